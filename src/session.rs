/// Session Manager
///
/// Orchestrates registration, login, refresh-token rotation, logout and
/// password changes on top of the hasher, token issuer and repository.
///
/// Each account has at most one redeemable refresh token. Login overwrites
/// it (last writer wins, which ends any earlier session), refresh swaps it
/// only if the presented token is still current, logout clears it.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::{fingerprint, PasswordHasher, TokenIssuer, TokenPair};
use crate::error::{AppError, AuthError, ErrorContext, ValidationError};
use crate::repository::UserRepository;
use crate::user::{NewUserAccount, UserAccount, UserProfile};
use crate::validators::{
    is_strong_password, passwords_match, present, validate_registration, RegistrationInput,
};

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub tokens: TokenPair,
    pub user: UserProfile,
}

/// Password change payload as received; every field may be absent
#[derive(Debug, Default, Clone)]
pub struct PasswordChange<'a> {
    pub old_password: Option<&'a str>,
    pub new_password: Option<&'a str>,
    pub confirm_password: Option<&'a str>,
}

pub struct SessionManager {
    repository: Arc<dyn UserRepository>,
    issuer: Arc<TokenIssuer>,
    hasher: PasswordHasher,
}

impl SessionManager {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        issuer: Arc<TokenIssuer>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            repository,
            issuer,
            hasher,
        }
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Validate, check uniqueness, hash and create a new account
    ///
    /// # Errors
    /// - Validation error for the first failing input check
    /// - Conflict if the email or mobile number is already registered
    pub async fn register(&self, input: &RegistrationInput<'_>) -> Result<UserProfile, AppError> {
        let context = ErrorContext::new("user_registration");

        let valid = validate_registration(input)?;

        if self
            .repository
            .find_by_email_or_mobile(&valid.email, &valid.mobile_number)
            .await?
            .is_some()
        {
            let err = AppError::account_conflict();
            context.log_error(&err);
            return Err(err);
        }

        let password_hash = self.hasher.hash(&valid.password).await?;
        drop(valid.password);

        let account = self
            .repository
            .create(NewUserAccount {
                full_name: valid.full_name,
                email: valid.email,
                mobile_number: valid.mobile_number,
                password_hash,
            })
            .await?;

        tracing::info!(
            request_id = %context.request_id,
            user_id = %account.id,
            "User registered successfully"
        );

        Ok(UserProfile::from(account))
    }

    /// Verify credentials and start a new session
    ///
    /// # Errors
    /// - Validation error if email or password is missing
    /// - NotFound if no account has this email
    /// - Unauthorized if the password does not verify
    pub async fn login(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<LoginOutcome, AppError> {
        let context = ErrorContext::new("user_login");

        let (email, password) = match (present(email), password.filter(|p| !p.is_empty())) {
            (Some(email), Some(password)) => (email.trim().to_lowercase(), password),
            _ => return Err(ValidationError::MissingFields.into()),
        };

        let account = self
            .repository
            .find_by_email(&email)
            .await?
            .ok_or_else(AppError::account_not_found)?;

        if !self.hasher.verify(password, &account.password_hash).await? {
            let err = AppError::Auth(AuthError::InvalidCredentials);
            context.with_user_id(account.id).log_error(&err);
            return Err(err);
        }

        let tokens = self.start_session(&account).await?;

        tracing::info!(
            request_id = %context.request_id,
            user_id = %account.id,
            "User logged in successfully"
        );

        Ok(LoginOutcome {
            tokens,
            user: UserProfile::from(account),
        })
    }

    /// Redeem the current refresh token for a new pair (rotation)
    ///
    /// # Errors
    /// - Unauthorized if the token is missing, fails verification, or its
    ///   subject is unknown
    /// - Forbidden if the token is not the account's current one
    pub async fn refresh(&self, presented: Option<&str>) -> Result<TokenPair, AppError> {
        let context = ErrorContext::new("token_refresh");

        let presented = present(presented).ok_or(AuthError::MissingToken)?;

        let claims = self
            .issuer
            .verify_refresh_token(presented)
            .map_err(|_| AppError::Auth(AuthError::InvalidRefreshToken))?;
        let user_id = claims
            .user_id()
            .map_err(|_| AppError::Auth(AuthError::InvalidRefreshToken))?;

        let account = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UnknownSubject)?;
        let context = context.with_user_id(account.id);

        let presented_hash = fingerprint(presented);
        if account.refresh_token_hash.as_deref() != Some(presented_hash.as_str()) {
            let err = AppError::Auth(AuthError::RefreshTokenReused);
            context.log_error(&err);
            return Err(err);
        }

        let tokens = self.issuer.issue_pair(&account)?;
        let rotated = self
            .repository
            .rotate_refresh_token_hash(account.id, &presented_hash, &fingerprint(&tokens.refresh_token))
            .await?;
        if !rotated {
            // a concurrent refresh, login or logout got there first
            let err = AppError::Auth(AuthError::RefreshTokenReused);
            context.log_error(&err);
            return Err(err);
        }

        tracing::info!(
            request_id = %context.request_id,
            user_id = %account.id,
            "Token refreshed successfully"
        );

        Ok(tokens)
    }

    /// End the account's session by clearing its refresh token
    ///
    /// # Errors
    /// NotFound if the account no longer exists
    pub async fn logout(&self, user_id: Uuid) -> Result<(), AppError> {
        if !self.repository.set_refresh_token_hash(user_id, None).await? {
            return Err(AppError::account_not_found());
        }
        tracing::info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Replace the password hash after verifying the old password.
    /// The current refresh token stays valid.
    ///
    /// # Errors
    /// - Validation error for missing fields, mismatch, or a weak new password
    /// - NotFound if the account no longer exists
    /// - Unauthorized if the old password does not verify
    pub async fn change_password(
        &self,
        user_id: Uuid,
        change: &PasswordChange<'_>,
    ) -> Result<(), AppError> {
        let context = ErrorContext::new("change_password").with_user_id(user_id);

        let (old_password, new_password, confirm_password) = match (
            change.old_password.filter(|p| !p.is_empty()),
            change.new_password.filter(|p| !p.is_empty()),
            change.confirm_password.filter(|p| !p.is_empty()),
        ) {
            (Some(o), Some(n), Some(c)) => (o, n, c),
            _ => return Err(ValidationError::MissingFields.into()),
        };
        passwords_match(new_password, confirm_password)?;
        is_strong_password(new_password)?;

        let account = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(AppError::account_not_found)?;

        if !self.hasher.verify(old_password, &account.password_hash).await? {
            let err = AppError::Auth(AuthError::InvalidCredentials);
            context.log_error(&err);
            return Err(err);
        }

        let password_hash = self.hasher.hash(new_password).await?;
        if !self
            .repository
            .update_password_hash(account.id, &password_hash)
            .await?
        {
            return Err(AppError::account_not_found());
        }

        tracing::info!(
            request_id = %context.request_id,
            user_id = %account.id,
            "Password changed"
        );
        Ok(())
    }

    /// Sanitized profile for an account id
    pub async fn user_details(&self, user_id: Uuid) -> Result<UserProfile, AppError> {
        self.repository
            .find_by_id(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(AppError::account_not_found)
    }

    async fn start_session(&self, account: &UserAccount) -> Result<TokenPair, AppError> {
        let tokens = self.issuer.issue_pair(account)?;
        let stored = self
            .repository
            .set_refresh_token_hash(account.id, Some(&fingerprint(&tokens.refresh_token)))
            .await?;
        if !stored {
            return Err(AppError::account_not_found());
        }
        Ok(tokens)
    }
}
