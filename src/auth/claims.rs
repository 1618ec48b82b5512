/// JWT Claims structures
///
/// Access and refresh tokens carry different claim sets. Both include a
/// random `jti` so tokens minted in the same second are still distinct.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::refresh_token::generate_token_id;
use crate::error::{AppError, AuthError};
use crate::user::UserAccount;

/// Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub jti: String,
}

impl AccessClaims {
    pub fn new(account: &UserAccount, expiry_seconds: i64, issuer: &str) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: account.id.to_string(),
            full_name: account.full_name.clone(),
            email: account.email.clone(),
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer.to_string(),
            jti: generate_token_id(),
        }
    }

    pub fn user_id(&self) -> Result<Uuid, AppError> {
        parse_subject(&self.sub)
    }
}

/// Claims for refresh tokens: subject only
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub jti: String,
}

impl RefreshClaims {
    pub fn new(user_id: Uuid, expiry_seconds: i64, issuer: &str) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer.to_string(),
            jti: generate_token_id(),
        }
    }

    pub fn user_id(&self) -> Result<Uuid, AppError> {
        parse_subject(&self.sub)
    }
}

// A signed token with a non-UUID subject was not minted by us.
fn parse_subject(sub: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(sub).map_err(|_| AppError::Auth(AuthError::TokenInvalid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::NewUserAccount;

    fn account() -> UserAccount {
        NewUserAccount {
            full_name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            mobile_number: "1234567890".to_string(),
            password_hash: "hash".to_string(),
        }
        .into_account()
    }

    #[test]
    fn test_access_claims_creation() {
        let account = account();
        let claims = AccessClaims::new(&account, 900, "test");

        assert_eq!(claims.sub, account.id.to_string());
        assert_eq!(claims.full_name, "Ann");
        assert_eq!(claims.email, "ann@x.com");
        assert_eq!(claims.exp - claims.iat, 900);
        assert_eq!(claims.user_id().unwrap(), account.id);
    }

    #[test]
    fn test_access_claims_serialize_full_name_in_camel_case() {
        let claims = AccessClaims::new(&account(), 900, "test");
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["fullName"], "Ann");
    }

    #[test]
    fn test_refresh_claims_are_unique() {
        let id = Uuid::new_v4();
        let first = RefreshClaims::new(id, 60, "test");
        let second = RefreshClaims::new(id, 60, "test");

        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_invalid_subject() {
        let mut claims = RefreshClaims::new(Uuid::new_v4(), 60, "test");
        claims.sub = "invalid-uuid".to_string();

        assert!(matches!(
            claims.user_id(),
            Err(AppError::Auth(AuthError::TokenInvalid))
        ));
    }
}
