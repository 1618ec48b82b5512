/// JWT Token Issuer
///
/// Creates and verifies access and refresh tokens. The two token kinds are
/// signed with independent secrets, so a leaked access secret cannot mint
/// refresh tokens and vice versa.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::claims::{AccessClaims, RefreshClaims};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::user::UserAccount;

/// Access plus refresh token, issued together on login and refresh
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

pub struct TokenIssuer {
    access: SigningKeys,
    refresh: SigningKeys,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
    issuer: String,
}

impl TokenIssuer {
    pub fn new(config: &JwtSettings) -> Self {
        Self {
            access: SigningKeys::from_secret(&config.access_token_secret),
            refresh: SigningKeys::from_secret(&config.refresh_token_secret),
            access_token_expiry: config.access_token_expiry,
            refresh_token_expiry: config.refresh_token_expiry,
            issuer: config.issuer.clone(),
        }
    }

    pub fn access_token_expiry(&self) -> i64 {
        self.access_token_expiry
    }

    pub fn refresh_token_expiry(&self) -> i64 {
        self.refresh_token_expiry
    }

    /// Sign `{sub, fullName, email}` with the access secret
    pub fn issue_access_token(&self, account: &UserAccount) -> Result<String, AppError> {
        let claims = AccessClaims::new(account, self.access_token_expiry, &self.issuer);
        sign(&claims, &self.access.encoding)
    }

    /// Sign `{sub}` with the refresh secret
    pub fn issue_refresh_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let claims = RefreshClaims::new(user_id, self.refresh_token_expiry, &self.issuer);
        sign(&claims, &self.refresh.encoding)
    }

    pub fn issue_pair(&self, account: &UserAccount) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(account)?,
            refresh_token: self.issue_refresh_token(account.id)?,
        })
    }

    /// # Errors
    /// `AuthError::TokenInvalid` if the token is malformed, tampered with,
    /// expired, or from another issuer
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        self.verify(token, &self.access.decoding)
    }

    /// # Errors
    /// `AuthError::TokenInvalid` under the same conditions as access tokens
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, AppError> {
        self.verify(token, &self.refresh.decoding)
    }

    fn verify<C: DeserializeOwned>(&self, token: &str, key: &DecodingKey) -> Result<C, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.leeway = 0;

        decode::<C>(token, key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::warn!("JWT validation error: {}", e);
                AppError::Auth(AuthError::TokenInvalid)
            })
    }
}

fn sign<C: Serialize>(claims: &C, key: &EncodingKey) -> Result<String, AppError> {
    encode(&Header::new(Algorithm::HS256), claims, key)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::NewUserAccount;

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            access_token_secret: "test-access-secret-at-least-32-characters".to_string(),
            access_token_expiry: 900,
            refresh_token_secret: "test-refresh-secret-at-least-32-characters".to_string(),
            refresh_token_expiry: 1_296_000,
            issuer: "test".to_string(),
        }
    }

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
    fn test_generate_and_validate_access_token() {
        let issuer = TokenIssuer::new(&get_test_config());
        let account = account();

        let token = issuer.issue_access_token(&account).expect("Failed to generate token");
        let claims = issuer.verify_access_token(&token).expect("Failed to validate token");

        assert_eq!(claims.user_id().unwrap(), account.id);
        assert_eq!(claims.email, "ann@x.com");
        assert_eq!(claims.full_name, "Ann");
    }

    #[test]
    fn test_generate_and_validate_refresh_token() {
        let issuer = TokenIssuer::new(&get_test_config());
        let id = Uuid::new_v4();

        let token = issuer.issue_refresh_token(id).unwrap();
        let claims = issuer.verify_refresh_token(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), id);
        assert_eq!(claims.exp - claims.iat, 1_296_000);
    }

    #[test]
    fn test_secrets_are_not_interchangeable() {
        let issuer = TokenIssuer::new(&get_test_config());
        let account = account();
        let pair = issuer.issue_pair(&account).unwrap();

        assert!(issuer.verify_refresh_token(&pair.access_token).is_err());
        assert!(issuer.verify_access_token(&pair.refresh_token).is_err());
    }

    #[test]
    fn test_pairs_are_distinct() {
        let issuer = TokenIssuer::new(&get_test_config());
        let account = account();

        let first = issuer.issue_pair(&account).unwrap();
        let second = issuer.issue_pair(&account).unwrap();

        assert_ne!(first.refresh_token, second.refresh_token);
        assert_ne!(first.access_token, second.access_token);
    }

    #[test]
    fn test_invalid_token() {
        let issuer = TokenIssuer::new(&get_test_config());
        let result = issuer.verify_access_token("invalid.token.here");

        assert!(matches!(result, Err(AppError::Auth(AuthError::TokenInvalid))));
    }

    #[test]
    fn test_tampered_token() {
        let issuer = TokenIssuer::new(&get_test_config());
        let token = issuer.issue_access_token(&account()).unwrap();

        let tampered = format!("{}X", token);
        assert!(issuer.verify_access_token(&tampered).is_err());
    }

    #[test]
    fn test_expired_token() {
        let mut config = get_test_config();
        config.access_token_expiry = -10;
        let issuer = TokenIssuer::new(&config);

        let token = issuer.issue_access_token(&account()).unwrap();
        assert!(matches!(
            issuer.verify_access_token(&token),
            Err(AppError::Auth(AuthError::TokenInvalid))
        ));
    }

    #[test]
    fn test_wrong_issuer() {
        let token = TokenIssuer::new(&get_test_config())
            .issue_access_token(&account())
            .unwrap();

        let mut config = get_test_config();
        config.issuer = "wrong-issuer".to_string();
        let result = TokenIssuer::new(&config).verify_access_token(&token);

        assert!(result.is_err());
    }
}
