/// User account model
///
/// `UserAccount` is the persisted record and deliberately does not implement
/// `Serialize`. Anything leaving the service goes through `UserProfile`,
/// which has no password or refresh token fields.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserAccount {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub mobile_number: String,
    pub password_hash: String,
    /// SHA-256 fingerprint of the single redeemable refresh token
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create an account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUserAccount {
    pub full_name: String,
    pub email: String,
    pub mobile_number: String,
    pub password_hash: String,
}

impl NewUserAccount {
    pub fn into_account(self) -> UserAccount {
        let now = Utc::now();
        UserAccount {
            id: Uuid::new_v4(),
            full_name: self.full_name,
            email: self.email,
            mobile_number: self.mobile_number,
            password_hash: self.password_hash,
            refresh_token_hash: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Sanitized account representation
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub mobile_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&UserAccount> for UserProfile {
    fn from(account: &UserAccount) -> Self {
        Self {
            id: account.id,
            full_name: account.full_name.clone(),
            email: account.email.clone(),
            mobile_number: account.mobile_number.clone(),
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

impl From<UserAccount> for UserProfile {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.id,
            full_name: account.full_name,
            email: account.email,
            mobile_number: account.mobile_number,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Identity resolved by the authorization guard and injected into
/// request extensions for protected handlers.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub profile: UserProfile,
}
