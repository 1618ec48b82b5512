/// User repository
///
/// Storage is a collaborator of the session logic, consumed through the
/// `UserRepository` trait. Email and mobile number uniqueness is enforced
/// by every implementation at write time.

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::user::{NewUserAccount, UserAccount};

pub use memory::InMemoryUserRepository;
pub use postgres::PgUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account
    ///
    /// # Errors
    /// Conflict if the email or mobile number is already taken
    async fn create(&self, new_user: NewUserAccount) -> Result<UserAccount, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>, AppError>;

    /// `email` must already be normalized to lowercase
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, AppError>;

    async fn find_by_email_or_mobile(
        &self,
        email: &str,
        mobile_number: &str,
    ) -> Result<Option<UserAccount>, AppError>;

    /// Returns `false` if the account does not exist
    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<bool, AppError>;

    /// Unconditionally overwrite (or clear) the stored refresh token
    /// fingerprint. Last writer wins. Returns `false` if the account does
    /// not exist.
    async fn set_refresh_token_hash(
        &self,
        id: Uuid,
        refresh_token_hash: Option<&str>,
    ) -> Result<bool, AppError>;

    /// Replace the stored fingerprint only if it still equals `expected`.
    /// Returns `false` if the account is gone or the fingerprint changed.
    async fn rotate_refresh_token_hash(
        &self,
        id: Uuid,
        expected: &str,
        replacement: &str,
    ) -> Result<bool, AppError>;
}
