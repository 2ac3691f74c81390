use async_trait::async_trait;

use super::{CreateUserDto, User};
use crate::shared::AppResult;

#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    /// Insert a user. A duplicate `email_address` fails with
    /// `DomainError::Conflict`.
    async fn create_user(&self, dto: CreateUserDto) -> AppResult<User>;

    async fn get_user_by_email(&self, email_address: &str) -> AppResult<Option<User>>;

    async fn email_exists(&self, email_address: &str) -> AppResult<bool> {
        Ok(self.get_user_by_email(email_address).await?.is_some())
    }

    async fn count_users(&self) -> AppResult<u64>;
}
