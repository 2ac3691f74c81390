//! In-memory user storage

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{CreateUserDto, DomainError, User, UserRepositoryInterface};
use crate::shared::AppResult;

/// In-memory user repository for development and testing.
///
/// Keyed by email address, so the uniqueness guarantee matches the
/// `users` table constraint.
pub struct InMemoryUserRepository {
    users: DashMap<String, User>,
    id_counter: AtomicI32,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            id_counter: AtomicI32::new(1),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepositoryInterface for InMemoryUserRepository {
    async fn create_user(&self, dto: CreateUserDto) -> AppResult<User> {
        match self.users.entry(dto.email_address.clone()) {
            Entry::Occupied(_) => Err(DomainError::Conflict("email_address".to_string()).into()),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let user = User {
                    id: self.id_counter.fetch_add(1, Ordering::SeqCst),
                    first_name: dto.first_name,
                    last_name: dto.last_name,
                    email_address: dto.email_address,
                    hashed_password: dto.hashed_password,
                    created_at: now,
                    updated_at: now,
                };
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }

    async fn get_user_by_email(&self, email_address: &str) -> AppResult<Option<User>> {
        Ok(self.users.get(email_address).map(|u| u.value().clone()))
    }

    async fn count_users(&self) -> AppResult<u64> {
        Ok(self.users.len() as u64)
    }
}
