//! Password hashing utilities

use async_trait::async_trait;
use bcrypt::{hash, verify};

use crate::shared::InfraError;

/// Work factor used for newly registered users.
pub const DEFAULT_COST: u32 = 10;

/// Lowest work factor bcrypt accepts.
pub const MIN_COST: u32 = 4;

/// Highest work factor bcrypt accepts.
pub const MAX_COST: u32 = 31;

/// One-way password hashing, injected into the registration service.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> Result<String, InfraError>;

    async fn verify(&self, password: &str, hashed: &str) -> Result<bool, InfraError>;
}

/// bcrypt with a fixed cost. Hashing runs on the blocking pool so a
/// slow hash never stalls the async workers.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// `cost` is clamped to the range bcrypt accepts.
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_COST, MAX_COST),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

#[async_trait]
impl PasswordHasher for BcryptHasher {
    async fn hash(&self, password: &str) -> Result<String, InfraError> {
        let password = password.to_owned();
        let cost = self.cost;
        let hashed = tokio::task::spawn_blocking(move || hash(password, cost)).await??;
        Ok(hashed)
    }

    async fn verify(&self, password: &str, hashed: &str) -> Result<bool, InfraError> {
        let password = password.to_owned();
        let hashed = hashed.to_owned();
        let valid = tokio::task::spawn_blocking(move || verify(password, &hashed)).await??;
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_is_clamped() {
        assert_eq!(BcryptHasher::new(0).cost(), MIN_COST);
        assert_eq!(BcryptHasher::new(1).cost(), 4);
        assert_eq!(BcryptHasher::new(99).cost(), MAX_COST);
        assert_eq!(BcryptHasher::new(31).cost(), 31);
        assert_eq!(BcryptHasher::new(12).cost(), 12);
        assert_eq!(BcryptHasher::default().cost(), DEFAULT_COST);
    }

    #[tokio::test]
    async fn async_hasher_round_trip() {
        let hasher = BcryptHasher::new(MIN_COST);
        let hashed = hasher.hash("Abcdef1!").await.unwrap();

        assert_ne!(hashed, "Abcdef1!");
        assert!(hashed.starts_with("$2b$04$"));
        assert!(hasher.verify("Abcdef1!", &hashed).await.unwrap());
        assert!(!hasher.verify("Abcdef1?", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_is_crypto_error() {
        let hasher = BcryptHasher::new(MIN_COST);
        let err = hasher.verify("Abcdef1!", "not-a-hash").await.unwrap_err();
        assert!(matches!(err, InfraError::Crypto(_)));
    }
}
