use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// A storage uniqueness constraint rejected the write.
    #[error("Already exists: {0}")]
    Conflict(String),
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<bcrypt::BcryptError> for InfraError {
    fn from(e: bcrypt::BcryptError) -> Self {
        Self::Crypto(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Infra(#[from] InfraError),
}

impl AppError {
    /// Whether the error comes from a collaborator (database, hashing,
    /// rendering) rather than from the request itself.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, AppError::Infra(_))
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::Infra(InfraError::Database(e))
    }
}

impl From<minijinja::Error> for AppError {
    fn from(e: minijinja::Error) -> Self {
        Self::Infra(InfraError::Template(e))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_are_infrastructure() {
        let err: AppError = sea_orm::DbErr::Custom("connection refused".into()).into();
        assert!(err.is_infrastructure());
        let msg = err.to_string();
        assert!(msg.starts_with("Database error:"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn conflict_is_domain_error() {
        let err: AppError = DomainError::Conflict("email_address".into()).into();
        assert!(!err.is_infrastructure());
        assert_eq!(err.to_string(), "Already exists: email_address");
    }
}
