//! Domain layer: entities and the ports the application layer talks to.

pub mod user;

pub use user::{CreateUserDto, User, UserRepositoryInterface};

pub use crate::shared::{AppError, AppResult, DomainError, InfraError};
