pub mod csrf;
pub mod password;

pub use password::{BcryptHasher, PasswordHasher};
