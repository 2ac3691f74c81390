//! # Park Tracker
//!
//! Server-rendered web application for tracking park visits. This crate
//! currently covers account registration.
//!
//! ## Architecture
//!
//! - **domain**: user model and the repository contract
//! - **application**: the registration rule table and workflow
//! - **infrastructure**: SQLite persistence, password hashing, anti-forgery tokens
//! - **interfaces**: HTTP router, middleware, handlers and templates
//! - **server**: process lifecycle (startup, graceful shutdown)

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig, ConfigError};

pub use infrastructure::{init_database, DatabaseConfig};

pub use interfaces::http::create_router;

pub use server::{init_tracing, ServerHandle, ServerOptions};
