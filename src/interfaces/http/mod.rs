//! HTTP interface
//!
//! - `middleware`: anti-forgery protection
//! - `modules`: request handlers per area
//! - `views`: minijinja templates
//! - `router`: route table and shared state

pub mod error;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod views;

pub use middleware::{CsrfConfig, CsrfToken};
pub use router::{create_router, AppState};
pub use views::Views;
