//! Application layer - use cases

pub mod registration;

pub use registration::{RegistrationForm, RegistrationOutcome, RegistrationService};
