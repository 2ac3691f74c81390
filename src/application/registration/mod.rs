//! Registration: sign-up validation and persistence
//!
//! `rules` holds the declarative rule table, `service` the
//! `RegistrationService` that evaluates it and stores new users.

pub mod rules;
pub mod service;

pub use rules::{Field, RegistrationForm, Rule, RuleRow, REGISTRATION_RULES};
pub use service::{RegistrationOutcome, RegistrationService};
