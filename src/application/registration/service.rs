//! Registration service: application-layer orchestration
//!
//! Runs the rule table, hashes the password and stores the user. HTTP
//! handlers only translate the outcome into a redirect or a form.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::rules::{RegistrationForm, Rule, EMAIL_TAKEN_MESSAGE, REGISTRATION_RULES};
use crate::domain::{CreateUserDto, DomainError, User, UserRepositoryInterface};
use crate::infrastructure::crypto::PasswordHasher;
use crate::shared::{AppError, AppResult};

/// Result of one submission. Validation failures are data, not errors.
#[derive(Debug)]
pub enum RegistrationOutcome {
    Registered(User),
    Rejected { errors: Vec<String> },
}

pub struct RegistrationService {
    users: Arc<dyn UserRepositoryInterface>,
    hasher: Arc<dyn PasswordHasher>,
}

impl RegistrationService {
    pub fn new(users: Arc<dyn UserRepositoryInterface>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Evaluate every rule and collect the messages of the failing ones,
    /// in table order.
    pub async fn validate(&self, form: &RegistrationForm) -> AppResult<Vec<String>> {
        let mut errors = Vec::new();
        let mut failed_fields = Vec::new();

        for row in REGISTRATION_RULES {
            let value = form.value(row.field);
            let passed = match row.rule.check(value, form) {
                Some(passed) => passed,
                None => self.check_remote(row.rule, value).await?,
            };
            if !passed {
                errors.push(row.message.to_string());
                failed_fields.push(row.field.form_name());
            }
        }

        if !errors.is_empty() {
            debug!(fields = ?failed_fields, "Registration form rejected");
        }
        Ok(errors)
    }

    async fn check_remote(&self, rule: Rule, value: &str) -> AppResult<bool> {
        match rule {
            // no stored user can have an empty email
            Rule::UniqueEmail if value.is_empty() => Ok(true),
            Rule::UniqueEmail => Ok(!self.users.email_exists(value).await?),
            _ => Ok(true),
        }
    }

    /// Validate, hash and persist. Only infrastructure faults come back as
    /// `Err`.
    pub async fn register(&self, form: &RegistrationForm) -> AppResult<RegistrationOutcome> {
        let errors = self.validate(form).await?;
        if !errors.is_empty() {
            return Ok(RegistrationOutcome::Rejected { errors });
        }

        let hashed_password = self.hasher.hash(&form.password).await?;

        let dto = CreateUserDto {
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            email_address: form.email_address.clone(),
            hashed_password,
        };

        match self.users.create_user(dto).await {
            Ok(user) => {
                info!(user_id = user.id, email = %user.email_address, "New user registered");
                Ok(RegistrationOutcome::Registered(user))
            }
            // another request registered the same email between lookup and insert
            Err(AppError::Domain(DomainError::Conflict(_))) => {
                warn!(email = %form.email_address, "Email taken by a concurrent registration");
                Ok(RegistrationOutcome::Rejected {
                    errors: vec![EMAIL_TAKEN_MESSAGE.to_string()],
                })
            }
            Err(e) => Err(e),
        }
    }
}
