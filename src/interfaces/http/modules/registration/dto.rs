//! Registration view models

use serde::Serialize;

use crate::application::RegistrationForm;

pub const PAGE_TITLE: &str = "Register";

/// Values echoed back into the form. Password fields are never included.
#[derive(Debug, Default, Serialize)]
pub struct UserFormValues {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
}

impl From<&RegistrationForm> for UserFormValues {
    fn from(form: &RegistrationForm) -> Self {
        Self {
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            email_address: form.email_address.clone(),
        }
    }
}

/// Context for `user-register.html`
#[derive(Debug, Serialize)]
pub struct RegisterPage {
    pub title: &'static str,
    pub user: UserFormValues,
    pub errors: Vec<String>,
    pub csrf_token: String,
}

impl RegisterPage {
    pub fn empty(csrf_token: String) -> Self {
        Self {
            title: PAGE_TITLE,
            user: UserFormValues::default(),
            errors: Vec::new(),
            csrf_token,
        }
    }

    pub fn with_errors(form: &RegistrationForm, errors: Vec<String>, csrf_token: String) -> Self {
        Self {
            title: PAGE_TITLE,
            user: UserFormValues::from(form),
            errors,
            csrf_token,
        }
    }
}
