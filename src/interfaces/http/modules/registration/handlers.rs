//! Registration handlers
//!
//! Thin wrappers over `RegistrationService`: render the form, or submit it
//! and turn the outcome into a redirect or a re-rendered form.

use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};

use super::dto::RegisterPage;
use crate::application::{RegistrationForm, RegistrationOutcome, RegistrationService};
use crate::interfaces::http::middleware::CsrfToken;
use crate::interfaces::http::views::{Views, USER_REGISTER};
use crate::shared::AppResult;

/// Where a successful registration lands.
pub const LANDING_ROUTE: &str = "/";

#[derive(Clone)]
pub struct RegistrationHandlerState {
    pub registration_service: Arc<RegistrationService>,
    pub views: Views,
}

/// GET /user/register
pub async fn show_registration_form(
    State(state): State<RegistrationHandlerState>,
    Extension(csrf): Extension<CsrfToken>,
) -> AppResult<Html<String>> {
    state
        .views
        .render(USER_REGISTER, RegisterPage::empty(csrf.issue()))
}

/// POST /user/register
pub async fn submit_registration(
    State(state): State<RegistrationHandlerState>,
    Extension(csrf): Extension<CsrfToken>,
    Form(form): Form<RegistrationForm>,
) -> AppResult<Response> {
    match state.registration_service.register(&form).await? {
        RegistrationOutcome::Registered(_) => Ok(Redirect::to(LANDING_ROUTE).into_response()),
        RegistrationOutcome::Rejected { errors } => {
            let page = RegisterPage::with_errors(&form, errors, csrf.issue());
            Ok(state.views.render(USER_REGISTER, page)?.into_response())
        }
    }
}
