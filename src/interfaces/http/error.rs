//! HTTP mapping for application errors
//!
//! Validation failures never get here; they are rendered by the handlers.
//! What does arrive is a fault: it is logged and the client gets a generic
//! page without internal details.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::error;

use crate::shared::{AppError, DomainError};

fn error_page(status: StatusCode) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    let message = if status.is_server_error() {
        "Something went wrong. Please try again later."
    } else {
        "The request could not be completed."
    };
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{title} | Park Tracker</title></head>\
         <body><h1>{title}</h1><p>{message}</p></body></html>"
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Domain(DomainError::Conflict(_)) => StatusCode::CONFLICT,
            AppError::Infra(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        (status, Html(error_page(status))).into_response()
    }
}
