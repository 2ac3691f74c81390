//! Landing page and fallback

use axum::{extract::State, http::StatusCode, response::Html};
use minijinja::context;

use crate::interfaces::http::views::{Views, ERROR, INDEX};
use crate::shared::AppResult;

/// GET /
pub async fn index(State(views): State<Views>) -> AppResult<Html<String>> {
    views.render(INDEX, context! { title => "Park Tracker" })
}

/// Any unmatched route
pub async fn not_found(State(views): State<Views>) -> AppResult<(StatusCode, Html<String>)> {
    let page = views.render(
        ERROR,
        context! { title => "Page Not Found", message => "The requested page does not exist." },
    )?;
    Ok((StatusCode::NOT_FOUND, page))
}
