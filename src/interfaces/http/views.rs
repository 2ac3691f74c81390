//! HTML views
//!
//! Templates are compiled into the binary and rendered with minijinja.
//! `.html` templates are auto-escaped.

use std::sync::Arc;

use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;

use crate::shared::AppResult;

pub const LAYOUT: &str = "layout.html";
pub const INDEX: &str = "index.html";
pub const USER_REGISTER: &str = "user-register.html";
pub const ERROR: &str = "error.html";

const TEMPLATES: &[(&str, &str)] = &[
    (LAYOUT, include_str!("../../../templates/layout.html")),
    (INDEX, include_str!("../../../templates/index.html")),
    (USER_REGISTER, include_str!("../../../templates/user-register.html")),
    (ERROR, include_str!("../../../templates/error.html")),
];

/// Shared, immutable template environment.
#[derive(Clone)]
pub struct Views {
    env: Arc<Environment<'static>>,
}

impl Views {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env: Arc::new(env) })
    }

    pub fn render<C: Serialize>(&self, name: &str, ctx: C) -> AppResult<Html<String>> {
        let template = self.env.get_template(name)?;
        Ok(Html(template.render(ctx)?))
    }
}
