//! HTTP router
//!
//! HTML pages (landing, registration) sit behind the anti-forgery
//! middleware; `/health` does not. Every route gets request tracing and
//! an `X-Request-Id`.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::FromRef, middleware, routing::get, Router};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;

use crate::application::RegistrationService;
use crate::interfaces::http::middleware::{csrf_middleware, CsrfConfig};
use crate::interfaces::http::modules::health::{self, HealthState};
use crate::interfaces::http::modules::registration::{self, RegistrationHandlerState};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::home;
use crate::interfaces::http::views::Views;

/// Unified state for all routes. Axum extracts the specific handler state
/// via `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub registration_service: Arc<RegistrationService>,
    pub views: Views,
    pub db: DatabaseConnection,
    pub started_at: Arc<Instant>,
}

impl FromRef<AppState> for RegistrationHandlerState {
    fn from_ref(s: &AppState) -> Self {
        RegistrationHandlerState {
            registration_service: Arc::clone(&s.registration_service),
            views: s.views.clone(),
        }
    }
}

impl FromRef<AppState> for HealthState {
    fn from_ref(s: &AppState) -> Self {
        HealthState {
            db: s.db.clone(),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

impl FromRef<AppState> for Views {
    fn from_ref(s: &AppState) -> Self {
        s.views.clone()
    }
}

pub fn create_router(state: AppState, csrf: CsrfConfig) -> Router {
    let pages = Router::new()
        .route("/", get(home::index))
        .route(
            "/user/register",
            get(registration::show_registration_form).post(registration::submit_registration),
        )
        .layer(middleware::from_fn_with_state(csrf, csrf_middleware));

    Router::new()
        .merge(pages)
        .route("/health", get(health::health_check))
        .fallback(home::not_found)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, Response, StatusCode};
    use sea_orm_migration::MigratorTrait;
    use tower::Service;

    use crate::domain::UserRepositoryInterface;
    use crate::infrastructure::crypto::password::MIN_COST;
    use crate::infrastructure::crypto::BcryptHasher;
    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::database::repositories::UserRepository;
    use crate::infrastructure::database::{init_database, DatabaseConfig};
    use crate::interfaces::http::modules::request_id::REQUEST_ID_HEADER;

    struct TestApp {
        router: Router,
        users: Arc<UserRepository>,
    }

    impl TestApp {
        async fn new() -> Self {
            let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
            Migrator::up(&db, None).await.unwrap();

            let users = Arc::new(UserRepository::new(db.clone()));
            let service = RegistrationService::new(
                users.clone(),
                Arc::new(BcryptHasher::new(MIN_COST)),
            );
            let state = AppState {
                registration_service: Arc::new(service),
                views: Views::new().unwrap(),
                db,
                started_at: Arc::new(Instant::now()),
            };

            Self {
                router: create_router(state, CsrfConfig::default()),
                users,
            }
        }

        async fn send(&self, req: Request<Body>) -> Response<Body> {
            let mut svc = self.router.clone().into_service();
            svc.call(req).await.unwrap()
        }

        /// GET the form; returns (cookie pair, token).
        async fn open_form(&self) -> (String, String) {
            let resp = self
                .send(Request::get("/user/register").body(Body::empty()).unwrap())
                .await;
            assert_eq!(resp.status(), StatusCode::OK);
            let cookie = resp
                .headers()
                .get(header::SET_COOKIE)
                .unwrap()
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .to_string();
            let html = body_string(resp).await;
            (cookie, csrf_from_html(&html))
        }

        async fn submit(&self, cookie: &str, token: &str, fields: &str) -> Response<Body> {
            let body = if fields.is_empty() {
                format!("_csrf={}", token)
            } else {
                format!("_csrf={}&{}", token, fields)
            };
            let req = Request::post("/user/register")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header(header::COOKIE, cookie)
                .body(Body::from(body))
                .unwrap();
            self.send(req).await
        }

        async fn user_count(&self) -> u64 {
            self.users.count_users().await.unwrap()
        }
    }

    const ANN: &str = "firstName=Ann&lastName=Lee&emailAddress=ann@example.com\
                       &password=Abcdef1!&confirmPassword=Abcdef1!";

    async fn body_string(resp: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn csrf_from_html(html: &str) -> String {
        let marker = "name=\"_csrf\" value=\"";
        let start = html.find(marker).unwrap() + marker.len();
        let end = start + html[start..].find('"').unwrap();
        html[start..end].to_string()
    }

    #[tokio::test]
    async fn form_renders_empty_with_token() {
        let app = TestApp::new().await;
        let (cookie, token) = app.open_form().await;

        assert!(cookie.starts_with("_csrf="));
        assert!(!token.is_empty());

        let resp = app
            .send(
                Request::get("/user/register")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        let html = body_string(resp).await;
        assert!(html.contains("<title>Register | Park Tracker</title>"));
        assert!(html.contains("name=\"emailAddress\" value=\"\""));
        assert!(!html.contains("class=\"errors\""));
        assert_ne!(csrf_from_html(&html), token);
    }

    #[tokio::test]
    async fn valid_submission_persists_and_redirects() {
        let app = TestApp::new().await;
        let (cookie, token) = app.open_form().await;

        let resp = app.submit(&cookie, &token, ANN).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");

        assert_eq!(app.user_count().await, 1);
        let user = app
            .users
            .get_user_by_email("ann@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.first_name, "Ann");
        assert_ne!(user.hashed_password, "Abcdef1!");
        assert!(bcrypt::verify("Abcdef1!", &user.hashed_password).unwrap());
    }

    #[tokio::test]
    async fn resubmission_reports_email_in_use() {
        let app = TestApp::new().await;
        let (cookie, token) = app.open_form().await;
        assert_eq!(
            app.submit(&cookie, &token, ANN).await.status(),
            StatusCode::SEE_OTHER
        );

        let resp = app.submit(&cookie, &token, ANN).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_string(resp).await;
        assert!(html.contains("The provided Email Address is already in use by another account"));
        assert_eq!(app.user_count().await, 1);
    }

    #[tokio::test]
    async fn empty_submission_lists_every_missing_field() {
        let app = TestApp::new().await;
        let (cookie, token) = app.open_form().await;

        let resp = app.submit(&cookie, &token, "").await;
        assert_eq!(resp.status(), StatusCode::OK);

        let html = body_string(resp).await;
        for field in [
            "First Name",
            "Last Name",
            "Email Address",
            "Password",
            "Confirm Password",
        ] {
            assert!(
                html.contains(&format!("Please provide a value for {}", field)),
                "missing message for {field}"
            );
        }
        assert_eq!(app.user_count().await, 0);
    }

    #[tokio::test]
    async fn rejected_form_keeps_values_but_not_passwords() {
        let app = TestApp::new().await;
        let (cookie, token) = app.open_form().await;

        let fields = "firstName=Ann&lastName=Lee&emailAddress=ann@example.com\
                      &password=Abcdef1!&confirmPassword=Abcdef1?";
        let resp = app.submit(&cookie, &token, fields).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let html = body_string(resp).await;
        assert!(html.contains("Confirm Password must match Password"));
        assert!(html.contains("value=\"Ann\""));
        assert!(html.contains("value=\"ann@example.com\""));
        assert!(!html.contains("Abcdef1"));
        assert_ne!(csrf_from_html(&html), token);
        assert_eq!(app.user_count().await, 0);
    }

    #[tokio::test]
    async fn weak_password_is_rejected() {
        let app = TestApp::new().await;
        let (cookie, token) = app.open_form().await;

        let fields = "firstName=Ann&lastName=Lee&emailAddress=ann@example.com\
                      &password=abcdef1!&confirmPassword=abcdef1!";
        let html = body_string(app.submit(&cookie, &token, fields).await).await;
        assert!(html.contains("Password must contain at least 1 lowercase letter"));
        assert_eq!(app.user_count().await, 0);
    }

    #[tokio::test]
    async fn submission_without_token_is_forbidden() {
        let app = TestApp::new().await;
        let (cookie, _) = app.open_form().await;

        let req = Request::post("/user/register")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::COOKIE, cookie)
            .body(Body::from(ANN))
            .unwrap();
        let resp = app.send(req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(app.user_count().await, 0);
    }

    #[tokio::test]
    async fn landing_page_and_fallback() {
        let app = TestApp::new().await;

        let resp = app.send(Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(REQUEST_ID_HEADER).is_some());

        let resp = app
            .send(Request::get("/rides").body(Body::empty()).unwrap())
            .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_reports_database() {
        let app = TestApp::new().await;
        let resp = app
            .send(Request::get("/health").body(Body::empty()).unwrap())
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(header::SET_COOKIE).is_none());

        let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["database"]["status"], "ok");
    }
}
