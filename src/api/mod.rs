//! HTTP handlers, routing and the authentication gate

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod health;
pub mod home;
pub mod middleware;

use axum::{
    async_trait,
    extract::{DefaultBodyLimit, FromRequestParts},
    http::{header::LOCATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use tower::Layer;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::{error::AppError, AppState};
use middleware::{MethodOverride, MethodOverrideLayer};

/// Largest accepted request body (cover uploads)
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// The signed-in user, taken from the session cookie.
///
/// Requests without a valid session, or whose user no longer exists, are
/// redirected to the login page.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth = &state.services.auth;
        let jar = CookieJar::from_headers(&parts.headers);

        let token = jar
            .get(auth.cookie_name())
            .map(|cookie| cookie.value().to_string())
            .ok_or_else(|| found("/login"))?;

        let user = auth.authenticate(&token).await.map_err(|e| match e {
            AppError::Authentication(reason) => {
                tracing::debug!("Rejected session: {}", reason);
                found("/login")
            }
            other => other.into_response(),
        })?;

        Ok(CurrentUser {
            id: user.id,
            username: user.username,
        })
    }
}

/// 302 redirect
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

/// Parse a record id from a path segment; malformed ids match nothing
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Home and session
        .route("/", get(home::index))
        .route("/login", get(home::login_page).post(home::login))
        .route("/register", get(home::register_page).post(home::register))
        .route("/logout", post(home::logout))
        // Health
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authors
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route("/authors/new", get(authors::new_author))
        .route(
            "/authors/:id",
            get(authors::show_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        .route("/authors/:id/edit", get(authors::edit_author))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/new", get(books::new_book))
        .route(
            "/books/:id",
            get(books::show_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/:id/edit", get(books::edit_book))
        // Book instances
        .route(
            "/bookinstances",
            get(book_instances::list).post(book_instances::create_post),
        )
        .route("/bookinstances/new", get(book_instances::create_get))
        .route("/bookinstances/:id", get(book_instances::detail))
        .route(
            "/bookinstances/:id/update",
            get(book_instances::update_get).post(book_instances::update_post),
        )
        .route(
            "/bookinstances/:id/delete",
            get(book_instances::delete_get).post(book_instances::delete_post),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::render_error_pages,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state)
}

/// Router wrapped with method override, which has to run before routing
pub fn create_app(state: AppState) -> MethodOverride<Router> {
    MethodOverrideLayer.layer(create_router(state))
}
