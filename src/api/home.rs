//! Home page and session endpoints

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookView,
        user::{LoginForm, RegisterForm},
    },
    AppState,
};

use super::{found, CurrentUser};

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let auth = &state.services.auth;
    Cookie::build((auth.cookie_name().to_string(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(auth.secure_cookie())
        .build()
}

/// Recently added books
pub async fn index(State(state): State<AppState>, user: Option<CurrentUser>) -> AppResult<Response> {
    let Some(user) = user else {
        return Ok(found("/login"));
    };

    let books = state.services.books.recent().await.unwrap_or_else(|e| {
        tracing::warn!("Failed to load recent books: {}", e);
        Vec::new()
    });
    let books: Vec<BookView> = books.iter().map(BookView::from).collect();

    state.render(
        "index",
        json!({ "title": "Lectern", "books": books, "username": user.username }),
    )
}

/// Login form
pub async fn login_page(State(state): State<AppState>) -> AppResult<Response> {
    state.render("login", json!({ "title": "Log in" }))
}

/// Verify credentials and open a session
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    match state.services.auth.login(&form).await {
        Ok((token, _)) => {
            let jar = jar.add(session_cookie(&state, token));
            Ok((jar, found("/")).into_response())
        }
        Err(AppError::Authentication(message)) => state.render_with_status(
            StatusCode::UNAUTHORIZED,
            "login",
            json!({ "title": "Log in", "error_message": message, "username": form.username }),
        ),
        Err(e) => Err(e),
    }
}

/// Registration form
pub async fn register_page(State(state): State<AppState>) -> AppResult<Response> {
    state.render("register", json!({ "title": "Register" }))
}

/// Create an account and open a session
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    match state.services.auth.register(&form).await {
        Ok((token, _)) => {
            let jar = jar.add(session_cookie(&state, token));
            Ok((jar, found("/")).into_response())
        }
        Err(AppError::Validation(message)) | Err(AppError::Conflict(message)) => state.render(
            "register",
            json!({ "title": "Register", "error_message": message, "username": form.username }),
        ),
        Err(e) => Err(e),
    }
}

/// Clear the session cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let cookie = Cookie::build(state.services.auth.cookie_name().to_string()).path("/");
    (jar.remove(cookie), found("/login")).into_response()
}
