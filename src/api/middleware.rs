//! Request and response middleware

use std::task::{Context, Poll};

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use serde_json::json;
use tower::{Layer, Service};

use crate::{error::ErrorPage, AppState};

/// Render the `error` view for responses carrying an [`ErrorPage`]
pub async fn render_error_pages(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let Some(page) = response.extensions().get::<ErrorPage>().cloned() else {
        return response;
    };

    let model = json!({
        "title": "Error",
        "message": page.message,
        "status": page.status.as_u16(),
    });
    match state.render_with_status(page.status, "error", model) {
        Ok(rendered) => rendered,
        Err(e) => {
            tracing::error!("Failed to render error page: {}", e);
            response
        }
    }
}

/// Layer applying [`MethodOverride`]
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodOverrideLayer;

impl<S> Layer<S> for MethodOverrideLayer {
    type Service = MethodOverride<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MethodOverride { inner }
    }
}

/// Lets HTML forms issue PUT and DELETE: `POST /authors/1?_method=DELETE`
/// is routed as `DELETE /authors/1`.
#[derive(Debug, Clone)]
pub struct MethodOverride<S> {
    inner: S,
}

impl<S, B> Service<axum::http::Request<B>> for MethodOverride<S>
where
    S: Service<axum::http::Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: axum::http::Request<B>) -> Self::Future {
        if let Some(method) = override_method(&request) {
            tracing::trace!(%method, uri = %request.uri(), "Method override");
            *request.method_mut() = method;
        }
        self.inner.call(request)
    }
}

fn override_method<B>(request: &axum::http::Request<B>) -> Option<Method> {
    if request.method() != Method::POST {
        return None;
    }
    request
        .uri()
        .query()?
        .split('&')
        .filter_map(|pair| pair.strip_prefix("_method="))
        .find_map(|value| match value.to_ascii_uppercase().as_str() {
            "PUT" => Some(Method::PUT),
            "PATCH" => Some(Method::PATCH),
            "DELETE" => Some(Method::DELETE),
            _ => None,
        })
}
