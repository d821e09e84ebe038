//! View rendering
//!
//! Handlers produce a named view and a JSON view-model; a `Renderer` turns
//! them into a response body.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::{json, Value};

use crate::{
    config::RenderFormat,
    error::{AppError, AppResult},
    forms::escape,
    AppState,
};

pub trait Renderer: Send + Sync {
    fn render(&self, view: &str, model: &Value) -> AppResult<String>;
}

/// Minimal HTML shell around the escaped view-model
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, view: &str, model: &Value) -> AppResult<String> {
        let title = model.get("title").and_then(Value::as_str).unwrap_or(view);
        let body = serde_json::to_string_pretty(model)
            .map_err(|e| AppError::Internal(format!("Failed to serialize view model: {}", e)))?;

        Ok(format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
             <body data-view=\"{view}\">\n<h1>{title}</h1>\n<pre id=\"view-model\">{body}</pre>\n</body>\n</html>\n",
            title = escape(title),
            view = escape(view),
            body = escape(&body),
        ))
    }
}

/// `{"view": ..., "model": ...}`, for tests and API-style clients
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, view: &str, model: &Value) -> AppResult<String> {
        serde_json::to_string(&json!({ "view": view, "model": model }))
            .map_err(|e| AppError::Internal(format!("Failed to serialize view model: {}", e)))
    }
}

pub fn renderer_for(format: RenderFormat) -> Arc<dyn Renderer> {
    match format {
        RenderFormat::Html => Arc::new(HtmlRenderer),
        RenderFormat::Json => Arc::new(JsonRenderer),
    }
}

impl AppState {
    /// Render a view with status 200
    pub fn render(&self, view: &str, model: Value) -> AppResult<Response> {
        self.render_with_status(StatusCode::OK, view, model)
    }

    pub fn render_with_status(&self, status: StatusCode, view: &str, model: Value) -> AppResult<Response> {
        let body = self.renderer.render(view, &model)?;
        Ok((status, Html(body)).into_response())
    }
}
