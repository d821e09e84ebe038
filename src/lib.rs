//! Lectern Library Catalog
//!
//! Server-rendered catalog of authors, books and their physical copies,
//! with per-user ownership and session authentication.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod repository;
pub mod services;
pub mod views;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub renderer: Arc<dyn views::Renderer>,
}

impl AppState {
    pub fn new(config: AppConfig, repository: repository::Repository) -> Self {
        let services = services::Services::new(
            repository,
            config.auth.clone(),
            config.catalog.clone(),
        );
        Self {
            renderer: views::renderer_for(config.render.format),
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
