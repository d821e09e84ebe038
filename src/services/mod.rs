//! Business logic services

pub mod auth;
pub mod authors;
pub mod book_instances;
pub mod books;

use crate::{
    config::{AuthConfig, CatalogConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub authors: authors::AuthorsService,
    pub books: books::BooksService,
    pub book_instances: book_instances::BookInstancesService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, catalog_config: CatalogConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            authors: authors::AuthorsService::new(repository.clone(), catalog_config.clone()),
            books: books::BooksService::new(repository.clone(), catalog_config),
            book_instances: book_instances::BookInstancesService::new(repository.clone()),
            repository,
        }
    }
}
