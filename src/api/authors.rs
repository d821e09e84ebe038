//! Author endpoints. Failures redirect rather than render an error page.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Form,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorQuery, AuthorView},
        book::BookView,
    },
    services::authors::AuthorChange,
    AppState,
};

use super::{found, parse_id, CurrentUser};

/// Author create/update form
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthorForm {
    pub name: String,
}

fn author_views(authors: &[Author]) -> Vec<AuthorView<'_>> {
    authors.iter().map(AuthorView::from).collect()
}

/// List the requester's authors, optionally filtered by name
pub async fn list_authors(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<AuthorQuery>,
) -> AppResult<Response> {
    match state.services.authors.list(user.id, &query).await {
        Ok(authors) => state.render(
            "authors/index",
            json!({
                "title": "Authors",
                "authors": author_views(&authors),
                "search_options": query,
            }),
        ),
        Err(e) => {
            tracing::warn!(user_id = %user.id, "Failed to list authors: {}", e);
            Ok(found("/"))
        }
    }
}

/// Blank author form
pub async fn new_author(State(state): State<AppState>, _user: CurrentUser) -> AppResult<Response> {
    state.render(
        "authors/new",
        json!({ "title": "New Author", "author": { "name": "" } }),
    )
}

/// Create an author owned by the requester
pub async fn create_author(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<AuthorForm>,
) -> AppResult<Response> {
    match state.services.authors.create(user.id, &form.name).await {
        Ok(author) => Ok(found(&author.url())),
        Err(e) => {
            tracing::warn!(user_id = %user.id, "Failed to create author: {}", e);
            state.render(
                "authors/new",
                json!({
                    "title": "New Author",
                    "author": { "name": form.name },
                    "error_message": "Error creating author",
                }),
            )
        }
    }
}

/// Author with a sample of their books
pub async fn show_author(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let Some(id) = parse_id(&id) else {
        return Ok(found("/"));
    };

    match state.services.authors.show(user.id, id).await {
        Ok(Some((author, books))) => {
            let books: Vec<BookView> = books.iter().map(BookView::from).collect();
            state.render(
                "authors/show",
                json!({
                    "title": author.name,
                    "author": AuthorView::from(&author),
                    "books_by_author": books,
                }),
            )
        }
        Ok(None) => Ok(found("/")),
        Err(e) => {
            tracing::warn!(author_id = %id, "Failed to show author: {}", e);
            Ok(found("/"))
        }
    }
}

/// Author edit form
pub async fn edit_author(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let Some(id) = parse_id(&id) else {
        return Ok(found("/authors"));
    };

    match state.services.authors.find(user.id, id).await {
        Ok(Some(author)) => state.render(
            "authors/edit",
            json!({ "title": "Edit Author", "author": AuthorView::from(&author) }),
        ),
        Ok(None) => Ok(found("/authors")),
        Err(e) => {
            tracing::warn!(author_id = %id, "Failed to load author for edit: {}", e);
            Ok(found("/authors"))
        }
    }
}

/// Rename an author; a rejected save re-renders the edit form
pub async fn update_author(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Form(form): Form<AuthorForm>,
) -> AppResult<Response> {
    let Some(id) = parse_id(&id) else {
        return Ok(found("/"));
    };

    match state.services.authors.update(user.id, id, &form.name).await {
        AuthorChange::Done(author) => Ok(found(&author.url())),
        AuthorChange::Missing => Ok(found("/")),
        AuthorChange::Failed(author) => state.render(
            "authors/edit",
            json!({
                "title": "Edit Author",
                "author": AuthorView::from(&author),
                "error_message": "Error updating author",
            }),
        ),
    }
}

/// Remove an author that has no books
pub async fn delete_author(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Response {
    let Some(id) = parse_id(&id) else {
        return found("/");
    };

    match state.services.authors.delete(user.id, id).await {
        AuthorChange::Done(_) => found("/authors"),
        AuthorChange::Missing => found("/"),
        AuthorChange::Failed(author) => found(&author.url()),
    }
}
