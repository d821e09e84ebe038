//! Book endpoints (multipart forms for the cover upload)

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use axum_extra::extract::Multipart;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{AuthorQuery, AuthorView},
        book::{BookQuery, BookView, Cover},
        book_instance::BookInstanceView,
    },
    services::books::{BookChange, BookSubmission},
    AppState,
};

use super::{found, parse_id, CurrentUser};

/// Collect the multipart fields of a book form
async fn read_submission(mut multipart: Multipart) -> AppResult<BookSubmission> {
    let mut submission = BookSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "cover" {
            let image_type = field.content_type().unwrap_or_default().to_string();
            let image = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            // An empty file input means "no new cover"
            if !image.is_empty() {
                submission.cover = Some(Cover {
                    image: image.to_vec(),
                    image_type,
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        match name.as_str() {
            "title" => submission.title = value,
            "author" => submission.author = value,
            "publish_date" => submission.publish_date = value,
            "page_count" => submission.page_count = value,
            "description" => submission.description = value,
            _ => {}
        }
    }

    Ok(submission)
}

/// Authors offered in the book form, or `None` if they cannot be loaded
async fn author_choices(state: &AppState, owner: Uuid) -> Option<Value> {
    match state.services.authors.list(owner, &AuthorQuery::default()).await {
        Ok(authors) => {
            let views: Vec<AuthorView> = authors.iter().map(AuthorView::from).collect();
            Some(json!(views))
        }
        Err(e) => {
            tracing::warn!(user_id = %owner, "Failed to load authors for book form: {}", e);
            None
        }
    }
}

/// List the requester's books, filtered by title and publish date
pub async fn list_books(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Response> {
    match state.services.books.list(user.id, &query).await {
        Ok(books) => {
            let books: Vec<BookView> = books.iter().map(BookView::from).collect();
            state.render(
                "books/index",
                json!({ "title": "Books", "books": books, "search_options": query }),
            )
        }
        Err(e) => {
            tracing::warn!(user_id = %user.id, "Failed to list books: {}", e);
            Ok(found("/"))
        }
    }
}

/// Blank book form
pub async fn new_book(State(state): State<AppState>, user: CurrentUser) -> AppResult<Response> {
    let Some(authors) = author_choices(&state, user.id).await else {
        return Ok(found("/books"));
    };
    state.render(
        "books/new",
        json!({ "title": "New Book", "book": BookSubmission::default(), "authors": authors }),
    )
}

/// Create a book from the multipart form
pub async fn create_book(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> AppResult<Response> {
    let submission = read_submission(multipart).await?;

    match state.services.books.create(user.id, &submission).await {
        Ok(book) => Ok(found(&book.url())),
        Err(e) => {
            tracing::warn!(user_id = %user.id, "Failed to create book: {}", e);
            let Some(authors) = author_choices(&state, user.id).await else {
                return Ok(found("/books"));
            };
            state.render(
                "books/new",
                json!({
                    "title": "New Book",
                    "book": submission,
                    "authors": authors,
                    "error_message": "Error creating book",
                }),
            )
        }
    }
}

/// Render a book with its copies
async fn render_show(
    state: &AppState,
    owner: Uuid,
    id: Uuid,
    error_message: Option<&str>,
) -> AppResult<Response> {
    match state.services.books.show(owner, id).await {
        Ok(Some((book, copies))) => {
            let copies: Vec<BookInstanceView> = copies.iter().map(BookInstanceView::from).collect();
            let mut model = json!({
                "title": book.title,
                "book": BookView::from(&book),
                "author_url": format!("/authors/{}", book.author_id),
                "copies": copies,
            });
            if let Some(message) = error_message {
                model["error_message"] = json!(message);
            }
            state.render("books/show", model)
        }
        Ok(None) => Ok(found("/")),
        Err(e) => {
            tracing::warn!(book_id = %id, "Failed to show book: {}", e);
            Ok(found("/"))
        }
    }
}

/// Show a book with its copies
pub async fn show_book(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let Some(id) = parse_id(&id) else {
        return Ok(found("/"));
    };
    render_show(&state, user.id, id, None).await
}

/// Book edit form
pub async fn edit_book(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let Some(id) = parse_id(&id) else {
        return Ok(found("/"));
    };

    let book = match state.services.books.find(user.id, id).await {
        Ok(Some(book)) => book,
        Ok(None) => return Ok(found("/")),
        Err(e) => {
            tracing::warn!(book_id = %id, "Failed to load book for edit: {}", e);
            return Ok(found("/books"));
        }
    };
    let Some(authors) = author_choices(&state, user.id).await else {
        return Ok(found("/books"));
    };

    state.render(
        "books/edit",
        json!({ "title": "Edit Book", "book": BookView::from(&book), "authors": authors }),
    )
}

/// Update a book; the stored cover is kept unless a new one is uploaded
pub async fn update_book(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Response> {
    let Some(id) = parse_id(&id) else {
        return Ok(found("/"));
    };
    let submission = read_submission(multipart).await?;

    match state.services.books.update(user.id, id, &submission).await {
        BookChange::Done(book) => Ok(found(&book.url())),
        BookChange::Missing => Ok(found("/")),
        BookChange::Failed(book) => {
            let Some(authors) = author_choices(&state, user.id).await else {
                return Ok(found("/books"));
            };
            state.render(
                "books/edit",
                json!({
                    "title": "Edit Book",
                    "book": BookView::from(&book),
                    "submission": submission,
                    "authors": authors,
                    "error_message": "Error updating book",
                }),
            )
        }
    }
}

/// Remove a book that has no copies
pub async fn delete_book(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let Some(id) = parse_id(&id) else {
        return Ok(found("/"));
    };

    match state.services.books.delete(user.id, id).await {
        BookChange::Done(_) => Ok(found("/books")),
        BookChange::Missing => Ok(found("/")),
        BookChange::Failed(book) => {
            render_show(&state, user.id, book.id, Some("Could not remove book")).await
        }
    }
}
