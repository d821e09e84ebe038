//! Book copy endpoints. Faults surface as error pages.
//!
//! Listing and detail pages are public; forms and writes need a session.

use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    forms::BookInstanceForm,
    models::book_instance::{BookInstanceStatus, BookInstanceView},
    services::book_instances::{RejectedForm, SubmitOutcome, NOT_FOUND},
    AppState,
};

use super::{found, parse_id, CurrentUser};

const CREATE_TITLE: &str = "Create BookInstance";
const UPDATE_TITLE: &str = "Update BookInstance";

/// Delete confirmation form
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteForm {
    pub bookinstanceid: String,
}

fn require_id(raw: &str) -> AppResult<Uuid> {
    parse_id(raw).ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

fn statuses() -> Vec<&'static str> {
    BookInstanceStatus::ALL.iter().map(BookInstanceStatus::as_str).collect()
}

fn rejected_model(title: &str, rejected: RejectedForm) -> Value {
    json!({
        "title": title,
        "book_list": rejected.books,
        "selected_book": rejected.input.book,
        "errors": rejected.errors,
        "bookinstance": rejected.input,
        "statuses": statuses(),
    })
}

fn submitted(state: &AppState, title: &str, outcome: SubmitOutcome) -> AppResult<Response> {
    match outcome {
        SubmitOutcome::Saved(instance) => Ok(found(&instance.url())),
        SubmitOutcome::Rejected(rejected) => {
            state.render("bookinstance_form", rejected_model(title, rejected))
        }
    }
}

/// List all copies with their book titles
pub async fn list(State(state): State<AppState>) -> AppResult<Response> {
    let instances = state.services.book_instances.list().await?;
    let views: Vec<BookInstanceView> = instances.iter().map(BookInstanceView::from).collect();
    state.render(
        "bookinstance_list",
        json!({ "title": "Book Instance List", "bookinstance_list": views }),
    )
}

/// Show one copy
pub async fn detail(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Response> {
    let instance = state.services.book_instances.detail(require_id(&id)?).await?;
    state.render(
        "bookinstance_detail",
        json!({
            "title": format!("Copy: {}", instance.book_title.as_deref().unwrap_or_default()),
            "bookinstance": BookInstanceView::from(&instance),
        }),
    )
}

/// Blank copy form
pub async fn create_get(State(state): State<AppState>, _user: CurrentUser) -> AppResult<Response> {
    let books = state.services.book_instances.books().await?;
    state.render(
        "bookinstance_form",
        json!({ "title": CREATE_TITLE, "book_list": books, "statuses": statuses() }),
    )
}

/// Create a copy, or re-render the form with its field errors
pub async fn create_post(
    State(state): State<AppState>,
    _user: CurrentUser,
    Form(form): Form<BookInstanceForm>,
) -> AppResult<Response> {
    let outcome = state.services.book_instances.create(&form).await?;
    submitted(&state, CREATE_TITLE, outcome)
}

/// Copy form pre-filled from the stored record
pub async fn update_get(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let (instance, books) = state.services.book_instances.edit(require_id(&id)?).await?;
    state.render(
        "bookinstance_form",
        json!({
            "title": UPDATE_TITLE,
            "book_list": books,
            "selected_book": instance.book_id,
            "bookinstance": BookInstanceView::from(&instance),
            "statuses": statuses(),
        }),
    )
}

/// Overwrite a copy, or re-render the form with its field errors
pub async fn update_post(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Form(form): Form<BookInstanceForm>,
) -> AppResult<Response> {
    let id = require_id(&id)?;
    let outcome = state.services.book_instances.update(id, &form).await?;
    submitted(&state, UPDATE_TITLE, outcome)
}

/// Delete confirmation page
pub async fn delete_get(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let Some(id) = parse_id(&id) else {
        return Ok(found("/bookinstances"));
    };

    match state.services.book_instances.find(id).await? {
        Some(instance) => state.render(
            "bookinstance_delete",
            json!({
                "title": "Delete BookInstance",
                "bookinstance": BookInstanceView::from(&instance),
            }),
        ),
        None => Ok(found("/bookinstances")),
    }
}

/// Remove the copy named in the form body; repeated deletes still redirect
pub async fn delete_post(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(path_id): Path<String>,
    Form(form): Form<DeleteForm>,
) -> AppResult<Response> {
    let id = parse_id(form.bookinstanceid.trim()).or_else(|| parse_id(&path_id));
    if let Some(id) = id {
        state.services.book_instances.delete(id).await?;
    }
    Ok(found("/bookinstances"))
}
