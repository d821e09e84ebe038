use axum::http::StatusCode;
use uuid::Uuid;

use lectern_server::models::Book;

use crate::common::TestApp;

async fn app_with_book() -> (TestApp, Book) {
    let app = TestApp::new().await;
    let author = app.create_author("Frank Herbert").await;
    let book = app.create_book(&author, "Dune").await;
    (app, book)
}

async fn create_copy(app: &TestApp, book: &Book, imprint: &str) -> String {
    let response = app
        .post_form(
            "/bookinstances",
            &format!("book={}&imprint={}&status=Available&due_back=", book.id, imprint),
        )
        .await;
    assert_eq!(response.status, StatusCode::FOUND);
    response.location().to_string()
}

#[tokio::test]
async fn test_create_copy_redirects_to_detail() {
    let (app, book) = app_with_book().await;

    let location = create_copy(&app, &book, "First+Edition").await;
    assert!(location.starts_with("/bookinstances/"));

    let detail = app.get(&location).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.view(), "bookinstance_detail");
    let model = detail.model();
    assert_eq!(model["title"], "Copy: Dune");
    assert_eq!(model["bookinstance"]["imprint"], "First Edition");
    assert_eq!(model["bookinstance"]["status"], "Available");
    assert!(model["bookinstance"]["due_back"].is_null());
}

#[tokio::test]
async fn test_unknown_copy_is_not_found() {
    let app = TestApp::new().await;

    let response = app.get(&format!("/bookinstances/{}", Uuid::new_v4())).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.view(), "error");
    assert_eq!(response.model()["message"], "Book copy not found");
    assert_eq!(response.model()["status"], 404);
}

#[tokio::test]
async fn test_missing_fields_rerender_form() {
    let (app, _) = app_with_book().await;

    let response = app
        .post_form("/bookinstances", "book=&imprint=+&status=&due_back=")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.view(), "bookinstance_form");
    let model = response.model();
    assert_eq!(model["title"], "Create BookInstance");
    let errors = model["errors"].as_array().unwrap();
    assert_eq!(errors[0]["msg"], "Book must be specified");
    assert_eq!(errors[1]["msg"], "Imprint must be specified");
    assert_eq!(model["book_list"][0]["title"], "Dune");

    let list = app.get("/bookinstances").await;
    assert_eq!(list.model()["bookinstance_list"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_bad_due_date_is_rejected() {
    let (app, book) = app_with_book().await;

    let response = app
        .post_form(
            "/bookinstances",
            &format!("book={}&imprint=Ace&status=Loaned&due_back=next+week", book.id),
        )
        .await;

    assert_eq!(response.view(), "bookinstance_form");
    let errors = response.model()["errors"].clone();
    assert_eq!(errors[0]["field"], "due_back");
    assert_eq!(errors[0]["msg"], "Invalid date");
}

#[tokio::test]
async fn test_unknown_book_is_a_form_error() {
    let (app, _) = app_with_book().await;

    let response = app
        .post_form(
            "/bookinstances",
            &format!("book={}&imprint=Ace&status=Available", Uuid::new_v4()),
        )
        .await;

    assert_eq!(response.view(), "bookinstance_form");
    assert_eq!(response.model()["errors"][0]["msg"], "Selected book does not exist");
}

#[tokio::test]
async fn test_imprint_is_escaped() {
    let (app, book) = app_with_book().await;

    let location = create_copy(&app, &book, "%3Cb%3EBold%3C%2Fb%3E").await;

    let detail = app.get(&location).await;
    assert_eq!(
        detail.model()["bookinstance"]["imprint"],
        "&lt;b&gt;Bold&lt;&#x2F;b&gt;"
    );
}

#[tokio::test]
async fn test_rejected_update_echoes_new_input() {
    let (app, book) = app_with_book().await;
    let location = create_copy(&app, &book, "Ace").await;

    let response = app
        .post_form(
            &format!("{}/update", location),
            &format!("book={}&imprint=Chilton&status=Lost", book.id),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let model = response.model();
    assert_eq!(model["title"], "Update BookInstance");
    assert_eq!(model["bookinstance"]["imprint"], "Chilton");
    assert_eq!(model["errors"][0]["msg"], "Invalid status");
    assert_eq!(model["book_list"][0]["title"], "Dune");
}

#[tokio::test]
async fn test_update_copy() {
    let (app, book) = app_with_book().await;
    let location = create_copy(&app, &book, "Ace").await;

    let response = app
        .post_form(
            &format!("{}/update", location),
            &format!("book={}&imprint=Chilton&status=Loaned&due_back=2026-11-01", book.id),
        )
        .await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), location);
    let detail = app.get(&location).await.model();
    assert_eq!(detail["bookinstance"]["imprint"], "Chilton");
    assert_eq!(detail["bookinstance"]["due_back_yyyy_mm_dd"], "2026-11-01");
}

#[tokio::test]
async fn test_update_of_vanished_copy_is_not_found() {
    let (app, book) = app_with_book().await;

    let response = app
        .post_form(
            &format!("/bookinstances/{}/update", Uuid::new_v4()),
            &format!("book={}&imprint=Ace&status=Available", book.id),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let (app, book) = app_with_book().await;
    let location = create_copy(&app, &book, "Ace").await;
    let id = location.trim_start_matches("/bookinstances/").to_string();

    for _ in 0..2 {
        let response = app
            .post_form(&format!("{}/delete", location), &format!("bookinstanceid={}", id))
            .await;
        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.location(), "/bookinstances");
    }

    let confirm = app.get(&format!("{}/delete", location)).await;
    assert_eq!(confirm.status, StatusCode::FOUND);
    assert_eq!(confirm.location(), "/bookinstances");
}

#[tokio::test]
async fn test_delete_confirmation_page() {
    let (app, book) = app_with_book().await;
    let location = create_copy(&app, &book, "Ace").await;

    let response = app.get(&format!("{}/delete", location)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.view(), "bookinstance_delete");
    assert_eq!(response.model()["bookinstance"]["book_title"], "Dune");
}

#[tokio::test]
async fn test_rejected_update_keeps_stored_copy() {
    let (app, book) = app_with_book().await;
    let location = create_copy(&app, &book, "Ace").await;

    let response = app
        .post_form(&format!("{}/update", location), "book=&imprint=&status=Available")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.view(), "bookinstance_form");
    let errors = response.model()["errors"].as_array().unwrap().clone();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["msg"], "Book must be specified");
    assert_eq!(errors[1]["msg"], "Imprint must be specified");

    let stored = app.get(&location).await.model();
    assert_eq!(stored["bookinstance"]["imprint"], "Ace");
    assert_eq!(stored["bookinstance"]["book_id"], book.id.to_string());
}

#[tokio::test]
async fn test_datetime_local_due_back_is_accepted() {
    let (app, book) = app_with_book().await;

    let response = app
        .post_form(
            "/bookinstances",
            &format!("book={}&imprint=Ace&status=Loaned&due_back=2026-10-14T09%3A30", book.id),
        )
        .await;

    assert_eq!(response.status, StatusCode::FOUND);
    let detail = app.get(response.location()).await.model();
    assert_eq!(detail["bookinstance"]["due_back_yyyy_mm_dd"], "2026-10-14");
}

#[tokio::test]
async fn test_anonymous_delete_is_redirected_to_login() {
    let (app, book) = app_with_book().await;
    let location = create_copy(&app, &book, "Ace").await;
    let id = location.trim_start_matches("/bookinstances/").to_string();

    let response = app
        .post_form_as(
            &format!("{}/delete", location),
            &format!("bookinstanceid={}", id),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), "/login");
    let detail = app.get_anonymous(&location).await;
    assert_eq!(detail.status, StatusCode::OK);
}

#[tokio::test]
async fn test_anonymous_writes_are_redirected_to_login() {
    let (app, book) = app_with_book().await;
    let location = create_copy(&app, &book, "Ace").await;
    let form = format!("book={}&imprint=Chilton&status=Available", book.id);

    for uri in ["/bookinstances".to_string(), format!("{}/update", location)] {
        let response = app.post_form_as(&uri, &form, None).await;
        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.location(), "/login");
    }

    let list = app.get_anonymous("/bookinstances").await.model();
    let copies = list["bookinstance_list"].as_array().unwrap();
    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0]["imprint"], "Ace");
}
