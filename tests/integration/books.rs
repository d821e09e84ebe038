use axum::http::StatusCode;

use crate::common::TestApp;

#[tokio::test]
async fn test_books_require_login() {
    let app = TestApp::new().await;

    let response = app.get_anonymous("/books").await;

    assert_eq!(response.location(), "/login");
}

#[tokio::test]
async fn test_create_book_from_multipart_form() {
    let app = TestApp::new().await;
    let author = app.create_author("Frank Herbert").await;
    let author_id = author.id.to_string();

    let response = app
        .post_multipart(
            "/books",
            &[
                ("title", "Dune"),
                ("author", &author_id),
                ("publish_date", "1965-08-01"),
                ("page_count", "412"),
                ("description", "Spice"),
            ],
            Some(("image/jpeg", b"jpeg-bytes")),
        )
        .await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert!(response.location().starts_with("/books/"));

    let shown = app.get(response.location()).await;
    assert_eq!(shown.view(), "books/show");
    let model = shown.model();
    assert_eq!(model["book"]["title"], "Dune");
    assert_eq!(model["book"]["author_name"], "Frank Herbert");
    assert_eq!(model["author_url"], format!("/authors/{}", author.id));
    assert!(model["book"]["cover_image_path"]
        .as_str()
        .unwrap()
        .starts_with("data:image/jpeg;"));
}

#[tokio::test]
async fn test_create_book_without_cover_rerenders_form() {
    let app = TestApp::new().await;
    let author = app.create_author("Frank Herbert").await;
    let author_id = author.id.to_string();

    let response = app
        .post_multipart(
            "/books",
            &[
                ("title", "Dune"),
                ("author", &author_id),
                ("publish_date", "1965-08-01"),
                ("page_count", "412"),
            ],
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.view(), "books/new");
    let model = response.model();
    assert_eq!(model["error_message"], "Error creating book");
    assert_eq!(model["book"]["title"], "Dune");
    assert_eq!(model["authors"][0]["name"], "Frank Herbert");
}

#[tokio::test]
async fn test_search_books_by_title() {
    let app = TestApp::new().await;
    let author = app.create_author("Frank Herbert").await;
    app.create_book(&author, "Dune").await;
    app.create_book(&author, "Children of Dune").await;
    app.create_book(&author, "The Dosadi Experiment").await;

    let response = app.get("/books?title=dune").await;

    assert_eq!(response.view(), "books/index");
    assert_eq!(response.model()["books"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_book_keeps_cover_when_none_uploaded() {
    let app = TestApp::new().await;
    let author = app.create_author("Frank Herbert").await;
    let book = app.create_book(&author, "Dune").await;
    let author_id = author.id.to_string();

    let response = app
        .post_multipart(
            &format!("/books/{}?_method=PUT", book.id),
            &[
                ("title", "Dune Messiah"),
                ("author", &author_id),
                ("publish_date", "1969-01-01"),
                ("page_count", "256"),
            ],
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), format!("/books/{}", book.id));
    let stored = app
        .state
        .services
        .books
        .find(app.user_id, book.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "Dune Messiah");
    assert_eq!(stored.cover_image, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_failed_update_rerenders_edit() {
    let app = TestApp::new().await;
    let author = app.create_author("Frank Herbert").await;
    let book = app.create_book(&author, "Dune").await;
    let author_id = author.id.to_string();

    let response = app
        .post_multipart(
            &format!("/books/{}?_method=PUT", book.id),
            &[
                ("title", "Dune"),
                ("author", &author_id),
                ("publish_date", "someday"),
                ("page_count", "412"),
            ],
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.view(), "books/edit");
    assert_eq!(response.model()["error_message"], "Error updating book");
}

#[tokio::test]
async fn test_delete_book_with_copies_is_refused() {
    let app = TestApp::new().await;
    let author = app.create_author("Frank Herbert").await;
    let book = app.create_book(&author, "Dune").await;
    app.post_form(
        "/bookinstances",
        &format!("book={}&imprint=Ace&status=Available", book.id),
    )
    .await;

    let response = app
        .post_form(&format!("/books/{}?_method=DELETE", book.id), "")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.view(), "books/show");
    let model = response.model();
    assert_eq!(model["error_message"], "Could not remove book");
    assert_eq!(model["copies"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_book() {
    let app = TestApp::new().await;
    let author = app.create_author("Frank Herbert").await;
    let book = app.create_book(&author, "Dune").await;

    let response = app
        .post_form(&format!("/books/{}?_method=DELETE", book.id), "")
        .await;
    assert_eq!(response.location(), "/books");

    let again = app
        .post_form(&format!("/books/{}?_method=DELETE", book.id), "")
        .await;
    assert_eq!(again.location(), "/");
}
