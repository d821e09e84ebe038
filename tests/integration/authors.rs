use axum::http::StatusCode;

use crate::common::TestApp;

#[tokio::test]
async fn test_authors_require_login() {
    let app = TestApp::new().await;

    let response = app.get_anonymous("/authors").await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), "/login");
}

#[tokio::test]
async fn test_name_search_is_scoped_to_requester() {
    let app = TestApp::new().await;
    app.create_author("Jane Smith").await;
    app.create_author("John Doe").await;
    let (_, other) = TestApp::session_for(&app.state, "visitor").await;
    app.state
        .services
        .authors
        .create(other, "Adam Smithers")
        .await
        .unwrap();

    let response = app.get("/authors?name=SMI").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.view(), "authors/index");
    let model = response.model();
    let authors = model["authors"].as_array().unwrap();
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0]["name"], "Jane Smith");
    assert_eq!(model["search_options"]["name"], "SMI");
}

#[tokio::test]
async fn test_create_author_redirects_to_it() {
    let app = TestApp::new().await;

    let response = app.post_form("/authors", "name=Ursula+Le+Guin").await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert!(response.location().starts_with("/authors/"));
    let shown = app.get(response.location()).await;
    assert_eq!(shown.view(), "authors/show");
    assert_eq!(shown.model()["author"]["name"], "Ursula Le Guin");
}

#[tokio::test]
async fn test_create_author_with_empty_name_rerenders_form() {
    let app = TestApp::new().await;

    let response = app.post_form("/authors", "name=").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.view(), "authors/new");
    assert_eq!(response.model()["error_message"], "Error creating author");
}

#[tokio::test]
async fn test_failed_update_keeps_stored_record() {
    let app = TestApp::new().await;
    let author = app.create_author("Octavia Butler").await;

    let response = app
        .post_form(&format!("/authors/{}?_method=PUT", author.id), "name=")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.view(), "authors/edit");
    assert_eq!(response.model()["error_message"], "Error updating author");

    let stored = app
        .state
        .services
        .authors
        .find(app.user_id, author.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Octavia Butler");
}

#[tokio::test]
async fn test_update_author() {
    let app = TestApp::new().await;
    let author = app.create_author("Octavia Buttler").await;

    let response = app
        .post_form(&format!("/authors/{}?_method=PUT", author.id), "name=Octavia+Butler")
        .await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), format!("/authors/{}", author.id));
    let stored = app
        .state
        .services
        .authors
        .find(app.user_id, author.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Octavia Butler");
}

#[tokio::test]
async fn test_update_unknown_author_redirects_home() {
    let app = TestApp::new().await;

    let response = app
        .post_form(&format!("/authors/{}?_method=PUT", uuid::Uuid::new_v4()), "name=Nobody")
        .await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), "/");
}

#[tokio::test]
async fn test_delete_author_with_books_is_refused() {
    let app = TestApp::new().await;
    let author = app.create_author("Frank Herbert").await;
    app.create_book(&author, "Dune").await;

    let response = app
        .post_form(&format!("/authors/{}?_method=DELETE", author.id), "")
        .await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), format!("/authors/{}", author.id));
    let kept = app
        .state
        .services
        .authors
        .find(app.user_id, author.id)
        .await
        .unwrap();
    assert!(kept.is_some());
}

#[tokio::test]
async fn test_delete_author() {
    let app = TestApp::new().await;
    let author = app.create_author("Anonymous").await;

    let response = app
        .post_form(&format!("/authors/{}?_method=DELETE", author.id), "")
        .await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), "/authors");

    let again = app
        .post_form(&format!("/authors/{}?_method=DELETE", author.id), "")
        .await;
    assert_eq!(again.location(), "/");

    let shown = app.get(&format!("/authors/{}", author.id)).await;
    assert_eq!(shown.status, StatusCode::FOUND);
    assert_eq!(shown.location(), "/");
}

#[tokio::test]
async fn test_show_author_lists_books() {
    let app = TestApp::new().await;
    let author = app.create_author("Frank Herbert").await;
    app.create_book(&author, "Dune").await;

    let response = app.get(&format!("/authors/{}", author.id)).await;

    assert_eq!(response.status, StatusCode::OK);
    let model = response.model();
    assert_eq!(model["title"], "Frank Herbert");
    assert_eq!(model["books_by_author"][0]["title"], "Dune");
}

#[tokio::test]
async fn test_edit_unknown_author_redirects_to_list() {
    let app = TestApp::new().await;

    let response = app.get("/authors/not-an-id/edit").await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), "/authors");
}

#[tokio::test]
async fn test_show_author_caps_books() {
    let app = TestApp::new().await;
    let author = app.create_author("Isaac Asimov").await;
    app.create_books(&author, 8).await;

    let response = app.get(&format!("/authors/{}", author.id)).await;

    assert_eq!(response.status, StatusCode::OK);
    let model = response.model();
    assert_eq!(model["books_by_author"].as_array().unwrap().len(), 6);
}
