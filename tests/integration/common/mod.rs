//! Shared test harness: an app over the in-memory store, rendering JSON view-models

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use lectern_server::{
    api,
    config::{AppConfig, RenderFormat},
    models::{author::Author, book::Book, book::Cover, user::RegisterForm},
    repository::Repository,
    services::books::BookSubmission,
    AppState,
};

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    /// Parsed `{"view", "model"}` body
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("Response is not a JSON view")
    }

    pub fn view(&self) -> String {
        self.json()["view"].as_str().unwrap_or_default().to_string()
    }

    pub fn model(&self) -> Value {
        self.json()["model"].clone()
    }
}

pub struct TestApp {
    pub state: AppState,
    pub user_id: Uuid,
    cookie: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.render.format = RenderFormat::Json;
        let state = AppState::new(config, Repository::in_memory());

        let (cookie, user_id) = Self::session_for(&state, "librarian").await;
        Self {
            state,
            user_id,
            cookie,
        }
    }

    /// Register another user and return their session cookie
    pub async fn session_for(state: &AppState, username: &str) -> (String, Uuid) {
        let (token, user) = state
            .services
            .auth
            .register(&RegisterForm {
                username: username.to_string(),
                password: "secret".to_string(),
            })
            .await
            .expect("Failed to register test user");
        (
            format!("{}={}", state.services.auth.cookie_name(), token),
            user.id,
        )
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = api::create_app(self.state.clone())
            .oneshot(request)
            .await
            .expect("Service call failed");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn builder(&self, method: Method, uri: &str, cookie: Option<&str>) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = self
            .builder(Method::GET, uri, Some(&self.cookie))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn get_anonymous(&self, uri: &str) -> TestResponse {
        let request = self.builder(Method::GET, uri, None).body(Body::empty()).unwrap();
        self.send(request).await
    }

    /// POST an urlencoded form with the session cookie
    pub async fn post_form(&self, uri: &str, form: &str) -> TestResponse {
        self.post_form_as(uri, form, Some(&self.cookie)).await
    }

    pub async fn post_form_as(&self, uri: &str, form: &str, cookie: Option<&str>) -> TestResponse {
        let request = self
            .builder(Method::POST, uri, cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// POST a multipart form; `cover` is `(content type, bytes)`
    pub async fn post_multipart(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        cover: Option<(&str, &[u8])>,
    ) -> TestResponse {
        const BOUNDARY: &str = "lectern-test-boundary";
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((content_type, bytes)) = cover {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"cover\"; filename=\"cover\"\r\n\
                     Content-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = self
            .builder(Method::POST, uri, Some(&self.cookie))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn create_author(&self, name: &str) -> Author {
        self.state
            .services
            .authors
            .create(self.user_id, name)
            .await
            .expect("Failed to create author")
    }

    /// `count` books titled `Book 01`, `Book 02`, ... created in that order
    pub async fn create_books(&self, author: &Author, count: usize) -> Vec<Book> {
        let mut books = Vec::with_capacity(count);
        for n in 1..=count {
            books.push(self.create_book(author, &format!("Book {:02}", n)).await);
            // distinct creation timestamps
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        books
    }

    pub async fn create_book(&self, author: &Author, title: &str) -> Book {
        let submission = BookSubmission {
            title: title.to_string(),
            author: author.id.to_string(),
            publish_date: "1965-08-01".to_string(),
            page_count: "412".to_string(),
            description: String::new(),
            cover: Some(Cover {
                image: vec![1, 2, 3],
                image_type: "image/png".to_string(),
            }),
        };
        self.state
            .services
            .books
            .create(self.user_id, &submission)
            .await
            .expect("Failed to create book")
    }
}
