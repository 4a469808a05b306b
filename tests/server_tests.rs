use serde_json::{Value, json};
use tokio::net::TcpListener;

mod common;
use common::{InMemoryRepository, test_router};

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
}

/// Serves the full router over a real socket, backed by the in-memory store.
async fn spawn_app() -> TestApp {
    let router = test_router(InMemoryRepository::new());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = spawn_app().await;
    let doc: Value = reqwest::get(format!("{}/api-docs/openapi.json", app.address))
        .await
        .expect("req fail")
        .json()
        .await
        .unwrap();
    assert!(doc["paths"]["/api/posts/{id}"].is_object());
    assert!(doc["components"]["schemas"]["Role"].is_object());
}

#[tokio::test]
async fn test_blogging_round_trip_over_http() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // Register + login
    let response = client
        .post(format!("{}/api/register", app.address))
        .json(&json!({ "username": "b1", "password": "secret", "account_type": "blogger" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let login: Value = client
        .post(format!("{}/api/login", app.address))
        .json(&json!({ "username": "b1", "password": "secret" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = login["token"].as_str().unwrap().to_string();

    // Create
    let response = client
        .post(format!("{}/api/posts", app.address))
        .bearer_auth(&token)
        .json(&json!({ "title": "Hello", "content": "World" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    assert!(response.headers().contains_key("x-request-id"));
    let post: Value = response.json().await.unwrap();

    // Read
    let posts: Vec<Value> = client
        .get(format!("{}/api/posts", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["id"], post["id"]);

    // Delete
    let response = client
        .delete(format!("{}/api/posts/{}", app.address, post["id"]))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = client
        .get(format!("{}/api/posts/{}", app.address, post["id"]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}
