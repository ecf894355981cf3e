use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, User};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- users ---

#[tokio::test]
async fn list_users_empty() {
    let resp = app().oneshot(get_request("/users")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let users: Vec<User> = body_json(resp).await;
    assert!(users.is_empty());
}

#[tokio::test]
async fn create_user_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/users", r#"{"name":"Ana"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: User = body_json(resp).await;
    assert_eq!(user.name, "Ana");
}

#[tokio::test]
async fn create_user_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/users", r#"{"nom":"Ana"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_user_not_found_has_json_body() {
    let resp = app()
        .oneshot(get_request("/users/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"error": "not found"}));
}

#[tokio::test]
async fn create_then_get_user() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/users", r#"{"name":"Ana"}"#))
        .await
        .unwrap();
    let created: User = body_json(resp).await;

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request(&format!("/users/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: User = body_json(resp).await;
    assert_eq!(fetched, created);
}

// --- login ---

#[tokio::test]
async fn login_with_valid_credentials_returns_token() {
    let resp = app()
        .oneshot(json_request("POST", "/login", r#"{"u":"x","p":"y"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn login_with_bad_credentials_returns_401() {
    let resp = app()
        .oneshot(json_request("POST", "/login", r#"{"u":"x","p":"wrong"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "invalid credentials");
}

// --- echo / plain / empty ---

#[tokio::test]
async fn echo_reflects_body_and_headers() {
    let mut req = json_request("POST", "/echo", r#"{"a":[1,2]}"#);
    req.headers_mut()
        .insert(http::header::ACCEPT, "application/json".parse().unwrap());
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["body"], json!({"a": [1, 2]}));
    assert_eq!(body["content_type"], "application/json");
    assert_eq!(body["accept"], "application/json");
}

#[tokio::test]
async fn echo_without_body_reflects_null() {
    let req = Request::builder()
        .method("POST")
        .uri("/echo")
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    let body: Value = body_json(resp).await;
    assert_eq!(body["body"], Value::Null);
    assert_eq!(body["content_type"], Value::Null);
}

#[tokio::test]
async fn plain_is_not_json() {
    let resp = app().oneshot(get_request("/plain")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert!(serde_json::from_slice::<Value>(&body).is_err());
}

#[tokio::test]
async fn empty_returns_204_without_body() {
    let resp = app().oneshot(get_request("/empty")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn big_is_valid_json_over_ten_mib() {
    let resp = app().oneshot(get_request("/big")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert!(body.len() > 10 * 1024 * 1024);
    let items: Vec<u8> = serde_json::from_slice(&body).unwrap();
    assert_eq!(items.len(), mock_server::BIG_ARRAY_LEN);
}
