use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub name: String,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub u: String,
    pub p: String,
}

pub type Db = Arc<RwLock<HashMap<Uuid, User>>>;

/// Number of zeros in the JSON array served by `GET /big`. The body is
/// about 12 MiB, above ureq's default read limit.
pub const BIG_ARRAY_LEN: usize = 6 * 1024 * 1024;

/// Username and password accepted by `POST /login`.
pub const VALID_USER: &str = "x";
pub const VALID_PASSWORD: &str = "y";

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/login", post(login))
        .route("/echo", post(echo))
        .route("/plain", get(plain))
        .route("/empty", get(empty).post(empty))
        .route("/big", get(big))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_users(State(db): State<Db>) -> Json<Vec<User>> {
    let users = db.read().await;
    Json(users.values().cloned().collect())
}

async fn create_user(
    State(db): State<Db>,
    Json(input): Json<CreateUser>,
) -> (StatusCode, Json<User>) {
    let user = User {
        id: Uuid::new_v4(),
        name: input.name,
    };
    db.write().await.insert(user.id, user.clone());
    (StatusCode::CREATED, Json(user))
}

async fn get_user(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, (StatusCode, Json<Value>)> {
    let users = db.read().await;
    users
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))))
}

async fn login(Json(credentials): Json<Credentials>) -> (StatusCode, Json<Value>) {
    if credentials.u == VALID_USER && credentials.p == VALID_PASSWORD {
        (StatusCode::OK, Json(json!({ "token": Uuid::new_v4() })))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid credentials" })),
        )
    }
}

/// Reflect the request body and the JSON negotiation headers back.
async fn echo(headers: HeaderMap, body: Bytes) -> Json<Value> {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    Json(json!({
        "body": body,
        "content_type": header_value(header::CONTENT_TYPE),
        "accept": header_value(header::ACCEPT),
    }))
}

async fn plain() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "definitely not json")
}

async fn big() -> impl IntoResponse {
    let mut body = String::with_capacity(BIG_ARRAY_LEN * 2 + 1);
    body.push('[');
    for i in 0..BIG_ARRAY_LEN {
        if i > 0 {
            body.push(',');
        }
        body.push('0');
    }
    body.push(']');
    ([(header::CONTENT_TYPE, "application/json")], body)
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}
