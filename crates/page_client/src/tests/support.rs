use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};
use url::Url;

pub(crate) type ReceivedForms = Arc<Mutex<Vec<Vec<(String, String)>>>>;

#[derive(Clone)]
struct ServerState {
    received: ReceivedForms,
}

pub(crate) struct TestServer {
    pub base_url: String,
    pub received: ReceivedForms,
}

impl TestServer {
    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("{}{path}", self.base_url)).expect("test server url")
    }
}

async fn handle_submit(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, StatusCode> {
    let mut fields = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        fields.push((name, value));
    }

    let order_id = fields
        .iter()
        .find(|(name, _)| name == "orderId")
        .map(|(_, value)| value.clone());
    state.received.lock().await.push(fields);

    Ok(Json(match order_id {
        Some(order_id) => json!({ "orderId": order_id }),
        None => json!({ "message": "No orderId provided" }),
    }))
}

async fn handle_plain_text() -> &'static str {
    "Internal Server Error"
}

async fn handle_rejected() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "detail": "orderId is malformed" })),
    )
}

/// `/submit` echoes `orderId` like the real endpoint, `/plain` answers with
/// text, `/rejected` answers 422 with a JSON body.
pub(crate) async fn spawn_submit_server() -> anyhow::Result<TestServer> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let received: ReceivedForms = Arc::new(Mutex::new(Vec::new()));
    let state = ServerState {
        received: received.clone(),
    };
    let app = Router::new()
        .route("/submit", post(handle_submit))
        .route("/plain", post(handle_plain_text))
        .route("/rejected", post(handle_rejected))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(TestServer {
        base_url: format!("http://{addr}"),
        received,
    })
}

/// A loopback URL with nothing listening behind it.
pub(crate) async fn unreachable_url() -> anyhow::Result<Url> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(Url::parse(&format!("http://{addr}/submit"))?)
}
