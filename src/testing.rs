//! Fake upstream services and an in-process proxy for tests.

use crate::config::UpstreamConfig;
use crate::upstream::UpstreamClient;
use axum::Json;
use axum::Router;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_router(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

/// Run the real proxy against `upstream` for both services.
pub async fn spawn_proxy(upstream: &str) -> String {
    let client = UpstreamClient::new(&UpstreamConfig {
        lyrics_base_url: upstream.to_string(),
        translate_base_url: upstream.to_string(),
        connect_timeout_secs: 2,
    })
    .unwrap();
    spawn_router(crate::server::router(client)).await
}

/// Behaviour is keyed on the artist name:
/// `missing` → 404, `busy` → 503, `broken` → 500, `slow` → answers after 2s,
/// `plain` → text only, `empty` → no lyrics fields.
pub fn fake_upstream() -> Router {
    Router::new()
        .route("/lyrics/", get(lyrics))
        .route("/translate/{artist}/{song}/{target}", get(translate))
        .route("/transliterate/{artist}/{song}/{target}", get(transliterate))
}

async fn lyrics(Query(q): Query<HashMap<String, String>>) -> Response {
    let artist = q.get("artist").cloned().unwrap_or_default();
    match artist.as_str() {
        "missing" => StatusCode::NOT_FOUND.into_response(),
        "plain" => Json(json!({
            "timed_lyrics": [],
            "lyrics": "Plain one\nPlain two",
        }))
        .into_response(),
        "empty" => Json(json!({ "error": "no match" })).into_response(),
        _ => Json(json!({
            "timed_lyrics": [
                { "timestamp": "00:12", "text": "Hello" },
                { "timestamp": "00:18", "text": "World" },
            ],
            "lyrics": "Hello\nWorld",
            "echo": q,
        }))
        .into_response(),
    }
}

async fn status_for(artist: &str) -> Option<StatusCode> {
    match artist {
        "missing" => Some(StatusCode::NOT_FOUND),
        "busy" => Some(StatusCode::SERVICE_UNAVAILABLE),
        "broken" => Some(StatusCode::INTERNAL_SERVER_ERROR),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            None
        }
        _ => None,
    }
}

async fn translate(Path((artist, song, target)): Path<(String, String, String)>) -> Response {
    if let Some(status) = status_for(&artist).await {
        return status.into_response();
    }
    if artist == "empty" {
        return Json(json!({})).into_response();
    }
    Json(json!({
        "lyrics": format!("{target} text"),
        "echo": [artist, song, target],
    }))
    .into_response()
}

async fn transliterate(Path((artist, song, target)): Path<(String, String, String)>) -> Response {
    if let Some(status) = status_for(&artist).await {
        return status.into_response();
    }
    Json(json!({
        "transliteration": format!("{} text", target.to_uppercase()),
        "echo": [artist, song, target],
    }))
    .into_response()
}
