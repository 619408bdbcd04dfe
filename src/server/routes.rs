use super::ProxyState;
use super::error::ApiError;
use crate::transform::TransformKind;
use crate::upstream::UpstreamError;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

const LYRICS_NOT_FOUND: &str = "Lyrics not found. Try another song or artist.";
const LYRICS_UNAVAILABLE: &str = "Failed to fetch lyrics. The service may be unavailable.";

#[derive(Debug, Default, Deserialize)]
pub struct LyricsQuery {
    artist: Option<String>,
    song: Option<String>,
    timestamps: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransformQuery {
    artist: Option<String>,
    song: Option<String>,
    language: Option<String>,
    system: Option<String>,
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

fn required(artist: Option<String>, song: Option<String>) -> Result<(String, String), ApiError> {
    match (non_empty(artist), non_empty(song)) {
        (Some(artist), Some(song)) => Ok((artist, song)),
        _ => Err(ApiError::MissingParams),
    }
}

fn json_body(body: Vec<u8>) -> Response {
    ([(CONTENT_TYPE, "application/json")], body).into_response()
}

pub async fn lyrics(
    State(state): State<ProxyState>,
    query: Result<Query<LyricsQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(q) = query.map_err(|_| ApiError::MissingParams)?;
    let (artist, song) = required(q.artist, q.song)?;
    let timestamps = non_empty(q.timestamps).unwrap_or_else(|| "true".to_string());

    tracing::info!(%artist, %song, "fetching lyrics");
    match state.upstream.lyrics(&artist, &song, &timestamps).await {
        Ok(body) => Ok(json_body(body)),
        Err(e) => Err(lyrics_error(e)),
    }
}

pub async fn translate(
    state: State<ProxyState>,
    query: Result<Query<TransformQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    transform(TransformKind::Translation, state, query).await
}

pub async fn transliterate(
    state: State<ProxyState>,
    query: Result<Query<TransformQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    transform(TransformKind::Transliteration, state, query).await
}

async fn transform(
    kind: TransformKind,
    State(state): State<ProxyState>,
    query: Result<Query<TransformQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(q) = query.map_err(|_| ApiError::MissingParams)?;
    let (artist, song) = required(q.artist, q.song)?;
    let target = match kind {
        TransformKind::Translation => q.language,
        TransformKind::Transliteration => q.system,
    };
    let target = non_empty(target).unwrap_or_else(|| kind.default_target().to_string());

    tracing::info!(%artist, %song, %target, "{} requested", kind.noun());
    match state.upstream.transform(kind, &artist, &song, &target).await {
        Ok(body) => Ok(json_body(body)),
        Err(e) => Err(transform_error(kind, e)),
    }
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub fn lyrics_error(err: UpstreamError) -> ApiError {
    match err {
        UpstreamError::Status(code) => {
            tracing::warn!(code, "lyrics upstream error");
            ApiError::upstream(code, LYRICS_NOT_FOUND)
        }
        other => {
            tracing::error!(error = %other, "lyrics upstream failed");
            ApiError::Unavailable(LYRICS_UNAVAILABLE)
        }
    }
}

pub fn transform_error(kind: TransformKind, err: UpstreamError) -> ApiError {
    match err {
        UpstreamError::Status(code) => {
            tracing::warn!(code, "{} upstream error", kind.noun());
            match code {
                404 => ApiError::upstream(404, kind.not_available_message()),
                503 => ApiError::upstream(503, kind.unavailable_message()),
                _ => ApiError::upstream(code, kind.failed_message()),
            }
        }
        other => {
            tracing::error!(error = %other, "{} upstream failed", kind.noun());
            ApiError::Unavailable(kind.transport_message())
        }
    }
}
