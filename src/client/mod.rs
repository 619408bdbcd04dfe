//! Client side of the proxy: what the browser page did, as a library
//!
//! `ApiClient` performs the three `/api/*` calls and turns failures into the
//! plain-language messages shown to the user. `Session` holds the per-view
//! state on top of it.

pub mod session;

use crate::lyrics::LyricsResponse;
use crate::transform::TransformKind;
use anyhow::Context;
use serde::Deserialize;
use std::fmt;

pub use session::{Session, SessionEvent};

const LYRICS_FALLBACK: &str = "Lyrics not found. Try another song or artist.";
const LYRICS_RETRY: &str = "Failed to fetch lyrics. Please try again.";

#[derive(Debug)]
pub enum ClientError {
    /// The proxy answered with an error body.
    Api { status: u16, message: String },
    /// Client-side hard timeout elapsed.
    Timeout { message: &'static str },
    /// The request never got an answer.
    Transport {
        message: &'static str,
        source: reqwest::Error,
    },
    /// A 2xx answer without usable data.
    NoData(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Api { message, .. } => f.write_str(message),
            ClientError::Timeout { message } => f.write_str(message),
            ClientError::Transport { message, .. } => f.write_str(message),
            ClientError::NoData(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Transport { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub fn new(base: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    pub fn lyrics_url(&self, artist: &str, song: &str) -> String {
        format!(
            "{}/api/lyrics?artist={}&song={}&timestamps=true",
            self.base,
            urlencoding::encode(artist),
            urlencoding::encode(song)
        )
    }

    pub fn transform_url(
        &self,
        kind: TransformKind,
        artist: &str,
        song: &str,
        target: &str,
    ) -> String {
        format!(
            "{}/api/{}?artist={}&song={}&{}={}",
            self.base,
            kind.path(),
            urlencoding::encode(artist),
            urlencoding::encode(song),
            kind.param(),
            urlencoding::encode(target)
        )
    }

    pub async fn lyrics(&self, artist: &str, song: &str) -> Result<LyricsResponse, ClientError> {
        let body = self
            .get(&self.lyrics_url(artist, song), LYRICS_FALLBACK, LYRICS_RETRY)
            .await?;
        serde_json::from_value(body).map_err(|e| {
            tracing::debug!(error = %e, "unexpected lyrics body");
            ClientError::NoData(LYRICS_FALLBACK.to_string())
        })
    }

    /// Returns the translated/transliterated text (`lyrics`, else the
    /// kind-specific result field).
    pub async fn transform(
        &self,
        kind: TransformKind,
        artist: &str,
        song: &str,
        target: &str,
    ) -> Result<String, ClientError> {
        let body = self
            .get(
                &self.transform_url(kind, artist, song, target),
                kind.failed_message(),
                kind.retry_message(),
            )
            .await?;

        let text = [body.get("lyrics"), body.get(kind.result_field())]
            .into_iter()
            .flatten()
            .filter_map(|v| v.as_str())
            .find(|s| !s.is_empty());

        match text {
            Some(text) => Ok(text.to_string()),
            None => Err(ClientError::NoData(kind.no_data_message().to_string())),
        }
    }

    async fn get(
        &self,
        url: &str,
        fallback: &'static str,
        retry: &'static str,
    ) -> Result<serde_json::Value, ClientError> {
        tracing::debug!(url, "GET");
        let transport = |source: reqwest::Error| ClientError::Transport {
            message: retry,
            source,
        };

        let response = self.http.get(url).send().await.map_err(transport)?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| fallback.to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response.json().await.map_err(transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_upstream, spawn_proxy, spawn_router};

    async fn client() -> ApiClient {
        let upstream = spawn_router(fake_upstream()).await;
        ApiClient::new(&spawn_proxy(&upstream).await).unwrap()
    }

    #[test]
    fn test_urls() {
        let c = ApiClient::new("http://localhost:3000/").unwrap();
        assert_eq!(
            c.lyrics_url("Daft Punk", "One More Time"),
            "http://localhost:3000/api/lyrics?artist=Daft%20Punk&song=One%20More%20Time&timestamps=true"
        );
        assert_eq!(
            c.transform_url(TransformKind::Transliteration, "A", "S", "roman"),
            "http://localhost:3000/api/transliterate?artist=A&song=S&system=roman"
        );
    }

    #[tokio::test]
    async fn test_transform_reads_either_field() {
        let c = client().await;
        let text = c
            .transform(TransformKind::Translation, "A", "S", "german")
            .await
            .unwrap();
        assert_eq!(text, "german text");

        let text = c
            .transform(TransformKind::Transliteration, "A", "S", "latin")
            .await
            .unwrap();
        assert_eq!(text, "LATIN text");
    }

    #[tokio::test]
    async fn test_api_error_message_is_surfaced() {
        let c = client().await;
        let err = c
            .transform(TransformKind::Translation, "missing", "S", "english")
            .await
            .unwrap_err();
        match &err {
            ClientError::Api { status, .. } => assert_eq!(*status, 404),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "Translation not available for this song. Try another language or song."
        );
    }

    #[tokio::test]
    async fn test_no_data() {
        let c = client().await;
        let err = c
            .transform(TransformKind::Translation, "empty", "S", "english")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No translation data received. The song may not be supported."
        );
    }

    #[tokio::test]
    async fn test_transport_error() {
        let dead = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            format!("http://{}", listener.local_addr().unwrap())
        };
        let c = ApiClient::new(&dead).unwrap();
        let err = c.lyrics("A", "S").await.unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
        assert_eq!(err.to_string(), "Failed to fetch lyrics. Please try again.");
    }
}
