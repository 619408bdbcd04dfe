//! Client for the third-party lyrics and translation services
//!
//! Responses are forwarded to the browser untouched, so the client hands back
//! the raw JSON bytes after checking they parse.

use crate::config::UpstreamConfig;
use crate::transform::TransformKind;
use anyhow::Context;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum UpstreamError {
    /// The service answered with a non-2xx status.
    Status(u16),
    /// Connection, TLS or read failure.
    Transport(reqwest::Error),
    /// 2xx with a body that is not JSON.
    Body(serde_json::Error),
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamError::Status(code) => write!(f, "upstream returned status {code}"),
            UpstreamError::Transport(e) => write!(f, "upstream request failed: {e}"),
            UpstreamError::Body(e) => write!(f, "upstream body is not json: {e}"),
        }
    }
}

impl std::error::Error for UpstreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpstreamError::Status(_) => None,
            UpstreamError::Transport(e) => Some(e),
            UpstreamError::Body(e) => Some(e),
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        UpstreamError::Transport(e)
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    lyrics_base: String,
    translate_base: String,
}

impl UpstreamClient {
    const USER_AGENT: &'static str = concat!("Lyrica/", env!("CARGO_PKG_VERSION"));

    pub fn new(cfg: &UpstreamConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent(Self::USER_AGENT)
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .build()
            .context("build reqwest client")?;

        Ok(Self {
            http,
            lyrics_base: cfg.lyrics_base_url.trim_end_matches('/').to_string(),
            translate_base: cfg.translate_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn lyrics_url(&self, artist: &str, song: &str, timestamps: &str) -> String {
        format!(
            "{}/lyrics/?artist={}&song={}&timestamps={}",
            self.lyrics_base,
            urlencoding::encode(artist),
            urlencoding::encode(song),
            urlencoding::encode(timestamps)
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
            "{}/{}/{}/{}/{}",
            self.translate_base,
            kind.path(),
            urlencoding::encode(artist),
            urlencoding::encode(song),
            urlencoding::encode(target)
        )
    }

    /// Fetch lyrics; `timestamps` is forwarded as given ("true" by default).
    pub async fn lyrics(
        &self,
        artist: &str,
        song: &str,
        timestamps: &str,
    ) -> Result<Vec<u8>, UpstreamError> {
        self.get_json(&self.lyrics_url(artist, song, timestamps)).await
    }

    /// Translate or transliterate; `target` is a language or script system.
    pub async fn transform(
        &self,
        kind: TransformKind,
        artist: &str,
        song: &str,
        target: &str,
    ) -> Result<Vec<u8>, UpstreamError> {
        self.get_json(&self.transform_url(kind, artist, song, target))
            .await
    }

    async fn get_json(&self, url: &str) -> Result<Vec<u8>, UpstreamError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        tracing::info!(%status, url, "upstream response");

        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice::<serde::de::IgnoredAny>(&body).map_err(UpstreamError::Body)?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> UpstreamClient {
        UpstreamClient::new(&UpstreamConfig {
            lyrics_base_url: "http://lyrics.test/".into(),
            translate_base_url: "http://tr.test".into(),
            connect_timeout_secs: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_lyrics_url_encodes_query() {
        assert_eq!(
            client().lyrics_url("AC/DC", "T.N.T & more", "true"),
            "http://lyrics.test/lyrics/?artist=AC%2FDC&song=T.N.T%20%26%20more&timestamps=true"
        );
    }

    #[test]
    fn test_transform_url_encodes_segments() {
        let c = client();
        assert_eq!(
            c.transform_url(TransformKind::Translation, "BTS", "Spring Day", "english"),
            "http://tr.test/translate/BTS/Spring%20Day/english"
        );
        assert_eq!(
            c.transform_url(TransformKind::Transliteration, "a/b", "c", "iso"),
            "http://tr.test/transliterate/a%2Fb/c/iso"
        );
    }
}
