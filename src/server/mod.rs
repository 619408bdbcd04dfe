//! Proxy endpoints forwarding browser requests to the upstream services
//!
//! - `GET /api/lyrics?artist=&song=[&timestamps=]`
//! - `GET /api/translate?artist=&song=[&language=]`
//! - `GET /api/transliterate?artist=&song=[&system=]`

pub mod error;
pub mod routes;

use crate::config::Config;
use crate::upstream::UpstreamClient;
use anyhow::Context;
use axum::Router;
use axum::routing::get;

#[derive(Debug, Clone)]
pub struct ProxyState {
    pub upstream: UpstreamClient,
}

pub fn router(upstream: UpstreamClient) -> Router {
    Router::new()
        .route(
            "/api/lyrics",
            get(routes::lyrics).fallback(routes::method_not_allowed),
        )
        .route(
            "/api/translate",
            get(routes::translate).fallback(routes::method_not_allowed),
        )
        .route(
            "/api/transliterate",
            get(routes::transliterate).fallback(routes::method_not_allowed),
        )
        .fallback(routes::not_found)
        .with_state(ProxyState { upstream })
}

/// Bind and serve until Ctrl-C.
pub async fn serve(cfg: &Config) -> anyhow::Result<()> {
    let upstream = UpstreamClient::new(&cfg.upstream)?;
    let app = router(upstream);

    let addr = format!("{}:{}", cfg.server.bind, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    tracing::info!("Proxy listening on http://{}", addr);
    tracing::info!("  lyrics upstream:    {}", cfg.upstream.lyrics_base_url);
    tracing::info!("  translate upstream: {}", cfg.upstream.translate_base_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .context("serve")?;
    Ok(())
}
