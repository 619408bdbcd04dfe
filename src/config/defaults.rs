use super::Config;

/// Config written on first run. `LYRICA_LYRICS_URL`, `LYRICA_TRANSLATE_URL`
/// and `LYRICA_API_BASE` take precedence over the built-in URLs.
pub fn defaults() -> Config {
    let mut cfg = Config::default();
    if let Ok(url) = std::env::var("LYRICA_LYRICS_URL") {
        cfg.upstream.lyrics_base_url = url;
    }
    if let Ok(url) = std::env::var("LYRICA_TRANSLATE_URL") {
        cfg.upstream.translate_base_url = url;
    }
    if let Ok(url) = std::env::var("LYRICA_API_BASE") {
        cfg.client.api_base = url;
    }
    cfg
}
