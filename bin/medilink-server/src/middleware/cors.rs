use crate::config::Config;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

/// Restrict to `MEDILINK_CORS_ORIGINS` when set, otherwise allow any origin.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origins = config
        .cors_allowed_origins
        .as_deref()
        .map(parse_origins)
        .unwrap_or_default();

    let cors = CorsLayer::new().allow_headers(Any).allow_methods(Any);
    if origins.is_empty() {
        // Wildcard – suitable for development; set MEDILINK_CORS_ORIGINS in production.
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}

fn parse_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn origins_are_split_and_trimmed() {
        let origins = parse_origins("https://a.example, https://b.example ,,");
        assert_eq!(origins, ["https://a.example", "https://b.example"]);
    }
}
