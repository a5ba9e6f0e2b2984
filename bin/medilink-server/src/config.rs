//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for medilink-server.
///
/// Every field has a default so the server starts without any environment
/// variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// sqlx SQLite URL (default: `"sqlite://medilink.db?mode=rwc"`).
    pub database_url: String,

    /// Upper bound on pooled database connections.
    pub db_max_connections: u32,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Directory for a daily-rolling log file, in addition to stdout.
    pub log_dir: Option<String>,

    /// Comma-separated list of allowed CORS origins. `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI at `/swagger-ui`.
    pub enable_swagger: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("MEDILINK_BIND", "0.0.0.0:8000"),
            database_url: env_or("MEDILINK_DATABASE_URL", "sqlite://medilink.db?mode=rwc"),
            db_max_connections: parse_env("MEDILINK_DB_MAX_CONNECTIONS", 5),
            log_level: env_or("MEDILINK_LOG", "info"),
            log_json: env_flag("MEDILINK_LOG_JSON", false),
            log_dir: env_opt("MEDILINK_LOG_DIR"),
            cors_allowed_origins: env_opt("MEDILINK_CORS_ORIGINS"),
            enable_swagger: env_flag("MEDILINK_ENABLE_SWAGGER", true),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_owned(),
            database_url: "sqlite://medilink.db?mode=rwc".to_owned(),
            db_max_connections: 5,
            log_level: "info".to_owned(),
            log_json: false,
            log_dir: None,
            cors_allowed_origins: None,
            enable_swagger: true,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| parse_flag(&v).unwrap_or(default))
        .unwrap_or(default)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" => Some(true),
        "0" => Some(false),
        v if v.eq_ignore_ascii_case("true") => Some(true),
        v if v.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flag_parsing() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" false "), Some(false));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn defaults_allow_any_origin_and_swagger() {
        let cfg = Config::default();
        assert!(cfg.cors_allowed_origins.is_none());
        assert!(cfg.enable_swagger);
        assert_eq!(cfg.bind_address, "0.0.0.0:8000");
    }
}
