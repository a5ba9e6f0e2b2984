//! Persistence layer.
//!
//! Each concern has its own store trait ([`ConversationStore`],
//! [`MessageStore`], [`DoctorStore`], [`AppointmentStore`]). The default implementation of all of
//! them is [`SqliteStore`]. To move to another database, implement the traits
//! for a new type and change the concrete type in [`crate::state::AppState`].
//!
//! Trait methods use `impl Future` in their signatures so no `async-trait`
//! crate is required.

pub mod appointment;
pub mod conversation;
pub mod dao;
pub mod doctor;
pub mod message;

pub use appointment::{AppointmentFilter, AppointmentStore};
pub use conversation::ConversationStore;
pub use dao::{Appointment, AppointmentStatus, AppointmentType, Conversation, Doctor, Message};
pub use doctor::DoctorStore;
pub use message::MessageStore;

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// SQLite-backed store for every entity.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and run pending migrations.
    ///
    /// `url` is a sqlx SQLite URL, e.g. `"sqlite://medilink.db?mode=rwc"`.
    /// Foreign keys are enforced on every pooled connection.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;
        Self::migrate(pool).await
    }

    /// Single-connection in-memory database; the data lives as long as the pool.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

/// Current time at the precision timestamps are stored with, so a freshly
/// built record equals the row read back from the database.
pub(crate) fn now_ts() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Timestamps are stored as fixed-width RFC 3339 strings so that `ORDER BY`
/// on the text column is chronological.
pub(crate) fn encode_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_ts(raw: &str, column: &'static str) -> DateTime<Utc> {
    raw.parse().unwrap_or_else(|e: chrono::ParseError| {
        tracing::warn!(
            raw = %raw,
            column,
            error = %e,
            "failed to parse stored timestamp; using now"
        );
        Utc::now()
    })
}
