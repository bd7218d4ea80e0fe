mod cloud_saves;
mod event_log;
mod player_stats;
mod schema;

use std::time::Duration;

use anyhow::{anyhow, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Executor;
use tracing::info;

use backend_domain::DbConfig;

pub use player_stats::PgStatsTransaction;

/// PostgreSQL adapter for the event log, the player statistics and the
/// cloud saves. Every query borrows a pooled connection and hands it back
/// on all exit paths.
#[derive(Clone)]
pub struct PostgresRepo {
    pool: PgPool,
}

impl PostgresRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds a bounded pool. Acquiring waits at most
    /// `acquire_timeout_seconds`; every connection carries a server-side
    /// `statement_timeout` so one hung query cannot pin a connection forever.
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| anyhow!("database_url is not configured"))?;
        let statement_timeout_ms = config.statement_timeout_seconds.saturating_mul(1000);
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds.max(1)))
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    if statement_timeout_ms > 0 {
                        conn.execute(
                            format!("SET statement_timeout = {}", statement_timeout_ms).as_str(),
                        )
                        .await?;
                    }
                    Ok(())
                })
            })
            .connect(url)
            .await?;
        info!(
            max_connections = config.max_connections,
            acquire_timeout_seconds = config.acquire_timeout_seconds,
            statement_timeout_seconds = config.statement_timeout_seconds,
            "postgres pool ready"
        );
        Ok(Self::new(pool))
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in schema::STATEMENTS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Escapes `%`, `_` and `\` so user text is matched literally inside ILIKE.
pub(crate) fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
