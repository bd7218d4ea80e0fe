use async_trait::async_trait;
use chrono::{DateTime, Utc};

use backend_domain::{EventLogRepository, EventRecord, NewEventRecord, PageLimit};

use super::PostgresRepo;

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    email: String,
    username: String,
    device_id: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<EventRow> for EventRecord {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            username: row.username,
            device_id: row.device_id,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl EventLogRepository for PostgresRepo {
    async fn append(&self, record: &NewEventRecord) -> anyhow::Result<EventRecord> {
        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO cloud_logs (email, username, device_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at
            "#,
        )
        .bind(record.owner.email())
        .bind(record.owner.username())
        .bind(record.device_id.as_str())
        .bind(&record.content)
        .fetch_one(&self.pool)
        .await?;
        Ok(EventRecord::assigned(record, id, created_at))
    }

    async fn read_before(
        &self,
        before_id: Option<i64>,
        limit: PageLimit,
    ) -> anyhow::Result<Vec<EventRecord>> {
        let rows: Vec<EventRow> = sqlx::query_as(
            r#"
            SELECT id, email, username, device_id, content, created_at
            FROM cloud_logs
            WHERE ($1::BIGINT IS NULL OR id < $1)
            ORDER BY id DESC
            LIMIT $2
            "#,
        )
        .bind(before_id)
        .bind(i64::from(limit.get()))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(EventRecord::from).collect())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        let _: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
