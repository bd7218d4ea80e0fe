use async_trait::async_trait;
use chrono::{DateTime, Utc};

use backend_domain::{CloudSave, CloudSaveRepository, EmailSaveStats, PlayerKey, SaveEntry, SaveReceipt};

use super::PostgresRepo;

#[derive(sqlx::FromRow)]
struct SaveRow {
    email: String,
    username: String,
    save_json: String,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl CloudSaveRepository for PostgresRepo {
    async fn upsert_save(&self, player: &PlayerKey, save_json: &str) -> anyhow::Result<SaveReceipt> {
        let (id, updated_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO cloud_saves (email, username, save_json, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (email, username)
            DO UPDATE SET
                save_json = EXCLUDED.save_json,
                updated_at = NOW()
            RETURNING id, updated_at
            "#,
        )
        .bind(player.email())
        .bind(player.username())
        .bind(save_json)
        .fetch_one(&self.pool)
        .await?;
        Ok(SaveReceipt {
            id,
            email: player.email().to_string(),
            username: player.username().to_string(),
            updated_at,
        })
    }

    async fn fetch_save(&self, player: &PlayerKey) -> anyhow::Result<Option<CloudSave>> {
        let row: Option<SaveRow> = sqlx::query_as(
            r#"
            SELECT email, username, save_json, updated_at
            FROM cloud_saves
            WHERE email = $1 AND username = $2
            LIMIT 1
            "#,
        )
        .bind(player.email())
        .bind(player.username())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|row| CloudSave {
            email: row.email,
            username: row.username,
            save_json: row.save_json,
            updated_at: row.updated_at,
        }))
    }

    async fn list_saves_by_email(&self, email: &str) -> anyhow::Result<Vec<SaveEntry>> {
        let rows: Vec<(String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT username, updated_at
            FROM cloud_saves
            WHERE email = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(username, updated_at)| SaveEntry { username, updated_at })
            .collect())
    }

    async fn list_emails(&self) -> anyhow::Result<Vec<EmailSaveStats>> {
        let rows: Vec<(String, i64, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT email, COUNT(*)::BIGINT AS save_count, MAX(updated_at) AS latest_updated_at
            FROM cloud_saves
            GROUP BY email
            ORDER BY email ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(email, save_count, latest_updated_at)| EmailSaveStats {
                email,
                save_count,
                latest_updated_at,
            })
            .collect())
    }

    async fn delete_email(&self, email: &str) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM cloud_saves WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_save(&self, player: &PlayerKey) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM cloud_saves WHERE email = $1 AND username = $2")
            .bind(player.email())
            .bind(player.username())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
