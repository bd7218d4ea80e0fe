use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};

use backend_domain::{
    AchievementKey, DeviceId, LossTally, PlayerDetail, PlayerFilter, PlayerKey,
    PlayerListEntry, PlayerStatsRepository, PlayerSummary, StatsTotals, StatsTransaction,
    WinTally,
};

use super::{escape_like, PostgresRepo};

/// Counter updates are in-place `x = x + 1` statements: the row lock taken
/// by UPDATE serializes concurrent writers for one player without a
/// read-modify-write race.
pub struct PgStatsTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StatsTransaction for PgStatsTransaction {
    async fn ensure_summary_row(&mut self, player: &PlayerKey) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO account_reports (email, username)
            VALUES ($1, $2)
            ON CONFLICT (email, username) DO NOTHING
            "#,
        )
        .bind(player.email())
        .bind(player.username())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn increment_wins(&mut self, player: &PlayerKey) -> anyhow::Result<WinTally> {
        let (wins_total, has_won, first_win_at): (i64, bool, Option<DateTime<Utc>>) =
            sqlx::query_as(
                r#"
                UPDATE account_reports
                SET
                    wins_total = wins_total + 1,
                    has_won = TRUE,
                    first_win_at = COALESCE(first_win_at, NOW()),
                    updated_at = NOW()
                WHERE email = $1 AND username = $2
                RETURNING wins_total, has_won, first_win_at
                "#,
            )
            .bind(player.email())
            .bind(player.username())
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(WinTally {
            wins_total,
            has_won,
            first_win_at,
        })
    }

    async fn increment_losses(&mut self, player: &PlayerKey) -> anyhow::Result<LossTally> {
        let (losses_total,): (i64,) = sqlx::query_as(
            r#"
            UPDATE account_reports
            SET
                losses_total = losses_total + 1,
                updated_at = NOW()
            WHERE email = $1 AND username = $2
            RETURNING losses_total
            "#,
        )
        .bind(player.email())
        .bind(player.username())
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(LossTally { losses_total })
    }

    async fn try_unlock_achievement(
        &mut self,
        player: &PlayerKey,
        key: &AchievementKey,
    ) -> anyhow::Result<bool> {
        let inserted: Option<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO account_achievements (email, username, achievement_key)
            VALUES ($1, $2, $3)
            ON CONFLICT (email, username, achievement_key) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(player.email())
        .bind(player.username())
        .bind(key.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(inserted.is_some())
    }

    async fn increment_achievements(&mut self, player: &PlayerKey) -> anyhow::Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            UPDATE account_reports
            SET
                achievements_count = achievements_count + 1,
                updated_at = NOW()
            WHERE email = $1 AND username = $2
            RETURNING achievements_count
            "#,
        )
        .bind(player.email())
        .bind(player.username())
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(count)
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    email: String,
    username: String,
    wins_total: i64,
    losses_total: i64,
    has_won: bool,
    first_win_at: Option<DateTime<Utc>>,
    achievements_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SummaryRow> for PlayerSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            email: row.email,
            username: row.username,
            wins_total: row.wins_total,
            losses_total: row.losses_total,
            has_won: row.has_won,
            first_win_at: row.first_win_at,
            achievements_count: row.achievements_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TotalsRow {
    players_total: i64,
    players_won: i64,
    wins_total: i64,
    losses_total: i64,
    achievements_avg: f64,
}

#[derive(sqlx::FromRow)]
struct PlayerListRow {
    email: String,
    username: String,
    wins_total: i64,
    losses_total: i64,
    achievements_count: i64,
    device_count: i64,
}

#[async_trait]
impl PlayerStatsRepository for PostgresRepo {
    async fn begin(&self) -> anyhow::Result<Box<dyn StatsTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgStatsTransaction { tx }))
    }

    async fn record_device(&self, player: &PlayerKey, device: &DeviceId) -> anyhow::Result<bool> {
        let inserted: Option<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO account_devices (email, username, device_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (email, username, device_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(player.email())
        .bind(player.username())
        .bind(device.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(inserted.is_some())
    }

    async fn fetch_totals(&self) -> anyhow::Result<StatsTotals> {
        let row: TotalsRow = sqlx::query_as(
            r#"
            SELECT
                COUNT(*)::BIGINT AS players_total,
                COALESCE(SUM(CASE WHEN has_won THEN 1 ELSE 0 END), 0)::BIGINT AS players_won,
                COALESCE(SUM(wins_total), 0)::BIGINT AS wins_total,
                COALESCE(SUM(losses_total), 0)::BIGINT AS losses_total,
                COALESCE(AVG(achievements_count), 0)::DOUBLE PRECISION AS achievements_avg
            FROM account_reports
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(StatsTotals {
            players_total: row.players_total,
            players_won: row.players_won,
            wins_total: row.wins_total,
            losses_total: row.losses_total,
            achievements_avg: row.achievements_avg,
        })
    }

    async fn list_players(&self, filter: &PlayerFilter) -> anyhow::Result<Vec<PlayerListEntry>> {
        let rows: Vec<PlayerListRow> = sqlx::query_as(
            r#"
            SELECT
                ar.email,
                ar.username,
                ar.wins_total,
                ar.losses_total,
                ar.achievements_count,
                COALESCE(ad.device_count, 0)::BIGINT AS device_count
            FROM account_reports ar
            LEFT JOIN (
                SELECT email, username, COUNT(*) AS device_count
                FROM account_devices
                GROUP BY email, username
            ) ad
                ON ad.email = ar.email AND ad.username = ar.username
            WHERE
                ($1::TEXT = '' OR ar.email ILIKE '%' || $2::TEXT || '%' OR ar.username ILIKE '%' || $2::TEXT || '%')
            ORDER BY ar.updated_at DESC, ar.id DESC
            LIMIT $3
            OFFSET $4
            "#,
        )
        .bind(&filter.text)
        .bind(escape_like(&filter.text))
        .bind(i64::from(filter.limit))
        .bind(i64::from(filter.offset))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| PlayerListEntry {
                email: row.email,
                username: row.username,
                wins_total: row.wins_total,
                losses_total: row.losses_total,
                achievements_count: row.achievements_count,
                device_count: row.device_count,
            })
            .collect())
    }

    /// The summary row and both ledgers are read from one snapshot, so a
    /// concurrent unlock cannot make the cached counter look drifted.
    async fn fetch_player(&self, player: &PlayerKey) -> anyhow::Result<Option<PlayerDetail>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let row: Option<SummaryRow> = sqlx::query_as(
            r#"
            SELECT email, username, wins_total, losses_total, has_won, first_win_at,
                   achievements_count, created_at, updated_at
            FROM account_reports
            WHERE email = $1 AND username = $2
            LIMIT 1
            "#,
        )
        .bind(player.email())
        .bind(player.username())
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            tx.commit().await?;
            return Ok(None);
        };

        let device_ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT device_id
            FROM account_devices
            WHERE email = $1 AND username = $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(player.email())
        .bind(player.username())
        .fetch_all(&mut *tx)
        .await?;

        let achievement_ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT achievement_key
            FROM account_achievements
            WHERE email = $1 AND username = $2
            ORDER BY unlocked_at ASC, id ASC
            "#,
        )
        .bind(player.email())
        .bind(player.username())
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(PlayerDetail::new(
            PlayerSummary::from(row),
            device_ids,
            achievement_ids,
        )))
    }

    async fn reconcile_achievement_counts(&self) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE account_reports ar
            SET
                achievements_count = ledger.cnt,
                updated_at = NOW()
            FROM (
                SELECT r.id, COUNT(a.id)::BIGINT AS cnt
                FROM account_reports r
                LEFT JOIN account_achievements a
                    ON a.email = r.email AND a.username = r.username
                GROUP BY r.id
            ) ledger
            WHERE ar.id = ledger.id AND ar.achievements_count <> ledger.cnt
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
