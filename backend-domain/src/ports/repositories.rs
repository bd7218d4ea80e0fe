use async_trait::async_trait;

use crate::entities::{
    CloudSave, EmailSaveStats, EventRecord, LossTally, NewEventRecord, PlayerDetail,
    PlayerFilter, PlayerListEntry, SaveEntry, SaveReceipt, StatsTotals, WinTally,
};
use crate::value_objects::{AchievementKey, DeviceId, PageLimit, PlayerKey};

/// Durable, append-only event log.
#[async_trait]
pub trait EventLogRepository: Send + Sync {
    /// Assigns id and commit timestamp atomically with the insert.
    async fn append(&self, record: &NewEventRecord) -> anyhow::Result<EventRecord>;

    /// Records with `id < before_id` (or the newest ones when `None`),
    /// strictly descending by id.
    async fn read_before(
        &self,
        before_id: Option<i64>,
        limit: PageLimit,
    ) -> anyhow::Result<Vec<EventRecord>>;

    async fn ping(&self) -> anyhow::Result<()>;
}

/// One atomic unit of work against the summary table and the achievement
/// ledger. Dropping it without `commit` discards every change.
#[async_trait]
pub trait StatsTransaction: Send {
    /// Insert-if-absent; a no-op when the row already exists.
    async fn ensure_summary_row(&mut self, player: &PlayerKey) -> anyhow::Result<()>;

    async fn increment_wins(&mut self, player: &PlayerKey) -> anyhow::Result<WinTally>;

    async fn increment_losses(&mut self, player: &PlayerKey) -> anyhow::Result<LossTally>;

    /// The single decision point for the achievement counter: `true` only
    /// when the (player, key) row did not exist before.
    async fn try_unlock_achievement(
        &mut self,
        player: &PlayerKey,
        key: &AchievementKey,
    ) -> anyhow::Result<bool>;

    async fn increment_achievements(&mut self, player: &PlayerKey) -> anyhow::Result<i64>;

    async fn commit(self: Box<Self>) -> anyhow::Result<()>;

    async fn rollback(self: Box<Self>) -> anyhow::Result<()>;
}

#[async_trait]
pub trait PlayerStatsRepository: Send + Sync {
    async fn begin(&self) -> anyhow::Result<Box<dyn StatsTransaction>>;

    /// Insert-if-absent into the device ledger; `true` on a first sighting.
    async fn record_device(&self, player: &PlayerKey, device: &DeviceId) -> anyhow::Result<bool>;

    async fn fetch_totals(&self) -> anyhow::Result<StatsTotals>;

    async fn list_players(&self, filter: &PlayerFilter) -> anyhow::Result<Vec<PlayerListEntry>>;

    async fn fetch_player(&self, player: &PlayerKey) -> anyhow::Result<Option<PlayerDetail>>;

    /// Rewrites every cached achievement count that differs from its ledger
    /// cardinality; returns how many rows were repaired.
    async fn reconcile_achievement_counts(&self) -> anyhow::Result<u64>;
}

#[async_trait]
pub trait CloudSaveRepository: Send + Sync {
    async fn upsert_save(&self, player: &PlayerKey, save_json: &str) -> anyhow::Result<SaveReceipt>;
    async fn fetch_save(&self, player: &PlayerKey) -> anyhow::Result<Option<CloudSave>>;
    async fn list_saves_by_email(&self, email: &str) -> anyhow::Result<Vec<SaveEntry>>;
    async fn list_emails(&self) -> anyhow::Result<Vec<EmailSaveStats>>;
    async fn delete_email(&self, email: &str) -> anyhow::Result<u64>;
    async fn delete_save(&self, player: &PlayerKey) -> anyhow::Result<u64>;
}
