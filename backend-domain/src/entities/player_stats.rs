// Player statistics entities
// Summary rows plus the outcomes of the counter operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub email: String,
    pub username: String,
    pub wins_total: i64,
    pub losses_total: i64,
    pub has_won: bool,
    pub first_win_at: Option<DateTime<Utc>>,
    pub achievements_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinTally {
    pub wins_total: i64,
    pub has_won: bool,
    pub first_win_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LossTally {
    pub losses_total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementOutcome {
    pub added: bool,
    pub achievement_key: String,
}

/// Raw aggregates as the store computes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsTotals {
    pub players_total: i64,
    pub players_won: i64,
    pub wins_total: i64,
    pub losses_total: i64,
    pub achievements_avg: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportsSummary {
    pub players_total: i64,
    pub players_won: i64,
    /// `players_won / players_total`, in `0..=1`.
    pub completion_rate: f64,
    pub wins_total: i64,
    pub losses_total: i64,
    pub achievements_avg: f64,
}

impl From<StatsTotals> for ReportsSummary {
    fn from(totals: StatsTotals) -> Self {
        let completion_rate = if totals.players_total > 0 {
            totals.players_won as f64 / totals.players_total as f64
        } else {
            0.0
        };
        Self {
            players_total: totals.players_total,
            players_won: totals.players_won,
            completion_rate,
            wins_total: totals.wins_total,
            losses_total: totals.losses_total,
            achievements_avg: totals.achievements_avg,
        }
    }
}

/// Normalized player list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerFilter {
    /// Lowercased substring matched against email or username; empty matches all.
    pub text: String,
    pub limit: u32,
    pub offset: u32,
}

impl PlayerFilter {
    pub fn matches(&self, email: &str, username: &str) -> bool {
        self.text.is_empty()
            || email.to_lowercase().contains(&self.text)
            || username.to_lowercase().contains(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerListEntry {
    pub email: String,
    pub username: String,
    pub wins_total: i64,
    pub losses_total: i64,
    pub achievements_count: i64,
    pub device_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDetail {
    #[serde(flatten)]
    pub summary: PlayerSummary,
    /// Device ids in order of first sighting.
    pub device_ids: Vec<String>,
    pub device_count: i64,
    /// Achievement keys in unlock order.
    pub achievement_ids: Vec<String>,
}

impl PlayerDetail {
    pub fn new(summary: PlayerSummary, device_ids: Vec<String>, achievement_ids: Vec<String>) -> Self {
        Self {
            summary,
            device_count: device_ids.len() as i64,
            device_ids,
            achievement_ids,
        }
    }

    /// True when the cached counter disagrees with the ledger.
    pub fn has_achievement_drift(&self) -> bool {
        self.summary.achievements_count != self.achievement_ids.len() as i64
    }
}
