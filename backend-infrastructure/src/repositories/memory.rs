// In-process store
// Same contracts as the PostgreSQL adapter, used for local runs and tests

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use backend_domain::{
    AchievementKey, CloudSave, CloudSaveRepository, DeviceId, EmailSaveStats, EventLogRepository,
    EventRecord, LossTally, NewEventRecord, PageLimit, PlayerDetail, PlayerFilter,
    PlayerListEntry, PlayerKey, PlayerStatsRepository, PlayerSummary, SaveEntry, SaveReceipt,
    StatsTotals, StatsTransaction, WinTally,
};

type Owner = (String, String);

fn owner_of(player: &PlayerKey) -> Owner {
    (player.email().to_string(), player.username().to_string())
}

#[derive(Clone)]
struct SummarySlot {
    id: i64,
    summary: PlayerSummary,
}

#[derive(Default)]
struct StatsState {
    next_id: i64,
    summaries: HashMap<Owner, SummarySlot>,
    /// Unlocked keys per player, in unlock order.
    achievements: HashMap<Owner, Vec<String>>,
}

#[derive(Default)]
struct SaveState {
    next_id: i64,
    saves: HashMap<Owner, (i64, CloudSave)>,
}

/// Holds every table behind async mutexes. Stats transactions keep the
/// stats lock for their whole lifetime, so they run one at a time and
/// only publish their staged rows on commit.
#[derive(Clone, Default)]
pub struct MemoryStore {
    logs: Arc<Mutex<Vec<EventRecord>>>,
    stats: Arc<Mutex<StatsState>>,
    devices: Arc<Mutex<HashMap<Owner, Vec<String>>>>,
    saves: Arc<Mutex<SaveState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventLogRepository for MemoryStore {
    async fn append(&self, record: &NewEventRecord) -> anyhow::Result<EventRecord> {
        let mut logs = self.logs.lock().await;
        let id = logs.last().map(|last| last.id).unwrap_or(0) + 1;
        let stored = EventRecord::assigned(record, id, Utc::now());
        logs.push(stored.clone());
        Ok(stored)
    }

    async fn read_before(
        &self,
        before_id: Option<i64>,
        limit: PageLimit,
    ) -> anyhow::Result<Vec<EventRecord>> {
        let logs = self.logs.lock().await;
        Ok(logs
            .iter()
            .rev()
            .filter(|record| before_id.map_or(true, |cursor| record.id < cursor))
            .take(limit.get() as usize)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub struct MemoryStatsTransaction {
    state: OwnedMutexGuard<StatsState>,
    staged_summaries: HashMap<Owner, SummarySlot>,
    staged_achievements: Vec<(Owner, String)>,
    staged_next_id: i64,
}

impl MemoryStatsTransaction {
    fn slot_mut(&mut self, player: &PlayerKey) -> anyhow::Result<&mut SummarySlot> {
        let owner = owner_of(player);
        if !self.staged_summaries.contains_key(&owner) {
            let committed = self
                .state
                .summaries
                .get(&owner)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no summary row for {}", player))?;
            self.staged_summaries.insert(owner.clone(), committed);
        }
        self.staged_summaries
            .get_mut(&owner)
            .ok_or_else(|| anyhow::anyhow!("no summary row for {}", player))
    }
}

#[async_trait]
impl StatsTransaction for MemoryStatsTransaction {
    async fn ensure_summary_row(&mut self, player: &PlayerKey) -> anyhow::Result<()> {
        let owner = owner_of(player);
        if self.staged_summaries.contains_key(&owner) || self.state.summaries.contains_key(&owner) {
            return Ok(());
        }
        self.staged_next_id += 1;
        let now = Utc::now();
        let slot = SummarySlot {
            id: self.staged_next_id,
            summary: PlayerSummary {
                email: owner.0.clone(),
                username: owner.1.clone(),
                wins_total: 0,
                losses_total: 0,
                has_won: false,
                first_win_at: None,
                achievements_count: 0,
                created_at: now,
                updated_at: now,
            },
        };
        self.staged_summaries.insert(owner, slot);
        Ok(())
    }

    async fn increment_wins(&mut self, player: &PlayerKey) -> anyhow::Result<WinTally> {
        let now = Utc::now();
        let summary = &mut self.slot_mut(player)?.summary;
        summary.wins_total += 1;
        summary.has_won = true;
        summary.first_win_at.get_or_insert(now);
        summary.updated_at = now;
        Ok(WinTally {
            wins_total: summary.wins_total,
            has_won: summary.has_won,
            first_win_at: summary.first_win_at,
        })
    }

    async fn increment_losses(&mut self, player: &PlayerKey) -> anyhow::Result<LossTally> {
        let summary = &mut self.slot_mut(player)?.summary;
        summary.losses_total += 1;
        summary.updated_at = Utc::now();
        Ok(LossTally {
            losses_total: summary.losses_total,
        })
    }

    async fn try_unlock_achievement(
        &mut self,
        player: &PlayerKey,
        key: &AchievementKey,
    ) -> anyhow::Result<bool> {
        let owner = owner_of(player);
        let committed = self
            .state
            .achievements
            .get(&owner)
            .map_or(false, |keys| keys.iter().any(|k| k == key.as_str()));
        let staged = self
            .staged_achievements
            .iter()
            .any(|(o, k)| *o == owner && k == key.as_str());
        if committed || staged {
            return Ok(false);
        }
        self.staged_achievements.push((owner, key.as_str().to_string()));
        Ok(true)
    }

    async fn increment_achievements(&mut self, player: &PlayerKey) -> anyhow::Result<i64> {
        let summary = &mut self.slot_mut(player)?.summary;
        summary.achievements_count += 1;
        summary.updated_at = Utc::now();
        Ok(summary.achievements_count)
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let MemoryStatsTransaction {
            mut state,
            staged_summaries,
            staged_achievements,
            staged_next_id,
        } = *self;
        state.next_id = staged_next_id;
        state.summaries.extend(staged_summaries);
        for (owner, key) in staged_achievements {
            state.achievements.entry(owner).or_default().push(key);
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl PlayerStatsRepository for MemoryStore {
    async fn begin(&self) -> anyhow::Result<Box<dyn StatsTransaction>> {
        let state = Arc::clone(&self.stats).lock_owned().await;
        let staged_next_id = state.next_id;
        Ok(Box::new(MemoryStatsTransaction {
            state,
            staged_summaries: HashMap::new(),
            staged_achievements: Vec::new(),
            staged_next_id,
        }))
    }

    async fn record_device(&self, player: &PlayerKey, device: &DeviceId) -> anyhow::Result<bool> {
        let mut devices = self.devices.lock().await;
        let seen = devices.entry(owner_of(player)).or_default();
        if seen.iter().any(|d| d == device.as_str()) {
            return Ok(false);
        }
        seen.push(device.as_str().to_string());
        Ok(true)
    }

    async fn fetch_totals(&self) -> anyhow::Result<StatsTotals> {
        let state = self.stats.lock().await;
        let players_total = state.summaries.len() as i64;
        let mut totals = StatsTotals {
            players_total,
            ..StatsTotals::default()
        };
        let mut achievements_sum = 0i64;
        for slot in state.summaries.values() {
            if slot.summary.has_won {
                totals.players_won += 1;
            }
            totals.wins_total += slot.summary.wins_total;
            totals.losses_total += slot.summary.losses_total;
            achievements_sum += slot.summary.achievements_count;
        }
        if players_total > 0 {
            totals.achievements_avg = achievements_sum as f64 / players_total as f64;
        }
        Ok(totals)
    }

    async fn list_players(&self, filter: &PlayerFilter) -> anyhow::Result<Vec<PlayerListEntry>> {
        let state = self.stats.lock().await;
        let devices = self.devices.lock().await;
        let mut slots: Vec<&SummarySlot> = state
            .summaries
            .values()
            .filter(|slot| filter.matches(&slot.summary.email, &slot.summary.username))
            .collect();
        slots.sort_by(|a, b| {
            b.summary
                .updated_at
                .cmp(&a.summary.updated_at)
                .then(b.id.cmp(&a.id))
        });
        Ok(slots
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .map(|slot| {
                let owner = (slot.summary.email.clone(), slot.summary.username.clone());
                PlayerListEntry {
                    email: slot.summary.email.clone(),
                    username: slot.summary.username.clone(),
                    wins_total: slot.summary.wins_total,
                    losses_total: slot.summary.losses_total,
                    achievements_count: slot.summary.achievements_count,
                    device_count: devices.get(&owner).map_or(0, |d| d.len() as i64),
                }
            })
            .collect())
    }

    async fn fetch_player(&self, player: &PlayerKey) -> anyhow::Result<Option<PlayerDetail>> {
        let owner = owner_of(player);
        let state = self.stats.lock().await;
        let Some(slot) = state.summaries.get(&owner) else {
            return Ok(None);
        };
        let device_ids = self
            .devices
            .lock()
            .await
            .get(&owner)
            .cloned()
            .unwrap_or_default();
        let achievement_ids = state.achievements.get(&owner).cloned().unwrap_or_default();
        Ok(Some(PlayerDetail::new(
            slot.summary.clone(),
            device_ids,
            achievement_ids,
        )))
    }

    async fn reconcile_achievement_counts(&self) -> anyhow::Result<u64> {
        let mut state = self.stats.lock().await;
        let StatsState {
            summaries,
            achievements,
            ..
        } = &mut *state;
        let now = Utc::now();
        let mut repaired = 0u64;
        for (owner, slot) in summaries.iter_mut() {
            let ledger = achievements.get(owner).map_or(0, |keys| keys.len() as i64);
            if slot.summary.achievements_count != ledger {
                slot.summary.achievements_count = ledger;
                slot.summary.updated_at = now;
                repaired += 1;
            }
        }
        Ok(repaired)
    }
}

#[async_trait]
impl CloudSaveRepository for MemoryStore {
    async fn upsert_save(&self, player: &PlayerKey, save_json: &str) -> anyhow::Result<SaveReceipt> {
        let mut state = self.saves.lock().await;
        let owner = owner_of(player);
        let updated_at = Utc::now();
        let existing = state.saves.get(&owner).map(|(id, _)| *id);
        let id = match existing {
            Some(id) => id,
            None => {
                state.next_id += 1;
                state.next_id
            }
        };
        let save = CloudSave {
            email: owner.0.clone(),
            username: owner.1.clone(),
            save_json: save_json.to_string(),
            updated_at,
        };
        state.saves.insert(owner, (id, save));
        Ok(SaveReceipt {
            id,
            email: player.email().to_string(),
            username: player.username().to_string(),
            updated_at,
        })
    }

    async fn fetch_save(&self, player: &PlayerKey) -> anyhow::Result<Option<CloudSave>> {
        let state = self.saves.lock().await;
        Ok(state.saves.get(&owner_of(player)).map(|(_, save)| save.clone()))
    }

    async fn list_saves_by_email(&self, email: &str) -> anyhow::Result<Vec<SaveEntry>> {
        let state = self.saves.lock().await;
        let mut entries: Vec<SaveEntry> = state
            .saves
            .values()
            .filter(|(_, save)| save.email == email)
            .map(|(_, save)| SaveEntry {
                username: save.username.clone(),
                updated_at: save.updated_at,
            })
            .collect();
        entries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(entries)
    }

    async fn list_emails(&self) -> anyhow::Result<Vec<EmailSaveStats>> {
        let state = self.saves.lock().await;
        let mut grouped: HashMap<&str, EmailSaveStats> = HashMap::new();
        for (_, save) in state.saves.values() {
            grouped
                .entry(save.email.as_str())
                .and_modify(|stats| {
                    stats.save_count += 1;
                    stats.latest_updated_at = stats.latest_updated_at.max(save.updated_at);
                })
                .or_insert_with(|| EmailSaveStats {
                    email: save.email.clone(),
                    save_count: 1,
                    latest_updated_at: save.updated_at,
                });
        }
        let mut emails: Vec<EmailSaveStats> = grouped.into_values().collect();
        emails.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(emails)
    }

    async fn delete_email(&self, email: &str) -> anyhow::Result<u64> {
        let mut state = self.saves.lock().await;
        let before = state.saves.len();
        state.saves.retain(|(owner_email, _), _| owner_email != email);
        Ok((before - state.saves.len()) as u64)
    }

    async fn delete_save(&self, player: &PlayerKey) -> anyhow::Result<u64> {
        let mut state = self.saves.lock().await;
        Ok(state.saves.remove(&owner_of(player)).map_or(0, |_| 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(email: &str, username: &str) -> PlayerKey {
        PlayerKey::new(email, username).unwrap()
    }

    fn new_record(content: &str) -> NewEventRecord {
        NewEventRecord {
            owner: player("a@b.c", "knight"),
            device_id: DeviceId::new("dev-1").unwrap(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn append_assigns_increasing_ids() {
        let store = MemoryStore::new();
        let first = store.append(&new_record("one")).await.unwrap();
        let second = store.append(&new_record("two")).await.unwrap();
        assert!(second.id > first.id);
        assert!(second.created_at >= first.created_at);
    }

    #[tokio::test]
    async fn read_before_is_strictly_descending_and_exclusive() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.append(&new_record(&format!("line {i}"))).await.unwrap();
        }
        let page = store
            .read_before(Some(4), PageLimit::clamped(Some(10), 20, 200))
            .await
            .unwrap();
        let ids: Vec<i64> = page.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn dropped_transaction_discards_changes() {
        let store = MemoryStore::new();
        let p = player("a@b.c", "knight");
        {
            let mut tx = store.begin().await.unwrap();
            tx.ensure_summary_row(&p).await.unwrap();
            tx.increment_wins(&p).await.unwrap();
        }
        assert!(store.fetch_player(&p).await.unwrap().is_none());

        let mut tx = store.begin().await.unwrap();
        tx.ensure_summary_row(&p).await.unwrap();
        tx.increment_losses(&p).await.unwrap();
        tx.rollback().await.unwrap();
        assert!(store.fetch_player(&p).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn achievement_unlock_is_decided_once() {
        let store = MemoryStore::new();
        let p = player("a@b.c", "knight");
        let key = AchievementKey::new("first_blood").unwrap();
        let mut tx = store.begin().await.unwrap();
        tx.ensure_summary_row(&p).await.unwrap();
        assert!(tx.try_unlock_achievement(&p, &key).await.unwrap());
        assert!(!tx.try_unlock_achievement(&p, &key).await.unwrap());
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(!tx.try_unlock_achievement(&p, &key).await.unwrap());
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn device_ledger_keeps_first_sighting_order() {
        let store = MemoryStore::new();
        let p = player("a@b.c", "knight");
        let mut tx = store.begin().await.unwrap();
        tx.ensure_summary_row(&p).await.unwrap();
        tx.commit().await.unwrap();

        for device in ["d2", "d1", "d2"] {
            store
                .record_device(&p, &DeviceId::new(device).unwrap())
                .await
                .unwrap();
        }
        let detail = store.fetch_player(&p).await.unwrap().unwrap();
        assert_eq!(detail.device_ids, vec!["d2".to_string(), "d1".to_string()]);
        assert_eq!(detail.device_count, 2);
    }

    #[tokio::test]
    async fn delete_email_counts_removed_saves() {
        let store = MemoryStore::new();
        store.upsert_save(&player("a@b.c", "one"), "{}").await.unwrap();
        store.upsert_save(&player("a@b.c", "two"), "{}").await.unwrap();
        store.upsert_save(&player("x@y.z", "one"), "{}").await.unwrap();

        assert_eq!(store.delete_email("a@b.c").await.unwrap(), 2);
        assert_eq!(store.delete_email("a@b.c").await.unwrap(), 0);
        let emails = store.list_emails().await.unwrap();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].email, "x@y.z");
    }
}
