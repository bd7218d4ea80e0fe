use tracing::{info, warn};

use crate::{AppError, AppState};
use backend_domain::{
    AchievementKey, AchievementOutcome, AchievementReportRequest, DeviceId, LossTally,
    PlayerKey, PlayerReportRequest, StatsTransaction, WinTally,
};

fn player_from_request(
    email: Option<&str>,
    username: Option<&str>,
    device_id: Option<&str>,
) -> Result<(PlayerKey, Option<DeviceId>), AppError> {
    let player = PlayerKey::new(email.unwrap_or_default(), username.unwrap_or_default())?;
    Ok((player, DeviceId::optional(device_id)))
}

/// Device sightings are informational and recorded only after the report
/// committed. Failures are logged and swallowed.
async fn record_device_best_effort(state: &AppState, player: &PlayerKey, device: Option<&DeviceId>) {
    let Some(device) = device else {
        return;
    };
    match state.player_stats.record_device(player, device).await {
        Ok(true) => info!(player = %player, device = device.as_str(), "new device sighted"),
        Ok(false) => {}
        Err(err) => warn!(
            player = %player,
            device = device.as_str(),
            error = %err,
            "failed to record device sighting"
        ),
    }
}

async fn begin(
    state: &AppState,
    operation: &'static str,
) -> Result<Box<dyn StatsTransaction>, AppError> {
    state.player_stats.begin().await.map_err(|err| {
        state.metrics.record_report_error();
        AppError::storage(operation)(err)
    })
}

/// Commits on success; on failure rolls the whole unit back so no partial
/// increment is ever visible.
async fn settle<T>(
    state: &AppState,
    operation: &'static str,
    tx: Box<dyn StatsTransaction>,
    outcome: anyhow::Result<T>,
) -> Result<T, AppError> {
    let result = match outcome {
        Ok(value) => tx.commit().await.map(|_| value),
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(operation, error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    };
    match result {
        Ok(value) => {
            state.metrics.record_report();
            Ok(value)
        }
        Err(err) => {
            state.metrics.record_report_error();
            Err(AppError::storage(operation)(err))
        }
    }
}

pub async fn report_win(state: &AppState, payload: PlayerReportRequest) -> Result<WinTally, AppError> {
    let (player, device) = player_from_request(
        payload.email.as_deref(),
        payload.username.as_deref(),
        payload.device_id.as_deref(),
    )?;
    let mut tx = begin(state, "report/win").await?;
    let outcome = async {
        tx.ensure_summary_row(&player).await?;
        tx.increment_wins(&player).await
    }
    .await;
    let tally = settle(state, "report/win", tx, outcome).await?;

    record_device_best_effort(state, &player, device.as_ref()).await;
    Ok(tally)
}

pub async fn report_loss(state: &AppState, payload: PlayerReportRequest) -> Result<LossTally, AppError> {
    let (player, device) = player_from_request(
        payload.email.as_deref(),
        payload.username.as_deref(),
        payload.device_id.as_deref(),
    )?;
    let mut tx = begin(state, "report/lose").await?;
    let outcome = async {
        tx.ensure_summary_row(&player).await?;
        tx.increment_losses(&player).await
    }
    .await;
    let tally = settle(state, "report/lose", tx, outcome).await?;

    record_device_best_effort(state, &player, device.as_ref()).await;
    Ok(tally)
}

/// Advances the achievement counter only when the ledger insert is fresh;
/// repeating an unlocked key commits with no counter change.
pub async fn report_achievement(
    state: &AppState,
    payload: AchievementReportRequest,
) -> Result<AchievementOutcome, AppError> {
    let (player, device) = player_from_request(
        payload.email.as_deref(),
        payload.username.as_deref(),
        payload.device_id.as_deref(),
    )?;
    let key = AchievementKey::new(payload.achievement_key.as_deref().unwrap_or_default())?;

    let mut tx = begin(state, "report/achievement").await?;
    let outcome = async {
        tx.ensure_summary_row(&player).await?;
        let added = tx.try_unlock_achievement(&player, &key).await?;
        if added {
            tx.increment_achievements(&player).await?;
        }
        Ok::<bool, anyhow::Error>(added)
    }
    .await;
    let added = settle(state, "report/achievement", tx, outcome).await?;

    record_device_best_effort(state, &player, device.as_ref()).await;
    Ok(AchievementOutcome {
        added,
        achievement_key: key.as_str().to_string(),
    })
}

pub async fn register_player(state: &AppState, payload: PlayerReportRequest) -> Result<(), AppError> {
    let (player, device) = player_from_request(
        payload.email.as_deref(),
        payload.username.as_deref(),
        payload.device_id.as_deref(),
    )?;

    let mut tx = begin(state, "report/register").await?;
    let outcome = tx.ensure_summary_row(&player).await;
    settle(state, "report/register", tx, outcome).await?;

    record_device_best_effort(state, &player, device.as_ref()).await;
    Ok(())
}

pub async fn reconcile_achievement_counts(state: &AppState) -> Result<u64, AppError> {
    let repaired = state
        .player_stats
        .reconcile_achievement_counts()
        .await
        .map_err(AppError::storage("reports/reconcile"))?;
    if repaired > 0 {
        warn!(repaired, "achievement counters drifted from the ledger and were repaired");
    }
    Ok(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_requires_email_and_username_but_not_device() {
        let (player, device) =
            player_from_request(Some("A@B.C"), Some("knight"), None).expect("player");
        assert_eq!(player.email(), "a@b.c");
        assert!(device.is_none());

        match player_from_request(None, Some("knight"), Some("d")) {
            Err(AppError::Validation(message)) => assert!(message.contains("email")),
            other => panic!("unexpected: {other:?}"),
        }
        match player_from_request(Some("a@b.c"), Some("  "), Some("d")) {
            Err(AppError::Validation(message)) => assert!(message.contains("username")),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
