use std::time::Duration;

use tracing::{error, info};

use backend_application::commands::report_commands::reconcile_achievement_counts;
use backend_application::AppState;

/// Periodically repairs cached achievement counts that drifted from the
/// ledger. Returns immediately when the interval is zero.
pub async fn schedule_reconciliation(state: AppState) {
    let Some(period) = reconcile_period(state.config.reconcile_interval_minutes) else {
        info!("achievement reconciliation schedule disabled");
        return;
    };
    loop {
        tokio::time::sleep(period).await;
        run_reconciliation(&state, "scheduled").await;
    }
}

/// One reconciliation pass; failures are logged, never propagated.
pub async fn run_reconciliation(state: &AppState, trigger: &'static str) {
    match reconcile_achievement_counts(state).await {
        Ok(0) => info!(trigger, "achievement counts consistent"),
        Ok(repaired) => info!(trigger, repaired, "achievement counts repaired"),
        Err(err) => error!(trigger, error = %err, "achievement reconciliation failed"),
    }
}

fn reconcile_period(minutes: u64) -> Option<Duration> {
    (minutes > 0).then(|| Duration::from_secs(minutes.saturating_mul(60)))
}
