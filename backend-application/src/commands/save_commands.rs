use tracing::info;

use crate::{AppError, AppState};
use backend_domain::{normalize_email, PlayerKey, SaveReceipt, SaveSyncRequest};

pub async fn sync_save(state: &AppState, payload: SaveSyncRequest) -> Result<SaveReceipt, AppError> {
    let player = PlayerKey::new(
        payload.email.as_deref().unwrap_or_default(),
        payload.username.as_deref().unwrap_or_default(),
    )?;
    let save_json = payload.save_json.unwrap_or_default();
    if save_json.is_empty() {
        return Err(AppError::Validation("saveJson is required".to_string()));
    }
    state
        .cloud_saves
        .upsert_save(&player, &save_json)
        .await
        .map_err(AppError::storage("cloud-save/sync"))
}

/// Returns the normalized email with the number of saves removed.
pub async fn delete_email_saves(state: &AppState, email: &str) -> Result<(String, u64), AppError> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(AppError::Validation("email is required".to_string()));
    }
    let deleted = state
        .cloud_saves
        .delete_email(&email)
        .await
        .map_err(AppError::storage("admin/delete-email"))?;
    info!(email = %email, deleted, "cloud saves deleted");
    Ok((email, deleted))
}

pub async fn delete_save(
    state: &AppState,
    email: Option<&str>,
    username: Option<&str>,
) -> Result<(PlayerKey, u64), AppError> {
    let player = PlayerKey::new(email.unwrap_or_default(), username.unwrap_or_default())?;
    let deleted = state
        .cloud_saves
        .delete_save(&player)
        .await
        .map_err(AppError::storage("admin/delete-save"))?;
    Ok((player, deleted))
}
