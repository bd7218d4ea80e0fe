use crate::{AppError, AppState};
use backend_domain::{normalize_email, CloudSave, EmailSaveStats, PlayerKey, SaveEntry};

pub async fn fetch_save(
    state: &AppState,
    email: Option<&str>,
    username: Option<&str>,
) -> Result<CloudSave, AppError> {
    let player = PlayerKey::new(email.unwrap_or_default(), username.unwrap_or_default())?;
    state
        .cloud_saves
        .fetch_save(&player)
        .await
        .map_err(AppError::storage("cloud-save/fetch"))?
        .ok_or_else(|| AppError::NotFound("save not found".to_string()))
}

/// Returns the normalized email alongside its saves, newest first.
pub async fn list_saves_by_email(
    state: &AppState,
    email: Option<&str>,
) -> Result<(String, Vec<SaveEntry>), AppError> {
    let email = normalize_email(email.unwrap_or_default());
    if email.is_empty() {
        return Err(AppError::Validation("email is required".to_string()));
    }
    let entries = state
        .cloud_saves
        .list_saves_by_email(&email)
        .await
        .map_err(AppError::storage("cloud-save/list-by-email"))?;
    Ok((email, entries))
}

pub async fn list_emails(state: &AppState) -> Result<Vec<EmailSaveStats>, AppError> {
    state
        .cloud_saves
        .list_emails()
        .await
        .map_err(AppError::storage("admin/emails"))
}
