use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use backend_application::commands::save_commands;
use backend_application::queries::save_queries;
use backend_application::AppState;
use backend_domain::{
    CloudSave, EmailQuery, EmailSaveStats, PlayerLookupQuery, SaveEntry, SaveReceipt,
    SaveSyncRequest,
};

use crate::error::HttpError;
use crate::middleware::json_body;
use crate::response::{ok, ApiOk};

#[derive(Debug, Serialize)]
pub struct EntriesBody {
    pub email: String,
    pub entries: Vec<SaveEntry>,
}

#[derive(Debug, Serialize)]
pub struct SavesBody {
    pub email: String,
    pub saves: Vec<SaveEntry>,
}

#[derive(Debug, Serialize)]
pub struct EmailsBody {
    pub emails: Vec<EmailSaveStats>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDeletedBody {
    pub email: String,
    pub deleted_count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDeletedBody {
    pub email: String,
    pub username: String,
    pub deleted_count: u64,
}

pub async fn sync_save(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiOk<SaveReceipt>>, HttpError> {
    let payload: SaveSyncRequest = json_body(&headers, &body, state.config.max_body_bytes)?;
    let receipt = save_commands::sync_save(&state, payload).await?;
    Ok(ok(receipt))
}

pub async fn fetch_save(
    State(state): State<AppState>,
    Query(query): Query<PlayerLookupQuery>,
) -> Result<Json<ApiOk<CloudSave>>, HttpError> {
    let save =
        save_queries::fetch_save(&state, query.email.as_deref(), query.username.as_deref()).await?;
    Ok(ok(save))
}

pub async fn list_saves_by_email(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<ApiOk<EntriesBody>>, HttpError> {
    let (email, entries) = save_queries::list_saves_by_email(&state, query.email.as_deref()).await?;
    Ok(ok(EntriesBody { email, entries }))
}

pub async fn admin_list_emails(
    State(state): State<AppState>,
) -> Result<Json<ApiOk<EmailsBody>>, HttpError> {
    let emails = save_queries::list_emails(&state).await?;
    Ok(ok(EmailsBody { emails }))
}

pub async fn admin_list_saves(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<ApiOk<SavesBody>>, HttpError> {
    let (email, saves) = save_queries::list_saves_by_email(&state, query.email.as_deref()).await?;
    Ok(ok(SavesBody { email, saves }))
}

pub async fn admin_delete_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<ApiOk<EmailDeletedBody>>, HttpError> {
    let (email, deleted_count) = save_commands::delete_email_saves(&state, &email).await?;
    Ok(ok(EmailDeletedBody {
        email,
        deleted_count,
    }))
}

pub async fn admin_delete_save(
    State(state): State<AppState>,
    Query(query): Query<PlayerLookupQuery>,
) -> Result<Json<ApiOk<SaveDeletedBody>>, HttpError> {
    let (player, deleted_count) =
        save_commands::delete_save(&state, query.email.as_deref(), query.username.as_deref())
            .await?;
    Ok(ok(SaveDeletedBody {
        email: player.email().to_string(),
        username: player.username().to_string(),
        deleted_count,
    }))
}
