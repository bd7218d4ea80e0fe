mod common;

use backend_application::commands::save_commands::{delete_email_saves, delete_save, sync_save};
use backend_application::queries::save_queries::{fetch_save, list_emails, list_saves_by_email};
use backend_application::AppError;
use backend_domain::SaveSyncRequest;

use common::memory_state;

fn sync(email: &str, username: &str, save_json: &str) -> SaveSyncRequest {
    SaveSyncRequest {
        email: Some(email.to_string()),
        username: Some(username.to_string()),
        save_json: Some(save_json.to_string()),
    }
}

#[tokio::test]
async fn last_write_wins_and_keeps_the_row_id() {
    let (state, _store) = memory_state();
    let first = sync_save(&state, sync("Hero@Example.com", "knight", r#"{"level":1}"#))
        .await
        .unwrap();
    let second = sync_save(&state, sync("hero@example.com", "knight", r#"{"level":2}"#))
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.email, "hero@example.com");
    assert!(second.updated_at >= first.updated_at);

    let save = fetch_save(&state, Some(" HERO@example.com"), Some("knight"))
        .await
        .unwrap();
    assert_eq!(save.save_json, r#"{"level":2}"#);
}

#[tokio::test]
async fn sync_requires_every_field() {
    let (state, _store) = memory_state();
    let err = sync_save(&state, sync("a@b.c", "knight", "")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    let err = sync_save(&state, sync("a@b.c", "", "{}")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn missing_save_is_not_found() {
    let (state, _store) = memory_state();
    let err = fetch_save(&state, Some("a@b.c"), Some("knight"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn listings_group_by_email() {
    let (state, _store) = memory_state();
    sync_save(&state, sync("a@b.c", "one", "{}")).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    sync_save(&state, sync("a@b.c", "two", "{}")).await.unwrap();
    sync_save(&state, sync("z@b.c", "one", "{}")).await.unwrap();

    let (email, entries) = list_saves_by_email(&state, Some(" A@B.C ")).await.unwrap();
    assert_eq!(email, "a@b.c");
    let names: Vec<&str> = entries.iter().map(|e| e.username.as_str()).collect();
    assert_eq!(names, vec!["two", "one"]);

    let emails = list_emails(&state).await.unwrap();
    assert_eq!(emails.len(), 2);
    assert_eq!(emails[0].email, "a@b.c");
    assert_eq!(emails[0].save_count, 2);
    assert_eq!(emails[1].email, "z@b.c");
}

#[tokio::test]
async fn deletes_report_counts() {
    let (state, _store) = memory_state();
    sync_save(&state, sync("a@b.c", "one", "{}")).await.unwrap();
    sync_save(&state, sync("a@b.c", "two", "{}")).await.unwrap();

    let (player, deleted) = delete_save(&state, Some("A@b.c"), Some(" one")).await.unwrap();
    assert_eq!((player.email(), player.username(), deleted), ("a@b.c", "one", 1));
    let (_, deleted) = delete_save(&state, Some("a@b.c"), Some("one")).await.unwrap();
    assert_eq!(deleted, 0);
    assert_eq!(
        delete_email_saves(&state, "A@B.C").await.unwrap(),
        ("a@b.c".to_string(), 1)
    );
    assert!(matches!(
        delete_email_saves(&state, "  ").await.unwrap_err(),
        AppError::Validation(_)
    ));
}
