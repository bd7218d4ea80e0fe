mod common;

use std::collections::HashSet;

use backend_application::commands::log_commands::append_log;
use backend_application::queries::log_history_queries::{fetch_page, list_logs};
use backend_application::AppError;
use backend_domain::{LogHistoryQuery, LogStreamMessage, LogTimeline, PageLimit, RuntimeConfig};

use common::{log_line, memory_state, memory_state_with};

#[tokio::test]
async fn append_returns_increasing_ids() {
    let (state, _store) = memory_state();
    let first = append_log(&state, log_line("one")).await.unwrap();
    let second = append_log(&state, log_line("two")).await.unwrap();
    assert!(second.id > first.id);
}

#[tokio::test]
async fn blank_content_is_rejected() {
    let (state, _store) = memory_state();
    let err = append_log(&state, log_line("   ")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn backward_paging_visits_every_record_once() {
    let (state, store) = memory_state();
    for i in 0..47 {
        append_log(&state, log_line(&format!("line {i}"))).await.unwrap();
    }

    let mut seen = Vec::new();
    let mut cursor = None;
    loop {
        let page = fetch_page(&store, cursor, PageLimit::clamped(Some(10), 20, 200))
            .await
            .unwrap();
        if page.logs.is_empty() {
            assert!(page.next_before_id.is_none());
            break;
        }
        let ids: Vec<i64> = page.logs.iter().map(|r| r.id).collect();
        assert!(ids.windows(2).all(|w| w[0] > w[1]), "page not descending: {ids:?}");
        seen.extend(ids);
        cursor = page.next_before_id;
    }
    let expected: Vec<i64> = (1..=47).rev().collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn history_query_parses_leniently() {
    let (state, _store) = memory_state();
    for i in 0..30 {
        append_log(&state, log_line(&format!("line {i}"))).await.unwrap();
    }
    let page = list_logs(
        &state,
        LogHistoryQuery {
            limit: Some("abc".to_string()),
            before_id: Some("not-a-number".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(page.logs.len(), 20);
    assert_eq!(page.logs[0].id, 30);
    assert_eq!(page.next_before_id, Some(11));

    let page = list_logs(
        &state,
        LogHistoryQuery {
            limit: Some("5".to_string()),
            before_id: Some("3".to_string()),
        },
    )
    .await
    .unwrap();
    let ids: Vec<i64> = page.logs.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[tokio::test]
async fn live_observer_sees_hello_then_records_in_order() {
    let (state, _store) = memory_state();
    let mut subscription = state.log_stream.subscribe();
    for i in 0..5 {
        append_log(&state, log_line(&format!("line {i}"))).await.unwrap();
    }

    assert!(matches!(
        subscription.recv().await,
        Some(LogStreamMessage::Hello(_))
    ));
    let mut ids = Vec::new();
    while let Some(message) = subscription.try_recv() {
        ids.extend(message.record_id());
    }
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn slow_observer_is_dropped_without_failing_the_append() {
    let config = RuntimeConfig {
        stream_buffer: 2,
        ..RuntimeConfig::default()
    };
    let (state, _store) = memory_state_with(config);
    let _slow = state.log_stream.subscribe();
    assert_eq!(state.log_stream.observer_count(), 1);

    for i in 0..4 {
        append_log(&state, log_line(&format!("line {i}"))).await.unwrap();
    }
    assert_eq!(state.log_stream.observer_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn live_and_backfill_merge_without_gaps_or_duplicates() {
    let (state, store) = memory_state();
    for i in 0..30 {
        append_log(&state, log_line(&format!("old {i}"))).await.unwrap();
    }

    let mut subscription = state.log_stream.subscribe();
    let writer = {
        let state = state.clone();
        tokio::spawn(async move {
            for i in 0..30 {
                append_log(&state, log_line(&format!("new {i}"))).await.unwrap();
            }
        })
    };

    let mut timeline = LogTimeline::new();
    let newest = fetch_page(&store, None, PageLimit::clamped(Some(7), 20, 200))
        .await
        .unwrap();
    timeline.apply_backfill(newest.logs);

    writer.await.unwrap();
    while let Some(message) = subscription.try_recv() {
        timeline.apply_live(message);
    }

    loop {
        let page = fetch_page(&store, timeline.cursor(), PageLimit::clamped(Some(7), 20, 200))
            .await
            .unwrap();
        if page.logs.is_empty() {
            break;
        }
        timeline.apply_backfill(page.logs);
    }

    let ids = timeline.ids_newest_first();
    let unique: HashSet<i64> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());
    assert_eq!(ids, (1..=60).rev().collect::<Vec<i64>>());
}

#[tokio::test]
async fn dropping_subscription_unsubscribes() {
    let (state, _store) = memory_state();
    let subscription = state.log_stream.subscribe();
    assert_eq!(state.log_stream.observer_count(), 1);
    drop(subscription);
    assert_eq!(state.log_stream.observer_count(), 0);

    let receipt = append_log(&state, log_line("nobody listening")).await.unwrap();
    assert_eq!(receipt.id, 1);
}
