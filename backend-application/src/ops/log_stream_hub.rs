use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use backend_domain::{current_millis, EventRecord, LogStreamMessage};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Why a single observer could not take a record. Never affects the append
/// or any other observer; the observer is simply dropped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("observer buffer is full")]
    Lagging,
    #[error("observer disconnected")]
    Disconnected,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub dropped: usize,
}

/// Registry of live log observers. Each observer owns a bounded channel;
/// publishing never waits on a slow consumer.
pub struct LogStreamHub {
    observers: Mutex<HashMap<Uuid, mpsc::Sender<LogStreamMessage>>>,
    buffer: usize,
    closed: AtomicBool,
}

impl LogStreamHub {
    pub fn new(buffer: usize) -> Self {
        Self {
            observers: Mutex::new(HashMap::new()),
            buffer: buffer.max(1),
            closed: AtomicBool::new(false),
        }
    }

    // Critical sections never await, so a poisoned lock still holds a
    // consistent map.
    fn registry(&self) -> MutexGuard<'_, HashMap<Uuid, mpsc::Sender<LogStreamMessage>>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers an observer whose first message is the hello sentinel.
    /// After `close_all` the observer gets the hello and then the end.
    pub fn subscribe(self: &Arc<Self>) -> LogSubscription {
        let (tx, receiver) = mpsc::channel(self.buffer);
        let _ = tx.try_send(LogStreamMessage::hello(current_millis()));
        let id = Uuid::new_v4();
        {
            let mut registry = self.registry();
            if !self.closed.load(Ordering::SeqCst) {
                registry.insert(id, tx);
                debug!(observer = %id, "live observer subscribed");
            }
        }
        LogSubscription {
            id,
            receiver,
            hub: Arc::downgrade(self),
        }
    }

    pub fn unsubscribe(&self, id: Uuid) -> bool {
        let removed = self.registry().remove(&id).is_some();
        if removed {
            debug!(observer = %id, "live observer unsubscribed");
        }
        removed
    }

    /// Fans `record` out to every registered observer. Works on a snapshot
    /// of the registry so concurrent subscribe/unsubscribe calls are safe.
    pub fn publish(&self, record: &EventRecord) -> PublishReport {
        let snapshot: Vec<(Uuid, mpsc::Sender<LogStreamMessage>)> = self
            .registry()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut report = PublishReport::default();
        let mut stale = Vec::new();
        for (id, tx) in snapshot {
            match deliver(&tx, LogStreamMessage::Record(record.clone())) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    warn!(observer = %id, record_id = record.id, error = %err, "dropping live observer");
                    stale.push(id);
                }
            }
        }

        if !stale.is_empty() {
            let mut registry = self.registry();
            for id in stale {
                if registry.remove(&id).is_some() {
                    report.dropped += 1;
                }
            }
        }
        report
    }

    /// Ends every live stream: each observer drains its buffer and then
    /// sees `None`. Used on shutdown so open streams do not hold the server.
    pub fn close_all(&self) -> usize {
        let mut registry = self.registry();
        self.closed.store(true, Ordering::SeqCst);
        let closed = registry.len();
        registry.clear();
        info!(observers = closed, "live log streams closed");
        closed
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn observer_count(&self) -> usize {
        self.registry().len()
    }
}

fn deliver(
    tx: &mpsc::Sender<LogStreamMessage>,
    message: LogStreamMessage,
) -> Result<(), DeliveryError> {
    tx.try_send(message).map_err(|err| match err {
        mpsc::error::TrySendError::Full(_) => DeliveryError::Lagging,
        mpsc::error::TrySendError::Closed(_) => DeliveryError::Disconnected,
    })
}

/// Handle for one observer. Dropping it unsubscribes.
pub struct LogSubscription {
    id: Uuid,
    receiver: mpsc::Receiver<LogStreamMessage>,
    hub: Weak<LogStreamHub>,
}

impl LogSubscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// `None` once the hub has dropped this observer and the buffer is drained.
    pub async fn recv(&mut self) -> Option<LogStreamMessage> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<LogStreamMessage> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for LogSubscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.unsubscribe(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: i64) -> EventRecord {
        EventRecord {
            id,
            email: "a@b.c".to_string(),
            username: "knight".to_string(),
            device_id: "dev".to_string(),
            content: format!("line {id}"),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn first_message_is_hello() {
        let hub = Arc::new(LogStreamHub::new(8));
        let mut sub = hub.subscribe();
        let first = sub.recv().await.expect("hello");
        assert!(matches!(first, LogStreamMessage::Hello(ref h) if h.kind == "hello"));
        assert_eq!(first.record_id(), None);
    }

    #[tokio::test]
    async fn publish_reaches_every_observer_in_order() {
        let hub = Arc::new(LogStreamHub::new(8));
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();
        for id in 1..=3 {
            let report = hub.publish(&record(id));
            assert_eq!(report, PublishReport { delivered: 2, dropped: 0 });
        }
        for sub in [&mut a, &mut b] {
            assert_eq!(sub.recv().await.and_then(|m| m.record_id()), None);
            let ids: Vec<i64> = (0..3)
                .filter_map(|_| sub.try_recv().and_then(|m| m.record_id()))
                .collect();
            assert_eq!(ids, vec![1, 2, 3]);
        }
    }

    #[tokio::test]
    async fn slow_observer_is_dropped_without_affecting_others() {
        let hub = Arc::new(LogStreamHub::new(2));
        let mut slow = hub.subscribe();
        let mut fast = hub.subscribe();

        // hello + 1 record fill the slow buffer; the fast one keeps draining
        assert!(fast.recv().await.is_some());
        hub.publish(&record(1));
        assert_eq!(fast.recv().await.and_then(|m| m.record_id()), Some(1));

        let report = hub.publish(&record(2));
        assert_eq!(report, PublishReport { delivered: 1, dropped: 1 });
        assert_eq!(fast.recv().await.and_then(|m| m.record_id()), Some(2));
        assert_eq!(hub.observer_count(), 1);

        // the dropped observer drains what it had and then sees the end
        assert!(slow.recv().await.is_some());
        assert_eq!(slow.recv().await.and_then(|m| m.record_id()), Some(1));
        assert!(slow.recv().await.is_none());
    }

    #[tokio::test]
    async fn dropping_subscription_unregisters_it() {
        let hub = Arc::new(LogStreamHub::new(4));
        let sub = hub.subscribe();
        let other = hub.subscribe();
        assert_eq!(hub.observer_count(), 2);
        drop(sub);
        assert_eq!(hub.observer_count(), 1);
        assert!(!hub.unsubscribe(Uuid::new_v4()));
        assert!(hub.unsubscribe(other.id()));
        assert_eq!(hub.publish(&record(1)), PublishReport::default());
    }

    #[tokio::test]
    async fn close_all_ends_every_stream() {
        let hub = Arc::new(LogStreamHub::new(8));
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();
        hub.publish(&record(1));

        assert_eq!(hub.close_all(), 2);
        assert_eq!(hub.observer_count(), 0);
        assert!(hub.is_closed());
        for sub in [&mut a, &mut b] {
            assert_eq!(sub.recv().await.and_then(|m| m.record_id()), None);
            assert_eq!(sub.recv().await.and_then(|m| m.record_id()), Some(1));
            assert!(sub.recv().await.is_none());
        }

        let mut late = hub.subscribe();
        assert_eq!(hub.observer_count(), 0);
        assert!(late.recv().await.is_some());
        assert!(late.recv().await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_unsubscribe_during_publish_is_safe() {
        let hub = Arc::new(LogStreamHub::new(1024));
        let publisher = {
            let hub = hub.clone();
            tokio::spawn(async move {
                for id in 0..500 {
                    hub.publish(&record(id));
                    tokio::task::yield_now().await;
                }
            })
        };
        let churn = {
            let hub = hub.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    let sub = hub.subscribe();
                    tokio::task::yield_now().await;
                    drop(sub);
                }
            })
        };
        publisher.await.expect("publisher");
        churn.await.expect("churn");
        assert_eq!(hub.observer_count(), 0);
    }
}
