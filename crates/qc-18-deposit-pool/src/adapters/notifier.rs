//! # Notification Adapters
//!
//! Publish committed deposit pool notifications.
//!
//! - `BroadcastNotifier`: multi-consumer fan-out over `tokio::sync::broadcast`
//! - `RecordingNotifier`: keeps every record, for assertions
//! - `NoOpNotifier`: discards everything

use crate::config::{DepositPoolConfig, DEFAULT_EVENT_CHANNEL_CAPACITY};
use crate::domain::EventRecord;
use crate::ports::outbound::NotificationSink;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Broadcast-channel notifier.
///
/// Sending never blocks; slow subscribers lag and skip records rather than
/// holding up the pool.
#[derive(Debug)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<EventRecord>,
    published: AtomicU64,
}

impl BroadcastNotifier {
    /// Create a notifier with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CHANNEL_CAPACITY)
    }

    /// Create a notifier buffering up to `capacity` records per subscriber.
    ///
    /// # Panics
    /// Panics if `capacity` is zero; `DepositPoolConfig::validate` rejects that.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            published: AtomicU64::new(0),
        }
    }

    /// Create a notifier sized by the service configuration.
    #[must_use]
    pub fn for_config(config: &DepositPoolConfig) -> Self {
        Self::with_capacity(config.event_channel_capacity)
    }

    /// Subscribe to records published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Total records published.
    #[must_use]
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for BroadcastNotifier {
    fn publish(&self, record: &EventRecord) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);
        let topic = record.event.topic();
        match self.sender.send(record.clone()) {
            Ok(receivers) => {
                debug!(topic, receivers, "notification published");
                receivers
            }
            Err(_) => {
                warn!(topic, "notification published with no subscribers");
                0
            }
        }
    }
}

/// Notifier that keeps every record.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    records: Mutex<Vec<EventRecord>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record published so far.
    #[must_use]
    pub fn records(&self) -> Vec<EventRecord> {
        self.records.lock().clone()
    }

    /// Number of records published so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns true if nothing was published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Forget recorded notifications.
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl NotificationSink for RecordingNotifier {
    fn publish(&self, record: &EventRecord) -> usize {
        self.records.lock().push(record.clone());
        1
    }
}

/// Notifier that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpNotifier;

impl NotificationSink for NoOpNotifier {
    fn publish(&self, _record: &EventRecord) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::units::ether;
    use crate::domain::{Address, DepositPoolEvent};
    use uuid::Uuid;

    fn record() -> EventRecord {
        EventRecord {
            correlation_id: Uuid::new_v4(),
            event: DepositPoolEvent::DepositReceived {
                contributor: Address::repeat(1),
                amount: ether(1),
                time: 100,
            },
        }
    }

    #[tokio::test]
    async fn test_broadcast_reaches_subscribers() {
        let notifier = BroadcastNotifier::with_capacity(8);
        let mut first = notifier.subscribe();
        let mut second = notifier.subscribe();
        assert_eq!(notifier.subscriber_count(), 2);

        let sent = record();
        assert_eq!(notifier.publish(&sent), 2);

        assert_eq!(first.recv().await.unwrap(), sent);
        assert_eq!(second.recv().await.unwrap(), sent);
        assert_eq!(notifier.published(), 1);
    }

    #[test]
    fn test_broadcast_without_subscribers() {
        let notifier = BroadcastNotifier::new();
        assert_eq!(notifier.publish(&record()), 0);
        assert_eq!(notifier.published(), 1);
    }

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        assert!(notifier.is_empty());
        notifier.publish(&record());
        notifier.publish(&record());
        assert_eq!(notifier.len(), 2);
        notifier.clear();
        assert!(notifier.is_empty());
    }

    #[test]
    fn test_no_op_notifier() {
        assert_eq!(NoOpNotifier.publish(&record()), 0);
    }
}
