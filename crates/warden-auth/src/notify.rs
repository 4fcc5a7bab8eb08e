//! Out-of-band anomaly notification.
//!
//! The session service only ever *sends* an event; delivery (HTTP,
//! retries, timeouts) belongs to whoever drains the channel. Sending
//! never blocks and never fails from the caller's point of view.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;
use uuid::Uuid;

/// Default capacity of the notification channel.
pub const DEFAULT_NOTIFY_CAPACITY: usize = 512;

/// A refresh arrived from a different network address than the one the
/// session was bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressChange {
    pub user_id: Uuid,
    pub new_ip: String,
}

/// Sink for anomaly events. Implementations must return immediately.
pub trait AnomalyNotifier: Send + Sync {
    fn address_changed(&self, event: AddressChange);
}

/// Notifier backed by a bounded tokio channel.
///
/// A full or closed channel drops the event.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: Option<mpsc::Sender<AddressChange>>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end a worker should drain.
    ///
    /// A capacity of zero is raised to one.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<AddressChange>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx: Some(tx) }, rx)
    }

    /// A notifier that discards every event (no endpoint configured).
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }
}

impl AnomalyNotifier for ChannelNotifier {
    fn address_changed(&self, event: AddressChange) {
        let Some(tx) = &self.tx else {
            return;
        };

        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(user_id = %event.user_id, "Notification queue full, dropping address change");
            }
            Err(TrySendError::Closed(event)) => {
                warn!(user_id = %event.user_id, "Notification worker stopped, dropping address change");
            }
        }
    }
}
