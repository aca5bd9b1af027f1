//! Event types for the AVP event system
//!
//! Provides shared event definitions and the EventBus used to publish
//! upload and refresh progress to whatever presentation layer is attached.

mod refresh_types;
mod upload_types;

pub use refresh_types::{FetchResource, RefreshTrigger};
pub use upload_types::UploadState;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Dashboard event types
///
/// Events are broadcast via EventBus and can be serialized for transmission
/// to a rendering layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DashboardEvent {
    /// Upload state machine moved to a new state
    UploadStateChanged {
        /// Correlates all events of one upload attempt
        upload_id: Uuid,
        /// State before the transition
        old_state: UploadState,
        /// State after the transition
        new_state: UploadState,
        /// When the transition happened
        timestamp: DateTime<Utc>,
    },

    /// Upload attempt finished (success or failure)
    UploadFinished {
        upload_id: Uuid,
        /// Name of the uploaded file
        filename: String,
        /// Whether the backend accepted the upload
        success: bool,
        /// User-facing summary line
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// A refresh cycle started
    RefreshStarted {
        trigger: RefreshTrigger,
        timestamp: DateTime<Utc>,
    },

    /// One side of a refresh failed; the previous value for that slot is kept
    FetchFailed {
        resource: FetchResource,
        /// Error text as logged
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// A refresh cycle settled (both fetches finished)
    RefreshCompleted {
        trigger: RefreshTrigger,
        /// Canonical image count after reconciliation
        image_count: usize,
        /// Whether analytics are available (fresh or previous)
        analytics_loaded: bool,
        timestamp: DateTime<Utc>,
    },
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus for dashboard events
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use avp_common::events::{EventBus, DashboardEvent, RefreshTrigger};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(DashboardEvent::RefreshStarted {
///     trigger: RefreshTrigger::Manual,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(matches!(rx.try_recv(), Ok(DashboardEvent::RefreshStarted { .. })));
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DashboardEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: DashboardEvent,
    ) -> Result<usize, broadcast::error::SendError<DashboardEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// The dashboard runs fine headless, so nearly every producer uses this.
    pub fn emit_lossy(&self, event: DashboardEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
