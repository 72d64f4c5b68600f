//! Broadcast-based fan-out keyed by task id

use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::ledger::ProgressEvent;

/// Per-task broadcast fan-out for progress events.
///
/// Uses one `tokio::broadcast` channel per task so subscribers of one task
/// never see another task's events. Slow subscribers miss events (lagged)
/// rather than blocking the publisher; delivery is best-effort throughout.
#[derive(Debug)]
pub struct TaskEventBus {
    channels: DashMap<Uuid, broadcast::Sender<ProgressEvent>>,
    capacity: usize,
}

impl TaskEventBus {
    /// Create a new bus with the given per-task channel capacity.
    ///
    /// Capacity bounds how far a subscriber can fall behind before it
    /// starts missing events. 256 is a reasonable default.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity,
        }
    }

    /// Subscribe to a task's events. The channel is created on first use,
    /// so subscribing before the task starts is fine.
    #[must_use]
    pub fn subscribe(&self, task_id: Uuid) -> broadcast::Receiver<ProgressEvent> {
        self.channels
            .entry(task_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Publish an event to the task's subscribers.
    ///
    /// Returns the number of subscribers that received the event. No
    /// channel or no receivers means the event is silently dropped - the
    /// ledger has already made it durable.
    pub fn publish(&self, task_id: Uuid, event: ProgressEvent) -> usize {
        match self.channels.get(&task_id) {
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        }
    }

    /// Current number of subscribers for a task
    #[must_use]
    pub fn subscriber_count(&self, task_id: Uuid) -> usize {
        self.channels
            .get(&task_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Drop a task's channel once the task is finished
    pub fn remove_task(&self, task_id: Uuid) {
        self.channels.remove(&task_id);
    }
}

impl Default for TaskEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
