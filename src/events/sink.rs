//! Event sinks: where engines send their events

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tokio::sync::mpsc;

use super::{EventKind, SwarmEvent};

/// Receiver of engine events. Must be callable from rayon workers.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: SwarmEvent);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: SwarmEvent) {}
}

/// Bounded in-memory log. When full, the oldest event is evicted.
#[derive(Debug)]
pub struct EventLog {
    events: Mutex<VecDeque<SwarmEvent>>,
    capacity: usize,
    total: AtomicU64,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity: capacity.max(1),
            total: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<SwarmEvent>> {
        // A panicking emitter cannot leave the deque half-updated
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Events ever received, including evicted ones
    pub fn total_received(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> Vec<SwarmEvent> {
        self.lock().iter().cloned().collect()
    }

    pub fn drain(&self) -> Vec<SwarmEvent> {
        self.lock().drain(..).collect()
    }

    pub fn of_kind(&self, kind: EventKind) -> Vec<SwarmEvent> {
        self.lock()
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.lock().iter().filter(|e| e.kind() == kind).count()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: SwarmEvent) {
        self.total.fetch_add(1, Ordering::Relaxed);
        let mut events = self.lock();
        if events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Forwards events into a bounded tokio channel without blocking.
///
/// Events that do not fit are dropped and counted.
#[derive(Debug)]
pub struct ChannelSink {
    sender: mpsc::Sender<SwarmEvent>,
    dropped: AtomicU64,
}

impl ChannelSink {
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<SwarmEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                sender,
                dropped: AtomicU64::new(0),
            },
            receiver,
        )
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: SwarmEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped.is_power_of_two() {
                    tracing::warn!(
                        "Event channel full, dropped {} event ({} dropped so far)",
                        event.kind(),
                        dropped
                    );
                }
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}
