//! Event Chronicle
//!
//! Append-only, bounded audit log of everything the command center does.
//! Entries are kept newest first and the log never holds more than
//! [`CHRONICLE_CAPACITY`] entries; the oldest entry is evicted first.
//!
//! Every recorded entry is also broadcast to live subscribers (the `/ws`
//! stream). Broadcasting is best effort: a lagging subscriber loses entries,
//! the chronicle itself never does.

use chrono::{SecondsFormat, Utc};
use sdk::types::{ChronicleLog, ChronicleLogType};
use std::collections::VecDeque;
use tokio::sync::broadcast;

/// Maximum number of entries retained
pub const CHRONICLE_CAPACITY: usize = 100;

/// Buffer size of the live broadcast channel
const BROADCAST_BUFFER_SIZE: usize = 1000;

/// Bounded, newest-first event log
pub struct Chronicle {
    entries: VecDeque<ChronicleLog>,
    capacity: usize,
    tx: broadcast::Sender<ChronicleLog>,
}

impl Chronicle {
    /// Create an empty chronicle holding at most [`CHRONICLE_CAPACITY`] entries
    pub fn new() -> Self {
        Self::with_capacity(CHRONICLE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(BROADCAST_BUFFER_SIZE);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            tx,
        }
    }

    /// Append an entry and broadcast it to subscribers
    pub fn record(&mut self, kind: ChronicleLogType, message: impl Into<String>) -> ChronicleLog {
        let entry = ChronicleLog {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            kind,
            message: message.into(),
        };

        match kind {
            ChronicleLogType::Anomaly => tracing::warn!(kind = ?kind, "{}", entry.message),
            _ => tracing::info!(kind = ?kind, "{}", entry.message),
        }

        self.entries.push_front(entry.clone());
        self.entries.truncate(self.capacity);

        // No receivers is not an error
        let _ = self.tx.send(entry.clone());

        entry
    }

    /// Snapshot of the log, newest first
    pub fn entries(&self) -> Vec<ChronicleLog> {
        self.entries.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&ChronicleLog> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Subscribe to entries recorded from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ChronicleLog> {
        self.tx.subscribe()
    }
}

impl Default for Chronicle {
    fn default() -> Self {
        Self::new()
    }
}
