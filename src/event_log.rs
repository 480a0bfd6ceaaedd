//! Bounded Recent-Event Log
//!
//! Keeps the most recent `capacity` ingested records in memory, newest
//! first. The log is the only shared state in the server:
//! - `record` stamps and inserts an event, evicting the oldest on overflow
//! - `snapshot` returns a consistent copy for the dashboard
//!
//! Both operations take the same lock, so a reader never sees a sequence
//! mid-eviction. Nothing is held across an `.await`.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use tracing::debug;

use crate::errors::BookdropError;

/// Number of events kept when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 50;

/// Largest accepted capacity.
pub const MAX_CAPACITY: usize = 100_000;

/// Well-known event kinds.
///
/// The log stores whatever action string the client sent; this enum only
/// classifies it for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Borrow,
    Return,
    AddBook,
    Unknown,
}

impl EventKind {
    pub const BORROW: &'static str = "borrow";
    pub const RETURN: &'static str = "return";
    pub const ADD_BOOK: &'static str = "add_book";
    pub const UNKNOWN: &'static str = "unknown";

    /// Classify a stored kind string. Anything unrecognized is `Unknown`.
    pub fn classify(kind: &str) -> Self {
        match kind {
            Self::BORROW => EventKind::Borrow,
            Self::RETURN => EventKind::Return,
            Self::ADD_BOOK => EventKind::AddBook,
            _ => EventKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Borrow => Self::BORROW,
            EventKind::Return => Self::RETURN,
            EventKind::AddBook => Self::ADD_BOOK,
            EventKind::Unknown => Self::UNKNOWN,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ingested record plus its server-assigned receipt time.
///
/// Serialized with the field names the dashboard reads:
/// `action`, `data` and `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "action")]
    pub kind: String,
    #[serde(rename = "data")]
    pub payload: Value,
    #[serde(rename = "timestamp")]
    pub received_at: DateTime<Utc>,
}

impl Event {
    pub fn classify(&self) -> EventKind {
        EventKind::classify(&self.kind)
    }
}

/// Point-in-time copy of the log, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub transactions: Vec<Event>,
    pub count: usize,
}

#[derive(Debug, Default)]
struct Inner {
    entries: VecDeque<Event>,
    last_received: Option<DateTime<Utc>>,
}

/// Size-capped, newest-first history of events.
#[derive(Debug)]
pub struct EventLog {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl EventLog {
    /// Create a log holding at most `capacity` events.
    pub fn new(capacity: usize) -> Result<Self, BookdropError> {
        if capacity == 0 || capacity > MAX_CAPACITY {
            return Err(BookdropError::Config(format!(
                "event log capacity must be between 1 and {}, got {}",
                MAX_CAPACITY, capacity
            )));
        }
        // Grows on demand past the default size.
        Ok(Self {
            capacity,
            inner: Mutex::new(Inner {
                entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY) + 1),
                last_received: None,
            }),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Stamp and insert an event at the front, dropping the oldest entry
    /// if the log is over capacity. Returns the inserted event.
    pub fn record(&self, kind: impl Into<String>, payload: Value) -> Event {
        self.record_at(kind.into(), payload, Utc::now())
    }

    fn record_at(&self, kind: String, payload: Value, now: DateTime<Utc>) -> Event {
        let mut inner = self.inner.lock();

        // Clock steps backwards must not reorder timestamps.
        let received_at = match inner.last_received {
            Some(last) if last > now => last,
            _ => now,
        };
        inner.last_received = Some(received_at);

        let event = Event {
            kind,
            payload,
            received_at,
        };
        inner.entries.push_front(event.clone());

        if inner.entries.len() > self.capacity {
            if let Some(evicted) = inner.entries.pop_back() {
                debug!(
                    kind = %evicted.kind,
                    received_at = %evicted.received_at,
                    "event_evicted"
                );
            }
        }

        event
    }

    /// Copy of the current contents, newest first.
    pub fn snapshot(&self) -> Snapshot {
        let inner = self.inner.lock();
        let transactions: Vec<Event> = inner.entries.iter().cloned().collect();
        let count = transactions.len();
        Snapshot {
            transactions,
            count,
        }
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            inner: Mutex::new(Inner::default()),
        }
    }
}
