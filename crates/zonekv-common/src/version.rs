//! Vector-clock versioning for optimistic concurrency on metadata writes.
//!
//! Every metadata value carries a [`VectorClock`]; a write must supply the
//! clock observed by the most recent read, so concurrent updates surface as
//! version conflicts instead of silent clobbering.

use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Outcome of comparing two vector clocks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Occurred {
    /// Self happened strictly before the other clock
    Before,
    /// Self happened strictly after the other clock
    After,
    /// The clocks are identical
    Equal,
    /// Neither clock descends the other
    Concurrent,
}

/// One node's counter within a vector clock
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockEntry {
    /// The node that coordinated the writes counted here
    pub node: NodeId,
    /// Number of writes coordinated by that node
    pub counter: u64,
}

/// A vector of per-node write counters plus a wall-clock timestamp.
///
/// Entries are kept sorted by node id. The timestamp is advisory (useful
/// for debugging and last-writer-wins tooling) and takes no part in
/// comparison or equality.
#[derive(Clone, Serialize, Deserialize)]
pub struct VectorClock {
    entries: Vec<ClockEntry>,
    timestamp_ms: u64,
}

impl VectorClock {
    /// Create an empty clock (no writes observed)
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            timestamp_ms: now_ms(),
        }
    }

    /// Per-node counters, sorted by node id
    #[must_use]
    pub fn entries(&self) -> &[ClockEntry] {
        &self.entries
    }

    /// Wall-clock timestamp of the last increment, in milliseconds
    #[must_use]
    pub const fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    /// Return a copy of this clock with `node`'s counter incremented
    #[must_use]
    pub fn incremented(&self, node: NodeId) -> Self {
        let mut entries = self.entries.clone();
        match entries.binary_search_by_key(&node, |e| e.node) {
            Ok(i) => entries[i].counter += 1,
            Err(i) => entries.insert(i, ClockEntry { node, counter: 1 }),
        }
        Self {
            entries,
            timestamp_ms: now_ms(),
        }
    }

    /// Counter for a single node (zero if absent)
    #[must_use]
    pub fn counter_of(&self, node: NodeId) -> u64 {
        self.entries
            .binary_search_by_key(&node, |e| e.node)
            .map_or(0, |i| self.entries[i].counter)
    }

    /// True if every counter in `other` is less than or equal to the
    /// matching counter in `self`.
    #[must_use]
    pub fn descends(&self, other: &Self) -> bool {
        other
            .entries
            .iter()
            .all(|e| self.counter_of(e.node) >= e.counter)
    }

    /// Partial-order comparison of two clocks
    #[must_use]
    pub fn compare(&self, other: &Self) -> Occurred {
        let forward = self.descends(other);
        let backward = other.descends(self);
        match (forward, backward) {
            (true, true) => Occurred::Equal,
            (true, false) => Occurred::After,
            (false, true) => Occurred::Before,
            (false, false) => Occurred::Concurrent,
        }
    }
}

impl Default for VectorClock {
    fn default() -> Self {
        Self::new()
    }
}

// Timestamp is advisory; equality is over the counters alone.
impl PartialEq for VectorClock {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for VectorClock {}

impl fmt::Debug for VectorClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VectorClock(")?;
        for (i, e) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{}", e.node, e.counter)?;
        }
        write!(f, ")")
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// A value tagged with the vector clock under which it was written
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned<T> {
    /// The stored value
    pub value: T,
    /// The clock observed when the value was written
    pub version: VectorClock,
}

impl<T> Versioned<T> {
    /// Pair a value with its version
    #[must_use]
    pub const fn new(value: T, version: VectorClock) -> Self {
        Self { value, version }
    }

    /// Map the value, keeping the version
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Versioned<U> {
        Versioned {
            value: f(self.value),
            version: self.version,
        }
    }
}
