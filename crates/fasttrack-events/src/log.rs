//! The append-only event log.
//!
//! One log per peer per session. The log owns its own sequence counter
//! (no global state): locally dispatched events take
//! [`EventLog::next_sequence`], and the counter re-derives from the last
//! stored event when a serialized log is loaded.

use std::collections::HashMap;
use std::fmt;

use crate::{EventError, EventId, GameEvent};

/// Callback invoked for every appended event.
pub type Subscriber = Box<dyn Fn(&GameEvent) + Send + Sync + 'static>;

/// An append-only, strictly ordered sequence of events.
#[derive(Default)]
pub struct EventLog {
    events: Vec<GameEvent>,
    index: HashMap<EventId, usize>,
    subscribers: Vec<Subscriber>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// The sequence of the most recent event, or 0 for an empty log.
    pub fn last_sequence(&self) -> u64 {
        self.events.last().map_or(0, |e| e.sequence)
    }

    /// The sequence the next locally dispatched event should carry.
    pub fn next_sequence(&self) -> u64 {
        self.last_sequence() + 1
    }

    /// Number of events in the log.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether an event with this id is already present.
    pub fn contains(&self, id: EventId) -> bool {
        self.index.contains_key(&id)
    }

    /// Looks up an event by id.
    pub fn get(&self, id: EventId) -> Option<&GameEvent> {
        self.index.get(&id).map(|&i| &self.events[i])
    }

    /// The full history, oldest first.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Every event with a sequence strictly greater than `sequence`.
    /// Cloned because the result goes on the wire in a `SyncResponse`.
    pub fn events_after(&self, sequence: u64) -> Vec<GameEvent> {
        // Sequences are dense, so a partition point would do; a filter
        // keeps this correct even for a log loaded from elsewhere.
        self.events
            .iter()
            .filter(|e| e.sequence > sequence)
            .cloned()
            .collect()
    }

    /// Appends an event.
    ///
    /// Validates required fields, rejects duplicates by id, and
    /// enforces that the sequence continues the log exactly. On success
    /// every subscriber is notified.
    ///
    /// # Errors
    /// [`EventError::MissingField`], [`EventError::Duplicate`], or
    /// [`EventError::OutOfOrder`]; the log is unchanged on error.
    pub fn append(&mut self, event: GameEvent) -> Result<(), EventError> {
        event.validate()?;
        if self.contains(event.id) {
            return Err(EventError::Duplicate(event.id));
        }
        let expected = self.next_sequence();
        if event.sequence != expected {
            return Err(EventError::OutOfOrder {
                expected,
                got: event.sequence,
            });
        }

        self.index.insert(event.id, self.events.len());
        self.events.push(event);
        let appended = self.events.last().expect("just pushed");
        for subscriber in &self.subscribers {
            subscriber(appended);
        }
        Ok(())
    }

    /// Registers a callback for every future append.
    pub fn subscribe(
        &mut self,
        f: impl Fn(&GameEvent) + Send + Sync + 'static,
    ) {
        self.subscribers.push(Box::new(f));
    }

    /// Serializes the history to JSON.
    ///
    /// # Errors
    /// [`EventError::Encode`] if serialization fails.
    pub fn to_json(&self) -> Result<String, EventError> {
        serde_json::to_string(&self.events).map_err(EventError::Encode)
    }

    /// Loads a log from JSON produced by [`EventLog::to_json`].
    ///
    /// Every event is re-validated through [`EventLog::append`], so the
    /// counter and index are rebuilt and a tampered dump is rejected.
    ///
    /// # Errors
    /// [`EventError::Decode`] for malformed JSON; append errors for an
    /// inconsistent history.
    pub fn from_json(json: &str) -> Result<Self, EventError> {
        let events: Vec<GameEvent> =
            serde_json::from_str(json).map_err(EventError::Decode)?;
        let mut log = Self::new();
        for event in events {
            log.append(event)?;
        }
        Ok(log)
    }
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("len", &self.events.len())
            .field("last_sequence", &self.last_sequence())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{EventPayload, PeerId};

    fn event(seq: u64) -> GameEvent {
        GameEvent {
            id: EventId(seq * 1_000),
            sequence: seq,
            timestamp: seq * 10,
            actor: PeerId(1),
            payload: EventPayload::GameStarted,
            checksum: None,
        }
    }

    #[test]
    fn test_append_assigns_contiguous_sequences() {
        let mut log = EventLog::new();
        assert_eq!(log.next_sequence(), 1);
        log.append(event(1)).unwrap();
        log.append(event(2)).unwrap();
        assert_eq!(log.last_sequence(), 2);
        assert_eq!(log.next_sequence(), 3);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_append_rejects_missing_fields() {
        let mut log = EventLog::new();
        let mut bad = event(1);
        bad.id = EventId(0);
        assert!(matches!(
            log.append(bad),
            Err(EventError::MissingField("id"))
        ));
        assert!(log.is_empty());
    }

    #[test]
    fn test_append_rejects_duplicates_and_leaves_log_unchanged() {
        let mut log = EventLog::new();
        log.append(event(1)).unwrap();
        // Same id, even with a fresh sequence, is a duplicate.
        let mut dup = event(2);
        dup.id = EventId(1_000);
        assert!(matches!(
            log.append(dup),
            Err(EventError::Duplicate(_))
        ));
        assert_eq!(log.len(), 1);
        assert_eq!(log.last_sequence(), 1);
    }

    #[test]
    fn test_append_rejects_gapped_and_stale_sequences() {
        let mut log = EventLog::new();
        log.append(event(1)).unwrap();
        assert!(matches!(
            log.append(event(3)),
            Err(EventError::OutOfOrder {
                expected: 2,
                got: 3
            })
        ));
        let mut stale = event(1);
        stale.id = EventId(77);
        assert!(matches!(
            log.append(stale),
            Err(EventError::OutOfOrder { .. })
        ));
    }

    #[test]
    fn test_lookup_by_id() {
        let mut log = EventLog::new();
        log.append(event(1)).unwrap();
        assert!(log.contains(EventId(1_000)));
        assert_eq!(log.get(EventId(1_000)).unwrap().sequence, 1);
        assert!(!log.contains(EventId(5)));
        assert!(log.get(EventId(5)).is_none());
    }

    #[test]
    fn test_events_after_supports_resync() {
        let mut log = EventLog::new();
        for seq in 1..=5 {
            log.append(event(seq)).unwrap();
        }
        let tail = log.events_after(2);
        let seqs: Vec<u64> = tail.iter().map(|e| e.sequence).collect();
        assert_eq!(seqs, vec![3, 4, 5]);
        assert!(log.events_after(5).is_empty());
        assert_eq!(log.events_after(0).len(), 5);
    }

    #[test]
    fn test_subscribers_fire_on_append_only() {
        let mut log = EventLog::new();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        log.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        log.append(event(1)).unwrap();
        log.append(event(2)).unwrap();
        // A rejected append must not notify.
        let _ = log.append(event(2));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_serialize_round_trip_restores_the_counter() {
        let mut log = EventLog::new();
        for seq in 1..=3 {
            log.append(event(seq)).unwrap();
        }
        let json = log.to_json().unwrap();
        let restored = EventLog::from_json(&json).unwrap();
        assert_eq!(restored.len(), 3);
        assert_eq!(restored.last_sequence(), 3);
        // The counter continues from the stored history.
        assert_eq!(restored.next_sequence(), 4);
        assert!(restored.contains(EventId(2_000)));
    }

    #[test]
    fn test_from_json_rejects_tampered_history() {
        let mut log = EventLog::new();
        log.append(event(1)).unwrap();
        log.append(event(2)).unwrap();
        let json = log.to_json().unwrap();
        // Drop the first event: the dump now starts at sequence 2.
        let mut events: Vec<GameEvent> =
            serde_json::from_str(&json).unwrap();
        events.remove(0);
        let tampered = serde_json::to_string(&events).unwrap();
        assert!(matches!(
            EventLog::from_json(&tampered),
            Err(EventError::OutOfOrder { .. })
        ));
    }
}
