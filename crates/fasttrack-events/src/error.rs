use crate::EventId;

/// Errors from the event log and the event wire format.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// An event arrived without a required field (nil id, zero
    /// sequence, zero timestamp). Rejected at the append boundary so a
    /// malformed event can never corrupt the log.
    #[error("event is missing required field: {0}")]
    MissingField(&'static str),

    /// An event with this id is already in the log.
    #[error("duplicate event {0}")]
    Duplicate(EventId),

    /// The event's sequence does not continue the log.
    #[error("out-of-order append: expected sequence {expected}, got {got}")]
    OutOfOrder {
        /// The sequence the log expects next.
        expected: u64,
        /// The sequence the event carried.
        got: u64,
    },

    /// Serializing the log failed.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserializing a log or event failed.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
