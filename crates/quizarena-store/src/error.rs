//! Error types for the storage layer.

use quizarena_protocol::{ProtocolError, RoomId};

/// Errors raised by a store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A versioned write lost to a concurrent writer.
    ///
    /// `expected` is the version the caller read (`None` for an insert);
    /// `found` is what the store holds now (`None` if the room is absent).
    #[error("version conflict on room {room_id}: expected {expected:?}, found {found:?}")]
    Conflict {
        room_id: RoomId,
        expected: Option<u64>,
        found: Option<u64>,
    },

    /// Reading or writing the backing file failed.
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing document could not be encoded or decoded.
    #[error("store document is invalid: {0}")]
    Codec(#[from] ProtocolError),
}
