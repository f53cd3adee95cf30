//! Shared vocabulary for QuizArena.
//!
//! This crate defines what every other layer agrees on:
//!
//! - **Identity** ([`PlayerId`], [`RoomId`], [`InviteId`]): newtype ids
//!   that cannot be mixed up with each other.
//! - **Time** ([`Millis`], [`now_millis`]): wall-clock timestamps in
//!   milliseconds since the Unix epoch, the unit every persisted record uses.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how records and
//!   configuration are turned into bytes and back.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! quizarena (engine) → quizarena-store (registries) → quizarena-room (pure domain)
//!                                   ↘                ↙
//!                                 quizarena-protocol
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{InviteId, Millis, PlayerId, RoomId, now_millis};
