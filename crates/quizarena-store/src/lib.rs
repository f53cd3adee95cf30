//! Registries behind the QuizArena engine.
//!
//! # Key types
//!
//! - [`RoomStore`]: versioned room records (compare-and-swap writes)
//! - [`InviteStore`]: direct invites
//! - [`ActiveRoomIndex`]: player → current room pointer
//! - [`MemoryStore`]: everything in memory
//! - [`JsonFileStore`]: everything in one JSON file

#![allow(async_fn_in_trait)]

mod error;
mod file;
mod memory;
mod registry;
mod traits;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use traits::{ActiveRoomIndex, InviteStore, RoomStore, Versioned};
