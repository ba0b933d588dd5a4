//! Connection tracking for Wordforge.
//!
//! Every accepted connection lives in exactly one of two collections:
//!
//! 1. **Pending**: connected, greeted, but no accepted name yet.
//! 2. **Active**: named players, in turn order.
//!
//! The [`ConnectionRegistry`] owns both and moves a connection from one to
//! the other when its name is accepted ([`ConnectionRegistry::promote`]).
//! Broadcasting to the active players lives here too, since delivery needs
//! nothing beyond the roster.
//!
//! # How it fits in the stack
//!
//! ```text
//! Event loop (above)  ← decides who is promoted, removed, or told what
//!     ↕
//! Session Layer (this crate)  ← who is connected, and in which order
//!     ↕
//! Protocol / Transport (below)  ← lines in, messages out
//! ```

mod broadcast;
mod connection;
mod error;
mod registry;

pub use connection::Connection;
pub use error::SessionError;
pub use registry::{ConnectionRegistry, JoinOrder, Membership, RegistryConfig};
