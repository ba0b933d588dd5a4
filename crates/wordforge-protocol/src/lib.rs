//! Wire protocol for Wordforge.
//!
//! The protocol is plain text, one message per line, every line terminated
//! by a network newline (`\r\n`) in both directions:
//!
//! - **Assembly** ([`LineAssembler`]) turns the raw bytes a connection
//!   delivers into complete lines, one at a time.
//! - **Letters** ([`Letter`]) are the only thing a playing client may send.
//! - **Messages** ([`ServerMessage`]) are everything the server may send.
//! - **Errors** ([`ProtocolError`]) cover input that doesn't parse.
//!
//! ```text
//! Transport (bytes) → Protocol (lines, letters) → Session / Room
//! ```

mod assembler;
mod error;
mod types;

pub use assembler::{find_network_newline, Assembled, AssemblerConfig, LineAssembler};
pub use error::ProtocolError;
pub use types::{Letter, ServerMessage, NETWORK_NEWLINE};
