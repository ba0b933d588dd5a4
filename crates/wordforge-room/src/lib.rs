//! The shared round for Wordforge.
//!
//! One [`GameState`] holds the word being guessed, what has been revealed,
//! which letters were tried, how many misses remain, and whose turn it is.
//! Words come from a [`WordSource`], normally a [`Dictionary`] file.
//!
//! # Key types
//!
//! - [`GameState`]: applies guesses and formats the status block
//! - [`GuessOutcome`]: what a single accepted guess did
//! - [`RoundPhase`]: where the round currently stands
//! - [`GameConfig`]: guess budget, mask placeholder, word length limit
//! - [`WordSource`]: where new words come from

mod config;
mod error;
mod source;
mod state;

pub use config::{GameConfig, RoundPhase};
pub use error::RoomError;
pub use source::{Dictionary, WordList, WordSource};
pub use state::{GameState, GuessOutcome};
