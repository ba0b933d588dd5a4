//! Round configuration and phases.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Settings applied to every round.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Misses allowed before the round is lost.
    pub max_guesses: u32,

    /// Shown in the mask for letters not yet revealed.
    pub placeholder: char,

    /// Longest playable word.
    pub max_word_len: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_guesses: 6,
            placeholder: '_',
            max_word_len: 30,
        }
    }
}

impl GameConfig {
    /// Fixes out-of-range values so the config is safe to use.
    ///
    /// - `max_guesses` is at least 1, otherwise a round would start lost.
    /// - `max_word_len` is at least 1.
    /// - `placeholder` falls back to `_` if it is a letter, which could be
    ///   mistaken for a revealed one, or a control character, which would
    ///   corrupt the line framing.
    pub fn validated(mut self) -> Self {
        self.max_guesses = self.max_guesses.max(1);
        self.max_word_len = self.max_word_len.max(1);
        if self.placeholder.is_ascii_alphabetic() || self.placeholder.is_control() {
            tracing::warn!(
                placeholder = ?self.placeholder,
                "placeholder replaced with '_'"
            );
            self.placeholder = '_';
        }
        self
    }
}

// ---------------------------------------------------------------------------
// RoundPhase
// ---------------------------------------------------------------------------

/// Where the shared round stands.
///
/// ```text
/// WaitingForPlayers ──first player──→ AwaitingGuess ──solved / exhausted──→ RoundOver
///         ↑                               ↑                                     │
///         └──── roster empty ─────────────┴──────────── new_round() ────────────┘
/// ```
///
/// `RoundOver` is transient: the event loop starts the next round as soon
/// as it observes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Nobody holds the turn.
    WaitingForPlayers,
    /// A turn holder is set and the word is still open.
    AwaitingGuess,
    /// The word is revealed or the guess budget is spent.
    RoundOver,
}
