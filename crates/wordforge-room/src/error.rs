//! Error types for the room layer.

use std::path::PathBuf;

use wordforge_protocol::Letter;

/// Errors from playing a round or loading words.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The letter was already tried this round.
    #[error("letter {0} was already guessed")]
    AlreadyGuessed(Letter),

    /// The round is solved or out of guesses; start a new one first.
    #[error("the round is over")]
    RoundOver,

    /// The word is empty, too long, or not made of ASCII letters.
    #[error("word {0:?} cannot be played")]
    InvalidWord(String),

    /// The dictionary file has no playable words.
    #[error("dictionary {} contains no playable words", .0.display())]
    EmptyDictionary(PathBuf),

    /// The dictionary file could not be read.
    #[error("failed to read dictionary {}", .path.display())]
    Dictionary {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
