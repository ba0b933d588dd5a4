//! Where round words come from.

use std::path::{Path, PathBuf};

use rand::Rng;

use crate::state::is_playable;
use crate::RoomError;

/// Supplies the word for each new round.
pub trait WordSource {
    /// Returns the next word to play.
    fn next_word(&mut self) -> Result<String, RoomError>;
}

// ---------------------------------------------------------------------------
// Dictionary
// ---------------------------------------------------------------------------

/// A word list loaded once from a file, one word per line.
///
/// Each round picks a word uniformly at random.
#[derive(Debug, Clone)]
pub struct Dictionary {
    path: PathBuf,
    words: Vec<String>,
}

impl Dictionary {
    /// Reads `path` and keeps every playable entry.
    ///
    /// Lines are trimmed. Blank lines are ignored. Entries that are longer
    /// than `max_word_len` or contain anything other than ASCII letters are
    /// skipped with a warning.
    ///
    /// # Errors
    /// - [`RoomError::Dictionary`]: the file could not be read.
    /// - [`RoomError::EmptyDictionary`]: no entry survived filtering.
    pub fn load(
        path: impl AsRef<Path>,
        max_word_len: usize,
    ) -> Result<Self, RoomError> {
        let path = path.as_ref().to_path_buf();
        let text = std::fs::read_to_string(&path).map_err(|source| {
            RoomError::Dictionary {
                path: path.clone(),
                source,
            }
        })?;

        let mut words = Vec::new();
        let mut skipped = 0usize;
        for entry in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if is_playable(entry, max_word_len) {
                words.push(entry.to_string());
            } else {
                skipped += 1;
            }
        }
        if skipped > 0 {
            tracing::warn!(path = %path.display(), skipped, "dictionary entries skipped");
        }
        if words.is_empty() {
            return Err(RoomError::EmptyDictionary(path));
        }

        tracing::info!(path = %path.display(), words = words.len(), "dictionary loaded");
        Ok(Self { path, words })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

impl WordSource for Dictionary {
    fn next_word(&mut self) -> Result<String, RoomError> {
        if self.words.is_empty() {
            return Err(RoomError::EmptyDictionary(self.path.clone()));
        }
        let index = rand::rng().random_range(0..self.words.len());
        Ok(self.words[index].clone())
    }
}

// ---------------------------------------------------------------------------
// WordList
// ---------------------------------------------------------------------------

/// A fixed list of words played in order, starting over at the end.
///
/// Useful for deterministic games and tests.
#[derive(Debug, Clone)]
pub struct WordList {
    words: Vec<String>,
    next: usize,
}

impl WordList {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            next: 0,
        }
    }
}

impl WordSource for WordList {
    fn next_word(&mut self) -> Result<String, RoomError> {
        if self.words.is_empty() {
            return Err(RoomError::InvalidWord(String::new()));
        }
        let word = self.words[self.next % self.words.len()].clone();
        self.next = (self.next + 1) % self.words.len();
        Ok(word)
    }
}
