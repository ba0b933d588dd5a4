//! The shared round: word, mask, guessed letters, budget, and turn holder.

use wordforge_protocol::{Letter, NETWORK_NEWLINE};
use wordforge_transport::ConnectionId;

use crate::{GameConfig, RoomError, RoundPhase};

const STATUS_RULE: &str = "***************";

/// What an accepted guess did to the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// The letter revealed `revealed` positions and the word is still open.
    Hit { revealed: usize },
    /// The letter is not in the word; at least one guess remains.
    Miss,
    /// The letter completed the word.
    Solved,
    /// The letter is not in the word and the budget is now spent.
    Exhausted,
}

/// One round of the word game.
///
/// Invariants, upheld by every method:
/// - `mask.len() == word.len()`
/// - `guessed[i]` is set exactly when letter `i` was guessed this round
/// - `guesses_left` never underflows; zero means the round is lost
///
/// The turn holder is stored here but chosen by the caller, since only the
/// caller knows the roster. Starting a new round leaves it untouched.
#[derive(Debug, Clone)]
pub struct GameState {
    word: Vec<char>,
    mask: Vec<char>,
    guessed: [bool; Letter::COUNT],
    guesses_left: u32,
    turn: Option<ConnectionId>,
    config: GameConfig,
}

impl GameState {
    /// Starts the first round with `word` and no turn holder.
    pub fn new(config: GameConfig, word: &str) -> Result<Self, RoomError> {
        let config = config.validated();
        let mut state = Self {
            word: Vec::new(),
            mask: Vec::new(),
            guessed: [false; Letter::COUNT],
            guesses_left: config.max_guesses,
            turn: None,
            config,
        };
        state.new_round(word)?;
        Ok(state)
    }

    /// Resets word, mask, guessed letters and budget in place.
    ///
    /// # Errors
    /// [`RoomError::InvalidWord`] if `word` is empty, longer than
    /// `max_word_len`, or not made of ASCII letters. The current round is
    /// left as it was.
    pub fn new_round(&mut self, word: &str) -> Result<(), RoomError> {
        if !is_playable(word, self.config.max_word_len) {
            return Err(RoomError::InvalidWord(word.to_string()));
        }
        self.word = word.chars().collect();
        self.mask = vec![self.config.placeholder; self.word.len()];
        self.guessed = [false; Letter::COUNT];
        self.guesses_left = self.config.max_guesses;

        tracing::info!(
            len = self.word.len(),
            guesses_left = self.guesses_left,
            "round started"
        );
        Ok(())
    }

    /// Applies a guess from the turn holder.
    ///
    /// Marks the letter guessed and reveals every position holding it
    /// (either case). A miss costs one guess. The turn is not touched.
    ///
    /// # Errors
    /// - [`RoomError::RoundOver`]: the round already ended.
    /// - [`RoomError::AlreadyGuessed`]: nothing changes.
    pub fn apply_guess(
        &mut self,
        letter: Letter,
    ) -> Result<GuessOutcome, RoomError> {
        if self.is_over() {
            return Err(RoomError::RoundOver);
        }
        if self.is_guessed(letter) {
            return Err(RoomError::AlreadyGuessed(letter));
        }
        self.guessed[letter.index()] = true;

        let mut revealed = 0;
        for (slot, &c) in self.mask.iter_mut().zip(&self.word) {
            if letter.matches(c) {
                *slot = c;
                revealed += 1;
            }
        }

        let outcome = if revealed == 0 {
            self.guesses_left = self.guesses_left.saturating_sub(1);
            if self.guesses_left == 0 {
                GuessOutcome::Exhausted
            } else {
                GuessOutcome::Miss
            }
        } else if self.is_solved() {
            GuessOutcome::Solved
        } else {
            GuessOutcome::Hit { revealed }
        };

        tracing::debug!(
            %letter,
            ?outcome,
            guesses_left = self.guesses_left,
            "guess applied"
        );
        Ok(outcome)
    }

    /// Where the round stands right now.
    pub fn phase(&self) -> RoundPhase {
        if self.is_over() {
            RoundPhase::RoundOver
        } else if self.turn.is_none() {
            RoundPhase::WaitingForPlayers
        } else {
            RoundPhase::AwaitingGuess
        }
    }

    /// Renders the status block sent to players.
    ///
    /// The block spans several lines joined by network newlines; the final
    /// terminator is added when the message is sent.
    pub fn status(&self) -> String {
        let letters: Vec<String> = self
            .guessed_letters()
            .map(|l| l.to_string())
            .collect();
        [
            STATUS_RULE.to_string(),
            format!("Word to guess: {}", self.mask()),
            format!("Guesses remaining: {}", self.guesses_left),
            "Letters guessed:".to_string(),
            letters.join(" "),
            STATUS_RULE.to_string(),
        ]
        .join(NETWORK_NEWLINE)
    }

    /// The target word.
    pub fn word(&self) -> String {
        self.word.iter().collect()
    }

    /// The partially revealed word.
    pub fn mask(&self) -> String {
        self.mask.iter().collect()
    }

    pub fn guesses_left(&self) -> u32 {
        self.guesses_left
    }

    pub fn is_guessed(&self, letter: Letter) -> bool {
        self.guessed[letter.index()]
    }

    /// Letters tried this round, alphabetical.
    pub fn guessed_letters(&self) -> impl Iterator<Item = Letter> + '_ {
        self.guessed
            .iter()
            .enumerate()
            .filter(|(_, g)| **g)
            .filter_map(|(i, _)| Letter::from_index(i))
    }

    /// Returns `true` once every position is revealed.
    pub fn is_solved(&self) -> bool {
        self.mask == self.word
    }

    /// Returns `true` if the word is solved or the budget is spent.
    pub fn is_over(&self) -> bool {
        self.is_solved() || self.guesses_left == 0
    }

    pub fn turn(&self) -> Option<ConnectionId> {
        self.turn
    }

    pub fn set_turn(&mut self, turn: Option<ConnectionId>) {
        self.turn = turn;
    }

    /// Returns `true` if `id` holds the turn.
    pub fn is_turn(&self, id: ConnectionId) -> bool {
        self.turn == Some(id)
    }
}

/// A word can be played if it is non-empty, at most `max_len` characters,
/// and made only of ASCII letters.
pub(crate) fn is_playable(word: &str, max_len: usize) -> bool {
    !word.is_empty()
        && word.len() <= max_len
        && word.chars().all(|c| c.is_ascii_alphabetic())
}
