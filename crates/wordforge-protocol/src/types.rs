//! Protocol types: what a client may send and what the server sends back.

use std::fmt;
use std::str::FromStr;

use crate::ProtocolError;

/// The terminator for every line, in both directions.
pub const NETWORK_NEWLINE: &str = "\r\n";

// ---------------------------------------------------------------------------
// Letter
// ---------------------------------------------------------------------------

/// A single lowercase ASCII letter: the only valid guess.
///
/// Stored as its index `0..26` so it can address a guessed-letters table
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Letter(u8);

impl Letter {
    /// Every letter, in alphabetical order.
    pub const COUNT: usize = 26;

    /// Returns the letter for `c` if it is `'a'..='z'`.
    pub fn new(c: char) -> Option<Self> {
        c.is_ascii_lowercase().then(|| Self(c as u8 - b'a'))
    }

    /// Returns the letter at alphabet position `index` (0 = `a`).
    pub fn from_index(index: usize) -> Option<Self> {
        (index < Self::COUNT).then(|| Self(index as u8))
    }

    /// Position in the alphabet, 0 for `a`.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The letter as a lowercase `char`.
    pub fn as_char(self) -> char {
        (b'a' + self.0) as char
    }

    /// Returns `true` if `c` is this letter in either case.
    pub fn matches(self, c: char) -> bool {
        c.to_ascii_lowercase() == self.as_char()
    }
}

impl FromStr for Letter {
    type Err = ProtocolError;

    /// Parses a line that must consist of exactly one lowercase letter.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut chars = line.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::new(c)
                .ok_or_else(|| ProtocolError::InvalidGuess(line.to_string())),
            _ => Err(ProtocolError::InvalidGuess(line.to_string())),
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ---------------------------------------------------------------------------
// ServerMessage
// ---------------------------------------------------------------------------

/// Every message the server sends to a client.
///
/// `Display` renders the text without a terminator;
/// [`to_wire`](Self::to_wire) adds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Greeting sent once, right after accept.
    Welcome,
    /// Asks a pending connection for a name again.
    NamePrompt,
    /// The proposed name was rejected.
    InvalidName { reason: String },
    /// A new player entered the game.
    Joined { name: String },
    /// A player left the game.
    Departed { name: String },
    /// Sent to the turn holder only.
    YourTurn,
    /// Sent to everyone except the turn holder.
    TurnOf { name: String },
    /// The turn holder sent something that isn't a fresh letter.
    InvalidGuess,
    /// A player who doesn't hold the turn tried to guess.
    NotYourTurn,
    /// Sent to the guesser when the letter isn't in the word.
    NotInWord { letter: Letter },
    /// Broadcast after every accepted guess.
    Guessed { name: String, letter: Letter },
    /// The guess budget ran out.
    NoMoreGuesses { word: String },
    /// Sent to the player who completed the word.
    YouWin,
    /// Sent to everyone else when a player completed the word.
    PlayerWon { name: String },
    /// Reveals the word after a win.
    WordWas { word: String },
    /// A fresh round is starting.
    NewRound,
    /// A preformatted status block (may span several lines).
    Status(String),
}

impl ServerMessage {
    /// Renders the message as it travels on the wire.
    pub fn to_wire(&self) -> String {
        format!("{self}{NETWORK_NEWLINE}")
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Welcome => {
                write!(f, "Welcome to our word game. What is your name?")
            }
            Self::NamePrompt => write!(f, "What is your name?"),
            Self::InvalidName { reason } => write!(f, "Invalid Name: {reason}"),
            Self::Joined { name } => write!(f, "{name} has just joined."),
            Self::Departed { name } => write!(f, "Goodbye {name}"),
            Self::YourTurn => write!(f, "Your guess?"),
            Self::TurnOf { name } => write!(f, "It is {name}'s turn."),
            Self::InvalidGuess => write!(f, "Invalid guess"),
            Self::NotYourTurn => write!(f, "It is not your turn to guess"),
            Self::NotInWord { letter } => {
                write!(f, "{letter} is not in the word")
            }
            Self::Guessed { name, letter } => {
                write!(f, "{name} guesses: {letter}")
            }
            Self::NoMoreGuesses { word } => {
                write!(f, "No more guesses. The word was {word}")
            }
            Self::YouWin => write!(f, "Game Over! You win!"),
            Self::PlayerWon { name } => write!(f, "Game Over! {name} won!"),
            Self::WordWas { word } => write!(f, "The word was {word}"),
            Self::NewRound => write!(f, "Let's start a new game"),
            Self::Status(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter(c: char) -> Letter {
        Letter::new(c).unwrap()
    }

    #[test]
    fn test_letter_new_accepts_only_lowercase() {
        assert_eq!(Letter::new('a').map(Letter::index), Some(0));
        assert_eq!(Letter::new('z').map(Letter::index), Some(25));
        assert!(Letter::new('A').is_none());
        assert!(Letter::new('1').is_none());
        assert!(Letter::new('é').is_none());
    }

    #[test]
    fn test_letter_from_index_round_trips_alphabet() {
        for i in 0..Letter::COUNT {
            assert_eq!(Letter::from_index(i).unwrap().index(), i);
        }
        assert!(Letter::from_index(26).is_none());
    }

    #[test]
    fn test_letter_matches_either_case() {
        assert!(letter('p').matches('P'));
        assert!(letter('p').matches('p'));
        assert!(!letter('p').matches('q'));
    }

    #[test]
    fn test_letter_parse_single_lowercase_succeeds() {
        assert_eq!("p".parse::<Letter>(), Ok(letter('p')));
    }

    #[test]
    fn test_letter_parse_rejects_everything_else() {
        for line in ["", "pp", "P", "1", " p", "p "] {
            assert_eq!(
                line.parse::<Letter>(),
                Err(ProtocolError::InvalidGuess(line.to_string())),
                "{line:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_server_message_to_wire_appends_network_newline() {
        assert_eq!(ServerMessage::YourTurn.to_wire(), "Your guess?\r\n");
        assert_eq!(
            ServerMessage::NotYourTurn.to_wire(),
            "It is not your turn to guess\r\n"
        );
    }

    #[test]
    fn test_server_message_display_texts() {
        assert_eq!(
            ServerMessage::TurnOf { name: "bob".into() }.to_string(),
            "It is bob's turn."
        );
        assert_eq!(
            ServerMessage::Guessed {
                name: "amy".into(),
                letter: letter('e'),
            }
            .to_string(),
            "amy guesses: e"
        );
        assert_eq!(
            ServerMessage::NoMoreGuesses {
                word: "APPLE".into()
            }
            .to_string(),
            "No more guesses. The word was APPLE"
        );
        assert_eq!(
            ServerMessage::InvalidName {
                reason: "name is already taken".into()
            }
            .to_string(),
            "Invalid Name: name is already taken"
        );
    }
}
