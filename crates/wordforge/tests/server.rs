//! Integration tests for the Wordforge server over real TCP connections.

use std::net::Ipv4Addr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use wordforge::prelude::*;

const WAIT: Duration = Duration::from_secs(5);

// =========================================================================
// Helpers
// =========================================================================

/// Starts a server on a random loopback port and returns the address.
async fn start_server(words: &[&str]) -> String {
    let server = WordServerBuilder::new()
        .bind_addr(Ipv4Addr::LOCALHOST.into())
        .port(0)
        .build(WordList::new(words.to_vec()))
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });
    addr
}

/// A line-oriented test client.
struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: &str) -> Self {
        let stream = TcpStream::connect(addr).await.expect("should connect");
        let (read_half, writer) = stream.into_split();
        let mut client = Self {
            reader: BufReader::new(read_half),
            writer,
        };
        assert_eq!(
            client.line().await,
            "Welcome to our word game. What is your name?"
        );
        client
    }

    async fn send_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.expect("write should succeed");
    }

    async fn send(&mut self, text: &str) {
        self.send_raw(format!("{text}\r\n").as_bytes()).await;
    }

    /// Reads one CRLF-terminated line, terminator stripped.
    async fn line(&mut self) -> String {
        let mut buf = String::new();
        let n = timeout(WAIT, self.reader.read_line(&mut buf))
            .await
            .expect("timed out waiting for a line")
            .expect("read should succeed");
        assert!(n > 0, "server closed the connection");
        assert!(buf.ends_with("\r\n"), "line {buf:?} lacks CRLF");
        buf.truncate(buf.len() - 2);
        buf
    }

    /// Reads lines up to and including `last`, returning all of them.
    async fn lines_until(&mut self, last: &str) -> Vec<String> {
        let mut seen = Vec::new();
        loop {
            let line = self.line().await;
            let done = line == last;
            seen.push(line);
            if done {
                return seen;
            }
        }
    }

    /// Connects and registers under `name`, reading through the turn
    /// announcement that ends the join.
    async fn join(addr: &str, name: &str, turn_line: &str) -> Self {
        let mut client = Self::connect(addr).await;
        client.send(name).await;
        client.lines_until(turn_line).await;
        client
    }
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_first_player_receives_status_and_prompt() {
    let addr = start_server(&["APPLE"]).await;
    let mut alice = Client::connect(&addr).await;

    alice.send("alice").await;

    assert_eq!(
        alice.lines_until("Your guess?").await,
        [
            "alice has just joined.",
            "***************",
            "Word to guess: _____",
            "Guesses remaining: 6",
            "Letters guessed:",
            "",
            "***************",
            "Your guess?",
        ]
    );
}

#[tokio::test]
async fn test_duplicate_name_is_rejected_then_other_name_accepted() {
    let addr = start_server(&["APPLE"]).await;
    let _alice = Client::join(&addr, "alice", "Your guess?").await;
    let mut second = Client::connect(&addr).await;

    second.send("alice").await;
    assert_eq!(
        second.line().await,
        "Invalid Name: name \"alice\" is already taken"
    );
    assert_eq!(second.line().await, "What is your name?");

    second.send("bob").await;
    let lines = second.lines_until("It is alice's turn.").await;
    assert_eq!(lines[0], "bob has just joined.");
}

#[tokio::test]
async fn test_turns_alternate_between_players() {
    let addr = start_server(&["APPLE"]).await;
    let mut alice = Client::join(&addr, "alice", "Your guess?").await;
    let mut bob = Client::join(&addr, "bob", "It is alice's turn.").await;
    alice.lines_until("Your guess?").await;

    bob.send("a").await;
    assert_eq!(bob.line().await, "It is not your turn to guess");

    alice.send("p").await;
    let to_alice = alice.lines_until("It is bob's turn.").await;
    assert_eq!(to_alice[0], "alice guesses: p");
    assert!(to_alice.contains(&"Word to guess: _PP__".to_string()));

    let to_bob = bob.lines_until("Your guess?").await;
    assert_eq!(to_bob[0], "alice guesses: p");
}

#[tokio::test]
async fn test_input_split_and_batched_is_handled_in_order() {
    let addr = start_server(&["APPLE"]).await;
    let mut alice = Client::connect(&addr).await;

    alice.send_raw(b"ali").await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    alice.send_raw(b"ce\r\nz\r\n").await;

    alice.lines_until("Your guess?").await;
    assert_eq!(alice.line().await, "z is not in the word");
    assert_eq!(alice.line().await, "alice guesses: z");
    let status = alice.lines_until("Your guess?").await;
    assert!(status.contains(&"Guesses remaining: 5".to_string()));
}

#[tokio::test]
async fn test_turn_holder_leaving_hands_turn_on() {
    let addr = start_server(&["APPLE"]).await;
    let alice = Client::join(&addr, "alice", "Your guess?").await;
    let mut bob = Client::join(&addr, "bob", "It is alice's turn.").await;

    drop(alice);

    assert_eq!(
        bob.lines_until("Your guess?").await,
        ["Goodbye alice", "Your guess?"]
    );
}

#[tokio::test]
async fn test_round_lost_restarts_with_same_players() {
    let addr = start_server(&["APPLE", "KIWI"]).await;
    let mut alice = Client::join(&addr, "alice", "Your guess?").await;

    for c in ["b", "c", "d", "f", "g"] {
        alice.send(c).await;
        alice.lines_until("Your guess?").await;
    }
    alice.send("h").await;

    let lines = alice.lines_until("Your guess?").await;
    assert_eq!(lines[0], "h is not in the word");
    assert_eq!(lines[1], "No more guesses. The word was APPLE");
    assert_eq!(lines[2], "Let's start a new game");
    assert!(lines.contains(&"Word to guess: ____".to_string()));
}
