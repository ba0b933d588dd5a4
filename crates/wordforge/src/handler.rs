//! Event handling: everything that happens between two readiness waits.
//!
//! [`WordGame`] owns the registry, the round, and the word source. The
//! server loop feeds it accepted peers and transport events; each call runs
//! to completion synchronously, so the collections are consistent again by
//! the time control returns to the loop.
//!
//! Failed deliveries are never acted on mid-handler. They are queued and the
//! affected connections are disconnected once the current handler is done,
//! so a broadcast always reaches every recipient that is still reachable.
//! A recipient whose write queue is full counts as a failed delivery.

use wordforge_protocol::{Assembled, AssemblerConfig, Letter, ServerMessage};
use wordforge_room::{GameState, GuessOutcome, RoomError, WordSource};
use wordforge_session::{Connection, ConnectionRegistry, Membership};
use wordforge_transport::{ConnectionId, Peer, TransportEvent};

use crate::{ServerConfig, WordforgeError};

/// Words drawn from the source before giving up on a new round.
const NEW_ROUND_ATTEMPTS: usize = 3;

/// The game server's state machine, independent of any socket.
pub struct WordGame<W: WordSource> {
    registry: ConnectionRegistry,
    state: GameState,
    source: W,
    assembler: AssemblerConfig,
    /// Connections whose delivery failed, awaiting disconnection.
    doomed: Vec<ConnectionId>,
}

impl<W: WordSource> WordGame<W> {
    /// Creates the game and draws the first word from `source`.
    pub fn new(config: &ServerConfig, mut source: W) -> Result<Self, WordforgeError> {
        let word = source.next_word()?;
        let state = GameState::new(config.game.clone(), &word)?;
        Ok(Self {
            registry: ConnectionRegistry::new(config.registry.clone()),
            state,
            source,
            assembler: config.assembler.clone(),
            doomed: Vec::new(),
        })
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Registers a freshly accepted peer as pending and greets it.
    pub fn connect(&mut self, peer: Peer) {
        let id = peer.id();
        tracing::info!(conn_id = %id, addr = %peer.addr(), "connection accepted");

        self.registry
            .insert_pending(Connection::new(peer, self.assembler.clone()));
        self.send(id, &ServerMessage::Welcome);
        self.reap();
    }

    /// Applies one transport event.
    ///
    /// # Errors
    /// Only when a round ends and the word source cannot supply a playable
    /// word for the next one. The game cannot continue after that.
    pub fn handle_event(&mut self, event: TransportEvent) -> Result<(), WordforgeError> {
        let id = event.id();
        match event {
            TransportEvent::Received { data, .. } => self.on_data(id, &data)?,
            TransportEvent::Closed { .. } => {
                tracing::debug!(conn_id = %id, "peer closed connection");
                self.disconnect(id);
            }
            TransportEvent::Failed { error, .. } => {
                tracing::debug!(conn_id = %id, error = %error, "connection failed");
                self.disconnect(id);
            }
        }
        self.reap();
        Ok(())
    }

    /// Feeds bytes to a connection and dispatches every completed line, in
    /// order, until the lines run out or the connection is gone.
    pub fn on_data(&mut self, id: ConnectionId, data: &[u8]) -> Result<(), WordforgeError> {
        let Some(conn) = self.registry.get_mut(id) else {
            tracing::trace!(conn_id = %id, "data for removed connection dropped");
            return Ok(());
        };
        tracing::trace!(conn_id = %id, bytes = data.len(), "bytes received");

        let mut line = match conn.push(data) {
            Assembled::Line(line) => Some(line),
            Assembled::Pending => None,
            Assembled::Disconnected => {
                self.disconnect(id);
                return Ok(());
            }
        };

        while let Some(text) = line.take() {
            tracing::debug!(conn_id = %id, line = %text, "line assembled");
            let dispatched = self.dispatch(id, &text);
            self.reap();
            dispatched?;
            line = self.registry.get_mut(id).and_then(Connection::next_line);
        }
        Ok(())
    }

    /// Removes a connection, handing the turn on first if it held it.
    ///
    /// Idempotent: unknown ids are ignored.
    pub fn disconnect(&mut self, id: ConnectionId) {
        let Some(membership) = self.registry.membership(id) else {
            return;
        };
        let held_turn = self.state.is_turn(id);
        if held_turn {
            self.advance_turn();
            if self.state.is_turn(id) {
                // It was the only player.
                self.state.set_turn(None);
            }
        }
        let Some(conn) = self.registry.remove(id) else {
            return;
        };
        tracing::info!(
            conn_id = %id,
            addr = %conn.addr(),
            name = conn.name().unwrap_or(""),
            "connection removed"
        );

        if membership == Membership::Active {
            if let Some(name) = conn.name() {
                self.broadcast(&ServerMessage::Departed {
                    name: name.to_string(),
                });
            }
            if held_turn {
                self.announce_turn();
            }
        }
    }

    fn dispatch(&mut self, id: ConnectionId, line: &str) -> Result<(), RoomError> {
        match self.registry.membership(id) {
            Some(Membership::Pending) => self.register_name(id, line),
            Some(Membership::Active) => return self.handle_guess(id, line),
            None => {}
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Name registration
    // ---------------------------------------------------------------------

    fn register_name(&mut self, id: ConnectionId, name: &str) {
        match self.registry.promote(id, name) {
            Ok(()) => {}
            Err(e) if e.is_name_rejection() => {
                tracing::debug!(conn_id = %id, name, error = %e, "name rejected");
                self.send(
                    id,
                    &ServerMessage::InvalidName {
                        reason: e.to_string(),
                    },
                );
                self.send(id, &ServerMessage::NamePrompt);
                return;
            }
            Err(e) => {
                tracing::warn!(conn_id = %id, error = %e, "registration failed");
                return;
            }
        }

        self.broadcast(&ServerMessage::Joined {
            name: name.to_string(),
        });
        if self.state.turn().is_none() {
            self.state.set_turn(Some(id));
            self.broadcast_status();
        } else {
            self.send(id, &ServerMessage::Status(self.state.status()));
        }
        self.announce_turn();
    }

    // ---------------------------------------------------------------------
    // Guessing
    // ---------------------------------------------------------------------

    fn handle_guess(&mut self, id: ConnectionId, line: &str) -> Result<(), RoomError> {
        if !self.state.is_turn(id) {
            tracing::debug!(conn_id = %id, "guess out of turn");
            self.send(id, &ServerMessage::NotYourTurn);
            return Ok(());
        }
        let letter = match line.parse::<Letter>() {
            Ok(letter) => letter,
            Err(e) => {
                tracing::debug!(conn_id = %id, error = %e, "unparseable guess");
                self.reject_guess(id);
                return Ok(());
            }
        };
        let outcome = match self.state.apply_guess(letter) {
            Ok(outcome) => outcome,
            Err(RoomError::AlreadyGuessed(_)) => {
                tracing::debug!(conn_id = %id, %letter, "letter already guessed");
                self.reject_guess(id);
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(conn_id = %id, %letter, error = %e, "guess not applied");
                self.reject_guess(id);
                return Ok(());
            }
        };

        let name = self.registry.name_of(id).unwrap_or_default().to_string();
        let word = self.state.word();

        match outcome {
            GuessOutcome::Exhausted => {
                tracing::info!(%word, "round lost");
                self.send(id, &ServerMessage::NotInWord { letter });
                self.broadcast(&ServerMessage::NoMoreGuesses { word });
                self.start_next_round(id)?;
            }
            GuessOutcome::Solved => {
                tracing::info!(winner = %name, %word, "round won");
                self.send(id, &ServerMessage::YouWin);
                let failed = self
                    .registry
                    .broadcast_except(id, &ServerMessage::PlayerWon { name });
                self.doomed.extend(failed);
                self.broadcast(&ServerMessage::WordWas { word });
                self.start_next_round(id)?;
            }
            GuessOutcome::Miss | GuessOutcome::Hit { .. } => {
                if outcome == GuessOutcome::Miss {
                    self.send(id, &ServerMessage::NotInWord { letter });
                }
                self.advance_turn();
                self.broadcast(&ServerMessage::Guessed { name, letter });
                self.broadcast_status();
                self.announce_turn();
            }
        }
        Ok(())
    }

    fn reject_guess(&mut self, id: ConnectionId) {
        self.send(id, &ServerMessage::InvalidGuess);
        self.send(id, &ServerMessage::YourTurn);
    }

    /// Resets the round in place and hands the turn to whoever follows
    /// `ended_by`. The roster is kept.
    ///
    /// Nothing is announced unless the new word is in place.
    fn start_next_round(&mut self, ended_by: ConnectionId) -> Result<(), RoomError> {
        self.draw_next_word()?;
        self.broadcast(&ServerMessage::NewRound);

        let next = self.registry.next_active_after(ended_by);
        self.state.set_turn(next);
        self.broadcast_status();
        self.announce_turn();
        Ok(())
    }

    /// Resets the round with the next playable word, skipping up to
    /// `NEW_ROUND_ATTEMPTS - 1` unusable ones.
    fn draw_next_word(&mut self) -> Result<(), RoomError> {
        let mut attempt = 1;
        loop {
            let reset = self
                .source
                .next_word()
                .and_then(|word| self.state.new_round(&word));
            match reset {
                Ok(()) => return Ok(()),
                Err(e) if attempt < NEW_ROUND_ATTEMPTS => {
                    tracing::warn!(attempt, error = %e, "word rejected, drawing another");
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(attempt, error = %e, "could not start a new round");
                    return Err(e);
                }
            }
        }
    }

    // ---------------------------------------------------------------------
    // Turn handling
    // ---------------------------------------------------------------------

    /// Moves the turn to the next active player, wrapping to the first.
    ///
    /// Every path that ends a turn goes through here.
    fn advance_turn(&mut self) {
        let next = match self.state.turn() {
            Some(holder) => self.registry.next_active_after(holder),
            None => self.registry.first_active(),
        };
        self.state.set_turn(next);
    }

    /// Prompts the turn holder and tells everyone else whose turn it is.
    fn announce_turn(&mut self) {
        let Some(holder) = self.state.turn() else {
            return;
        };
        let Some(name) = self.registry.name_of(holder).map(str::to_string) else {
            return;
        };
        self.send(holder, &ServerMessage::YourTurn);
        let failed = self
            .registry
            .broadcast_except(holder, &ServerMessage::TurnOf { name });
        self.doomed.extend(failed);
    }

    // ---------------------------------------------------------------------
    // Delivery
    // ---------------------------------------------------------------------

    fn send(&mut self, id: ConnectionId, message: &ServerMessage) {
        if !self.registry.send_to(id, message) {
            self.doomed.push(id);
        }
    }

    fn broadcast(&mut self, message: &ServerMessage) {
        let failed = self.registry.broadcast(message);
        self.doomed.extend(failed);
    }

    fn broadcast_status(&mut self) {
        self.broadcast(&ServerMessage::Status(self.state.status()));
    }

    /// Disconnects every connection whose delivery failed. Disconnecting
    /// can fail further deliveries, so this runs until nothing is left.
    fn reap(&mut self) {
        while !self.doomed.is_empty() {
            for id in std::mem::take(&mut self.doomed) {
                self.disconnect(id);
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
