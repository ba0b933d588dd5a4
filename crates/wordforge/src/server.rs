//! `WordServer` builder and event loop.
//!
//! This is the entry point for running a Wordforge server. It ties the
//! layers together: transport → protocol → session → room.

use std::net::{IpAddr, SocketAddr};

use tokio::sync::mpsc;
use wordforge_room::{GameConfig, WordSource};
use wordforge_session::RegistryConfig;
use wordforge_transport::{TcpTransport, TransportConfig, TransportEvent};

use crate::{ServerConfig, WordGame, WordforgeError};

/// Builder for configuring and starting a Wordforge server.
///
/// The word source is only named at [`build`](Self::build), which fixes the
/// server's source type.
///
/// # Example
///
/// ```rust,ignore
/// let server = WordServerBuilder::new()
///     .port(4000)
///     .build(Dictionary::load("words.txt", 30)?)
///     .await?;
/// server.run().await
/// ```
#[derive(Debug, Default)]
pub struct WordServerBuilder {
    config: ServerConfig,
}

impl WordServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the interface to listen on.
    pub fn bind_addr(mut self, addr: IpAddr) -> Self {
        self.config.bind_addr = addr;
        self
    }

    /// Sets the TCP port. `0` picks any free port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn game_config(mut self, game: GameConfig) -> Self {
        self.config.game = game;
        self
    }

    pub fn registry_config(mut self, registry: RegistryConfig) -> Self {
        self.config.registry = registry;
        self
    }

    pub fn transport_config(mut self, transport: TransportConfig) -> Self {
        self.config.transport = transport;
        self
    }

    /// Binds the listener and draws the first word from `source`.
    pub async fn build<W: WordSource>(
        self,
        source: W,
    ) -> Result<WordServer<W>, WordforgeError> {
        let config = self.config.validated();
        let game = WordGame::new(&config, source)?;
        let transport =
            TcpTransport::bind(config.listen_addr(), config.transport.clone())
                .await?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Ok(WordServer {
            transport,
            game,
            events_tx,
            events_rx,
        })
    }
}

/// A bound Wordforge server.
///
/// Call [`run()`](Self::run) to start serving.
pub struct WordServer<W: WordSource> {
    transport: TcpTransport,
    game: WordGame<W>,
    events_tx: mpsc::UnboundedSender<TransportEvent>,
    events_rx: mpsc::UnboundedReceiver<TransportEvent>,
}

impl<W: WordSource> WordServer<W> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the event loop.
    ///
    /// Each iteration waits for either a new connection or an event from an
    /// existing one and handles it completely before waiting again. Accept
    /// failures are logged and the loop carries on. Runs until the process
    /// is terminated, or until a round ends and the word source has no
    /// playable word for the next one.
    pub async fn run(mut self) -> Result<(), WordforgeError> {
        tracing::info!(addr = ?self.local_addr().ok(), "wordforge server running");

        loop {
            tokio::select! {
                accepted = self.transport.accept(&self.events_tx) => match accepted {
                    Ok(peer) => self.game.connect(peer),
                    Err(e) => tracing::error!(error = %e, "accept failed"),
                },
                Some(event) = self.events_rx.recv() => {
                    self.game.handle_event(event)?;
                }
            }
        }
    }
}
