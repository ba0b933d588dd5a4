//! Server configuration, loaded from TOML.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```toml
//! port = 4000
//! log_level = "debug"
//!
//! [game]
//! max_guesses = 8
//!
//! [registry]
//! join_order = "oldest_first"
//!
//! [transport]
//! write_queue = 32
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};
use wordforge_protocol::AssemblerConfig;
use wordforge_room::GameConfig;
use wordforge_session::RegistryConfig;
use wordforge_transport::TransportConfig;

use crate::WordforgeError;

/// Everything the server needs to start.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to listen on, IPv4 or IPv6.
    pub bind_addr: IpAddr,

    /// TCP port to listen on.
    pub port: u16,

    /// Default log filter, used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,

    pub game: GameConfig,
    pub registry: RegistryConfig,
    pub assembler: AssemblerConfig,
    pub transport: TransportConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 55879,
            log_level: "info".to_string(),
            json_logs: false,
            game: GameConfig::default(),
            registry: RegistryConfig::default(),
            assembler: AssemblerConfig::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads and parses a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WordforgeError> {
        let path = path.as_ref();
        let config_error = |reason: String| WordforgeError::Config {
            path: path.to_path_buf(),
            reason,
        };

        let text = std::fs::read_to_string(path)
            .map_err(|e| config_error(e.to_string()))?;
        let config = Self::from_toml(&text)
            .map_err(|e| config_error(e.to_string()))?;

        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Parses a TOML document. Missing fields take their defaults.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Self>(text).map(Self::validated)
    }

    /// Fixes out-of-range values in every section.
    pub fn validated(mut self) -> Self {
        self.game = self.game.validated();
        self.assembler = self.assembler.validated();
        self.transport = self.transport.validated();
        self.registry.max_name_len = self.registry.max_name_len.max(1);
        self
    }

    /// The socket address the listener binds to.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
