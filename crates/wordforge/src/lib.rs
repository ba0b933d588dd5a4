//! # Wordforge
//!
//! A multiplayer, turn-based word guessing server.
//!
//! Clients connect over TCP and talk in CRLF-terminated lines. Each new
//! connection is asked for a name; once the name is accepted the player
//! joins the single shared round and takes turns guessing letters.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::net::Ipv4Addr;
//!
//! use wordforge::prelude::*;
//!
//! # async fn start() -> Result<(), Box<dyn std::error::Error>> {
//! let dictionary = Dictionary::load("words.txt", 30)?;
//! let server = WordServerBuilder::new()
//!     .bind_addr(Ipv4Addr::LOCALHOST.into())
//!     .port(55879)
//!     .build(dictionary)
//!     .await?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod handler;
pub mod logging;
mod server;

pub use config::ServerConfig;
pub use error::WordforgeError;
pub use handler::WordGame;
pub use server::{WordServer, WordServerBuilder};

/// The types most programs need.
pub mod prelude {
    pub use crate::{
        ServerConfig, WordGame, WordServer, WordServerBuilder, WordforgeError,
    };
    pub use wordforge_room::{Dictionary, GameConfig, WordList, WordSource};
    pub use wordforge_session::{JoinOrder, RegistryConfig};
    pub use wordforge_transport::TransportConfig;
}
