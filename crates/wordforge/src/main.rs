use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use wordforge::prelude::*;
use wordforge::logging;

/// Multiplayer turn-based word guessing server.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Dictionary file, one word per line
    dictionary: PathBuf,

    /// TOML config file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Interface to listen on, IPv4 or IPv6
    #[arg(short, long)]
    bind: Option<IpAddr>,

    /// Misses allowed per round
    #[arg(long)]
    max_guesses: Option<u32>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    /// Write logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    /// Layers command-line flags over `config`.
    fn apply(&self, config: &mut ServerConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(max_guesses) = self.max_guesses {
            config.game.max_guesses = max_guesses;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        config.json_logs |= self.json_logs;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    args.apply(&mut config);
    logging::init(&config.log_level, config.json_logs)?;

    let dictionary = Dictionary::load(&args.dictionary, config.game.max_word_len)?;
    let server = WordServerBuilder::new()
        .config(config)
        .build(dictionary)
        .await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }
    Ok(())
}
