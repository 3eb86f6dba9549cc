//! `bm-serial` command-line host.
//!
//! Connects to a UART exposed over TCP and either listens for publishes or
//! sends a single console frame.

mod cli;
mod report;

use std::io;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bm_serial::{
    BmSerialConfig, BristlemouthSerial, ConfigError, ConsumerHandle, MonotonicClock, SerialError,
    TcpTransport,
};
use clap::Parser;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

#[derive(Debug, Error)]
enum RunnerError {
    #[error("failed to connect to {addr}: {source}")]
    Connect { addr: String, source: io::Error },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Serial(#[from] SerialError),

    #[error("invalid hex data: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("failed to install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("no topics to listen on; pass --topic or list subscriptions in the config")]
    NoTopics,
}

type Client = BristlemouthSerial<TcpTransport, MonotonicClock>;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), RunnerError> {
    let config = cli.load_config()?;
    let mut client = connect(&cli.connect, &config)?;

    match cli.command {
        Command::Listen { topics } => listen(&mut client, &config, topics),
        Command::Transmit { data, hex } => {
            let bytes = if hex {
                hex::decode(data.trim())?
            } else {
                data.into_bytes()
            };
            let written = client.transmit(&bytes)?;
            info!(len = bytes.len(), written, "transmitted");
            Ok(())
        }
        Command::Print { text } => {
            client.print(&text)?;
            Ok(())
        }
        Command::Log { file, text } => {
            client.log(&file, &text)?;
            Ok(())
        }
    }
}

fn connect(addr: &str, config: &BmSerialConfig) -> Result<Client, RunnerError> {
    let transport = TcpTransport::connect(addr).map_err(|source| RunnerError::Connect {
        addr: addr.to_string(),
        source,
    })?;
    info!(peer = %transport.peer_addr(), node_id = %config.node_id, "connected");
    Ok(BristlemouthSerial::from_config(transport, MonotonicClock::new(), config)?)
}

fn listen(client: &mut Client, config: &BmSerialConfig, extra: Vec<String>) -> Result<(), RunnerError> {
    let mut topics = config.subscriptions.clone();
    for topic in extra {
        if !topics.contains(&topic) {
            topics.push(topic);
        }
    }
    if topics.is_empty() {
        return Err(RunnerError::NoTopics);
    }

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))?;

    let consumer = ConsumerHandle::from_fn(|record| {
        report::log_record(record);
        Ok(())
    })
    .named("listen");
    for topic in &topics {
        client.subscribe(topic, &consumer)?;
        info!(%topic, "subscribed");
    }

    while running.load(Ordering::SeqCst) {
        client.poll_default()?;
    }
    info!("interrupted, exiting");
    Ok(())
}
