//! Binary entrypoint for the parlor CLI.
//!
//! Commands:
//! - `start` - run the bot with the interactive dev console transport
//! - `init` - create a starter `config.toml`
//! - `status` - print stored player statistics
//!
//! See the library crate docs for module-level details: `parlor::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use parlor::bot::{BotServer, ChatEvent, CommandInvocation, IncomingMessage, OutgoingAction};
use parlor::config::Config;
use parlor::storage::Store;

/// Identity the dev console types under.
const CONSOLE_CHANNEL: u64 = 1;
const CONSOLE_USER: u64 = 100;

#[derive(Parser)]
#[command(name = "parlor")]
#[command(about = "An AI-assisted parlor-games bot for chat platforms")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot with the stdin/stdout dev console transport
    Start,
    /// Initialize a new configuration file
    Init,
    /// Show stored player statistics
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            info!("Starting parlor v{}", env!("CARGO_PKG_VERSION"));

            let (actions_tx, actions_rx) = mpsc::unbounded_channel();
            let (events_tx, events_rx) = mpsc::unbounded_channel();
            spawn_console_transport(events_tx, actions_rx);

            let mut server = BotServer::new(config, actions_tx)?;
            server.run(events_rx).await?;
        }
        Commands::Init => {
            init_logging(&None, cli.verbose);
            if tokio::fs::metadata(&cli.config).await.is_ok() {
                warn!("{} already exists, not overwriting", cli.config);
                return Ok(());
            }
            Config::create_default(&cli.config).await?;
            println!("Created {}. Fill in [gateway] before starting.", cli.config);
        }
        Commands::Status => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            let store = Store::open(&config.storage.data_dir)?;
            println!("Players on record: {}", store.player_count());
            let board = store.leaderboard(3)?;
            for (i, record) in board.iter().enumerate() {
                println!("{}. {} - {} pts", i + 1, record.user_name, record.score);
            }
        }
    }
    Ok(())
}

/// Minimal transport for local runs: stdin lines become chat events, and
/// outbound actions are printed. Lines starting with `/` are commands
/// (`/wordle hard`), `pick N` is an interactive choice, anything else is a
/// plain channel message.
fn spawn_console_transport(
    events_tx: mpsc::UnboundedSender<ChatEvent>,
    mut actions_rx: mpsc::UnboundedReceiver<OutgoingAction>,
) {
    tokio::spawn(async move {
        while let Some(action) = actions_rx.recv().await {
            match action {
                OutgoingAction::Send { channel, text } => println!("[#{channel}] {text}"),
                OutgoingAction::Reply { channel, text, .. } => println!("[#{channel}] ↳ {text}"),
                OutgoingAction::React { channel, emoji, .. } => println!("[#{channel}] {emoji}"),
                OutgoingAction::Whisper { user, text } => println!("[dm:{user}] {text}"),
            }
        }
    });

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut next_message_id: u64 = 1;
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            let event = if let Some(rest) = line.strip_prefix('/') {
                let mut parts = rest.split_whitespace();
                let Some(name) = parts.next() else { continue };
                ChatEvent::Command(CommandInvocation {
                    channel: CONSOLE_CHANNEL,
                    user_id: CONSOLE_USER,
                    user_name: "console".to_string(),
                    name: name.to_string(),
                    args: parts.map(str::to_string).collect(),
                })
            } else if let Some(index) = line
                .strip_prefix("pick ")
                .and_then(|n| n.trim().parse::<usize>().ok())
            {
                ChatEvent::Choice(parlor::bot::ChoiceEvent {
                    channel: CONSOLE_CHANNEL,
                    user_id: CONSOLE_USER,
                    user_name: "console".to_string(),
                    index: index.saturating_sub(1),
                })
            } else {
                let message_id = next_message_id;
                next_message_id += 1;
                ChatEvent::Message(IncomingMessage {
                    channel: CONSOLE_CHANNEL,
                    message_id,
                    user_id: CONSOLE_USER,
                    user_name: "console".to_string(),
                    text: line,
                })
            };
            if events_tx.send(event).is_err() {
                break;
            }
        }
        let _ = events_tx.send(ChatEvent::Shutdown);
    });
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config.as_ref().and_then(|c| c.logging.file.clone());
    if let Some(file) = log_file {
        if let Ok(f) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file)
        {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            let is_tty = atty::is(atty::Stream::Stdout);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
    } else {
        builder.format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    let _ = builder.try_init();
}
