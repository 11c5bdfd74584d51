//! # Parlor - AI-assisted parlor games for chat platforms
//!
//! Parlor is a chat-platform bot that hosts a fixed catalog of lightweight
//! word and trivia minigames (a Wordle-style word guess, hangman, quiz,
//! twenty questions, two-truths-and-a-lie, word association, collaborative
//! story, and taboo), keeps durable player scores and achievements, and
//! delegates all content generation (secret words, quiz questions, hints,
//! narrative text) to an external generative-text service.
//!
//! ## Features
//!
//! - **Per-channel game coordination**: at most one personal game per
//!   (channel, player) and one shared game per channel, with routing of
//!   inbound chat into the matching rule engine.
//! - **Pure rule engines**: every game's rules live in a side-effect-free
//!   engine that maps an action onto a new state plus outbound effects.
//! - **Durable scoring**: sled-backed player records, an insert-once
//!   achievement set, and a small settings table.
//! - **Idle reaper**: stalled shared games are nudged along with a
//!   bot-authored continuation.
//! - **Async design**: built with Tokio; one logical worker processes
//!   actions in arrival order while gateway calls are in flight.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parlor::config::Config;
//! use parlor::bot::BotServer;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let (actions_tx, _actions_rx) = mpsc::unbounded_channel();
//!     let (_events_tx, events_rx) = mpsc::unbounded_channel();
//!     let mut server = BotServer::new(config, actions_tx)?;
//!     server.run(events_rx).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`bot`] - Event loop, session store, command surface, and idle reaper
//! - [`games`] - One rule engine per game type in the catalog
//! - [`achievements`] - Static achievement catalog and the unlock evaluator
//! - [`gateway`] - Generation gateway HTTP client
//! - [`storage`] - Player, unlock, and settings persistence
//! - [`config`] - Configuration management and validation
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   BotServer     │ ← event loop + command surface
//! └─────────────────┘
//!     │           │
//! ┌─────────┐ ┌─────────────┐
//! │ Session │ │ Rule        │ ← pure per-game engines
//! │ Store   │ │ Engines     │
//! └─────────┘ └─────────────┘
//!     │           │
//! ┌─────────────────┐   ┌─────────────────┐
//! │ Storage (sled)  │   │ Gateway (HTTP)  │
//! └─────────────────┘   └─────────────────┘
//! ```
//!
//! The chat transport itself (message delivery, slash-command registration,
//! permission checks) is an external collaborator: it feeds
//! [`bot::ChatEvent`]s in and consumes [`bot::OutgoingAction`]s.

pub mod achievements;
pub mod bot;
pub mod config;
pub mod games;
pub mod gateway;
pub mod logutil;
pub mod metrics;
pub mod storage;
