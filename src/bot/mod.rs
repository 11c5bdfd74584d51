//! # Bot Core Module
//!
//! This module implements the game-coordination core of parlor: session
//! bookkeeping, command handling, message routing, the idle reaper, and the
//! server event loop that ties them together.
//!
//! ## Components
//!
//! - [`server`] - Main bot server implementation and lifecycle management
//! - [`session`] - Session Store for personal and shared game sessions
//! - [`commands`] - Slash-command parsing and execution
//! - [`router`] - Routing of plain messages and picks into rule engines
//! - [`reaper`] - Periodic idle sweep for shared sessions
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  BotServer      │ ← Event loop, owns every component below
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  Session Store  │ ← (channel, player) and channel-wide sessions
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  Rule Engines   │ ← Pure per-game logic producing Effects
//! └─────────────────┘
//! ```
//!
//! The chat transport stays outside this crate: it feeds [`ChatEvent`]s in
//! through a channel and applies the [`OutgoingAction`]s the server emits.

pub mod commands;
pub mod reaper;
pub mod router;
pub mod server;
pub mod session;

pub use server::BotServer;

/// Platform channel identifier.
pub type ChannelId = u64;
/// Platform user identifier.
pub type UserId = u64;
/// Platform message identifier, used for replies and reactions.
pub type MessageId = u64;

/// A plain chat message observed in a channel.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub channel: ChannelId,
    pub message_id: MessageId,
    pub user_id: UserId,
    pub user_name: String,
    pub text: String,
}

/// A slash-command invocation, already split into name and arguments by the
/// transport.
#[derive(Debug, Clone)]
pub struct CommandInvocation {
    pub channel: ChannelId,
    pub user_id: UserId,
    pub user_name: String,
    pub name: String,
    pub args: Vec<String>,
}

/// A button/option pick on an interactive prompt (two-truths).
#[derive(Debug, Clone)]
pub struct ChoiceEvent {
    pub channel: ChannelId,
    pub user_id: UserId,
    pub user_name: String,
    /// Zero-based index of the picked option.
    pub index: usize,
}

/// Everything the transport can hand to the server.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    Message(IncomingMessage),
    Command(CommandInvocation),
    Choice(ChoiceEvent),
    Shutdown,
}

/// Everything the server can ask the transport to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutgoingAction {
    /// Post a message to a channel.
    Send { channel: ChannelId, text: String },
    /// Reply to a specific message.
    Reply {
        channel: ChannelId,
        message_id: MessageId,
        text: String,
    },
    /// React to a specific message with an emoji.
    React {
        channel: ChannelId,
        message_id: MessageId,
        emoji: char,
    },
    /// Direct message to a single user, off-channel. Used for content the
    /// channel must not see (the taboo card for the describer).
    Whisper { user: UserId, text: String },
}

/// Transport-side view of which channels still exist. The reaper drops
/// sessions whose channel the directory no longer knows.
pub trait ChannelDirectory: Send {
    fn channel_exists(&self, channel: ChannelId) -> bool;
}

/// Directory that believes every channel exists. Used by the dev console
/// transport and in tests.
pub struct AllChannels;

impl ChannelDirectory for AllChannels {
    fn channel_exists(&self, _channel: ChannelId) -> bool {
        true
    }
}
