//! Drive the server event loop over its channels, the way a transport
//! would, and assert on the outbound actions. Only paths that never reach
//! the generation gateway are exercised here; engine behavior is covered by
//! the per-module unit tests.

mod common;

use parlor::bot::{BotServer, ChatEvent, CommandInvocation, OutgoingAction};
use tempfile::tempdir;
use tokio::sync::mpsc;

const CHANNEL: u64 = 10;
const PLAYER: u64 = 100;
const OWNER: u64 = 500;

fn command(user_id: u64, name: &str, args: &[&str]) -> ChatEvent {
    ChatEvent::Command(CommandInvocation {
        channel: CHANNEL,
        user_id,
        user_name: (if user_id == OWNER { "owner" } else { "player" }).to_string(),
        name: name.to_string(),
        args: args.iter().map(|s| s.to_string()).collect(),
    })
}

/// Run the server over the given events and collect everything it sent.
async fn drive(events: Vec<ChatEvent>) -> Vec<OutgoingAction> {
    let dir = tempdir().unwrap();
    let config = common::test_config(&dir);
    let (actions_tx, mut actions_rx) = mpsc::unbounded_channel();
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let mut server = BotServer::new(config, actions_tx).unwrap();
    for event in events {
        events_tx.send(event).unwrap();
    }
    events_tx.send(ChatEvent::Shutdown).unwrap();
    server.run(events_rx).await.unwrap();

    let mut actions = Vec::new();
    while let Ok(action) = actions_rx.try_recv() {
        actions.push(action);
    }
    actions
}

fn texts(actions: &[OutgoingAction]) -> Vec<String> {
    actions
        .iter()
        .map(|a| match a {
            OutgoingAction::Send { text, .. } => text.clone(),
            OutgoingAction::Reply { text, .. } => text.clone(),
            OutgoingAction::Whisper { text, .. } => text.clone(),
            OutgoingAction::React { emoji, .. } => emoji.to_string(),
        })
        .collect()
}

#[tokio::test]
async fn info_lists_games_and_commands() {
    let actions = drive(vec![command(PLAYER, "info", &[])]).await;
    let texts = texts(&actions);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("Wordle"));
    assert!(texts[0].contains("leaderboard"));
}

#[tokio::test]
async fn unknown_command_yields_usage_error() {
    let actions = drive(vec![command(PLAYER, "dance", &[])]).await;
    assert!(texts(&actions)[0].contains("Unknown command"));
}

#[tokio::test]
async fn maintenance_blocks_starts_for_non_owners() {
    let actions = drive(vec![
        command(OWNER, "maintenance", &["on"]),
        command(PLAYER, "wordle", &[]),
        command(OWNER, "maintenance", &["off"]),
    ])
    .await;
    let texts = texts(&actions);
    assert!(texts.iter().any(|t| t.contains("Maintenance mode ON")));
    assert!(texts.iter().any(|t| t.contains("games are paused")));
    assert!(texts.iter().any(|t| t.contains("Maintenance mode OFF")));
}

#[tokio::test]
async fn admin_commands_require_the_owner() {
    let actions = drive(vec![
        command(PLAYER, "maintenance", &["on"]),
        command(PLAYER, "reset_stats", &[]),
    ])
    .await;
    let texts = texts(&actions);
    assert_eq!(texts.iter().filter(|t| t.contains("not authorized")).count(), 2);
}

#[tokio::test]
async fn channel_allow_list_gates_starts() {
    let actions = drive(vec![
        // Allow only some other channel, then try to start here.
        command(OWNER, "channel_add", &["999"]),
        command(PLAYER, "wordle", &[]),
        command(OWNER, "channel_remove", &["999"]),
        command(PLAYER, "stop", &[]),
    ])
    .await;
    let texts = texts(&actions);
    assert!(texts.iter().any(|t| t.contains("not enabled in this channel")));
    // Empty list again = all channels allowed; stop answers normally.
    assert!(texts.iter().any(|t| t.contains("no game running")));
}

#[tokio::test]
async fn stats_reset_needs_confirmation() {
    let actions = drive(vec![
        command(OWNER, "confirm_reset", &[]),
        command(OWNER, "reset_stats", &[]),
        command(OWNER, "confirm_reset", &[]),
    ])
    .await;
    let texts = texts(&actions);
    // Confirming with nothing pending is refused.
    assert!(texts[0].contains("No reset pending"));
    assert!(texts.iter().any(|t| t.contains("confirm_reset")));
    assert!(texts.iter().any(|t| t.contains("statistics have been reset")));
}

#[tokio::test]
async fn reset_cancel_aborts_the_pending_request() {
    let actions = drive(vec![
        command(OWNER, "reset_stats", &[]),
        command(OWNER, "cancel_reset", &[]),
        command(OWNER, "confirm_reset", &[]),
    ])
    .await;
    let texts = texts(&actions);
    assert!(texts.iter().any(|t| t.contains("Reset cancelled")));
    assert!(texts.last().unwrap().contains("No reset pending"));
}

#[tokio::test]
async fn profile_and_leaderboard_start_empty() {
    let actions = drive(vec![
        command(PLAYER, "profile", &[]),
        command(PLAYER, "leaderboard", &[]),
        command(PLAYER, "achievements", &[]),
    ])
    .await;
    let texts = texts(&actions);
    assert!(texts[0].contains("No stats yet"));
    assert!(texts[1].contains("leaderboard is empty"));
    // Full catalog listed, nothing unlocked.
    assert_eq!(texts[2].matches('⬜').count(), 6);
}

#[tokio::test]
async fn messages_without_sessions_are_silent() {
    let actions = drive(vec![ChatEvent::Message(parlor::bot::IncomingMessage {
        channel: CHANNEL,
        message_id: 1,
        user_id: PLAYER,
        user_name: "player".to_string(),
        text: "hello there".to_string(),
    })])
    .await;
    assert!(actions.is_empty());
}

#[tokio::test]
async fn story_end_without_a_story_is_a_notice() {
    let actions = drive(vec![command(PLAYER, "story_end", &[])]).await;
    assert!(texts(&actions)[0].contains("No story"));
}
