//! Bot server: owns the configuration, storage, session store, and gateway
//! client, and drives the single event loop that processes chat events and
//! the periodic idle-reaper tick.

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{info, warn};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::achievements::WinContext;
use crate::config::Config;
use crate::games::{Effect, Scoree};
use crate::gateway::GenerationClient;
use crate::metrics;
use crate::storage::{ScoreDelta, Store};

use super::session::SessionStore;
use super::{
    AllChannels, ChannelDirectory, ChannelId, ChatEvent, MessageId, OutgoingAction, UserId,
};

/// Which session an `Effect::EndSession` in a batch refers to.
#[derive(Debug, Clone, Copy)]
pub(crate) enum SessionTarget {
    Personal(ChannelId, UserId),
    Shared(ChannelId),
    None,
}

/// # Bot Server - Core Game Coordinator
///
/// Owns every component: the sled-backed [`Store`], the live
/// [`SessionStore`], the generation gateway client, and the outbound action
/// channel back to the chat transport.
///
/// ## Usage
///
/// ```rust,no_run
/// use parlor::bot::{BotServer, OutgoingAction};
/// use parlor::config::Config;
/// use tokio::sync::mpsc;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = Config::load("config.toml").await?;
///     let (actions_tx, _actions_rx) = mpsc::unbounded_channel::<OutgoingAction>();
///     let (_events_tx, events_rx) = mpsc::unbounded_channel();
///     let mut server = BotServer::new(config, actions_tx)?;
///     server.run(events_rx).await
/// }
/// ```
///
/// All state lives on this struct and is only touched from the event-loop
/// task; no locks, no globals.
pub struct BotServer {
    pub(crate) config: Config,
    pub(crate) store: Store,
    pub(crate) sessions: SessionStore,
    pub(crate) gateway: GenerationClient,
    pub(crate) actions_tx: mpsc::UnboundedSender<OutgoingAction>,
    pub(crate) directory: Box<dyn ChannelDirectory>,
    /// Owner-initiated statistics reset awaiting confirmation.
    pub(crate) pending_reset: Option<(UserId, DateTime<Utc>)>,
}

impl BotServer {
    pub fn new(config: Config, actions_tx: mpsc::UnboundedSender<OutgoingAction>) -> Result<Self> {
        let store = Store::open(&config.storage.data_dir)?;
        let gateway = GenerationClient::new(config.gateway.clone());
        Ok(BotServer {
            config,
            store,
            sessions: SessionStore::new(),
            gateway,
            actions_tx,
            directory: Box::new(AllChannels),
            pending_reset: None,
        })
    }

    /// Replace the channel directory; the transport installs its own view
    /// before `run`.
    pub fn with_directory(mut self, directory: Box<dyn ChannelDirectory>) -> Self {
        self.directory = directory;
        self
    }

    /// Run the event loop until the events channel closes or a `Shutdown`
    /// event arrives.
    pub async fn run(&mut self, mut events_rx: mpsc::UnboundedReceiver<ChatEvent>) -> Result<()> {
        info!(
            "{} starting: {} players on record",
            self.config.bot.name,
            self.store.player_count()
        );
        let mut reaper_tick =
            interval(Duration::from_secs(self.config.games.reaper_period_seconds));
        reaper_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                event = events_rx.recv() => {
                    match event {
                        Some(ChatEvent::Message(msg)) => {
                            if let Err(e) = self.route_message(msg).await {
                                warn!("message handling failed: {e}");
                            }
                        }
                        Some(ChatEvent::Command(cmd)) => {
                            let channel = cmd.channel;
                            if let Err(e) = self.handle_command(cmd).await {
                                warn!("command handling failed: {e}");
                                self.send_to(channel, "😵 Something went wrong on my end, sorry!");
                            }
                        }
                        Some(ChatEvent::Choice(choice)) => {
                            if let Err(e) = self.route_choice(choice) {
                                warn!("choice handling failed: {e}");
                            }
                        }
                        Some(ChatEvent::Shutdown) | None => break,
                    }
                }
                _ = reaper_tick.tick() => {
                    if let Err(e) = self.reap_idle_sessions().await {
                        warn!("idle reaper sweep failed: {e}");
                    }
                }
            }
        }
        info!("{} shutting down", self.config.bot.name);
        Ok(())
    }

    pub(crate) fn send_action(&self, action: OutgoingAction) {
        if self.actions_tx.send(action).is_err() {
            warn!("transport action channel closed, dropping outbound action");
        }
    }

    pub(crate) fn send_to(&self, channel: ChannelId, text: impl Into<String>) {
        self.send_action(OutgoingAction::Send {
            channel,
            text: text.into(),
        });
    }

    /// Emit a notable event to the operational log channel (when one is
    /// configured) and the process log.
    pub(crate) fn ops_log(&self, event: &str, detail: &str) {
        info!(target: "ops", "{event}: {detail}");
        if let Some(log_channel) = self.config.bot.log_channel {
            self.send_to(log_channel, format!("`{}` {}", event, detail));
        }
    }

    /// Apply one engine's effect batch in order. `message_id` is the
    /// triggering message when there is one; replies and reactions fall
    /// back to plain sends without it.
    pub(crate) fn apply_effects(
        &mut self,
        channel: ChannelId,
        message_id: Option<MessageId>,
        actor_id: UserId,
        actor_name: &str,
        effects: Vec<Effect>,
        target: SessionTarget,
    ) -> Result<()> {
        let won = effects
            .iter()
            .any(|e| matches!(e, Effect::Score { delta, .. } if delta.points > 0));
        for effect in effects {
            match effect {
                Effect::Reply(text) => match message_id {
                    Some(message_id) => self.send_action(OutgoingAction::Reply {
                        channel,
                        message_id,
                        text,
                    }),
                    None => self.send_to(channel, text),
                },
                Effect::Announce(text) => self.send_to(channel, text),
                Effect::React(emoji) => {
                    if let Some(message_id) = message_id {
                        self.send_action(OutgoingAction::React {
                            channel,
                            message_id,
                            emoji,
                        });
                    }
                }
                Effect::Score {
                    recipient,
                    delta,
                    context,
                } => {
                    let (user_id, user_name) = match recipient {
                        Scoree::Actor => (actor_id, actor_name.to_string()),
                        Scoree::Player { user_id, user_name } => (user_id, user_name),
                    };
                    self.award_and_evaluate(channel, user_id, &user_name, &delta, &context)?;
                }
                Effect::OpsLog { event, detail } => self.ops_log(event, &detail),
                Effect::EndSession => match target {
                    SessionTarget::Personal(channel, user) => {
                        if let Some(session) = self.sessions.remove_personal(channel, user) {
                            metrics::record_game_end(session.game.kind().slug(), won);
                        }
                    }
                    SessionTarget::Shared(channel) => {
                        if let Some(session) = self.sessions.remove_shared(channel) {
                            metrics::record_game_end(session.game.kind().slug(), won);
                        }
                    }
                    SessionTarget::None => {}
                },
            }
        }
        Ok(())
    }

    /// Persist a score delta, then run the achievement pass against the
    /// freshly mutated statistics. Evaluation order matters: predicates
    /// read the counters this delta just changed.
    pub(crate) fn award_and_evaluate(
        &mut self,
        channel: ChannelId,
        user_id: UserId,
        user_name: &str,
        delta: &ScoreDelta,
        context: &WinContext,
    ) -> Result<()> {
        self.store.adjust_score(user_id, user_name, delta)?;

        let unlocked = crate::achievements::evaluate(&self.store, user_id, context)?;
        for def in unlocked {
            self.store.adjust_score(
                user_id,
                user_name,
                &ScoreDelta {
                    points: def.points,
                    ..Default::default()
                },
            )?;
            self.send_to(
                channel,
                format!(
                    "🏅 **{}** unlocked **{}** (+{} pts): {}",
                    user_name, def.name, def.points, def.description
                ),
            );
            self.ops_log(
                "achievement.unlock",
                &format!("user={} achievement={}", user_name, def.id),
            );
        }
        Ok(())
    }

    /// One-line liveness summary for the status surface.
    pub fn status_report(&self) -> String {
        format!(
            "{}: {} personal / {} shared sessions live, {} players on record",
            self.config.bot.name,
            self.sessions.personal_count(),
            self.sessions.shared_count(),
            self.store.player_count()
        )
    }
}
