//! Idle reaper: a periodic sweep independent of player input.
//!
//! Shared association/story sessions that have gone quiet past the idle
//! threshold get a gateway-synthesized continuation, applied through the
//! same update path as a player contribution. Taboo has no synthetic move
//! and is left alone. Sessions on channels the directory no longer knows
//! are dropped outright. Expired two-truths prompts are discarded without
//! scoring in the same sweep.
//!
//! The reaper can race a concurrently arriving player action: liveness
//! (session still present, still idle) is re-checked after the gateway
//! call, immediately before committing the synthetic move.

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::debug;

use crate::games::shared::{SharedGame, SharedSession};
use crate::metrics;

use super::session::PersonalGame;
use super::BotServer;

/// Whether a shared session is due for a synthetic continuation.
pub(crate) fn needs_continuation(
    session: &SharedSession,
    now: DateTime<Utc>,
    idle_threshold_seconds: u64,
) -> bool {
    matches!(
        session.game,
        SharedGame::Association { .. } | SharedGame::Story { .. }
    ) && session.idle_seconds(now) > idle_threshold_seconds as i64
}

impl BotServer {
    pub(crate) async fn reap_idle_sessions(&mut self) -> Result<()> {
        let now = Utc::now();
        self.sweep_expired_prompts(now);

        let threshold = self.config.games.idle_timeout_seconds;
        for channel in self.sessions.shared_channels() {
            if !self.directory.channel_exists(channel) {
                if let Some(session) = self.sessions.remove_shared(channel) {
                    metrics::record_game_end(session.game.kind().slug(), false);
                    debug!("dropped shared session on vanished channel {channel}");
                }
                continue;
            }

            let continuation_input = match self.sessions.shared(channel) {
                Some(session) if needs_continuation(session, now, threshold) => {
                    match &session.game {
                        SharedGame::Association { chain } => {
                            chain.last().cloned().map(ContinuationInput::Association)
                        }
                        SharedGame::Story { .. } => {
                            session.story_text().map(ContinuationInput::Story)
                        }
                        SharedGame::Taboo { .. } => None,
                    }
                }
                _ => None,
            };
            let Some(input) = continuation_input else {
                continue;
            };

            let generated = match &input {
                ContinuationInput::Association(word) => {
                    self.gateway.continue_association(word).await
                }
                ContinuationInput::Story(text) => self.gateway.continue_story(text).await,
            };
            let text = match generated {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => continue,
                Err(e) => {
                    self.ops_log("gateway.failure", &format!("reaper continuation: {e}"));
                    continue;
                }
            };

            // Re-check liveness: a player may have moved, or the session may
            // be gone, while the gateway call was in flight.
            let applied = {
                let now = Utc::now();
                match self.sessions.shared_mut(channel) {
                    Some(session) if needs_continuation(session, now, threshold) => {
                        session.apply_synthetic_move(self.config.bot.user_id, &text, now)
                    }
                    _ => false,
                }
            };
            if applied {
                let announcement = match input {
                    ContinuationInput::Association(_) => {
                        format!("🤖 I'll keep it going: **{}**", text.to_uppercase())
                    }
                    ContinuationInput::Story(_) => format!("🤖 {}", text),
                };
                self.send_to(channel, announcement);
                debug!("synthetic continuation applied on channel {channel}");
            }
        }
        Ok(())
    }

    /// Discard two-truths prompts whose pick window has elapsed.
    fn sweep_expired_prompts(&mut self, now: DateTime<Utc>) {
        for (channel, user) in self.sessions.personal_keys() {
            let expired = matches!(
                self.sessions.personal(channel, user).map(|s| &s.game),
                Some(PersonalGame::TwoTruths(game)) if game.is_expired(now)
            );
            if expired {
                if let Some(session) = self.sessions.remove_personal(channel, user) {
                    metrics::record_game_end(session.game.kind().slug(), false);
                    self.send_to(
                        channel,
                        format!("⌛ {} took too long to pick. Round discarded.", session.user_name),
                    );
                }
            }
        }
    }
}

enum ContinuationInput {
    Association(String),
    Story(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn story_session(now: DateTime<Utc>, idle_seconds: i64) -> SharedSession {
        SharedSession::new(
            SharedGame::Story {
                opening: "Opening.".to_string(),
                contributions: vec![],
            },
            now - Duration::seconds(idle_seconds),
        )
    }

    #[test]
    fn ninety_one_seconds_idle_is_due_eighty_nine_is_not() {
        let now = Utc::now();
        assert!(needs_continuation(&story_session(now, 91), now, 90));
        assert!(!needs_continuation(&story_session(now, 89), now, 90));
    }

    #[test]
    fn taboo_is_never_due() {
        let now = Utc::now();
        let session = SharedSession::new(
            SharedGame::Taboo {
                keyword: "piano".to_string(),
                forbidden: vec![],
                describer_id: 1,
                describer_name: "Ada".to_string(),
            },
            now - Duration::seconds(600),
        );
        assert!(!needs_continuation(&session, now, 90));
    }
}
