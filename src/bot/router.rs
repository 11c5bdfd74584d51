//! Routing of plain channel messages and interactive picks into the rule
//! engines. Personal sessions shadow the shared session: a player with a
//! live personal game in a channel has their messages routed there first.

use anyhow::Result;
use chrono::Utc;
use log::debug;

use crate::games::Effect;
use crate::logutil::content_preview;

use super::server::SessionTarget;
use super::session::PersonalGame;
use super::{BotServer, ChannelId, ChoiceEvent, IncomingMessage, UserId};

impl BotServer {
    /// Route one channel message. Messages with no matching session, or
    /// rejected by the engine, produce no output at all.
    pub(crate) async fn route_message(&mut self, msg: IncomingMessage) -> Result<()> {
        if msg.user_id == self.config.bot.user_id {
            return Ok(());
        }
        if self.play_suspended(msg.channel, msg.user_id)? {
            return Ok(());
        }
        debug!(
            "message channel={} user={} text={}",
            msg.channel,
            msg.user_id,
            content_preview(&msg.text)
        );

        let personal_kind = self
            .sessions
            .personal(msg.channel, msg.user_id)
            .map(|s| s.game.kind());
        if let Some(kind) = personal_kind {
            if kind == crate::games::GameKind::TwentyQuestions {
                return self.route_twenty_question(msg).await;
            }
            let target = SessionTarget::Personal(msg.channel, msg.user_id);
            let effects = {
                let Some(session) = self.sessions.personal_mut(msg.channel, msg.user_id) else {
                    return Ok(());
                };
                match &mut session.game {
                    PersonalGame::Wordle(game) => game.handle_guess(&msg.text),
                    PersonalGame::Hangman(game) => game.handle_guess(&msg.text),
                    PersonalGame::Quiz(game) => game.handle_answer(&msg.text),
                    // Handled above / via the interactive pick.
                    PersonalGame::TwentyQuestions(_) | PersonalGame::TwoTruths(_) => Vec::new(),
                }
            };
            return self.apply_effects(
                msg.channel,
                Some(msg.message_id),
                msg.user_id,
                &msg.user_name,
                effects,
                target,
            );
        }

        if let Some(session) = self.sessions.shared_mut(msg.channel) {
            let effects =
                session.handle_message(msg.user_id, &msg.user_name, &msg.text, Utc::now());
            return self.apply_effects(
                msg.channel,
                Some(msg.message_id),
                msg.user_id,
                &msg.user_name,
                effects,
                SessionTarget::Shared(msg.channel),
            );
        }
        Ok(())
    }

    /// Twenty-questions text path: the gateway answers the question, then
    /// the session is looked up again before any state is committed, since
    /// it may have been stopped while the call was in flight.
    async fn route_twenty_question(&mut self, msg: IncomingMessage) -> Result<()> {
        let target = SessionTarget::Personal(msg.channel, msg.user_id);

        let (secret, history, at_cap) = {
            let Some(session) = self.sessions.personal_mut(msg.channel, msg.user_id) else {
                return Ok(());
            };
            let PersonalGame::TwentyQuestions(game) = &session.game else {
                return Ok(());
            };
            if game.at_cap() {
                let effects = game.reveal_at_cap();
                return self.apply_effects(
                    msg.channel,
                    Some(msg.message_id),
                    msg.user_id,
                    &msg.user_name,
                    effects,
                    target,
                );
            }
            (game.secret.clone(), game.history.clone(), game.at_cap())
        };
        debug_assert!(!at_cap);

        let answer = self.gateway.answer_question(&secret, &history, &msg.text).await;

        if let Err(e) = &answer {
            self.ops_log("gateway.failure", &format!("twenty answer: {e}"));
        }

        // Optimistic re-validation: the session may be gone by now.
        let effects: Vec<Effect> = {
            let Some(session) = self.sessions.personal_mut(msg.channel, msg.user_id) else {
                return Ok(());
            };
            let PersonalGame::TwentyQuestions(game) = &mut session.game else {
                return Ok(());
            };
            match answer {
                Ok(answer) => game.note_exchange(&msg.text, &answer),
                Err(_) => game.generation_failed(),
            }
        };
        self.apply_effects(
            msg.channel,
            Some(msg.message_id),
            msg.user_id,
            &msg.user_name,
            effects,
            target,
        )
    }

    /// The same gates that block game starts also freeze play in flight:
    /// maintenance mode drops non-owner input, and input from a channel no
    /// longer on the allow-list is dropped too.
    fn play_suspended(&self, channel: ChannelId, user_id: UserId) -> Result<bool> {
        if self.store.maintenance_mode()? && user_id != self.config.bot.owner_id {
            return Ok(true);
        }
        let allowed = self.store.allowed_channels()?;
        Ok(!allowed.is_empty() && !allowed.contains(&channel))
    }

    /// Route an interactive pick. Only two-truths listens for these.
    pub(crate) fn route_choice(&mut self, choice: ChoiceEvent) -> Result<()> {
        if self.play_suspended(choice.channel, choice.user_id)? {
            return Ok(());
        }
        let effects = {
            let Some(session) = self.sessions.personal_mut(choice.channel, choice.user_id) else {
                return Ok(());
            };
            let PersonalGame::TwoTruths(game) = &mut session.game else {
                return Ok(());
            };
            game.choose(choice.index)
        };
        self.apply_effects(
            choice.channel,
            None,
            choice.user_id,
            &choice.user_name,
            effects,
            SessionTarget::Personal(choice.channel, choice.user_id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::session::{PersonalGame, PersonalSession};
    use crate::bot::{BotServer, OutgoingAction};
    use crate::config::Config;
    use crate::games::wordle::WordleGame;
    use crate::games::Difficulty;
    use tokio::sync::mpsc;

    const CHANNEL: u64 = 1;
    const PLAYER: u64 = 100;

    fn test_server(
        dir: &tempfile::TempDir,
    ) -> (BotServer, mpsc::UnboundedReceiver<OutgoingAction>) {
        let mut config = Config::default();
        config.bot.owner_id = 500;
        config.storage.data_dir = dir.path().to_string_lossy().to_string();
        let (actions_tx, actions_rx) = mpsc::unbounded_channel();
        let server = BotServer::new(config, actions_tx).unwrap();
        (server, actions_rx)
    }

    fn wordle_session() -> PersonalSession {
        PersonalSession {
            game: PersonalGame::Wordle(WordleGame::new("MOUSE", Difficulty::Normal, 6)),
            user_name: "player".to_string(),
        }
    }

    fn message(text: &str) -> IncomingMessage {
        IncomingMessage {
            channel: CHANNEL,
            message_id: 7,
            user_id: PLAYER,
            user_name: "player".to_string(),
            text: text.to_string(),
        }
    }

    fn wordle_attempts(server: &BotServer) -> u32 {
        match server.sessions.personal(CHANNEL, PLAYER).map(|s| &s.game) {
            Some(PersonalGame::Wordle(game)) => game.attempts,
            _ => panic!("wordle session missing"),
        }
    }

    #[tokio::test]
    async fn maintenance_freezes_play_mid_game() {
        let dir = tempfile::tempdir().unwrap();
        let (mut server, mut actions_rx) = test_server(&dir);
        server
            .sessions
            .put_personal(CHANNEL, PLAYER, wordle_session())
            .unwrap();

        server.store.set_maintenance_mode(true).unwrap();
        server.route_message(message("HOUSE")).await.unwrap();
        assert!(actions_rx.try_recv().is_err());
        assert_eq!(wordle_attempts(&server), 0);

        server.store.set_maintenance_mode(false).unwrap();
        server.route_message(message("HOUSE")).await.unwrap();
        assert!(actions_rx.try_recv().is_ok());
        assert_eq!(wordle_attempts(&server), 1);
    }

    #[tokio::test]
    async fn channel_removal_freezes_play_mid_game() {
        let dir = tempfile::tempdir().unwrap();
        let (mut server, mut actions_rx) = test_server(&dir);
        server
            .sessions
            .put_personal(CHANNEL, PLAYER, wordle_session())
            .unwrap();

        // The allow-list names some other channel; this one goes quiet.
        server.store.set_allowed_channels(&[999]).unwrap();
        server.route_message(message("HOUSE")).await.unwrap();
        assert!(actions_rx.try_recv().is_err());
        assert_eq!(wordle_attempts(&server), 0);

        server.store.set_allowed_channels(&[]).unwrap();
        server.route_message(message("HOUSE")).await.unwrap();
        assert!(actions_rx.try_recv().is_ok());
    }
}
