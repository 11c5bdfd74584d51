//! Session Store: live game state for personal and shared sessions.
//!
//! Personal sessions are keyed by `(channel, player)` so one player can run
//! at most one personal game per channel; shared sessions are keyed by
//! channel alone. The store is plain owned state inside [`super::BotServer`]
//! and is only ever touched from the single event-loop task.

use std::collections::HashMap;

use crate::games::hangman::HangmanGame;
use crate::games::quiz::QuizGame;
use crate::games::shared::SharedSession;
use crate::games::truths::TwoTruthsGame;
use crate::games::twenty::TwentyQuestionsGame;
use crate::games::wordle::WordleGame;
use crate::games::GameKind;

use super::{ChannelId, UserId};

/// One live personal game. Exactly one engine per variant.
#[derive(Debug, Clone)]
pub enum PersonalGame {
    Wordle(WordleGame),
    Hangman(HangmanGame),
    Quiz(QuizGame),
    TwentyQuestions(TwentyQuestionsGame),
    TwoTruths(TwoTruthsGame),
}

impl PersonalGame {
    pub fn kind(&self) -> GameKind {
        match self {
            PersonalGame::Wordle(_) => GameKind::Wordle,
            PersonalGame::Hangman(_) => GameKind::Hangman,
            PersonalGame::Quiz(_) => GameKind::Quiz,
            PersonalGame::TwentyQuestions(_) => GameKind::TwentyQuestions,
            PersonalGame::TwoTruths(_) => GameKind::TwoTruths,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PersonalSession {
    pub game: PersonalGame,
    pub user_name: String,
}

/// Returned when a start attempt finds the key already occupied. The
/// existing session is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyActive(pub GameKind);

#[derive(Default)]
pub struct SessionStore {
    personal: HashMap<(ChannelId, UserId), PersonalSession>,
    shared: HashMap<ChannelId, SharedSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn personal(&self, channel: ChannelId, user: UserId) -> Option<&PersonalSession> {
        self.personal.get(&(channel, user))
    }

    pub fn personal_mut(&mut self, channel: ChannelId, user: UserId) -> Option<&mut PersonalSession> {
        self.personal.get_mut(&(channel, user))
    }

    /// Register a personal session, refusing if the key is occupied.
    pub fn put_personal(
        &mut self,
        channel: ChannelId,
        user: UserId,
        session: PersonalSession,
    ) -> Result<(), AlreadyActive> {
        match self.personal.entry((channel, user)) {
            std::collections::hash_map::Entry::Occupied(existing) => {
                Err(AlreadyActive(existing.get().game.kind()))
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(session);
                Ok(())
            }
        }
    }

    pub fn remove_personal(&mut self, channel: ChannelId, user: UserId) -> Option<PersonalSession> {
        self.personal.remove(&(channel, user))
    }

    pub fn shared(&self, channel: ChannelId) -> Option<&SharedSession> {
        self.shared.get(&channel)
    }

    pub fn shared_mut(&mut self, channel: ChannelId) -> Option<&mut SharedSession> {
        self.shared.get_mut(&channel)
    }

    /// Register a shared session, refusing if the channel already hosts one.
    pub fn put_shared(
        &mut self,
        channel: ChannelId,
        session: SharedSession,
    ) -> Result<(), AlreadyActive> {
        match self.shared.entry(channel) {
            std::collections::hash_map::Entry::Occupied(existing) => {
                Err(AlreadyActive(existing.get().game.kind()))
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(session);
                Ok(())
            }
        }
    }

    pub fn remove_shared(&mut self, channel: ChannelId) -> Option<SharedSession> {
        self.shared.remove(&channel)
    }

    /// Channels with a live shared session, for the reaper sweep.
    pub fn shared_channels(&self) -> Vec<ChannelId> {
        self.shared.keys().copied().collect()
    }

    /// Personal-session keys, for the two-truths expiry sweep.
    pub fn personal_keys(&self) -> Vec<(ChannelId, UserId)> {
        self.personal.keys().copied().collect()
    }

    pub fn personal_count(&self) -> usize {
        self.personal.len()
    }

    pub fn shared_count(&self) -> usize {
        self.shared.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::wordle::WordleGame;
    use crate::games::Difficulty;

    fn wordle_session(name: &str) -> PersonalSession {
        PersonalSession {
            game: PersonalGame::Wordle(WordleGame::new("MOUSE", Difficulty::Normal, 6)),
            user_name: name.to_string(),
        }
    }

    #[test]
    fn second_start_rejected_without_clobbering() {
        let mut store = SessionStore::new();
        store.put_personal(1, 10, wordle_session("Ada")).unwrap();
        let err = store
            .put_personal(1, 10, wordle_session("Imposter"))
            .unwrap_err();
        assert_eq!(err, AlreadyActive(GameKind::Wordle));
        assert_eq!(store.personal(1, 10).unwrap().user_name, "Ada");
    }

    #[test]
    fn keys_are_per_channel_and_player() {
        let mut store = SessionStore::new();
        store.put_personal(1, 10, wordle_session("Ada")).unwrap();
        store.put_personal(1, 11, wordle_session("Grace")).unwrap();
        store.put_personal(2, 10, wordle_session("Ada")).unwrap();
        assert_eq!(store.personal_count(), 3);
        assert!(store.remove_personal(1, 10).is_some());
        assert!(store.remove_personal(1, 10).is_none());
    }

    #[test]
    fn one_shared_session_per_channel() {
        use crate::games::shared::SharedGame;
        use chrono::Utc;

        let mut store = SessionStore::new();
        let session = SharedSession::new(SharedGame::Association { chain: vec![] }, Utc::now());
        store.put_shared(5, session.clone()).unwrap();
        let err = store.put_shared(5, session).unwrap_err();
        assert_eq!(err, AlreadyActive(GameKind::Association));
        assert_eq!(store.shared_channels(), vec![5]);
    }
}
