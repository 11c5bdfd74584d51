//! Shared-session rule engines: association chain, collaborative story,
//! and taboo. One shared session per channel; every channel member plays
//! in the same state.
//!
//! Association and story enforce turn alternation: a contribution from the
//! same identity as the last contributor is dropped silently. Taboo splits
//! the channel into the describer and everyone else and scans messages for
//! the keyword and forbidden words on word boundaries.

use chrono::{DateTime, Utc};

use crate::achievements::WinContext;
use crate::storage::ScoreDelta;

use super::{Effect, GameKind, Scoree};

/// Points each side earns when a taboo keyword is guessed.
pub const TABOO_WIN_POINTS: i64 = 15;

#[derive(Debug, Clone)]
pub enum SharedGame {
    Association {
        chain: Vec<String>,
    },
    Story {
        opening: String,
        contributions: Vec<String>,
    },
    Taboo {
        keyword: String,
        forbidden: Vec<String>,
        describer_id: u64,
        describer_name: String,
    },
}

impl SharedGame {
    pub fn kind(&self) -> GameKind {
        match self {
            SharedGame::Association { .. } => GameKind::Association,
            SharedGame::Story { .. } => GameKind::Story,
            SharedGame::Taboo { .. } => GameKind::Taboo,
        }
    }
}

/// Lowercased word tokens, split on anything non-alphanumeric.
fn word_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
pub struct SharedSession {
    pub game: SharedGame,
    pub last_actor: Option<u64>,
    pub last_activity: DateTime<Utc>,
}

impl SharedSession {
    pub fn new(game: SharedGame, now: DateTime<Utc>) -> Self {
        SharedSession {
            game,
            last_actor: None,
            last_activity: now,
        }
    }

    /// Idle time in seconds as seen by the reaper.
    pub fn idle_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_activity).num_seconds()
    }

    /// Route one channel message into the active shared game.
    pub fn handle_message(
        &mut self,
        user_id: u64,
        user_name: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Vec<Effect> {
        match &mut self.game {
            SharedGame::Association { chain } => {
                if self.last_actor == Some(user_id) {
                    return Vec::new();
                }
                let word = text.trim();
                if word.is_empty()
                    || word.contains(char::is_whitespace)
                    || !word.chars().all(char::is_alphabetic)
                {
                    return Vec::new();
                }
                let upper = word.to_uppercase();
                // Repeats are dropped like any other malformed contribution.
                if chain.contains(&upper) {
                    return Vec::new();
                }
                chain.push(upper);
                self.last_actor = Some(user_id);
                self.last_activity = now;
                vec![Effect::React('✅')]
            }
            SharedGame::Story { contributions, .. } => {
                if self.last_actor == Some(user_id) {
                    return Vec::new();
                }
                if text.trim().is_empty() {
                    return Vec::new();
                }
                contributions.push(text.trim().to_string());
                self.last_actor = Some(user_id);
                self.last_activity = now;
                vec![
                    Effect::React('✅'),
                    Effect::score_actor(
                        ScoreDelta {
                            story_post: true,
                            ..Default::default()
                        },
                        WinContext::default(),
                    ),
                ]
            }
            SharedGame::Taboo {
                keyword,
                forbidden,
                describer_id,
                describer_name,
            } => {
                let tokens = word_tokens(text);
                let keyword_lower = keyword.to_lowercase();

                if user_id == *describer_id {
                    // The keyword itself counts as forbidden for the
                    // describer's own messages.
                    let tripped = forbidden
                        .iter()
                        .map(|w| w.to_lowercase())
                        .chain(std::iter::once(keyword_lower))
                        .find(|w| tokens.contains(w));
                    if let Some(word) = tripped {
                        return vec![
                            Effect::Announce(format!(
                                "🚨 **{}** used the forbidden word **{}**! The keyword was **{}**. Game over.",
                                user_name,
                                word.to_uppercase(),
                                keyword
                            )),
                            Effect::OpsLog {
                                event: "taboo.forfeit",
                                detail: format!("keyword={} tripped={}", keyword, word),
                            },
                            Effect::EndSession,
                        ];
                    }
                    Vec::new()
                } else if tokens.contains(&keyword_lower) {
                    vec![
                        Effect::Announce(format!(
                            "🎉 **{}** guessed the keyword **{}**! +{} pts for the guesser and the describer.",
                            user_name, keyword, TABOO_WIN_POINTS
                        )),
                        Effect::score_actor(
                            ScoreDelta {
                                points: TABOO_WIN_POINTS,
                                ..Default::default()
                            },
                            WinContext {
                                taboo_win: true,
                                ..Default::default()
                            },
                        ),
                        Effect::Score {
                            recipient: Scoree::Player {
                                user_id: *describer_id,
                                user_name: describer_name.clone(),
                            },
                            delta: ScoreDelta {
                                points: TABOO_WIN_POINTS,
                                ..Default::default()
                            },
                            context: WinContext {
                                taboo_win: true,
                                ..Default::default()
                            },
                        },
                        Effect::OpsLog {
                            event: "taboo.win",
                            detail: format!("keyword={} guesser={}", keyword, user_name),
                        },
                        Effect::EndSession,
                    ]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Apply a reaper-synthesized continuation. Runs through the same
    /// last-actor bookkeeping as a player contribution so turn alternation
    /// stays intact, but never scores.
    pub fn apply_synthetic_move(&mut self, bot_id: u64, text: &str, now: DateTime<Utc>) -> bool {
        match &mut self.game {
            SharedGame::Association { chain } => {
                let upper = text.trim().to_uppercase();
                if upper.is_empty() || chain.contains(&upper) {
                    return false;
                }
                chain.push(upper);
            }
            SharedGame::Story { contributions, .. } => {
                if text.trim().is_empty() {
                    return false;
                }
                contributions.push(text.trim().to_string());
            }
            SharedGame::Taboo { .. } => return false,
        }
        self.last_actor = Some(bot_id);
        self.last_activity = now;
        true
    }

    /// The full story text, opening included. Used by the story-end
    /// command; empty for the other variants.
    pub fn story_text(&self) -> Option<String> {
        match &self.game {
            SharedGame::Story {
                opening,
                contributions,
            } => {
                let mut parts = vec![opening.clone()];
                parts.extend(contributions.iter().cloned());
                Some(parts.join(" "))
            }
            _ => None,
        }
    }
}
