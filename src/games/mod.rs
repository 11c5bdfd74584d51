//! # Game Catalog and Rule Engine Support Types
//!
//! The catalog of game types is closed: each variant of [`GameKind`] has
//! exactly one rule engine, and routing is matched exhaustively so a new
//! game type cannot be added without handling it everywhere.
//!
//! Rule engines are pure. They consume an inbound action (plus any text the
//! gateway already produced) and return [`Effect`]s; the server applies the
//! effects: sending messages, persisting score deltas, running the
//! achievement evaluator, and removing finished sessions.

use std::fmt;
use std::str::FromStr;

use crate::achievements::WinContext;
use crate::storage::ScoreDelta;

pub mod hangman;
pub mod quiz;
pub mod shared;
pub mod truths;
pub mod twenty;
pub mod wordle;

/// Fixed catalog of game types. Not data-driven by design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKind {
    Wordle,
    Hangman,
    Quiz,
    TwentyQuestions,
    TwoTruths,
    Association,
    Story,
    Taboo,
}

impl GameKind {
    pub const ALL: [GameKind; 8] = [
        GameKind::Wordle,
        GameKind::Hangman,
        GameKind::Quiz,
        GameKind::TwentyQuestions,
        GameKind::TwoTruths,
        GameKind::Association,
        GameKind::Story,
        GameKind::Taboo,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            GameKind::Wordle => "wordle",
            GameKind::Hangman => "hangman",
            GameKind::Quiz => "quiz",
            GameKind::TwentyQuestions => "twenty-questions",
            GameKind::TwoTruths => "two-truths",
            GameKind::Association => "association",
            GameKind::Story => "story",
            GameKind::Taboo => "taboo",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            GameKind::Wordle => "Wordle",
            GameKind::Hangman => "Hangman",
            GameKind::Quiz => "Quiz",
            GameKind::TwentyQuestions => "Twenty Questions",
            GameKind::TwoTruths => "Two Truths and a Lie",
            GameKind::Association => "Word Association",
            GameKind::Story => "Collaborative Story",
            GameKind::Taboo => "Taboo",
        }
    }

    /// Personal games are keyed by (channel, player); the rest are shared
    /// channel-wide.
    pub fn is_personal(self) -> bool {
        matches!(
            self,
            GameKind::Wordle
                | GameKind::Hangman
                | GameKind::Quiz
                | GameKind::TwentyQuestions
                | GameKind::TwoTruths
        )
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Difficulty level for word and quiz games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// Base points awarded for a win at this difficulty.
    pub fn base_points(self) -> i64 {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Normal => 15,
            Difficulty::Hard => 25,
        }
    }

    /// Adjective used when prompting the gateway for content.
    pub fn prompt_adjective(self) -> &'static str {
        match self {
            Difficulty::Easy => "common, everyday",
            Difficulty::Normal => "reasonably common",
            Difficulty::Hard => "rare",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {}", other)),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        };
        f.write_str(label)
    }
}

/// Who a score effect applies to. Engines usually score the acting player;
/// taboo also scores the describer by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scoree {
    Actor,
    Player { user_id: u64, user_name: String },
}

/// Outbound side effects produced by a rule engine for one action.
/// Applied in order by the server; `EndSession` removes the session after
/// the preceding effects have been handled.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Reply to the triggering message in its channel.
    Reply(String),
    /// Plain message to the session's channel.
    Announce(String),
    /// Emoji reaction on the triggering message.
    React(char),
    /// Additive score/counter update followed by an achievement pass.
    Score {
        recipient: Scoree,
        delta: ScoreDelta,
        context: WinContext,
    },
    /// Notice for the operational log channel.
    OpsLog {
        event: &'static str,
        detail: String,
    },
    /// The game is over; remove the session.
    EndSession,
}

impl Effect {
    /// Convenience constructor for a score effect on the acting player.
    pub fn score_actor(delta: ScoreDelta, context: WinContext) -> Effect {
        Effect::Score {
            recipient: Scoree::Actor,
            delta,
            context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_points_match_table() {
        assert_eq!(Difficulty::Easy.base_points(), 10);
        assert_eq!(Difficulty::Normal.base_points(), 15);
        assert_eq!(Difficulty::Hard.base_points(), 25);
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(" easy ".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn catalog_split_between_personal_and_shared() {
        let personal = GameKind::ALL.iter().filter(|k| k.is_personal()).count();
        assert_eq!(personal, 5);
        assert_eq!(GameKind::ALL.len() - personal, 3);
    }
}
