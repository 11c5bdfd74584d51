//! Two-truths-and-a-lie rule engine.
//!
//! Three gateway-generated statements, one of which is false. The player
//! gets a single bounded-time pick; a click guard keeps a duplicated
//! interaction from resolving the game twice.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::achievements::WinContext;
use crate::storage::ScoreDelta;

use super::Effect;

/// Points for spotting the lie. A flat reward: there is no difficulty
/// dimension to this game.
pub const WIN_POINTS: i64 = 5;

/// Statement set requested from the generation gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct StatementSet {
    pub statements: Vec<String>,
    pub lie_index: usize,
}

impl StatementSet {
    pub fn is_well_formed(&self) -> bool {
        self.statements.len() == 3
            && self.lie_index < 3
            && self.statements.iter().all(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct TwoTruthsGame {
    pub statements: Vec<String>,
    pub lie_index: usize,
    pub clicked: bool,
    pub started_at: DateTime<Utc>,
    pub timeout_seconds: u64,
}

impl TwoTruthsGame {
    pub fn new(set: StatementSet, timeout_seconds: u64) -> Self {
        TwoTruthsGame {
            statements: set.statements,
            lie_index: set.lie_index,
            clicked: false,
            started_at: Utc::now(),
            timeout_seconds,
        }
    }

    /// Numbered statement list for the channel.
    pub fn present(&self) -> String {
        let mut out = String::from("🤔 **Two truths and a lie**: which one is false?\n");
        for (i, statement) in self.statements.iter().enumerate() {
            out.push_str(&format!("**{}.** {}\n", i + 1, statement));
        }
        out
    }

    /// Whether the pick window has elapsed. Expired sessions are swept by
    /// the reaper and discarded without scoring.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.started_at > Duration::seconds(self.timeout_seconds as i64)
    }

    /// Resolve a pick of statement `index` (0-based). Either outcome is
    /// terminal; a second pick is ignored.
    pub fn choose(&mut self, index: usize) -> Vec<Effect> {
        if self.clicked || index >= self.statements.len() {
            return Vec::new();
        }
        self.clicked = true;

        if index == self.lie_index {
            vec![
                Effect::Reply(format!(
                    "✅ Exactly! Statement {} was the lie. (+{} pts)",
                    index + 1,
                    WIN_POINTS
                )),
                Effect::score_actor(
                    ScoreDelta {
                        points: WIN_POINTS,
                        ..Default::default()
                    },
                    WinContext::default(),
                ),
                Effect::OpsLog {
                    event: "truths.win",
                    detail: format!("lie_index={}", self.lie_index),
                },
                Effect::EndSession,
            ]
        } else {
            vec![
                Effect::Reply(format!(
                    "❌ Not quite. The lie was statement {}.",
                    self.lie_index + 1
                )),
                Effect::OpsLog {
                    event: "truths.loss",
                    detail: format!("picked={} lie_index={}", index, self.lie_index),
                },
                Effect::EndSession,
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> StatementSet {
        StatementSet {
            statements: vec![
                "Honey never spoils.".to_string(),
                "Octopuses have three hearts.".to_string(),
                "Goldfish have a three-second memory.".to_string(),
            ],
            lie_index: 2,
        }
    }

    #[test]
    fn correct_pick_scores_and_ends() {
        let mut game = TwoTruthsGame::new(sample_set(), 180);
        let effects = game.choose(2);
        assert!(game.clicked);
        let points = effects.iter().find_map(|e| match e {
            Effect::Score { delta, .. } => Some(delta.points),
            _ => None,
        });
        assert_eq!(points, Some(WIN_POINTS));
        assert!(effects.iter().any(|e| matches!(e, Effect::EndSession)));
    }

    #[test]
    fn wrong_pick_reveals_without_score() {
        let mut game = TwoTruthsGame::new(sample_set(), 180);
        let effects = game.choose(0);
        assert!(effects.iter().any(
            |e| matches!(e, Effect::Reply(text) if text.contains("statement 3"))
        ));
        assert!(!effects.iter().any(|e| matches!(e, Effect::Score { .. })));
        assert!(effects.iter().any(|e| matches!(e, Effect::EndSession)));
    }

    #[test]
    fn click_guard_blocks_second_resolution() {
        let mut game = TwoTruthsGame::new(sample_set(), 180);
        assert!(!game.choose(2).is_empty());
        assert!(game.choose(2).is_empty());
        assert!(game.choose(0).is_empty());
    }

    #[test]
    fn out_of_range_pick_ignored() {
        let mut game = TwoTruthsGame::new(sample_set(), 180);
        assert!(game.choose(3).is_empty());
        assert!(!game.clicked);
    }

    #[test]
    fn expiry_follows_time_bound() {
        let mut game = TwoTruthsGame::new(sample_set(), 180);
        game.started_at = Utc::now() - Duration::seconds(181);
        assert!(game.is_expired(Utc::now()));
        game.started_at = Utc::now() - Duration::seconds(179);
        assert!(!game.is_expired(Utc::now()));
    }

    #[test]
    fn statement_shape_validation() {
        assert!(sample_set().is_well_formed());
        let mut set = sample_set();
        set.lie_index = 3;
        assert!(!set.is_well_formed());
        let mut set = sample_set();
        set.statements.pop();
        assert!(!set.is_well_formed());
    }
}
