//! Static achievement catalog and the unlock evaluator.
//!
//! The catalog is a process-wide constant; only the unlock set is durable.
//! The evaluator is idempotent: every predicate is checked on every relevant
//! event, and the store's insert-once guarantee makes sure the reward grant
//! and announcement fire exactly once per (player, achievement) pair.

use crate::storage::{StorageError, Store};

/// One entry of the immutable achievement table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Reward points granted when the achievement is first unlocked.
    pub points: i64,
}

pub const CATALOG: &[AchievementDef] = &[
    AchievementDef {
        id: "FIRST_WIN",
        name: "First Steps",
        description: "Win your first game!",
        points: 10,
    },
    AchievementDef {
        id: "WORDLE_PRO",
        name: "Word Wizard",
        description: "Guess the word in 2 attempts.",
        points: 50,
    },
    AchievementDef {
        id: "QUIZ_MASTER",
        name: "Brains of the Operation",
        description: "Win 5 quiz games.",
        points: 25,
    },
    AchievementDef {
        id: "DETECTIVE",
        name: "Master of Deduction",
        description: "Win twenty questions in 10 questions or fewer.",
        points: 30,
    },
    AchievementDef {
        id: "SOCIALITE",
        name: "Life of the Party",
        description: "Win a game of taboo.",
        points: 20,
    },
    AchievementDef {
        id: "SCRIBE",
        name: "Storyteller",
        description: "Add 5 sentences to collaborative stories.",
        points: 15,
    },
];

/// Look up a catalog entry by id.
pub fn by_id(id: &str) -> Option<&'static AchievementDef> {
    CATALOG.iter().find(|def| def.id == id)
}

/// Per-event context the evaluator sees in addition to durable statistics.
/// Carries the transient facts (attempts used, questions asked, win flags)
/// that never reach the player record.
#[derive(Debug, Clone, Default)]
pub struct WinContext {
    pub wordle_attempts: Option<u32>,
    pub questions_asked: Option<u32>,
    pub twenty_win: bool,
    pub taboo_win: bool,
}

/// Check every achievement predicate against the player's current stats and
/// the event context, recording unlocks through the store. Returns the
/// definitions that were newly unlocked in this pass; the caller grants
/// reward points and announces them.
///
/// Must run after the score/counter mutation the predicates read; the
/// first-win and counter-threshold checks depend on the updated totals.
pub fn evaluate(
    store: &Store,
    user_id: u64,
    ctx: &WinContext,
) -> Result<Vec<&'static AchievementDef>, StorageError> {
    let Some(stats) = store.get_player(user_id)? else {
        return Ok(Vec::new());
    };

    let mut newly = Vec::new();
    for def in CATALOG {
        let met = match def.id {
            "FIRST_WIN" => stats.total_wins() >= 1,
            "WORDLE_PRO" => ctx.wordle_attempts == Some(2),
            "QUIZ_MASTER" => stats.quiz_wins >= 5,
            "DETECTIVE" => {
                ctx.twenty_win && ctx.questions_asked.is_some_and(|asked| asked <= 10)
            }
            "SOCIALITE" => ctx.taboo_win,
            "SCRIBE" => stats.story_posts >= 5,
            _ => false,
        };
        if met && store.grant_unlock(user_id, def.id)? {
            newly.push(def);
        }
    }

    Ok(newly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ScoreDelta;
    use tempfile::tempdir;

    fn open_store() -> (tempfile::TempDir, Store) {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn no_stats_means_no_unlocks() {
        let (_dir, store) = open_store();
        let newly = evaluate(&store, 404, &WinContext::default()).unwrap();
        assert!(newly.is_empty());
    }

    #[test]
    fn first_win_unlocks_once() {
        let (_dir, store) = open_store();
        store
            .adjust_score(
                1,
                "alice",
                &ScoreDelta {
                    points: 15,
                    wordle_win: true,
                    ..Default::default()
                },
            )
            .unwrap();

        let first = evaluate(&store, 1, &WinContext::default()).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, "FIRST_WIN");

        // Identical statistics, second pass: no new reward.
        let second = evaluate(&store, 1, &WinContext::default()).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn one_event_can_unlock_multiple() {
        let (_dir, store) = open_store();
        store
            .adjust_score(
                2,
                "bob",
                &ScoreDelta {
                    points: 20,
                    wordle_win: true,
                    ..Default::default()
                },
            )
            .unwrap();
        let ctx = WinContext {
            wordle_attempts: Some(2),
            ..Default::default()
        };
        let newly = evaluate(&store, 2, &ctx).unwrap();
        let ids: Vec<_> = newly.iter().map(|def| def.id).collect();
        assert!(ids.contains(&"FIRST_WIN"));
        assert!(ids.contains(&"WORDLE_PRO"));
    }

    #[test]
    fn quiz_master_needs_five_wins() {
        let (_dir, store) = open_store();
        for _ in 0..4 {
            store
                .adjust_score(
                    3,
                    "carol",
                    &ScoreDelta {
                        points: 15,
                        quiz_win: true,
                        ..Default::default()
                    },
                )
                .unwrap();
        }
        let newly = evaluate(&store, 3, &WinContext::default()).unwrap();
        assert!(!newly.iter().any(|def| def.id == "QUIZ_MASTER"));

        store
            .adjust_score(
                3,
                "carol",
                &ScoreDelta {
                    points: 15,
                    quiz_win: true,
                    ..Default::default()
                },
            )
            .unwrap();
        let newly = evaluate(&store, 3, &WinContext::default()).unwrap();
        assert!(newly.iter().any(|def| def.id == "QUIZ_MASTER"));
    }

    #[test]
    fn detective_requires_question_budget() {
        let (_dir, store) = open_store();
        store
            .adjust_score(4, "dan", &ScoreDelta { points: 25, ..Default::default() })
            .unwrap();

        let slow = WinContext {
            twenty_win: true,
            questions_asked: Some(15),
            ..Default::default()
        };
        assert!(!evaluate(&store, 4, &slow)
            .unwrap()
            .iter()
            .any(|def| def.id == "DETECTIVE"));

        let sharp = WinContext {
            twenty_win: true,
            questions_asked: Some(9),
            ..Default::default()
        };
        assert!(evaluate(&store, 4, &sharp)
            .unwrap()
            .iter()
            .any(|def| def.id == "DETECTIVE"));
    }

    #[test]
    fn catalog_ids_are_unique() {
        for def in CATALOG {
            assert_eq!(
                CATALOG.iter().filter(|d| d.id == def.id).count(),
                1,
                "duplicate id {}",
                def.id
            );
        }
    }
}
