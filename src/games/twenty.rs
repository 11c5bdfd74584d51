//! Twenty-questions rule engine.
//!
//! The player asks free-text yes/no questions about a secret object; the
//! gateway produces the answers. The question counter only advances on a
//! successful exchange, so a failed generation call never costs a question.
//! A separate final-guess action compares normalized text to the secret.

use crate::achievements::WinContext;
use crate::storage::ScoreDelta;

use super::{Difficulty, Effect};

/// Case- and whitespace-normalized form used for the final comparison.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

#[derive(Debug, Clone)]
pub struct TwentyQuestionsGame {
    pub secret: String,
    pub questions_asked: u32,
    pub question_cap: u32,
    pub history: Vec<(String, String)>,
    pub hint_used: bool,
}

impl TwentyQuestionsGame {
    pub fn new(secret: &str, question_cap: u32) -> Self {
        TwentyQuestionsGame {
            secret: normalize(secret),
            questions_asked: 0,
            question_cap,
            history: Vec::new(),
            hint_used: false,
        }
    }

    /// True once the question budget is spent; the next question attempt
    /// reveals the secret instead of being answered.
    pub fn at_cap(&self) -> bool {
        self.questions_asked >= self.question_cap
    }

    /// Effects for a question attempt that arrives at the cap.
    pub fn reveal_at_cap(&self) -> Vec<Effect> {
        vec![
            Effect::Reply(format!(
                "⌛ Out of questions! The answer was **{}**.",
                self.secret
            )),
            Effect::OpsLog {
                event: "twenty.loss",
                detail: format!("secret={} reason=question-cap", self.secret),
            },
            Effect::EndSession,
        ]
    }

    /// Record one successful question/answer exchange. Called only after
    /// the gateway produced an answer, so the counter never needs to be
    /// rolled back.
    pub fn note_exchange(&mut self, question: &str, answer: &str) -> Vec<Effect> {
        self.questions_asked += 1;
        self.history
            .push((question.to_string(), answer.to_string()));
        vec![Effect::Reply(format!(
            "`Q {}/{}`: **{}**",
            self.questions_asked, self.question_cap, answer
        ))]
    }

    /// User-visible transient error for a failed generation call. The
    /// session state is untouched.
    pub fn generation_failed(&self) -> Vec<Effect> {
        vec![Effect::Reply(
            "Something went wrong answering that, try again...".to_string(),
        )]
    }

    /// One-shot hint: immediately costs two questions; the clue text comes
    /// from the gateway afterwards.
    pub fn charge_hint(&mut self) {
        self.hint_used = true;
        self.questions_asked += 2;
    }

    /// Compare a final guess against the secret. A match wins and ends the
    /// session; a miss costs one question and the game continues.
    pub fn final_guess(&mut self, attempt: &str) -> Vec<Effect> {
        if normalize(attempt) == self.secret {
            let points = Difficulty::Normal.base_points() + 10;
            vec![
                Effect::Announce(format!(
                    "🎉 Incredible! The answer was **{}**! (+{} pts)",
                    self.secret, points
                )),
                Effect::score_actor(
                    ScoreDelta {
                        points,
                        ..Default::default()
                    },
                    WinContext {
                        twenty_win: true,
                        questions_asked: Some(self.questions_asked),
                        ..Default::default()
                    },
                ),
                Effect::OpsLog {
                    event: "twenty.win",
                    detail: format!(
                        "secret={} questions={} points={}",
                        self.secret, self.questions_asked, points
                    ),
                },
                Effect::EndSession,
            ]
        } else {
            self.questions_asked += 1;
            vec![Effect::Reply(format!(
                "❌ No, it is not **{}**. (Question {}/{})",
                normalize(attempt),
                self.questions_asked,
                self.question_cap
            ))]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_generation_leaves_counter_untouched() {
        let mut game = TwentyQuestionsGame::new("bicycle", 20);
        for n in 1..=4 {
            let effects = game.note_exchange("is it alive?", "NO");
            assert_eq!(game.questions_asked, n);
            assert_eq!(effects.len(), 1);
        }
        // Question 5 fails at the gateway: no exchange is recorded.
        let effects = game.generation_failed();
        assert_eq!(game.questions_asked, 4);
        assert!(matches!(effects[0], Effect::Reply(_)));
        assert_eq!(game.history.len(), 4);
    }

    #[test]
    fn cap_reveals_secret() {
        let mut game = TwentyQuestionsGame::new("bicycle", 2);
        game.note_exchange("q1", "YES");
        game.note_exchange("q2", "NO");
        assert!(game.at_cap());
        let effects = game.reveal_at_cap();
        assert!(effects.iter().any(
            |e| matches!(e, Effect::Reply(text) if text.contains("BICYCLE"))
        ));
        assert!(effects.iter().any(|e| matches!(e, Effect::EndSession)));
    }

    #[test]
    fn final_guess_normalizes_case_and_spaces() {
        let mut game = TwentyQuestionsGame::new("  Fire   Truck ", 20);
        game.note_exchange("big?", "YES");
        let effects = game.final_guess("fire truck");
        let ctx = effects.iter().find_map(|e| match e {
            Effect::Score { delta, context, .. } => Some((delta.points, context.clone())),
            _ => None,
        });
        let (points, ctx) = ctx.expect("score effect");
        assert_eq!(points, 25); // 15 base + 10
        assert!(ctx.twenty_win);
        assert_eq!(ctx.questions_asked, Some(1));
        assert!(effects.iter().any(|e| matches!(e, Effect::EndSession)));
    }

    #[test]
    fn wrong_final_guess_costs_a_question() {
        let mut game = TwentyQuestionsGame::new("bicycle", 20);
        let effects = game.final_guess("tricycle");
        assert_eq!(game.questions_asked, 1);
        assert!(!effects.iter().any(|e| matches!(e, Effect::EndSession)));
    }

    #[test]
    fn hint_costs_two_questions() {
        let mut game = TwentyQuestionsGame::new("bicycle", 20);
        game.charge_hint();
        assert!(game.hint_used);
        assert_eq!(game.questions_asked, 2);
    }
}
