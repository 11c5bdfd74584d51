//! Quiz rule engine.
//!
//! One gateway-generated question with four labeled options. The first
//! message matching a label (case-insensitively) resolves the game; any
//! other input, or input after resolution, is ignored.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::achievements::WinContext;
use crate::storage::ScoreDelta;

use super::{Difficulty, Effect};

pub const ANSWER_LABELS: [&str; 4] = ["A", "B", "C", "D"];

/// Structured question shape requested from the generation gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub answers: BTreeMap<String, String>,
    pub correct_answer: String,
}

impl QuizQuestion {
    /// A generated question is usable only when it carries all four labels
    /// and the correct label is one of them.
    pub fn is_well_formed(&self) -> bool {
        ANSWER_LABELS.iter().all(|l| self.answers.contains_key(*l))
            && ANSWER_LABELS.contains(&self.correct_answer.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct QuizGame {
    pub question: QuizQuestion,
    pub answered: bool,
    pub difficulty: Difficulty,
    pub category: String,
}

impl QuizGame {
    pub fn new(question: QuizQuestion, difficulty: Difficulty, category: &str) -> Self {
        QuizGame {
            question,
            answered: false,
            difficulty,
            category: category.to_string(),
        }
    }

    /// Question text plus the four options, formatted for the channel.
    pub fn present(&self) -> String {
        let mut out = format!("🧠 **Quiz: {}**\n{}\n", self.category, self.question.question);
        for label in ANSWER_LABELS {
            if let Some(text) = self.question.answers.get(label) {
                out.push_str(&format!("**{}**: {}\n", label, text));
            }
        }
        out
    }

    /// Resolve the game on a label match. Non-label input and any input
    /// after the answered flag is set are ignored.
    pub fn handle_answer(&mut self, raw: &str) -> Vec<Effect> {
        let guess = raw.trim().to_uppercase();
        if self.answered || !ANSWER_LABELS.contains(&guess.as_str()) {
            return Vec::new();
        }
        self.answered = true;

        let correct = &self.question.correct_answer;
        let mut effects = Vec::new();
        if guess == *correct {
            let points = self.difficulty.base_points();
            effects.push(Effect::Reply(format!("✅ Correct! (+{} pts)", points)));
            effects.push(Effect::score_actor(
                ScoreDelta {
                    points,
                    quiz_win: true,
                    ..Default::default()
                },
                WinContext::default(),
            ));
            effects.push(Effect::OpsLog {
                event: "quiz.win",
                detail: format!("category={} points={}", self.category, points),
            });
        } else {
            let correct_text = self
                .question
                .answers
                .get(correct)
                .map(String::as_str)
                .unwrap_or("?");
            effects.push(Effect::Reply(format!(
                "❌ Wrong answer. Correct: **{}: {}**.",
                correct, correct_text
            )));
            effects.push(Effect::OpsLog {
                event: "quiz.loss",
                detail: format!("category={} answered={} correct={}", self.category, guess, correct),
            });
        }
        effects.push(Effect::EndSession);
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question() -> QuizQuestion {
        let answers: BTreeMap<String, String> = [
            ("A", "Mercury"),
            ("B", "Venus"),
            ("C", "Mars"),
            ("D", "Jupiter"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        QuizQuestion {
            question: "Which planet is closest to the sun?".to_string(),
            answers,
            correct_answer: "A".to_string(),
        }
    }

    #[test]
    fn correct_answer_scores_and_ends() {
        let mut game = QuizGame::new(sample_question(), Difficulty::Hard, "space");
        let effects = game.handle_answer("a");
        assert!(game.answered);
        let points = effects.iter().find_map(|e| match e {
            Effect::Score { delta, .. } => Some((delta.points, delta.quiz_win)),
            _ => None,
        });
        assert_eq!(points, Some((25, true)));
        assert!(effects.iter().any(|e| matches!(e, Effect::EndSession)));
    }

    #[test]
    fn wrong_answer_reveals_and_ends_without_score() {
        let mut game = QuizGame::new(sample_question(), Difficulty::Normal, "space");
        let effects = game.handle_answer("D");
        assert!(effects.iter().any(
            |e| matches!(e, Effect::Reply(text) if text.contains("A: Mercury"))
        ));
        assert!(!effects.iter().any(|e| matches!(e, Effect::Score { .. })));
        assert!(effects.iter().any(|e| matches!(e, Effect::EndSession)));
    }

    #[test]
    fn non_label_and_post_answer_input_ignored() {
        let mut game = QuizGame::new(sample_question(), Difficulty::Normal, "space");
        assert!(game.handle_answer("E").is_empty());
        assert!(game.handle_answer("the sun").is_empty());
        assert!(!game.answered);
        game.handle_answer("B");
        assert!(game.handle_answer("A").is_empty());
    }

    #[test]
    fn question_shape_validation() {
        let mut q = sample_question();
        assert!(q.is_well_formed());
        q.correct_answer = "E".to_string();
        assert!(!q.is_well_formed());
        let mut q = sample_question();
        q.answers.remove("C");
        assert!(!q.is_well_formed());
    }

    #[test]
    fn parses_gateway_json() {
        let raw = r#"{
            "question": "2+2?",
            "answers": {"A": "3", "B": "4", "C": "5", "D": "6"},
            "correct_answer": "B"
        }"#;
        let parsed: QuizQuestion = serde_json::from_str(raw).unwrap();
        assert!(parsed.is_well_formed());
        assert_eq!(parsed.answers["B"], "4");
    }
}
