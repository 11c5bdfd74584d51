//! Letter-guess rule engine (hangman-style).
//!
//! Single-letter guesses accumulate in a set; wrong guesses advance the
//! gallows. The word is won when every letter is covered, lost when the
//! wrong-guess budget is spent. Malformed input is ignored silently.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;

use crate::achievements::WinContext;
use crate::storage::ScoreDelta;

use super::{Difficulty, Effect};

const GALLOWS: [&str; 7] = [
    "  +---+\n  |   |\n      |\n      |\n      |\n      |\n===",
    "  +---+\n  |   |\n  O   |\n      |\n      |\n      |\n===",
    "  +---+\n  |   |\n  O   |\n  |   |\n      |\n      |\n===",
    "  +---+\n  |   |\n  O   |\n /|   |\n      |\n      |\n===",
    "  +---+\n  |   |\n  O   |\n /|\\  |\n      |\n      |\n===",
    "  +---+\n  |   |\n  O   |\n /|\\  |\n /    |\n      |\n===",
    "  +---+\n  |   |\n  O   |\n /|\\  |\n / \\  |\n      |\n===",
];

#[derive(Debug, Clone)]
pub struct HangmanGame {
    pub secret: String,
    pub guessed: BTreeSet<char>,
    pub wrong_guesses: u32,
    pub max_wrong_guesses: u32,
    pub difficulty: Difficulty,
    pub hint_used: bool,
}

impl HangmanGame {
    pub fn new(secret: &str, difficulty: Difficulty, max_wrong_guesses: u32) -> Self {
        HangmanGame {
            secret: secret.trim().to_uppercase(),
            guessed: BTreeSet::new(),
            wrong_guesses: 0,
            max_wrong_guesses,
            difficulty,
            hint_used: false,
        }
    }

    /// Gallows art, masked word, used letters, and the error count.
    pub fn render(&self) -> String {
        let stage = (self.wrong_guesses as usize).min(GALLOWS.len() - 1);
        let masked: Vec<String> = self
            .secret
            .chars()
            .map(|c| {
                if self.guessed.contains(&c) {
                    c.to_string()
                } else {
                    "_".to_string()
                }
            })
            .collect();
        let mut out = format!(
            "```\n{}\n```\n**Word:** `{}`\n",
            GALLOWS[stage],
            masked.join(" ")
        );
        if !self.guessed.is_empty() {
            let used: Vec<String> = self.guessed.iter().map(|c| c.to_string()).collect();
            out.push_str(&format!("**Used:** {}\n", used.join(", ")));
        }
        out.push_str(&format!(
            "**Errors:** {}/{}",
            self.wrong_guesses, self.max_wrong_guesses
        ));
        out
    }

    fn is_solved(&self) -> bool {
        self.secret.chars().all(|c| self.guessed.contains(&c))
    }

    /// Apply one guessed letter. Multi-character input, non-letters, and
    /// repeats are ignored with no state change.
    pub fn handle_guess(&mut self, raw: &str) -> Vec<Effect> {
        let guess = raw.trim().to_uppercase();
        let mut chars = guess.chars();
        let (Some(letter), None) = (chars.next(), chars.next()) else {
            return Vec::new();
        };
        if !letter.is_alphabetic() || self.guessed.contains(&letter) {
            return Vec::new();
        }

        self.guessed.insert(letter);
        if !self.secret.contains(letter) {
            self.wrong_guesses += 1;
        }
        let mut effects = vec![Effect::Reply(self.render())];

        if self.is_solved() {
            let points = self.difficulty.base_points();
            effects.push(Effect::Announce(format!(
                "🎉 Congratulations! The word was **{}** (+{} pts)",
                self.secret, points
            )));
            effects.push(Effect::score_actor(
                ScoreDelta {
                    points,
                    hangman_win: true,
                    ..Default::default()
                },
                WinContext::default(),
            ));
            effects.push(Effect::OpsLog {
                event: "hangman.win",
                detail: format!(
                    "word={} errors={}/{} points={}",
                    self.secret, self.wrong_guesses, self.max_wrong_guesses, points
                ),
            });
            effects.push(Effect::EndSession);
        } else if self.wrong_guesses >= self.max_wrong_guesses {
            effects.push(Effect::Announce(format!(
                "😔 Game over. The word was **{}**.",
                self.secret
            )));
            effects.push(Effect::OpsLog {
                event: "hangman.loss",
                detail: format!("word={}", self.secret),
            });
            effects.push(Effect::EndSession);
        }
        effects
    }

    /// One-shot hint: reveals a random unguessed letter of the word at the
    /// cost of one wrong guess. Refused outright when the next wrong guess
    /// would already end the game.
    pub fn hint(&mut self) -> Vec<Effect> {
        if self.wrong_guesses >= self.max_wrong_guesses.saturating_sub(1) {
            return vec![Effect::Reply("Too late for a hint!".to_string())];
        }
        let mut unrevealed: Vec<char> = self
            .secret
            .chars()
            .filter(|c| !self.guessed.contains(c))
            .collect();
        unrevealed.sort_unstable();
        unrevealed.dedup();
        let Some(letter) = unrevealed.choose(&mut rand::thread_rng()).copied() else {
            return vec![Effect::Reply("Nothing left to reveal!".to_string())];
        };
        self.guessed.insert(letter);
        self.wrong_guesses += 1;
        self.hint_used = true;
        vec![
            Effect::Reply("💡 Revealing a letter! (Cost: 1 error)".to_string()),
            Effect::Announce(self.render()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solving_kot_with_no_errors_wins() {
        let mut game = HangmanGame::new("KOT", Difficulty::Normal, 6);
        assert!(!game.handle_guess("K").is_empty());
        game.handle_guess("O");
        let effects = game.handle_guess("T");
        assert_eq!(game.wrong_guesses, 0);
        assert!(effects.iter().any(|e| matches!(e, Effect::EndSession)));
        let points = effects.iter().find_map(|e| match e {
            Effect::Score { delta, .. } => Some(delta.points),
            _ => None,
        });
        assert_eq!(points, Some(15));
    }

    #[test]
    fn wrong_guesses_accumulate_to_loss() {
        let mut game = HangmanGame::new("KOT", Difficulty::Normal, 2);
        game.handle_guess("X");
        assert_eq!(game.wrong_guesses, 1);
        let effects = game.handle_guess("Y");
        assert!(effects.iter().any(
            |e| matches!(e, Effect::Announce(text) if text.contains("KOT"))
        ));
        assert!(effects.iter().any(|e| matches!(e, Effect::EndSession)));
    }

    #[test]
    fn malformed_and_repeat_input_ignored() {
        let mut game = HangmanGame::new("KOT", Difficulty::Normal, 6);
        assert!(game.handle_guess("KO").is_empty());
        assert!(game.handle_guess("5").is_empty());
        assert!(game.handle_guess("").is_empty());
        game.handle_guess("K");
        assert!(game.handle_guess("K").is_empty());
        assert_eq!(game.guessed.len(), 1);
        assert_eq!(game.wrong_guesses, 0);
    }

    #[test]
    fn hint_rejected_at_budget_edge() {
        let mut game = HangmanGame::new("KOT", Difficulty::Normal, 6);
        game.wrong_guesses = 5;
        let effects = game.hint();
        assert!(!game.hint_used);
        assert_eq!(game.wrong_guesses, 5);
        assert!(effects.iter().any(
            |e| matches!(e, Effect::Reply(text) if text.contains("Too late"))
        ));
    }

    #[test]
    fn hint_reveals_and_charges_an_error() {
        let mut game = HangmanGame::new("KOT", Difficulty::Normal, 6);
        game.handle_guess("K");
        let effects = game.hint();
        assert!(game.hint_used);
        assert_eq!(game.wrong_guesses, 1);
        assert_eq!(game.guessed.len(), 2);
        assert!(effects.iter().any(|e| matches!(e, Effect::Announce(_))));
    }

    #[test]
    fn render_masks_unguessed_letters() {
        let mut game = HangmanGame::new("KOT", Difficulty::Normal, 6);
        game.handle_guess("O");
        let rendered = game.render();
        assert!(rendered.contains("_ O _"));
        assert!(rendered.contains("Errors: 0/6"));
    }
}
