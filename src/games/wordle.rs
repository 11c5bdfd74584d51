//! Word-guess rule engine (Wordle-style).
//!
//! The secret is a fixed-case alphabetic word of 4-8 letters. Each guess of
//! matching length produces per-letter feedback; an exact match wins, and
//! exhausting the attempt budget reveals the word.

use rand::seq::SliceRandom;

use crate::achievements::WinContext;
use crate::storage::ScoreDelta;

use super::{Difficulty, Effect};

pub const MIN_WORD_LEN: usize = 4;
pub const MAX_WORD_LEN: usize = 8;

const MARK_EXACT: char = '🟩';
const MARK_PRESENT: char = '🟨';
const MARK_ABSENT: char = '⬛';

#[derive(Debug, Clone)]
pub struct WordleGame {
    pub secret: String,
    pub attempts: u32,
    pub max_attempts: u32,
    pub difficulty: Difficulty,
    pub history: Vec<String>,
    pub hint_used: bool,
}

/// Per-letter feedback for one guess, computed in two passes.
///
/// Pass 1 marks exact-position matches and removes those letters from both
/// pools. Pass 2 marks remaining guess letters found anywhere in the
/// remaining secret pool, consuming one occurrence per match, so a repeated
/// guess letter is never credited more times than it occurs in the secret.
pub fn check_guess(guess: &str, secret: &str) -> String {
    let guess_chars: Vec<char> = guess.chars().collect();
    let secret_chars: Vec<char> = secret.chars().collect();
    debug_assert_eq!(guess_chars.len(), secret_chars.len());

    let mut marks = vec![MARK_ABSENT; secret_chars.len()];
    let mut secret_pool: Vec<Option<char>> = secret_chars.iter().copied().map(Some).collect();
    let mut guess_pool: Vec<Option<char>> = guess_chars.iter().copied().map(Some).collect();

    for i in 0..secret_pool.len() {
        if guess_pool[i] == secret_pool[i] {
            marks[i] = MARK_EXACT;
            secret_pool[i] = None;
            guess_pool[i] = None;
        }
    }
    for i in 0..guess_pool.len() {
        let Some(letter) = guess_pool[i] else { continue };
        if let Some(pos) = secret_pool.iter().position(|s| *s == Some(letter)) {
            marks[i] = MARK_PRESENT;
            secret_pool[pos] = None;
        }
    }
    marks.into_iter().collect()
}

impl WordleGame {
    pub fn new(secret: &str, difficulty: Difficulty, max_attempts: u32) -> Self {
        WordleGame {
            secret: secret.trim().to_uppercase(),
            attempts: 0,
            max_attempts,
            difficulty,
            history: Vec::new(),
            hint_used: false,
        }
    }

    pub fn word_len(&self) -> usize {
        self.secret.chars().count()
    }

    /// Points for a win: base by difficulty plus 5 per letter over the
    /// minimum word length.
    pub fn win_points(&self) -> i64 {
        self.difficulty.base_points() + 5 * (self.word_len() as i64 - MIN_WORD_LEN as i64)
    }

    /// Apply one candidate guess. Length mismatches and non-alphabetic
    /// input are rejected silently with no state change.
    pub fn handle_guess(&mut self, raw: &str) -> Vec<Effect> {
        let guess = raw.trim().to_uppercase();
        if guess.chars().count() != self.word_len() || !guess.chars().all(|c| c.is_alphabetic()) {
            return Vec::new();
        }

        self.attempts += 1;
        self.history.push(guess.clone());
        let mut effects = vec![Effect::Reply(format!(
            "{} `({}/{})`",
            check_guess(&guess, &self.secret),
            self.attempts,
            self.max_attempts
        ))];

        if guess == self.secret {
            let points = self.win_points();
            effects.push(Effect::Announce(format!(
                "🎉 Well done! The word was **{}**! (+{} pts)",
                self.secret, points
            )));
            effects.push(Effect::score_actor(
                ScoreDelta {
                    points,
                    wordle_win: true,
                    ..Default::default()
                },
                WinContext {
                    wordle_attempts: Some(self.attempts),
                    ..Default::default()
                },
            ));
            effects.push(Effect::OpsLog {
                event: "wordle.win",
                detail: format!(
                    "word={} attempts={}/{} points={}",
                    self.secret, self.attempts, self.max_attempts, points
                ),
            });
            effects.push(Effect::EndSession);
        } else if self.attempts >= self.max_attempts {
            effects.push(Effect::Announce(format!(
                "😔 Out of attempts. The word was **{}**.",
                self.secret
            )));
            effects.push(Effect::OpsLog {
                event: "wordle.loss",
                detail: format!("word={}", self.secret),
            });
            effects.push(Effect::EndSession);
        }
        effects
    }

    /// Letters already confirmed exact in any prior guess.
    fn confirmed_exact(&self) -> Vec<char> {
        let secret: Vec<char> = self.secret.chars().collect();
        let mut confirmed = Vec::new();
        for guess in &self.history {
            for (i, ch) in guess.chars().enumerate() {
                if secret.get(i) == Some(&ch) && !confirmed.contains(&ch) {
                    confirmed.push(ch);
                }
            }
        }
        confirmed
    }

    /// One-shot hint: consumes an attempt and reveals a random secret
    /// letter not yet confirmed exact. When every letter is already
    /// confirmed the session is left untouched.
    pub fn hint(&mut self) -> Vec<Effect> {
        let confirmed = self.confirmed_exact();
        let mut pool: Vec<char> = self
            .secret
            .chars()
            .filter(|c| !confirmed.contains(c))
            .collect();
        pool.sort_unstable();
        pool.dedup();
        let Some(letter) = pool.choose(&mut rand::thread_rng()).copied() else {
            return vec![Effect::Reply(
                "No letters left to hint!".to_string(),
            )];
        };
        self.hint_used = true;
        self.attempts += 1;
        vec![Effect::Reply(format!(
            "💡 The letter **{}** is in the word. (Cost: 1 attempt)",
            letter
        ))]
    }
}
