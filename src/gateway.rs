//! Generation gateway client.
//!
//! Thin wrapper over an OpenAI-compatible completion endpoint. Every game
//! that needs generated content (secret words, quiz questions, statement
//! sets, yes/no answers, continuations) goes through this one client.
//!
//! Rate-limited calls (HTTP 429) back off for a fixed delay and retry, but
//! only up to `max_attempts` total tries; there is no unbounded retry path.
//! Structured responses are parsed as JSON after stripping an optional
//! code-fence wrapper.

use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio::time::timeout;

use crate::config::GatewayConfig;
use crate::games::quiz::QuizQuestion;
use crate::games::truths::StatementSet;
use crate::games::wordle::{MAX_WORD_LEN, MIN_WORD_LEN};
use crate::games::Difficulty;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("rate limited after {0} attempts")]
    RateLimited(u32),
    #[error("service returned status {0}")]
    Status(u16),
    #[error("empty or filtered response")]
    Empty,
    #[error("malformed structured response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("could not produce a usable {0} after {1} attempts")]
    ShapeExhausted(&'static str, u32),
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Strip a Markdown code fence (``` or ```json) wrapped around a payload.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}

/// A generated secret word must be a single alphabetic token in the
/// playable length range.
fn is_playable_word(word: &str) -> bool {
    let len = word.chars().count();
    (MIN_WORD_LEN..=MAX_WORD_LEN).contains(&len) && word.chars().all(char::is_alphabetic)
}

pub struct GenerationClient {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl GenerationClient {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// One completion round-trip. Retries within the attempt bound only on
    /// rate limiting; every other failure is returned as-is.
    pub async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        for attempt in 1..=self.config.max_attempts {
            match self.request_once(prompt).await {
                Err(GatewayError::Status(429)) if attempt < self.config.max_attempts => {
                    warn!(
                        "gateway rate limited (attempt {}/{}), backing off {}s",
                        attempt, self.config.max_attempts, self.config.rate_limit_backoff_seconds
                    );
                    tokio::time::sleep(Duration::from_secs(
                        self.config.rate_limit_backoff_seconds,
                    ))
                    .await;
                }
                Err(GatewayError::Status(429)) => {
                    return Err(GatewayError::RateLimited(self.config.max_attempts));
                }
                other => return other,
            }
        }
        Err(GatewayError::RateLimited(self.config.max_attempts))
    }

    async fn request_once(&self, prompt: &str) -> Result<String, GatewayError> {
        debug!("gateway request: model={}", self.config.model);
        let body = json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "messages": [{"role": "user", "content": prompt}],
        });

        let request = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body);
        let bound = Duration::from_secs(self.config.timeout_seconds);
        let response = timeout(bound, request.send())
            .await
            .map_err(|_| GatewayError::Timeout(self.config.timeout_seconds))??;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        let parsed: CompletionResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(GatewayError::Empty);
        }
        Ok(content.trim().to_string())
    }

    /// Generate and JSON-parse a structured payload.
    async fn generate_structured<T: for<'de> Deserialize<'de>>(
        &self,
        prompt: &str,
    ) -> Result<T, GatewayError> {
        let raw = self.generate(prompt).await?;
        Ok(serde_json::from_str(strip_code_fence(&raw))?)
    }

    /// Secret word for wordle/hangman. `length` pins the exact word length
    /// when given; otherwise any playable length passes. Re-asks within the
    /// attempt bound when the model returns something unplayable.
    pub async fn generate_word(
        &self,
        difficulty: Difficulty,
        length: Option<usize>,
    ) -> Result<String, GatewayError> {
        let prompt = match length {
            Some(len) => format!(
                "Give me one {} English noun exactly {} letters long. \
                 Reply with the word only, no punctuation.",
                difficulty.prompt_adjective(),
                len
            ),
            None => format!(
                "Give me one {} English noun between {} and {} letters long. \
                 Reply with the word only, no punctuation.",
                difficulty.prompt_adjective(),
                MIN_WORD_LEN,
                MAX_WORD_LEN
            ),
        };
        for attempt in 1..=self.config.max_attempts {
            let candidate = self.generate(&prompt).await?;
            let word = candidate.trim().trim_matches(|c: char| !c.is_alphabetic());
            let length_ok = length.map_or(true, |len| word.chars().count() == len);
            if is_playable_word(word) && length_ok {
                return Ok(word.to_uppercase());
            }
            debug!(
                "unplayable word candidate {:?} (attempt {}/{})",
                candidate, attempt, self.config.max_attempts
            );
        }
        Err(GatewayError::ShapeExhausted("word", self.config.max_attempts))
    }

    /// Quiz question with four labeled options, shape-validated.
    pub async fn generate_quiz(
        &self,
        category: &str,
        difficulty: Difficulty,
    ) -> Result<QuizQuestion, GatewayError> {
        let prompt = format!(
            "Write one {} multiple-choice trivia question about {}. \
             Respond with JSON only, shaped {{\"question\": \"...\", \
             \"answers\": {{\"A\": \"...\", \"B\": \"...\", \"C\": \"...\", \"D\": \"...\"}}, \
             \"correct_answer\": \"A\"}}.",
            difficulty, category
        );
        for attempt in 1..=self.config.max_attempts {
            let question: QuizQuestion = self.generate_structured(&prompt).await?;
            if question.is_well_formed() {
                return Ok(question);
            }
            debug!(
                "malformed quiz question (attempt {}/{})",
                attempt, self.config.max_attempts
            );
        }
        Err(GatewayError::ShapeExhausted(
            "quiz question",
            self.config.max_attempts,
        ))
    }

    /// Two-truths statement set, shape-validated.
    pub async fn generate_statements(&self, topic: &str) -> Result<StatementSet, GatewayError> {
        let prompt = format!(
            "Write three short statements about {}: two true, one false. \
             Respond with JSON only, shaped {{\"statements\": [\"...\", \"...\", \"...\"], \
             \"lie_index\": 0}} where lie_index marks the false statement.",
            topic
        );
        for attempt in 1..=self.config.max_attempts {
            let set: StatementSet = self.generate_structured(&prompt).await?;
            if set.is_well_formed() {
                return Ok(set);
            }
            debug!(
                "malformed statement set (attempt {}/{})",
                attempt, self.config.max_attempts
            );
        }
        Err(GatewayError::ShapeExhausted(
            "statement set",
            self.config.max_attempts,
        ))
    }

    /// Secret for twenty questions, drawn from the requested category.
    pub async fn generate_secret_object(&self, category: &str) -> Result<String, GatewayError> {
        let prompt = format!(
            "Pick one concrete thing from the category \"{}\" for a game of \
             twenty questions. Reply with its name only (one to three words).",
            category
        );
        self.generate(&prompt).await
    }

    /// Constrained yes/no-class answer for a twenty-questions question.
    pub async fn answer_question(
        &self,
        secret: &str,
        history: &[(String, String)],
        question: &str,
    ) -> Result<String, GatewayError> {
        let mut prompt = format!(
            "We are playing twenty questions. The secret object is \"{}\". \
             Answer the player's question with exactly one of: YES, NO, MAYBE.\n",
            secret
        );
        for (q, a) in history {
            prompt.push_str(&format!("Q: {}\nA: {}\n", q, a));
        }
        prompt.push_str(&format!("Q: {}\nA:", question));
        let answer = self.generate(&prompt).await?;
        Ok(answer.to_uppercase())
    }

    /// Non-revealing clue for the twenty-questions hint.
    pub async fn generate_clue(&self, secret: &str) -> Result<String, GatewayError> {
        let prompt = format!(
            "Give a short cryptic clue about \"{}\" without naming it or any \
             part of its name.",
            secret
        );
        self.generate(&prompt).await
    }

    /// Keyword plus forbidden-word list for taboo.
    pub async fn generate_taboo_card(&self) -> Result<(String, Vec<String>), GatewayError> {
        #[derive(Deserialize)]
        struct TabooCard {
            keyword: String,
            forbidden: Vec<String>,
        }
        let prompt = "Create a taboo card. Respond with JSON only, shaped \
                      {\"keyword\": \"...\", \"forbidden\": [\"...\", \"...\", \"...\", \"...\"]} \
                      with four forbidden words closely related to the keyword.";
        for attempt in 1..=self.config.max_attempts {
            let card: TabooCard = self.generate_structured(prompt).await?;
            if !card.keyword.trim().is_empty() && !card.forbidden.is_empty() {
                return Ok((card.keyword.trim().to_string(), card.forbidden));
            }
            debug!(
                "malformed taboo card (attempt {}/{})",
                attempt, self.config.max_attempts
            );
        }
        Err(GatewayError::ShapeExhausted(
            "taboo card",
            self.config.max_attempts,
        ))
    }

    /// Opening line for a collaborative story.
    pub async fn generate_story_opening(&self) -> Result<String, GatewayError> {
        let prompt = "Write a single intriguing opening sentence for a collaborative story.";
        self.generate(prompt).await
    }

    /// Bot continuation used by the idle reaper.
    pub async fn continue_story(&self, story_so_far: &str) -> Result<String, GatewayError> {
        let prompt = format!(
            "Continue this collaborative story with exactly one sentence:\n{}",
            story_so_far
        );
        self.generate(&prompt).await
    }

    /// Next association-chain word from the bot, used by the idle reaper.
    pub async fn continue_association(&self, current_word: &str) -> Result<String, GatewayError> {
        let prompt = format!(
            "In a word-association game the current word is \"{}\". Reply \
             with one associated English word only.",
            current_word
        );
        let word = self.generate(&prompt).await?;
        Ok(word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_uppercase())
    }

    /// One-off creative scenario, no session attached.
    pub async fn generate_scenario(&self) -> Result<String, GatewayError> {
        let prompt = "Invent a short, funny what-if scenario for a group chat \
                      to discuss. Two sentences at most.";
        self.generate(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_fence_stripping() {
        assert_eq!(strip_code_fence("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn word_shape_bounds() {
        assert!(is_playable_word("MOUSE"));
        assert!(is_playable_word("tree"));
        assert!(!is_playable_word("cat")); // too short
        assert!(!is_playable_word("ELEPHANTS")); // too long
        assert!(!is_playable_word("MO USE"));
        assert!(!is_playable_word("M0USE"));
    }

    #[test]
    fn completion_response_parses() {
        let raw = r#"{"choices": [{"message": {"content": "MOUSE"}}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("MOUSE"));
    }

    #[tokio::test]
    async fn transport_errors_are_not_retried() {
        let config = GatewayConfig {
            api_url: "http://127.0.0.1:1/unreachable".to_string(),
            api_key: String::new(),
            model: "test".to_string(),
            temperature: 0.9,
            timeout_seconds: 2,
            max_attempts: 3,
            rate_limit_backoff_seconds: 60,
        };
        let client = GenerationClient::new(config);
        // Only 429 responses go through the backoff loop; a refused
        // connection surfaces immediately instead of burning attempts.
        let started = std::time::Instant::now();
        let result = client.generate("hello").await;
        assert!(matches!(result, Err(GatewayError::Http(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
