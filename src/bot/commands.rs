//! Slash-command surface: game starts, hint/guess/stop, player queries,
//! and the administrative commands.
//!
//! Precondition checks (maintenance mode, channel allow-list, session
//! already active) run before any gateway call or state mutation. A start
//! command that fails at the gateway registers nothing.

use anyhow::Result;
use chrono::{Duration, Utc};
use log::debug;

use crate::games::hangman::HangmanGame;
use crate::games::quiz::QuizGame;
use crate::games::shared::{SharedGame, SharedSession};
use crate::games::truths::TwoTruthsGame;
use crate::games::twenty::TwentyQuestionsGame;
use crate::games::wordle::{WordleGame, MAX_WORD_LEN, MIN_WORD_LEN};
use crate::games::{Difficulty, GameKind};
use crate::metrics;

use super::server::SessionTarget;
use super::session::{PersonalGame, PersonalSession};
use super::{BotServer, ChannelId, CommandInvocation, OutgoingAction};

/// Seconds an owner has to confirm a statistics reset.
const RESET_CONFIRM_WINDOW_SECONDS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start {
        kind: GameKind,
        difficulty: Difficulty,
        topic: Option<String>,
        /// Requested secret-word length (wordle only).
        length: Option<usize>,
    },
    Stop,
    Hint,
    FinalGuess(String),
    Profile,
    Leaderboard,
    Achievements,
    Info,
    Scenario,
    StoryEnd,
    Admin(AdminCommand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    ChannelAdd(ChannelId),
    ChannelRemove(ChannelId),
    Maintenance(bool),
    ForceEnd,
    ResetStats,
    ConfirmReset,
    CancelReset,
}

/// Parse an invocation into a [`Command`]. Errors are user-facing usage
/// strings.
pub fn parse(name: &str, args: &[String]) -> Result<Command, String> {
    let difficulty = |idx: usize| -> Result<Difficulty, String> {
        match args.get(idx) {
            Some(raw) => raw.parse(),
            None => Ok(Difficulty::default()),
        }
    };
    match name {
        // Length and difficulty may come in either order: `wordle 6 hard`.
        "wordle" => {
            let mut length = None;
            let mut level = Difficulty::default();
            for raw in args {
                if let Ok(n) = raw.parse::<usize>() {
                    if !(MIN_WORD_LEN..=MAX_WORD_LEN).contains(&n) {
                        return Err(format!(
                            "Word length must be between {} and {}.",
                            MIN_WORD_LEN, MAX_WORD_LEN
                        ));
                    }
                    length = Some(n);
                } else {
                    level = raw.parse()?;
                }
            }
            Ok(Command::Start {
                kind: GameKind::Wordle,
                difficulty: level,
                topic: None,
                length,
            })
        }
        "hangman" => Ok(Command::Start {
            kind: GameKind::Hangman,
            difficulty: difficulty(0)?,
            topic: None,
            length: None,
        }),
        "quiz" => Ok(Command::Start {
            kind: GameKind::Quiz,
            difficulty: difficulty(1)?,
            topic: args.first().cloned(),
            length: None,
        }),
        "twenty" => Ok(Command::Start {
            kind: GameKind::TwentyQuestions,
            difficulty: Difficulty::Normal,
            topic: args.first().cloned(),
            length: None,
        }),
        "truths" => Ok(Command::Start {
            kind: GameKind::TwoTruths,
            difficulty: Difficulty::Normal,
            topic: args.first().cloned(),
            length: None,
        }),
        "association" => Ok(Command::Start {
            kind: GameKind::Association,
            difficulty: Difficulty::Normal,
            topic: None,
            length: None,
        }),
        "story" => Ok(Command::Start {
            kind: GameKind::Story,
            difficulty: Difficulty::Normal,
            topic: None,
            length: None,
        }),
        "taboo" => Ok(Command::Start {
            kind: GameKind::Taboo,
            difficulty: Difficulty::Normal,
            topic: None,
            length: None,
        }),
        "stop" => Ok(Command::Stop),
        "hint" => Ok(Command::Hint),
        "guess" => {
            let text = args.join(" ");
            if text.trim().is_empty() {
                Err("Usage: guess <your final answer>".to_string())
            } else {
                Ok(Command::FinalGuess(text))
            }
        }
        "profile" => Ok(Command::Profile),
        "leaderboard" => Ok(Command::Leaderboard),
        "achievements" => Ok(Command::Achievements),
        "info" => Ok(Command::Info),
        "scenario" => Ok(Command::Scenario),
        "story_end" => Ok(Command::StoryEnd),
        "channel_add" | "channel_remove" => {
            let id: ChannelId = args
                .first()
                .and_then(|raw| raw.parse().ok())
                .ok_or_else(|| format!("Usage: {} <channel id>", name))?;
            Ok(Command::Admin(if name == "channel_add" {
                AdminCommand::ChannelAdd(id)
            } else {
                AdminCommand::ChannelRemove(id)
            }))
        }
        "maintenance" => match args.first().map(String::as_str) {
            Some("on") => Ok(Command::Admin(AdminCommand::Maintenance(true))),
            Some("off") => Ok(Command::Admin(AdminCommand::Maintenance(false))),
            _ => Err("Usage: maintenance on|off".to_string()),
        },
        "force_end" => Ok(Command::Admin(AdminCommand::ForceEnd)),
        "reset_stats" => Ok(Command::Admin(AdminCommand::ResetStats)),
        "confirm_reset" => Ok(Command::Admin(AdminCommand::ConfirmReset)),
        "cancel_reset" => Ok(Command::Admin(AdminCommand::CancelReset)),
        other => Err(format!("Unknown command: {}", other)),
    }
}

impl BotServer {
    pub(crate) async fn handle_command(&mut self, inv: CommandInvocation) -> Result<()> {
        debug!(
            "command channel={} user={} name={}",
            inv.channel, inv.user_id, inv.name
        );
        let command = match parse(&inv.name, &inv.args) {
            Ok(command) => command,
            Err(usage) => {
                self.send_to(inv.channel, usage);
                return Ok(());
            }
        };

        match command {
            Command::Start {
                kind,
                difficulty,
                topic,
                length,
            } => self.start_game(&inv, kind, difficulty, topic, length).await,
            Command::Stop => self.stop_personal(&inv),
            Command::Hint => self.handle_hint(&inv).await,
            Command::FinalGuess(text) => self.handle_final_guess(&inv, &text),
            Command::Profile => self.show_profile(&inv),
            Command::Leaderboard => self.show_leaderboard(&inv),
            Command::Achievements => self.show_achievements(&inv),
            Command::Info => {
                self.send_to(inv.channel, info_text());
                Ok(())
            }
            Command::Scenario => self.handle_scenario(&inv).await,
            Command::StoryEnd => self.end_story(&inv),
            Command::Admin(admin) => self.handle_admin(&inv, admin),
        }
    }

    /// Maintenance and channel allow-list checks shared by every start.
    /// Returns `false` (after messaging the user) when a start must abort.
    fn start_preconditions(&self, inv: &CommandInvocation) -> Result<bool> {
        if self.store.maintenance_mode()? && inv.user_id != self.config.bot.owner_id {
            self.send_to(
                inv.channel,
                "🛠️ Maintenance in progress, games are paused. Try again later.",
            );
            return Ok(false);
        }
        let allowed = self.store.allowed_channels()?;
        if !allowed.is_empty() && !allowed.contains(&inv.channel) {
            self.send_to(inv.channel, "Games are not enabled in this channel.");
            return Ok(false);
        }
        Ok(true)
    }

    async fn start_game(
        &mut self,
        inv: &CommandInvocation,
        kind: GameKind,
        difficulty: Difficulty,
        topic: Option<String>,
        length: Option<usize>,
    ) -> Result<()> {
        if !self.start_preconditions(inv)? {
            return Ok(());
        }
        // Fast-fail before the gateway round-trip; the put below re-checks.
        if kind.is_personal() {
            if let Some(existing) = self.sessions.personal(inv.channel, inv.user_id) {
                self.send_to(
                    inv.channel,
                    format!(
                        "You already have a {} game running here. Finish it or `stop` first.",
                        existing.game.kind().display_name()
                    ),
                );
                return Ok(());
            }
        } else if let Some(existing) = self.sessions.shared(inv.channel) {
            self.send_to(
                inv.channel,
                format!(
                    "A {} game is already running in this channel.",
                    existing.game.kind().display_name()
                ),
            );
            return Ok(());
        }

        match kind {
            GameKind::Wordle => self.start_wordle(inv, difficulty, length).await,
            GameKind::Hangman => self.start_hangman(inv, difficulty).await,
            GameKind::Quiz => self.start_quiz(inv, difficulty, topic).await,
            GameKind::TwentyQuestions => self.start_twenty(inv, topic).await,
            GameKind::TwoTruths => self.start_truths(inv, topic).await,
            GameKind::Association => self.start_association(inv).await,
            GameKind::Story => self.start_story(inv).await,
            GameKind::Taboo => self.start_taboo(inv).await,
        }
    }

    fn generation_failed(&self, inv: &CommandInvocation, what: &str, err: impl std::fmt::Display) {
        self.send_to(
            inv.channel,
            "😵 I couldn't come up with anything right now. Try again in a moment.",
        );
        self.ops_log("gateway.failure", &format!("{what}: {err}"));
    }

    /// Register a freshly started personal session. A concurrent start may
    /// have won the race during the gateway call; the loser's session is
    /// dropped and the player is told.
    fn register_personal(
        &mut self,
        inv: &CommandInvocation,
        game: PersonalGame,
    ) -> Result<bool> {
        let kind = game.kind();
        let session = PersonalSession {
            game,
            user_name: inv.user_name.clone(),
        };
        match self.sessions.put_personal(inv.channel, inv.user_id, session) {
            Ok(()) => {
                metrics::record_game_start(kind.slug());
                self.ops_log(
                    "game.start",
                    &format!("game={} user={}", kind.slug(), inv.user_name),
                );
                Ok(true)
            }
            Err(existing) => {
                self.send_to(
                    inv.channel,
                    format!(
                        "You already have a {} game running here.",
                        existing.0.display_name()
                    ),
                );
                Ok(false)
            }
        }
    }

    fn register_shared(&mut self, inv: &CommandInvocation, session: SharedSession) -> Result<bool> {
        let kind = session.game.kind();
        match self.sessions.put_shared(inv.channel, session) {
            Ok(()) => {
                metrics::record_game_start(kind.slug());
                self.ops_log(
                    "game.start",
                    &format!("game={} channel={}", kind.slug(), inv.channel),
                );
                Ok(true)
            }
            Err(existing) => {
                self.send_to(
                    inv.channel,
                    format!(
                        "A {} game is already running in this channel.",
                        existing.0.display_name()
                    ),
                );
                Ok(false)
            }
        }
    }

    async fn start_wordle(
        &mut self,
        inv: &CommandInvocation,
        difficulty: Difficulty,
        length: Option<usize>,
    ) -> Result<()> {
        let length = length.unwrap_or(5);
        let word = match self.gateway.generate_word(difficulty, Some(length)).await {
            Ok(word) => word,
            Err(e) => {
                self.generation_failed(inv, "wordle word", e);
                return Ok(());
            }
        };
        let game = WordleGame::new(&word, difficulty, self.config.games.wordle_max_attempts);
        let len = game.word_len();
        let max = game.max_attempts;
        if self.register_personal(inv, PersonalGame::Wordle(game))? {
            self.send_to(
                inv.channel,
                format!(
                    "🟩 **Wordle** ({difficulty}): I picked a **{len}-letter** word. \
                     You have {max} attempts. Just type your guesses!"
                ),
            );
        }
        Ok(())
    }

    async fn start_hangman(&mut self, inv: &CommandInvocation, difficulty: Difficulty) -> Result<()> {
        let word = match self.gateway.generate_word(difficulty, None).await {
            Ok(word) => word,
            Err(e) => {
                self.generation_failed(inv, "hangman word", e);
                return Ok(());
            }
        };
        let game = HangmanGame::new(&word, difficulty, self.config.games.hangman_max_wrong);
        let board = game.render();
        if self.register_personal(inv, PersonalGame::Hangman(game))? {
            self.send_to(
                inv.channel,
                format!("💀 **Hangman** ({difficulty}): one letter per message.\n{board}"),
            );
        }
        Ok(())
    }

    async fn start_quiz(
        &mut self,
        inv: &CommandInvocation,
        difficulty: Difficulty,
        topic: Option<String>,
    ) -> Result<()> {
        let category = topic.unwrap_or_else(|| "general knowledge".to_string());
        let question = match self.gateway.generate_quiz(&category, difficulty).await {
            Ok(question) => question,
            Err(e) => {
                self.generation_failed(inv, "quiz question", e);
                return Ok(());
            }
        };
        let game = QuizGame::new(question, difficulty, &category);
        let presentation = game.present();
        if self.register_personal(inv, PersonalGame::Quiz(game))? {
            self.send_to(inv.channel, presentation);
        }
        Ok(())
    }

    async fn start_twenty(&mut self, inv: &CommandInvocation, topic: Option<String>) -> Result<()> {
        let category = topic.unwrap_or_else(|| "everyday objects".to_string());
        let secret = match self.gateway.generate_secret_object(&category).await {
            Ok(secret) => secret,
            Err(e) => {
                self.generation_failed(inv, "twenty secret", e);
                return Ok(());
            }
        };
        let game = TwentyQuestionsGame::new(&secret, self.config.games.question_cap);
        let cap = game.question_cap;
        if self.register_personal(inv, PersonalGame::TwentyQuestions(game))? {
            self.send_to(
                inv.channel,
                format!(
                    "🔍 **Twenty Questions**: I'm thinking of something. Ask up to {cap} \
                     yes/no questions, then `guess <answer>` when you're sure!"
                ),
            );
        }
        Ok(())
    }

    async fn start_truths(&mut self, inv: &CommandInvocation, topic: Option<String>) -> Result<()> {
        let topic = topic.unwrap_or_else(|| "the world".to_string());
        let set = match self.gateway.generate_statements(&topic).await {
            Ok(set) => set,
            Err(e) => {
                self.generation_failed(inv, "statement set", e);
                return Ok(());
            }
        };
        let game = TwoTruthsGame::new(set, self.config.games.truths_timeout_seconds);
        let presentation = game.present();
        if self.register_personal(inv, PersonalGame::TwoTruths(game))? {
            self.send_to(inv.channel, presentation);
        }
        Ok(())
    }

    async fn start_association(&mut self, inv: &CommandInvocation) -> Result<()> {
        let seed = match self.gateway.generate_word(Difficulty::Easy, None).await {
            Ok(seed) => seed,
            Err(e) => {
                self.generation_failed(inv, "association seed", e);
                return Ok(());
            }
        };
        let session = SharedSession::new(
            SharedGame::Association {
                chain: vec![seed.clone()],
            },
            Utc::now(),
        );
        if self.register_shared(inv, session)? {
            self.send_to(
                inv.channel,
                format!(
                    "🔗 **Word Association**: reply with one word associated with the \
                     last one. No repeats, and never twice in a row. First word: **{seed}**"
                ),
            );
        }
        Ok(())
    }

    async fn start_story(&mut self, inv: &CommandInvocation) -> Result<()> {
        let opening = match self.gateway.generate_story_opening().await {
            Ok(opening) => opening,
            Err(e) => {
                self.generation_failed(inv, "story opening", e);
                return Ok(());
            }
        };
        let session = SharedSession::new(
            SharedGame::Story {
                opening: opening.clone(),
                contributions: Vec::new(),
            },
            Utc::now(),
        );
        if self.register_shared(inv, session)? {
            self.send_to(
                inv.channel,
                format!(
                    "📖 **Collaborative Story**: add one sentence at a time, never \
                     twice in a row. `story_end` wraps it up.\n\n> {opening}"
                ),
            );
        }
        Ok(())
    }

    async fn start_taboo(&mut self, inv: &CommandInvocation) -> Result<()> {
        let (keyword, forbidden) = match self.gateway.generate_taboo_card().await {
            Ok(card) => card,
            Err(e) => {
                self.generation_failed(inv, "taboo card", e);
                return Ok(());
            }
        };
        let session = SharedSession::new(
            SharedGame::Taboo {
                keyword: keyword.clone(),
                forbidden: forbidden.clone(),
                describer_id: inv.user_id,
                describer_name: inv.user_name.clone(),
            },
            Utc::now(),
        );
        if self.register_shared(inv, session)? {
            self.send_action(OutgoingAction::Whisper {
                user: inv.user_id,
                text: format!(
                    "🤐 Your taboo card. Keyword: **{}**. Forbidden words: {}.",
                    keyword,
                    forbidden.join(", ")
                ),
            });
            self.send_to(
                inv.channel,
                format!(
                    "🤐 **Taboo**: **{}** is describing a secret word. Everyone else, \
                     guess it! The card went to their DMs.",
                    inv.user_name
                ),
            );
        }
        Ok(())
    }

    fn stop_personal(&mut self, inv: &CommandInvocation) -> Result<()> {
        match self.sessions.remove_personal(inv.channel, inv.user_id) {
            Some(session) => {
                metrics::record_game_end(session.game.kind().slug(), false);
                let reveal = match &session.game {
                    PersonalGame::Wordle(game) => Some(game.secret.clone()),
                    PersonalGame::Hangman(game) => Some(game.secret.clone()),
                    PersonalGame::TwentyQuestions(game) => Some(game.secret.clone()),
                    PersonalGame::Quiz(_) | PersonalGame::TwoTruths(_) => None,
                };
                let notice = match reveal {
                    Some(secret) => format!(
                        "Your {} game is over. The answer was **{}**.",
                        session.game.kind().display_name(),
                        secret
                    ),
                    None => format!("Your {} game is over.", session.game.kind().display_name()),
                };
                self.send_to(inv.channel, notice);
                self.ops_log(
                    "game.stop",
                    &format!(
                        "game={} user={}",
                        session.game.kind().slug(),
                        inv.user_name
                    ),
                );
            }
            None => self.send_to(inv.channel, "You have no game running here."),
        }
        Ok(())
    }

    async fn handle_hint(&mut self, inv: &CommandInvocation) -> Result<()> {
        let target = SessionTarget::Personal(inv.channel, inv.user_id);

        // Twenty questions needs a gateway clue; the cost is charged first
        // and sticks even if the clue never arrives.
        let twenty_secret = {
            let Some(session) = self.sessions.personal_mut(inv.channel, inv.user_id) else {
                self.send_to(inv.channel, "You have no game running here.");
                return Ok(());
            };
            match &mut session.game {
                PersonalGame::Wordle(game) => {
                    if game.hint_used {
                        self.send_to(inv.channel, "You already used your hint!");
                        return Ok(());
                    }
                    let effects = game.hint();
                    return self.apply_effects(
                        inv.channel,
                        None,
                        inv.user_id,
                        &inv.user_name,
                        effects,
                        target,
                    );
                }
                PersonalGame::Hangman(game) => {
                    if game.hint_used {
                        self.send_to(inv.channel, "You already used your hint!");
                        return Ok(());
                    }
                    let effects = game.hint();
                    return self.apply_effects(
                        inv.channel,
                        None,
                        inv.user_id,
                        &inv.user_name,
                        effects,
                        target,
                    );
                }
                PersonalGame::TwentyQuestions(game) => {
                    if game.hint_used {
                        self.send_to(inv.channel, "You already used your hint!");
                        return Ok(());
                    }
                    game.charge_hint();
                    game.secret.clone()
                }
                PersonalGame::Quiz(_) | PersonalGame::TwoTruths(_) => {
                    self.send_to(inv.channel, "No hints in this game!");
                    return Ok(());
                }
            }
        };

        match self.gateway.generate_clue(&twenty_secret).await {
            Ok(clue) => self.send_to(
                inv.channel,
                format!("💡 {} (Cost: 2 questions)", clue),
            ),
            Err(e) => {
                self.send_to(
                    inv.channel,
                    "💡 The clue got lost on the way... the 2 questions are still spent.",
                );
                self.ops_log("gateway.failure", &format!("twenty clue: {e}"));
            }
        }
        Ok(())
    }

    fn handle_final_guess(&mut self, inv: &CommandInvocation, text: &str) -> Result<()> {
        let effects = {
            let Some(session) = self.sessions.personal_mut(inv.channel, inv.user_id) else {
                self.send_to(inv.channel, "You have no twenty-questions game running here.");
                return Ok(());
            };
            let PersonalGame::TwentyQuestions(game) = &mut session.game else {
                self.send_to(inv.channel, "Final guesses only work in twenty questions.");
                return Ok(());
            };
            game.final_guess(text)
        };
        self.apply_effects(
            inv.channel,
            None,
            inv.user_id,
            &inv.user_name,
            effects,
            SessionTarget::Personal(inv.channel, inv.user_id),
        )
    }

    fn show_profile(&mut self, inv: &CommandInvocation) -> Result<()> {
        let Some(record) = self.store.get_player(inv.user_id)? else {
            self.send_to(inv.channel, "No stats yet. Win something first!");
            return Ok(());
        };
        let unlocks = self.store.player_unlocks(inv.user_id)?;
        let badges = if unlocks.is_empty() {
            "none yet".to_string()
        } else {
            unlocks
                .iter()
                .filter_map(|id| crate::achievements::by_id(id))
                .map(|def| def.name)
                .collect::<Vec<_>>()
                .join(", ")
        };
        self.send_to(
            inv.channel,
            format!(
                "👤 **{}** — {} pts\nQuiz wins: {} | Wordle wins: {} | Hangman wins: {} | Story posts: {}\nAchievements: {}",
                record.user_name,
                record.score,
                record.quiz_wins,
                record.wordle_wins,
                record.hangman_wins,
                record.story_posts,
                badges
            ),
        );
        Ok(())
    }

    fn show_leaderboard(&mut self, inv: &CommandInvocation) -> Result<()> {
        let board = self.store.leaderboard(10)?;
        if board.is_empty() {
            self.send_to(inv.channel, "The leaderboard is empty. Go play!");
            return Ok(());
        }
        let mut out = String::from("🏆 **Leaderboard**\n");
        for (i, record) in board.iter().enumerate() {
            out.push_str(&format!(
                "{}. **{}** — {} pts\n",
                i + 1,
                record.user_name,
                record.score
            ));
        }
        self.send_to(inv.channel, out);
        Ok(())
    }

    fn show_achievements(&mut self, inv: &CommandInvocation) -> Result<()> {
        let unlocked = self.store.player_unlocks(inv.user_id)?;
        let mut out = String::from("🏅 **Achievements**\n");
        for def in crate::achievements::CATALOG {
            let mark = if unlocked.iter().any(|id| id == def.id) {
                "✅"
            } else {
                "⬜"
            };
            out.push_str(&format!(
                "{} **{}** (+{} pts) — {}\n",
                mark, def.name, def.points, def.description
            ));
        }
        self.send_to(inv.channel, out);
        Ok(())
    }

    async fn handle_scenario(&mut self, inv: &CommandInvocation) -> Result<()> {
        match self.gateway.generate_scenario().await {
            Ok(scenario) => self.send_to(inv.channel, format!("🎭 {}", scenario)),
            Err(e) => self.generation_failed(inv, "scenario", e),
        }
        Ok(())
    }

    fn end_story(&mut self, inv: &CommandInvocation) -> Result<()> {
        let is_story = matches!(
            self.sessions.shared(inv.channel),
            Some(session) if matches!(session.game, SharedGame::Story { .. })
        );
        if !is_story {
            self.send_to(inv.channel, "No story is running in this channel.");
            return Ok(());
        }
        if let Some(session) = self.sessions.remove_shared(inv.channel) {
            metrics::record_game_end(GameKind::Story.slug(), false);
            if let Some(text) = session.story_text() {
                self.send_to(
                    inv.channel,
                    format!("📖 **The End!** Here is your story:\n\n> {}", text),
                );
            }
            self.ops_log("game.stop", &format!("game=story channel={}", inv.channel));
        }
        Ok(())
    }

    fn handle_admin(&mut self, inv: &CommandInvocation, admin: AdminCommand) -> Result<()> {
        if inv.user_id != self.config.bot.owner_id {
            self.send_to(inv.channel, "You are not authorized to do that.");
            return Ok(());
        }
        match admin {
            AdminCommand::ChannelAdd(id) => {
                let mut channels = self.store.allowed_channels()?;
                channels.push(id);
                self.store.set_allowed_channels(&channels)?;
                self.send_to(inv.channel, format!("Channel {} may now host games.", id));
                self.ops_log("admin.channel_add", &format!("channel={}", id));
            }
            AdminCommand::ChannelRemove(id) => {
                let channels: Vec<ChannelId> = self
                    .store
                    .allowed_channels()?
                    .into_iter()
                    .filter(|c| *c != id)
                    .collect();
                self.store.set_allowed_channels(&channels)?;
                self.send_to(
                    inv.channel,
                    format!("Channel {} removed from the game list.", id),
                );
                self.ops_log("admin.channel_remove", &format!("channel={}", id));
            }
            AdminCommand::Maintenance(enabled) => {
                self.store.set_maintenance_mode(enabled)?;
                let notice = if enabled {
                    "🛠️ Maintenance mode ON: new games are paused."
                } else {
                    "✅ Maintenance mode OFF: games are back!"
                };
                self.send_to(inv.channel, notice);
                self.ops_log("admin.maintenance", &format!("enabled={}", enabled));
            }
            AdminCommand::ForceEnd => match self.sessions.remove_shared(inv.channel) {
                Some(session) => {
                    metrics::record_game_end(session.game.kind().slug(), false);
                    self.send_to(
                        inv.channel,
                        format!(
                            "The {} game was ended by an administrator.",
                            session.game.kind().display_name()
                        ),
                    );
                    self.ops_log(
                        "admin.force_end",
                        &format!("game={} channel={}", session.game.kind().slug(), inv.channel),
                    );
                }
                None => self.send_to(inv.channel, "No shared game is running here."),
            },
            AdminCommand::ResetStats => {
                self.pending_reset = Some((inv.user_id, Utc::now()));
                self.send_to(
                    inv.channel,
                    format!(
                        "⚠️ This wipes every player record and achievement. \
                         `confirm_reset` within {} seconds to proceed, `cancel_reset` to abort.",
                        RESET_CONFIRM_WINDOW_SECONDS
                    ),
                );
            }
            AdminCommand::ConfirmReset => {
                let valid = matches!(
                    self.pending_reset,
                    Some((user, at)) if user == inv.user_id
                        && Utc::now() - at <= Duration::seconds(RESET_CONFIRM_WINDOW_SECONDS)
                );
                self.pending_reset = None;
                if valid {
                    self.store.reset_statistics()?;
                    self.send_to(inv.channel, "🧹 All statistics have been reset.");
                    self.ops_log("admin.reset", &format!("by={}", inv.user_name));
                } else {
                    self.send_to(
                        inv.channel,
                        "No reset pending (or the confirmation window expired).",
                    );
                }
            }
            AdminCommand::CancelReset => {
                self.pending_reset = None;
                self.send_to(inv.channel, "Reset cancelled.");
            }
        }
        Ok(())
    }
}

fn info_text() -> String {
    let mut out = String::from(
        "🎲 **Parlor** — minigames for this channel\n\n**Games**\n",
    );
    for kind in GameKind::ALL {
        let scope = if kind.is_personal() { "personal" } else { "channel-wide" };
        out.push_str(&format!(
            "• `{}` — {} ({})\n",
            kind.slug().replace('-', "_"),
            kind.display_name(),
            scope
        ));
    }
    out.push_str(
        "\n**Other commands**\n\
         • `stop` — end your personal game\n\
         • `hint` — one-shot hint (costs attempts/errors/questions)\n\
         • `guess <answer>` — final guess in twenty questions\n\
         • `story_end` — finish the channel story\n\
         • `profile`, `leaderboard`, `achievements`, `scenario`\n",
    );
    out
}
