//! # Storage Module - Data Persistence Layer
//!
//! Sled-backed persistence for the three durable tables the bot needs:
//!
//! - **players** - per-player score and win counters, upserted additively
//! - **unlocks** - the (player, achievement) set, insert-once
//! - **settings** - maintenance flag and the allowed-channel list
//!
//! Records are bincode-serialized with a schema-version byte so future
//! migrations can detect stale rows. All mutation goes through small CRUD
//! methods; no game logic lives here.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use parlor::storage::{ScoreDelta, Store};
//!
//! fn main() -> Result<(), parlor::storage::StorageError> {
//!     let store = Store::open("./data")?;
//!     let delta = ScoreDelta { points: 15, quiz_win: true, ..Default::default() };
//!     let record = store.adjust_score(42, "alice", &delta)?;
//!     assert_eq!(record.quiz_wins, 1);
//!     Ok(())
//! }
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::IVec;
use thiserror::Error;

const TREE_PLAYERS: &str = "players";
const TREE_UNLOCKS: &str = "unlocks";
const TREE_SETTINGS: &str = "settings";

pub const PLAYER_SCHEMA_VERSION: u8 = 1;

const SETTING_MAINTENANCE: &[u8] = b"maintenance_mode";
const SETTING_ALLOWED_CHANNELS: &[u8] = b"allowed_channels";

/// Errors that can arise while interacting with the persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },

    /// Settings values are stored as JSON; malformed values surface here.
    #[error("malformed setting {key}: {source}")]
    MalformedSetting {
        key: &'static str,
        source: serde_json::Error,
    },
}

/// Durable per-player statistics. Created on the first score-affecting
/// event, mutated additively, removed only by the administrative reset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerRecord {
    pub schema_version: u8,
    pub user_id: u64,
    pub user_name: String,
    pub score: i64,
    pub quiz_wins: u32,
    pub wordle_wins: u32,
    pub hangman_wins: u32,
    pub story_posts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlayerRecord {
    fn new(user_id: u64, user_name: &str) -> Self {
        let now = Utc::now();
        PlayerRecord {
            schema_version: PLAYER_SCHEMA_VERSION,
            user_id,
            user_name: user_name.to_string(),
            score: 0,
            quiz_wins: 0,
            wordle_wins: 0,
            hangman_wins: 0,
            story_posts: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Total game wins counted toward the first-win achievement.
    pub fn total_wins(&self) -> u32 {
        self.quiz_wins + self.wordle_wins + self.hangman_wins
    }
}

/// One additive score/counter adjustment. Applied as a single upsert so a
/// failed write never leaves a partially updated record behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreDelta {
    pub points: i64,
    pub quiz_win: bool,
    pub wordle_win: bool,
    pub hangman_win: bool,
    pub story_post: bool,
}

/// Sled-backed store for player stats, achievement unlocks, and settings.
///
/// Not safe to share between processes; the bot's single logical worker is
/// the only writer.
pub struct Store {
    _db: sled::Db,
    players: sled::Tree,
    unlocks: sled::Tree,
    settings: sled::Tree,
}

impl Store {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let players = db.open_tree(TREE_PLAYERS)?;
        let unlocks = db.open_tree(TREE_UNLOCKS)?;
        let settings = db.open_tree(TREE_SETTINGS)?;
        Ok(Store {
            _db: db,
            players,
            unlocks,
            settings,
        })
    }

    fn player_key(user_id: u64) -> [u8; 8] {
        user_id.to_be_bytes()
    }

    fn unlock_key(user_id: u64, achievement_id: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(8 + 1 + achievement_id.len());
        key.extend_from_slice(&user_id.to_be_bytes());
        key.push(b':');
        key.extend_from_slice(achievement_id.as_bytes());
        key
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, StorageError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize_player(bytes: IVec) -> Result<PlayerRecord, StorageError> {
        let record: PlayerRecord = bincode::deserialize(&bytes)?;
        if record.schema_version != PLAYER_SCHEMA_VERSION {
            return Err(StorageError::SchemaMismatch {
                entity: "player",
                expected: PLAYER_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    /// Fetch a player record, if one exists.
    pub fn get_player(&self, user_id: u64) -> Result<Option<PlayerRecord>, StorageError> {
        match self.players.get(Self::player_key(user_id))? {
            Some(bytes) => Ok(Some(Self::deserialize_player(bytes)?)),
            None => Ok(None),
        }
    }

    /// Upsert the player's display name and apply one additive adjustment.
    /// Returns the updated record.
    pub fn adjust_score(
        &self,
        user_id: u64,
        user_name: &str,
        delta: &ScoreDelta,
    ) -> Result<PlayerRecord, StorageError> {
        let mut record = self
            .get_player(user_id)?
            .unwrap_or_else(|| PlayerRecord::new(user_id, user_name));
        record.user_name = user_name.to_string();
        record.score += delta.points;
        if delta.quiz_win {
            record.quiz_wins += 1;
        }
        if delta.wordle_win {
            record.wordle_wins += 1;
        }
        if delta.hangman_win {
            record.hangman_wins += 1;
        }
        if delta.story_post {
            record.story_posts += 1;
        }
        record.updated_at = Utc::now();
        let bytes = Self::serialize(&record)?;
        self.players.insert(Self::player_key(user_id), bytes)?;
        self.players.flush()?;
        Ok(record)
    }

    /// Record an achievement unlock if absent. Returns `true` only for the
    /// first insertion; callers grant the reward only on `true`.
    pub fn grant_unlock(
        &self,
        user_id: u64,
        achievement_id: &str,
    ) -> Result<bool, StorageError> {
        let key = Self::unlock_key(user_id, achievement_id);
        let swap = self
            .unlocks
            .compare_and_swap(key, None as Option<&[u8]>, Some(&[1u8][..]))?;
        if swap.is_ok() {
            self.unlocks.flush()?;
        }
        Ok(swap.is_ok())
    }

    /// All achievement ids a player has unlocked.
    pub fn player_unlocks(&self, user_id: u64) -> Result<Vec<String>, StorageError> {
        let mut prefix = Vec::with_capacity(9);
        prefix.extend_from_slice(&user_id.to_be_bytes());
        prefix.push(b':');
        let mut ids = Vec::new();
        for entry in self.unlocks.scan_prefix(&prefix) {
            let (key, _) = entry?;
            if let Ok(text) = std::str::from_utf8(&key[prefix.len()..]) {
                ids.push(text.to_string());
            }
        }
        Ok(ids)
    }

    /// Top-N players ordered by score descending.
    pub fn leaderboard(&self, limit: usize) -> Result<Vec<PlayerRecord>, StorageError> {
        let mut records = Vec::new();
        for entry in self.players.iter() {
            let (_, bytes) = entry?;
            records.push(Self::deserialize_player(bytes)?);
        }
        records.sort_by(|a, b| b.score.cmp(&a.score).then(a.user_name.cmp(&b.user_name)));
        records.truncate(limit);
        Ok(records)
    }

    /// Number of player records currently stored.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Remove all player records and achievement unlocks. Settings survive.
    pub fn reset_statistics(&self) -> Result<(), StorageError> {
        self.players.clear()?;
        self.unlocks.clear()?;
        self.players.flush()?;
        self.unlocks.flush()?;
        Ok(())
    }

    /// Channels allowed to host games. Empty means every channel may.
    pub fn allowed_channels(&self) -> Result<Vec<u64>, StorageError> {
        match self.settings.get(SETTING_ALLOWED_CHANNELS)? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|source| {
                StorageError::MalformedSetting {
                    key: "allowed_channels",
                    source,
                }
            }),
            None => Ok(Vec::new()),
        }
    }

    pub fn set_allowed_channels(&self, channels: &[u64]) -> Result<(), StorageError> {
        let mut deduped: Vec<u64> = channels.to_vec();
        deduped.sort_unstable();
        deduped.dedup();
        let bytes =
            serde_json::to_vec(&deduped).map_err(|source| StorageError::MalformedSetting {
                key: "allowed_channels",
                source,
            })?;
        self.settings.insert(SETTING_ALLOWED_CHANNELS, bytes)?;
        self.settings.flush()?;
        Ok(())
    }

    pub fn maintenance_mode(&self) -> Result<bool, StorageError> {
        Ok(matches!(
            self.settings.get(SETTING_MAINTENANCE)?,
            Some(ref bytes) if bytes.as_ref() == b"true"
        ))
    }

    pub fn set_maintenance_mode(&self, enabled: bool) -> Result<(), StorageError> {
        let value: &[u8] = if enabled { b"true" } else { b"false" };
        self.settings.insert(SETTING_MAINTENANCE, value)?;
        self.settings.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_store() -> (tempfile::TempDir, Store) {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn adjust_score_creates_then_accumulates() {
        let (_dir, store) = open_store();
        assert!(store.get_player(7).unwrap().is_none());

        let delta = ScoreDelta {
            points: 15,
            wordle_win: true,
            ..Default::default()
        };
        let record = store.adjust_score(7, "alice", &delta).unwrap();
        assert_eq!(record.score, 15);
        assert_eq!(record.wordle_wins, 1);
        assert_eq!(record.total_wins(), 1);

        let record = store
            .adjust_score(
                7,
                "alice-renamed",
                &ScoreDelta {
                    points: 10,
                    quiz_win: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(record.score, 25);
        assert_eq!(record.quiz_wins, 1);
        assert_eq!(record.user_name, "alice-renamed");
    }

    #[test]
    fn grant_unlock_is_insert_once() {
        let (_dir, store) = open_store();
        assert!(store.grant_unlock(7, "FIRST_WIN").unwrap());
        assert!(!store.grant_unlock(7, "FIRST_WIN").unwrap());
        assert!(store.grant_unlock(8, "FIRST_WIN").unwrap());
        assert_eq!(store.player_unlocks(7).unwrap(), vec!["FIRST_WIN"]);
    }

    #[test]
    fn leaderboard_orders_by_score_desc() {
        let (_dir, store) = open_store();
        for (id, name, points) in [(1, "low", 5), (2, "high", 50), (3, "mid", 20)] {
            let delta = ScoreDelta {
                points,
                ..Default::default()
            };
            store.adjust_score(id, name, &delta).unwrap();
        }
        let board = store.leaderboard(2).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].user_name, "high");
        assert_eq!(board[1].user_name, "mid");
    }

    #[test]
    fn settings_round_trip() {
        let (_dir, store) = open_store();
        assert!(store.allowed_channels().unwrap().is_empty());
        assert!(!store.maintenance_mode().unwrap());

        store.set_allowed_channels(&[30, 10, 20, 10]).unwrap();
        assert_eq!(store.allowed_channels().unwrap(), vec![10, 20, 30]);

        store.set_maintenance_mode(true).unwrap();
        assert!(store.maintenance_mode().unwrap());
        store.set_maintenance_mode(false).unwrap();
        assert!(!store.maintenance_mode().unwrap());
    }

    #[test]
    fn reset_clears_players_and_unlocks_but_not_settings() {
        let (_dir, store) = open_store();
        store
            .adjust_score(1, "alice", &ScoreDelta { points: 5, ..Default::default() })
            .unwrap();
        store.grant_unlock(1, "FIRST_WIN").unwrap();
        store.set_allowed_channels(&[99]).unwrap();

        store.reset_statistics().unwrap();
        assert!(store.get_player(1).unwrap().is_none());
        assert!(store.player_unlocks(1).unwrap().is_empty());
        assert_eq!(store.allowed_channels().unwrap(), vec![99]);
    }
}
