//! Process-wide counters for game lifecycle events.
//! Exposed for the status command and periodic log lines; not persisted.
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

static GAME_COUNTERS: OnceLock<Mutex<HashMap<String, GameCounter>>> = OnceLock::new();

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GameCounter {
    pub started: u64,
    pub finished: u64,
    pub wins: u64,
    pub currently_active: u64,
    pub concurrent_peak: u64,
}

fn game_counter_lock() -> &'static Mutex<HashMap<String, GameCounter>> {
    GAME_COUNTERS.get_or_init(|| Mutex::new(HashMap::new()))
}

pub fn record_game_start(slug: &str) -> GameCounter {
    let mut guard = game_counter_lock()
        .lock()
        .expect("game counter mutex poisoned");
    let counter = guard.entry(slug.to_string()).or_default();
    counter.started = counter.started.saturating_add(1);
    counter.currently_active = counter.currently_active.saturating_add(1);
    if counter.currently_active > counter.concurrent_peak {
        counter.concurrent_peak = counter.currently_active;
    }
    *counter
}

pub fn record_game_end(slug: &str, won: bool) -> GameCounter {
    let mut guard = game_counter_lock()
        .lock()
        .expect("game counter mutex poisoned");
    let counter = guard.entry(slug.to_string()).or_default();
    counter.finished = counter.finished.saturating_add(1);
    if won {
        counter.wins = counter.wins.saturating_add(1);
    }
    if counter.currently_active > 0 {
        counter.currently_active -= 1;
    }
    *counter
}

pub fn game_counters_snapshot() -> HashMap<String, GameCounter> {
    game_counter_lock()
        .lock()
        .expect("game counter mutex poisoned")
        .clone()
}

#[cfg(test)]
pub(crate) fn reset_game_counters_for_tests() {
    if let Some(lock) = GAME_COUNTERS.get() {
        let mut guard = lock.lock().expect("game counter mutex poisoned");
        guard.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_and_end_update_counters() {
        reset_game_counters_for_tests();
        assert!(game_counters_snapshot().is_empty());

        let started = record_game_start("wordle");
        assert_eq!(started.started, 1);
        assert_eq!(started.currently_active, 1);
        assert_eq!(started.concurrent_peak, 1);

        let ended = record_game_end("wordle", true);
        assert_eq!(ended.finished, 1);
        assert_eq!(ended.wins, 1);
        assert_eq!(ended.currently_active, 0);
        assert_eq!(ended.concurrent_peak, 1);

        let lost = record_game_end("wordle", false);
        assert_eq!(lost.finished, 2);
        assert_eq!(lost.wins, 1);
    }
}
