//! Test utilities & fixtures shared by the integration tests.

use parlor::config::Config;
use tempfile::TempDir;

/// A config pointing at a throwaway data directory. The gateway endpoint is
/// unreachable on purpose; tests only exercise paths that never call it.
pub fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.bot.name = "parlor-test".to_string();
    config.bot.user_id = 1;
    config.bot.owner_id = 500;
    config.storage.data_dir = dir.path().to_string_lossy().to_string();
    config.gateway.api_url = "http://127.0.0.1:1/unreachable".to_string();
    config.gateway.max_attempts = 1;
    config
}
