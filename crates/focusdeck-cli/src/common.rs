//! Shared plumbing for CLI commands: config, remote client, engine.

use std::sync::Arc;

use focusdeck_core::storage::data_dir;
use focusdeck_core::{Config, FocusEngine, FocusQueue, HttpTaskRemote, TaskRemote, TimerCache};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    Ok(Config::load()?)
}

pub fn build_remote(config: &Config) -> Result<Arc<dyn TaskRemote>, Box<dyn std::error::Error>> {
    let base_url = config
        .remote
        .base_url
        .as_deref()
        .ok_or("remote.base_url is not configured; edit config.toml")?;
    let remote = HttpTaskRemote::new(base_url, config.remote.api_token.clone())?;
    Ok(Arc::new(remote))
}

pub fn load_queue(config: &Config) -> Result<FocusQueue, Box<dyn std::error::Error>> {
    let path = data_dir()?.join("queue.json");
    Ok(FocusQueue::with_path(config.queue.capacity, path))
}

pub fn build_engine() -> Result<FocusEngine, Box<dyn std::error::Error>> {
    let config = load_config()?;
    let remote = build_remote(&config)?;
    let queue = load_queue(&config)?;
    let cache = TimerCache::open()?;
    Ok(FocusEngine::new(
        queue,
        remote,
        cache,
        config.timer.backup_interval_secs * 1_000,
    ))
}

pub fn fmt_elapsed(elapsed_ms: u64) -> String {
    let total_secs = elapsed_ms / 1_000;
    let h = total_secs / 3_600;
    let m = (total_secs % 3_600) / 60;
    let s = total_secs % 60;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}
