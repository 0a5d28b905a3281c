//! Runtime configuration for the discovery engine.
//!
//! Everything is overridable per scan request; these are the process-wide
//! defaults, selectable through the environment so a deployment can flip
//! between simulated and real probing without a rebuild.

use crate::model::scan::ScanMode;

#[derive(Debug, Clone)]
pub struct Config {
    /// Default probe mode when a request does not specify one.
    pub mode: ScanMode,
    /// Community strings tried in order when a request carries none.
    pub communities: Vec<String>,
    /// Number of addresses probed concurrently per batch.
    pub batch_size: usize,
    /// Per-credential probe timeout in milliseconds.
    pub probe_timeout_ms: u64,
    /// Delay between simulated progress steps in milliseconds.
    pub sim_step_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: ScanMode::Simulation,
            communities: vec!["public".to_string(), "private".to_string()],
            batch_size: 10,
            probe_timeout_ms: 2_000,
            sim_step_ms: 400,
        }
    }
}

impl Config {
    /// Builds a config from `SONDR_*` environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(mode) = std::env::var("SONDR_MODE") {
            match mode.to_ascii_lowercase().as_str() {
                "real" => cfg.mode = ScanMode::Real,
                "simulation" => cfg.mode = ScanMode::Simulation,
                other => tracing::warn!("ignoring unknown SONDR_MODE '{other}'"),
            }
        }

        if let Ok(raw) = std::env::var("SONDR_COMMUNITIES") {
            let communities: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if !communities.is_empty() {
                cfg.communities = communities;
            }
        }

        cfg.batch_size = env_parse("SONDR_BATCH_SIZE", cfg.batch_size);
        cfg.probe_timeout_ms = env_parse("SONDR_PROBE_TIMEOUT_MS", cfg.probe_timeout_ms);
        cfg.sim_step_ms = env_parse("SONDR_SIM_STEP_MS", cfg.sim_step_ms);

        cfg
    }
}

fn env_parse<T: std::str::FromStr + Copy>(key: &str, fallback: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("ignoring unparsable {key}='{raw}'");
            fallback
        }),
        Err(_) => fallback,
    }
}
