use std::time::Duration;

use reelgen_client::config::{env_or, ConfigError};

/// Default interval between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Shortest interval the tracker accepts.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Tracker settings.
///
/// | Env Var                    | Default |
/// |----------------------------|---------|
/// | `REELGEN_POLL_INTERVAL_MS` | `3000`  |
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub poll_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl TrackerConfig {
    /// Build a config with the given interval, raised to
    /// [`MIN_POLL_INTERVAL`] if shorter.
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self {
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let interval_ms: u64 = env_or(
            "REELGEN_POLL_INTERVAL_MS",
            DEFAULT_POLL_INTERVAL.as_millis() as u64,
        )?;
        let poll_interval = Duration::from_millis(interval_ms);
        if poll_interval < MIN_POLL_INTERVAL {
            return Err(ConfigError::Invalid {
                var: "REELGEN_POLL_INTERVAL_MS",
                reason: format!(
                    "must be at least {} ms, got {interval_ms}",
                    MIN_POLL_INTERVAL.as_millis()
                ),
            });
        }
        Ok(Self { poll_interval })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interval_is_three_seconds() {
        assert_eq!(TrackerConfig::default().poll_interval, Duration::from_secs(3));
    }

    #[test]
    fn short_intervals_are_raised_to_minimum() {
        let config = TrackerConfig::with_poll_interval(Duration::ZERO);
        assert_eq!(config.poll_interval, MIN_POLL_INTERVAL);
    }
}
