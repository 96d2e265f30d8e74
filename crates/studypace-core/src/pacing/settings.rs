use std::time::Duration;

use crate::storage::Config;
use crate::timer::InactivityDetector;

use super::review::{DEFAULT_REVIEW_BLOCK, DEFAULT_REVIEW_EVERY};

pub const DEFAULT_TIME_MENU_SECS: [u64; 6] = [15, 30, 45, 60, 90, 120];
pub const DEFAULT_BOREDOM_TIMEOUT: Duration = Duration::from_secs(45);

/// Knobs the orchestrator reads; built from [`Config`] by the front end.
#[derive(Debug, Clone, PartialEq)]
pub struct PacingSettings {
    pub time_menu_secs: Vec<u64>,
    pub review_every: u32,
    pub review_block: Duration,
    pub boredom_enabled: bool,
    pub boredom_timeout: Duration,
    pub boredom_poll: Duration,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            time_menu_secs: DEFAULT_TIME_MENU_SECS.to_vec(),
            review_every: DEFAULT_REVIEW_EVERY,
            review_block: DEFAULT_REVIEW_BLOCK,
            boredom_enabled: true,
            boredom_timeout: DEFAULT_BOREDOM_TIMEOUT,
            boredom_poll: InactivityDetector::DEFAULT_POLL_INTERVAL,
        }
    }
}

impl From<&Config> for PacingSettings {
    fn from(config: &Config) -> Self {
        let time_menu_secs = if config.pacing.time_menu_secs.is_empty() {
            DEFAULT_TIME_MENU_SECS.to_vec()
        } else {
            config.pacing.time_menu_secs.clone()
        };
        Self {
            time_menu_secs,
            review_every: config.pacing.review_every.max(1),
            review_block: Duration::from_secs(config.pacing.review_block_secs),
            boredom_enabled: config.boredom.enabled,
            boredom_timeout: Duration::from_secs(config.boredom.timeout_secs),
            boredom_poll: Duration::from_secs(config.boredom.poll_secs.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_default_settings() {
        assert_eq!(PacingSettings::from(&Config::default()), PacingSettings::default());
    }

    #[test]
    fn empty_menu_falls_back_to_defaults() {
        let mut config = Config::default();
        config.pacing.time_menu_secs.clear();
        config.pacing.review_every = 0;
        let settings = PacingSettings::from(&config);
        assert_eq!(settings.time_menu_secs, DEFAULT_TIME_MENU_SECS.to_vec());
        assert_eq!(settings.review_every, 1);
    }
}
