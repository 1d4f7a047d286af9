use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PlaybackError {
    #[error("Invalid playback configuration: {0}")]
    InvalidConfig(String),
}

/// Bounded prefetch for reels near the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetchBudget {
    pub max_segments: u32,
    pub max_buffer_secs: u32,
}

/// Tunables of the reel player and reels feed.
///
/// Defaults reproduce the shipped behaviour: two HLS retries with a linear
/// 1 s backoff step, a 300 ms double-tap window, 60% visibility to count as
/// on screen, a 2 segment / 4 s prefetch that is stopped after 2 s, preload
/// within distance 2 and unload beyond distance 3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub max_hls_retries: u32,
    pub retry_backoff_ms: u64,
    pub double_tap_window_ms: u64,
    pub visibility_threshold: f64,
    pub preload_max_segments: u32,
    pub preload_max_buffer_secs: u32,
    pub preload_window_ms: u64,
    pub preload_distance: usize,
    pub unload_distance: usize,
    /// Fraction of a feed item that must be visible before it may become active.
    pub activation_ratio: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            max_hls_retries: 2,
            retry_backoff_ms: 1000,
            double_tap_window_ms: 300,
            visibility_threshold: 0.6,
            preload_max_segments: 2,
            preload_max_buffer_secs: 4,
            preload_window_ms: 2000,
            preload_distance: 2,
            unload_distance: 3,
            activation_ratio: 0.5,
        }
    }
}

impl PlaybackConfig {
    /// Backoff before retry number `retry_count + 1`: linear in the retry count.
    pub fn retry_delay(&self, retry_count: u32) -> Duration {
        let steps = u64::from(retry_count).saturating_add(1);
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(steps))
    }

    pub fn double_tap_window(&self) -> Duration {
        Duration::from_millis(self.double_tap_window_ms)
    }

    pub fn preload_window(&self) -> Duration {
        Duration::from_millis(self.preload_window_ms)
    }

    pub fn preload_budget(&self) -> PrefetchBudget {
        PrefetchBudget {
            max_segments: self.preload_max_segments,
            max_buffer_secs: self.preload_max_buffer_secs,
        }
    }

    pub fn validate(&self) -> Result<(), PlaybackError> {
        for (name, ratio) in [
            ("visibility_threshold", self.visibility_threshold),
            ("activation_ratio", self.activation_ratio),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(PlaybackError::InvalidConfig(format!(
                    "{name} must be within 0.0..=1.0, got {ratio}"
                )));
            }
        }
        if self.unload_distance < self.preload_distance {
            return Err(PlaybackError::InvalidConfig(
                "unload_distance must not be smaller than preload_distance".to_string(),
            ));
        }
        if self.double_tap_window_ms == 0 {
            return Err(PlaybackError::InvalidConfig(
                "double_tap_window_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_is_linear() {
        let config = PlaybackConfig::default();
        assert_eq!(config.retry_delay(0), Duration::from_millis(1000));
        assert_eq!(config.retry_delay(1), Duration::from_millis(2000));
    }

    #[test]
    fn test_retry_delay_saturates_instead_of_overflowing() {
        let config = PlaybackConfig {
            retry_backoff_ms: u64::MAX / 2,
            ..Default::default()
        };
        assert_eq!(config.retry_delay(u32::MAX), Duration::from_millis(u64::MAX));
        assert_eq!(config.retry_delay(0), Duration::from_millis(u64::MAX / 2));
    }

    #[test]
    fn test_validate_rejects_bad_ratios_and_distances() {
        assert!(PlaybackConfig::default().validate().is_ok());

        let config = PlaybackConfig {
            visibility_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PlaybackConfig {
            preload_distance: 4,
            unload_distance: 3,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: PlaybackConfig = serde_json::from_str(r#"{"max_hls_retries": 5}"#).unwrap();
        assert_eq!(config.max_hls_retries, 5);
        assert_eq!(config.double_tap_window_ms, 300);
    }
}
