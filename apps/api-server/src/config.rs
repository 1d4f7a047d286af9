//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use nearly_core::domain::UploadStrategy;
use nearly_core::playback::PlaybackConfig;

#[cfg(feature = "postgres")]
use nearly_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    /// Served to reel players from `/api/reels/config`.
    pub playback: PlaybackConfig,
    /// Uploads up to this size go direct, larger ones use a presigned URL.
    pub direct_upload_limit: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            #[cfg(feature = "postgres")]
            database: None,
            playback: PlaybackConfig::default(),
            direct_upload_limit: UploadStrategy::DEFAULT_DIRECT_LIMIT,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
            playback: playback_from(&lookup),
            direct_upload_limit: parsed(&lookup, "MEDIA_DIRECT_UPLOAD_LIMIT_BYTES")
                .unwrap_or(defaults.direct_upload_limit),
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparsable configuration value");
            None
        }
    }
}

/// `PLAYBACK_*` overrides on top of the shipped defaults. An invalid
/// combination falls back to the defaults as a whole.
fn playback_from(lookup: &impl Fn(&str) -> Option<String>) -> PlaybackConfig {
    let d = PlaybackConfig::default();
    let config = PlaybackConfig {
        max_hls_retries: parsed(lookup, "PLAYBACK_MAX_HLS_RETRIES").unwrap_or(d.max_hls_retries),
        retry_backoff_ms: parsed(lookup, "PLAYBACK_RETRY_BACKOFF_MS").unwrap_or(d.retry_backoff_ms),
        double_tap_window_ms: parsed(lookup, "PLAYBACK_DOUBLE_TAP_WINDOW_MS")
            .unwrap_or(d.double_tap_window_ms),
        visibility_threshold: parsed(lookup, "PLAYBACK_VISIBILITY_THRESHOLD")
            .unwrap_or(d.visibility_threshold),
        preload_max_segments: parsed(lookup, "PLAYBACK_PRELOAD_MAX_SEGMENTS")
            .unwrap_or(d.preload_max_segments),
        preload_max_buffer_secs: parsed(lookup, "PLAYBACK_PRELOAD_MAX_BUFFER_SECS")
            .unwrap_or(d.preload_max_buffer_secs),
        preload_window_ms: parsed(lookup, "PLAYBACK_PRELOAD_WINDOW_MS")
            .unwrap_or(d.preload_window_ms),
        preload_distance: parsed(lookup, "PLAYBACK_PRELOAD_DISTANCE").unwrap_or(d.preload_distance),
        unload_distance: parsed(lookup, "PLAYBACK_UNLOAD_DISTANCE").unwrap_or(d.unload_distance),
        activation_ratio: parsed(lookup, "PLAYBACK_ACTIVATION_RATIO")
            .unwrap_or(d.activation_ratio),
    };

    match config.validate() {
        Ok(()) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid playback overrides, using defaults");
            d
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.playback, PlaybackConfig::default());
        assert_eq!(config.direct_upload_limit, 10 * 1024 * 1024);
    }

    #[test]
    fn test_playback_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("PLAYBACK_MAX_HLS_RETRIES", "4"),
            ("PLAYBACK_PRELOAD_DISTANCE", "1"),
            ("MEDIA_DIRECT_UPLOAD_LIMIT_BYTES", "1024"),
        ]));
        assert_eq!(config.port, 9000);
        assert_eq!(config.playback.max_hls_retries, 4);
        assert_eq!(config.playback.preload_distance, 1);
        assert_eq!(config.direct_upload_limit, 1024);
    }

    #[test]
    fn test_invalid_playback_combination_falls_back() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PLAYBACK_PRELOAD_DISTANCE", "5"),
            ("PLAYBACK_UNLOAD_DISTANCE", "1"),
        ]));
        assert_eq!(config.playback, PlaybackConfig::default());
    }

    #[test]
    fn test_unparsable_value_is_ignored() {
        let config = AppConfig::from_lookup(lookup(&[("PORT", "eighty")]));
        assert_eq!(config.port, 8080);
    }
}
