//! Configuration module.
//!
//! Environment-driven configuration for the library: database path,
//! storage layout, external AI credentials, sampler and retry tuning.
//! The binary loads `.env` via dotenvy before calling [`AppConfig::from_env`];
//! clients and pools are constructed once at startup and injected, never
//! lazily on first use.

use std::env;

const DEFAULT_SAMPLE_COUNT: usize = 3;
const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 60;
const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_INITIAL_DELAY_MS: u64 = 1_000;
const DEFAULT_COMIC_PAGE_DELAY_MS: u64 = 2_000;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// SQLite database file path.
    pub database_path: String,
    /// Root directory for the local object store.
    pub storage_root: String,
    /// Base URL under which stored assets resolve.
    pub storage_base_url: String,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Frames sampled per video.
    pub sample_count: usize,
    /// Wall-clock bound on one whole frame extraction run.
    pub extraction_timeout_secs: u64,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub replicate_api_token: Option<String>,
    pub replicate_image_model: String,
    pub retry_max_attempts: u32,
    pub retry_initial_delay_ms: u64,
    /// Fixed delay between sequential comic page generations (cooperative
    /// backpressure against the provider's rate limit).
    pub comic_page_delay_ms: u64,
    /// Master switch for AI enrichment; off means every ingest takes the
    /// placeholder path.
    pub magic_enabled: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            database_path: env_or("KEEPSAKE_DATABASE_PATH", "keepsake.db"),
            storage_root: env_or("KEEPSAKE_STORAGE_ROOT", "./storage"),
            storage_base_url: env_or("KEEPSAKE_STORAGE_BASE_URL", "http://localhost:3000/assets"),
            ffmpeg_path: env_or("FFMPEG_PATH", "ffmpeg"),
            ffprobe_path: env_or("FFPROBE_PATH", "ffprobe"),
            sample_count: parse_env("KEEPSAKE_SAMPLE_COUNT", DEFAULT_SAMPLE_COUNT),
            extraction_timeout_secs: parse_env(
                "KEEPSAKE_EXTRACTION_TIMEOUT_SECS",
                DEFAULT_EXTRACTION_TIMEOUT_SECS,
            ),
            anthropic_api_key: env::var("ANTHROPIC_API_KEY").ok().filter(|v| !v.is_empty()),
            anthropic_model: env_or("ANTHROPIC_MODEL", "claude-sonnet-4-20250514"),
            replicate_api_token: env::var("REPLICATE_API_TOKEN")
                .ok()
                .filter(|v| !v.is_empty()),
            replicate_image_model: env_or(
                "REPLICATE_IMAGE_MODEL",
                "black-forest-labs/flux-kontext-pro",
            ),
            retry_max_attempts: parse_env("KEEPSAKE_RETRY_MAX_ATTEMPTS", DEFAULT_RETRY_MAX_ATTEMPTS),
            retry_initial_delay_ms: parse_env(
                "KEEPSAKE_RETRY_INITIAL_DELAY_MS",
                DEFAULT_RETRY_INITIAL_DELAY_MS,
            ),
            comic_page_delay_ms: parse_env(
                "KEEPSAKE_COMIC_PAGE_DELAY_MS",
                DEFAULT_COMIC_PAGE_DELAY_MS,
            ),
            magic_enabled: parse_env("KEEPSAKE_MAGIC_ENABLED", true),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        // Other tests don't set KEEPSAKE_* vars, so defaults apply.
        let config = AppConfig::from_env();
        assert_eq!(config.sample_count, DEFAULT_SAMPLE_COUNT);
        assert_eq!(config.retry_max_attempts, DEFAULT_RETRY_MAX_ATTEMPTS);
        assert!(config.magic_enabled);
    }

    #[test]
    fn test_parse_env_falls_back_on_garbage() {
        std::env::set_var("KEEPSAKE_TEST_GARBAGE", "not-a-number");
        let v: u64 = parse_env("KEEPSAKE_TEST_GARBAGE", 7);
        assert_eq!(v, 7);
        std::env::remove_var("KEEPSAKE_TEST_GARBAGE");
    }
}
