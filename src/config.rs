use std::time::Duration;

use crate::ddragon_fetch::DEFAULT_BASE_URL;
use crate::locale::DEFAULT_LOCALE;
use crate::media::DEFAULT_MEDIA_BASE_URL;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub media_base_url: String,
    pub initial_locale: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            media_base_url: DEFAULT_MEDIA_BASE_URL.to_string(),
            initial_locale: DEFAULT_LOCALE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Blank or unparsable values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|val| val.trim().to_string())
                .filter(|val| !val.is_empty())
        };
        let defaults = Self::default();
        let timeout_secs = read("DDRAGON_TIMEOUT_SECS")
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .max(1);
        Self {
            base_url: read("DDRAGON_BASE_URL")
                .map(|val| val.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            media_base_url: read("DDRAGON_MEDIA_BASE_URL")
                .map(|val| val.trim_end_matches('/').to_string())
                .unwrap_or(defaults.media_base_url),
            initial_locale: read("DDRAGON_LOCALE").unwrap_or(defaults.initial_locale),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}
