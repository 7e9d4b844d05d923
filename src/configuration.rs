use config::{Config, ConfigError};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

/// Everything the fetch client needs to know about the site it talks to.
///
/// Built once at startup and never changed afterwards.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub user_agent: String,
    /// Pause before every request.
    pub delay_ms: u32,
    pub max_retries: u32,
    pub backoff_base: u32,
    pub min_backoff_secs: u32,
    pub max_backoff_secs: u32,
    pub retry_statuses: Vec<u16>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "https://dynasty-scans.com/".into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            delay_ms: 500,
            max_retries: 5,
            backoff_base: 2,
            min_backoff_secs: 2,
            max_backoff_secs: 120,
            retry_statuses: vec![403, 429, 500, 502, 503, 504],
        }
    }
}

impl Settings {
    /// Load settings, letting `config_file` override the built-in defaults.
    pub fn new(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let d = Self::default();
        let statuses: Vec<i64> = d.retry_statuses.iter().map(|s| i64::from(*s)).collect();

        let mut builder = Config::builder()
            .set_default("base_url", d.base_url)?
            .set_default("user_agent", d.user_agent)?
            .set_default("delay_ms", i64::from(d.delay_ms))?
            .set_default("max_retries", i64::from(d.max_retries))?
            .set_default("backoff_base", i64::from(d.backoff_base))?
            .set_default("min_backoff_secs", i64::from(d.min_backoff_secs))?
            .set_default("max_backoff_secs", i64::from(d.max_backoff_secs))?
            .set_default("retry_statuses", statuses)?;

        if let Some(file) = config_file {
            builder = builder.add_source(config::File::with_name(file));
        }

        builder.build()?.try_deserialize()
    }

    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.base_url)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.delay_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let s = Settings::new(None).unwrap();
        assert_eq!(Settings::default(), s);
        assert_eq!(Duration::from_millis(500), s.delay());
        assert_eq!(5, s.max_retries);
        assert_eq!(2, s.backoff_base);
        assert_eq!(vec![403, 429, 500, 502, 503, 504], s.retry_statuses);
        assert_eq!("dynasty-scans.com", s.base_url().unwrap().host_str().unwrap());
    }

    #[test]
    fn load_config() {
        let s = Settings::new(Some("dynasty.test.toml")).unwrap();

        assert_eq!("https://example.test/", s.base_url);
        assert_eq!(Duration::ZERO, s.delay());
        assert_eq!(2, s.max_retries);
        assert_eq!(vec![429, 503], s.retry_statuses);
        // untouched keys keep their defaults
        assert_eq!(DEFAULT_USER_AGENT, s.user_agent);
        assert_eq!(2, s.backoff_base);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Settings::new(Some("does-not-exist.toml")).is_err());
    }
}
