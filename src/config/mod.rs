use std::env;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ENV_MAX_RETRIES: &str = "PROBE_MAX_RETRIES";
const ENV_RETRY_DELAY_SECS: &str = "PROBE_RETRY_DELAY_SECS";
const ENV_TIMEOUT_SECS: &str = "PROBE_TIMEOUT_SECS";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("max retries must be at least 1")]
    ZeroRetries,
    #[error("request timeout must be non-zero")]
    ZeroTimeout,
}

/// Tuning for the archive prober.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    pub max_retries: u32,
    pub retry_delay: Duration,
    /// Upper bound for a single HTTP attempt.
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ProbeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Values that are missing or fail to
    /// parse keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(retries) = read_u64(&lookup, ENV_MAX_RETRIES) {
            if retries == 0 || retries > u32::MAX as u64 {
                log::warn!("Ignoring {}={}, using {}", ENV_MAX_RETRIES, retries, config.max_retries);
            } else {
                config.max_retries = retries as u32;
            }
        }
        if let Some(secs) = read_u64(&lookup, ENV_RETRY_DELAY_SECS) {
            config.retry_delay = Duration::from_secs(secs);
        }
        if let Some(secs) = read_u64(&lookup, ENV_TIMEOUT_SECS) {
            if secs == 0 {
                log::warn!("Ignoring {}=0, using {:?}", ENV_TIMEOUT_SECS, config.timeout);
            } else {
                config.timeout = Duration::from_secs(secs);
            }
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries == 0 {
            return Err(ConfigError::ZeroRetries);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

fn read_u64<F>(lookup: &F, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("{} is not a number: {:?}", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ProbeConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, ProbeConfig::default());
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay, Duration::from_secs(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = ProbeConfig::from_lookup(lookup_from(&[
            ("PROBE_MAX_RETRIES", "5"),
            ("PROBE_RETRY_DELAY_SECS", "0"),
            ("PROBE_TIMEOUT_SECS", " 12 "),
        ]));

        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_delay, Duration::ZERO);
        assert_eq!(config.timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = ProbeConfig::from_lookup(lookup_from(&[
            ("PROBE_MAX_RETRIES", "0"),
            ("PROBE_RETRY_DELAY_SECS", "soon"),
            ("PROBE_TIMEOUT_SECS", "0"),
        ]));

        assert_eq!(config, ProbeConfig::default());
    }

    #[test]
    fn test_validate() {
        let mut config = ProbeConfig::default();
        config.max_retries = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroRetries));

        config.max_retries = 1;
        config.timeout = Duration::ZERO;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));
    }
}
