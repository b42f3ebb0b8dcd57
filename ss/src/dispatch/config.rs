//! Dispatcher configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Dispatcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Submissions issued per rate window
    #[serde(default = "default_tokens_per_interval", rename = "tokens-per-interval")]
    pub tokens_per_interval: u32,

    /// Rate window length in milliseconds
    #[serde(default = "default_interval_ms", rename = "interval-ms")]
    pub interval_ms: u64,

    /// Per-submission timeout in milliseconds; expiry counts as a failure
    #[serde(default = "default_submit_timeout_ms", rename = "submit-timeout-ms")]
    pub submit_timeout_ms: u64,

    /// What happens to items whose submission failed
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_tokens_per_interval() -> u32 {
    3
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_submit_timeout_ms() -> u64 {
    30_000
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            tokens_per_interval: default_tokens_per_interval(),
            interval_ms: default_interval_ms(),
            submit_timeout_ms: default_submit_timeout_ms(),
            retry: RetryPolicy::default(),
        }
    }
}

impl DispatchConfig {
    /// Get the rate window as a Duration
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Get the submission timeout as a Duration
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }

    /// Check the rate and timeout parameters are usable
    pub fn validate(&self) -> Result<(), String> {
        if self.tokens_per_interval == 0 {
            return Err("dispatch.tokens-per-interval must be greater than 0".to_string());
        }
        if self.interval_ms == 0 {
            return Err("dispatch.interval-ms must be greater than 0".to_string());
        }
        if self.submit_timeout_ms == 0 {
            return Err("dispatch.submit-timeout-ms must be greater than 0".to_string());
        }
        if self.retry.max_attempts == Some(0) {
            return Err("dispatch.retry.max-attempts must be at least 1 (or null for unlimited)".to_string());
        }
        Ok(())
    }
}

/// Retry policy for failed submissions
///
/// `max_attempts: None` retries forever. Backoff doubles from
/// `backoff_base_ms` per failed attempt up to `backoff_max_ms`; a base of 0
/// re-enqueues immediately, leaving the rate limiter as the only pacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per item before it is abandoned
    #[serde(default = "default_max_attempts", rename = "max-attempts")]
    pub max_attempts: Option<u32>,

    #[serde(default, rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,

    #[serde(default = "default_backoff_max_ms", rename = "backoff-max-ms")]
    pub backoff_max_ms: u64,
}

fn default_max_attempts() -> Option<u32> {
    Some(5)
}

fn default_backoff_max_ms() -> u64 {
    30_000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: 0,
            backoff_max_ms: default_backoff_max_ms(),
        }
    }
}

impl RetryPolicy {
    /// Retry forever, no backoff
    pub fn unbounded() -> Self {
        Self {
            max_attempts: None,
            backoff_base_ms: 0,
            backoff_max_ms: default_backoff_max_ms(),
        }
    }

    /// Whether an item that has failed `attempts` times may be retried
    pub fn allows_retry(&self, attempts: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempts < max)
    }

    /// Delay before an item that has failed `attempts` times re-enters the queue
    pub fn backoff(&self, attempts: u32) -> Duration {
        if self.backoff_base_ms == 0 || attempts == 0 {
            return Duration::ZERO;
        }
        let factor = 1u64.checked_shl(attempts - 1).unwrap_or(u64::MAX);
        let ms = self.backoff_base_ms.saturating_mul(factor).min(self.backoff_max_ms);
        Duration::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DispatchConfig::default();
        assert_eq!(config.tokens_per_interval, 3);
        assert_eq!(config.interval_ms, 1000);
        assert_eq!(config.submit_timeout_ms, 30_000);
        assert_eq!(config.retry.max_attempts, Some(5));
        assert_eq!(config.retry.backoff_base_ms, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_durations() {
        let config = DispatchConfig {
            interval_ms: 250,
            submit_timeout_ms: 5000,
            ..Default::default()
        };
        assert_eq!(config.interval(), Duration::from_millis(250));
        assert_eq!(config.submit_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_validate_rejects_zero_rates() {
        let config = DispatchConfig {
            tokens_per_interval: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DispatchConfig {
            interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let mut config = DispatchConfig::default();
        config.retry.max_attempts = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_allows_retry() {
        let policy = RetryPolicy {
            max_attempts: Some(3),
            ..Default::default()
        };
        assert!(policy.allows_retry(1));
        assert!(policy.allows_retry(2));
        assert!(!policy.allows_retry(3));

        assert!(RetryPolicy::unbounded().allows_retry(u32::MAX));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: None,
            backoff_base_ms: 100,
            backoff_max_ms: 1000,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(4), Duration::from_millis(800));
        assert_eq!(policy.backoff(5), Duration::from_millis(1000));
        assert_eq!(policy.backoff(200), Duration::from_millis(1000));
    }

    #[test]
    fn test_zero_base_disables_backoff() {
        assert_eq!(RetryPolicy::default().backoff(3), Duration::ZERO);
    }

    #[test]
    fn test_yaml_keys() {
        let yaml = "tokens-per-interval: 5\ninterval-ms: 2000\nretry:\n  max-attempts: null\n  backoff-base-ms: 50\n";
        let config: DispatchConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tokens_per_interval, 5);
        assert_eq!(config.interval_ms, 2000);
        assert_eq!(config.submit_timeout_ms, 30_000);
        assert_eq!(config.retry.max_attempts, None);
        assert_eq!(config.retry.backoff_base_ms, 50);
        assert_eq!(config.retry.backoff_max_ms, 30_000);
    }
}
