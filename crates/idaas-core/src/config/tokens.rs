//! Token lifetime and access-log queue configuration.

use serde::Deserialize;

use crate::error::AppError;

/// Upper bound for user and service access token lifetimes.
pub const MAX_ACCESS_TTL_SECONDS: u64 = 24 * 60 * 60;
/// Upper bound for refresh token lifetimes.
pub const MAX_REFRESH_TTL_DAYS: u64 = 365;
/// Upper bound for the sweep interval.
pub const MAX_CLEANUP_INTERVAL_SECONDS: u64 = 24 * 60 * 60;

/// Lifetimes of issued credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    /// User access token TTL in seconds.
    #[serde(default = "default_user_access_ttl")]
    pub user_access_ttl_seconds: u64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: u64,
    /// Service access token TTL in seconds.
    #[serde(default = "default_service_access_ttl")]
    pub service_access_ttl_seconds: u64,
    /// Interval between expired-token sweeps in seconds.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            user_access_ttl_seconds: default_user_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            service_access_ttl_seconds: default_service_access_ttl(),
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

impl TokenConfig {
    /// Reject lifetimes and intervals that are zero or out of range.
    pub fn validate(&self) -> Result<(), AppError> {
        check_range(
            "tokens.user_access_ttl_seconds",
            self.user_access_ttl_seconds,
            MAX_ACCESS_TTL_SECONDS,
        )?;
        check_range(
            "tokens.service_access_ttl_seconds",
            self.service_access_ttl_seconds,
            MAX_ACCESS_TTL_SECONDS,
        )?;
        check_range("tokens.refresh_ttl_days", self.refresh_ttl_days, MAX_REFRESH_TTL_DAYS)?;
        check_range(
            "tokens.cleanup_interval_seconds",
            self.cleanup_interval_seconds,
            MAX_CLEANUP_INTERVAL_SECONDS,
        )
    }
}

fn check_range(field: &str, value: u64, max: u64) -> Result<(), AppError> {
    if value == 0 || value > max {
        return Err(AppError::configuration(format!(
            "{field} must be between 1 and {max}, got {value}"
        )));
    }
    Ok(())
}

/// What the access-log recorder does when its queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Discard the entry and count it.
    #[default]
    Drop,
    /// Wait for queue capacity.
    Block,
}

/// Access-log recorder configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessLogConfig {
    /// Capacity of the bounded queue between requests and the writer.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Backpressure policy.
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

impl Default for AccessLogConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            overflow: OverflowPolicy::default(),
        }
    }
}

fn default_user_access_ttl() -> u64 {
    15 * 60
}

fn default_refresh_ttl() -> u64 {
    30
}

fn default_service_access_ttl() -> u64 {
    300
}

fn default_cleanup_interval() -> u64 {
    3600
}

fn default_queue_capacity() -> usize {
    1024
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults_are_valid() {
        assert!(TokenConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_cleanup_interval_rejected() {
        let config = TokenConfig {
            cleanup_interval_seconds: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("cleanup_interval_seconds"));
    }

    #[test]
    fn test_zero_refresh_ttl_rejected() {
        let config = TokenConfig {
            refresh_ttl_days: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().message.contains("refresh_ttl_days"));
    }

    #[test]
    fn test_zero_access_ttls_rejected() {
        let user = TokenConfig {
            user_access_ttl_seconds: 0,
            ..Default::default()
        };
        assert!(user.validate().is_err());

        let service = TokenConfig {
            service_access_ttl_seconds: 0,
            ..Default::default()
        };
        assert!(service.validate().is_err());
    }

    #[test]
    fn test_huge_lifetimes_rejected() {
        let access = TokenConfig {
            user_access_ttl_seconds: u64::MAX,
            ..Default::default()
        };
        assert!(access.validate().unwrap_err().message.contains("user_access_ttl_seconds"));

        let service = TokenConfig {
            service_access_ttl_seconds: MAX_ACCESS_TTL_SECONDS + 1,
            ..Default::default()
        };
        assert!(service.validate().is_err());

        let refresh = TokenConfig {
            refresh_ttl_days: u64::MAX,
            ..Default::default()
        };
        assert!(refresh.validate().is_err());

        let cleanup = TokenConfig {
            cleanup_interval_seconds: u64::MAX,
            ..Default::default()
        };
        assert!(cleanup.validate().is_err());
    }

    #[test]
    fn test_upper_bounds_accepted() {
        let config = TokenConfig {
            user_access_ttl_seconds: MAX_ACCESS_TTL_SECONDS,
            service_access_ttl_seconds: MAX_ACCESS_TTL_SECONDS,
            refresh_ttl_days: MAX_REFRESH_TTL_DAYS,
            cleanup_interval_seconds: MAX_CLEANUP_INTERVAL_SECONDS,
        };
        assert!(config.validate().is_ok());
    }
}
