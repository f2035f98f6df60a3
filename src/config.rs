//! Immutable run configuration shared (read-only) by every probe, search and
//! bulk operation.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by [`configure`] and [`ScoutConfig::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{which} concurrency must be at least 1")]
    ZeroConcurrency { which: &'static str },
    #[error("SMTP timeout must be a positive number of seconds, got {0}")]
    InvalidTimeout(f64),
    #[error("throttle rate must be finite and >= 0, got {0}")]
    InvalidThrottle(f64),
}

/// SMTP dialogue parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub port: u16,
    /// Bound applied to the TCP connect and to every command round-trip.
    pub timeout: Duration,
    /// Identity announced with `EHLO`.
    pub helo_domain: String,
    /// Envelope sender used for `MAIL FROM`. Empty means the null reverse-path.
    pub mail_from: String,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            port: 25,
            timeout: Duration::from_secs(2),
            helo_domain: "localhost".to_string(),
            mail_from: "noreply@localhost".to_string(),
        }
    }
}

impl SmtpSettings {
    pub fn mail_from_command(&self) -> String {
        if self.mail_from.is_empty() {
            "MAIL FROM:<>".to_string()
        } else {
            format!("MAIL FROM:<{}>", self.mail_from)
        }
    }

    pub fn helo_command(&self) -> String {
        let helo = self.helo_domain.trim();
        if helo.is_empty() {
            "EHLO localhost".to_string()
        } else {
            format!("EHLO {helo}")
        }
    }
}

/// Token-bucket pacing of probe dispatch within one domain search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throttle {
    /// Probes started per second. `0.0` disables pacing.
    pub per_second: f64,
    /// Probes that may start back to back before pacing kicks in.
    pub burst: u32,
}

impl Throttle {
    pub const fn disabled() -> Self {
        Self {
            per_second: 0.0,
            burst: 1,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.per_second > 0.0
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self {
            per_second: 1.0,
            burst: 5,
        }
    }
}

/// Runtime configuration of a [`Scout`](crate::Scout).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoutConfig {
    pub check_variants: bool,
    pub check_prefixes: bool,
    pub check_catch_all: bool,
    pub normalize: bool,
    /// Concurrent probes within one domain search.
    pub probe_concurrency: usize,
    /// Concurrent domain searches in bulk mode.
    pub bulk_concurrency: usize,
    pub dns_timeout: Duration,
    pub smtp: SmtpSettings,
    pub throttle: Throttle,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            check_variants: true,
            check_prefixes: true,
            check_catch_all: true,
            normalize: true,
            probe_concurrency: 5,
            bulk_concurrency: 3,
            dns_timeout: Duration::from_secs(5),
            smtp: SmtpSettings::default(),
            throttle: Throttle::default(),
        }
    }
}

impl ScoutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency { which: "probe" });
        }
        if self.bulk_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency { which: "bulk" });
        }
        if self.smtp.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(0.0));
        }
        let rate = self.throttle.per_second;
        if !rate.is_finite() || rate < 0.0 {
            return Err(ConfigError::InvalidThrottle(rate));
        }
        Ok(())
    }

    /// Same configuration with another SMTP port.
    pub fn with_port(&self, port: u16) -> Self {
        let mut config = self.clone();
        config.smtp.port = port;
        config
    }
}

/// Builds a validated [`ScoutConfig`]; every setting not named here keeps its
/// default.
pub fn configure(
    enable_variants: bool,
    enable_prefixes: bool,
    enable_catch_all_check: bool,
    normalize: bool,
    probe_concurrency: usize,
    bulk_concurrency: usize,
    smtp_timeout_secs: f64,
) -> Result<ScoutConfig, ConfigError> {
    if smtp_timeout_secs <= 0.0 {
        return Err(ConfigError::InvalidTimeout(smtp_timeout_secs));
    }
    let timeout = Duration::try_from_secs_f64(smtp_timeout_secs)
        .map_err(|_| ConfigError::InvalidTimeout(smtp_timeout_secs))?;
    let config = ScoutConfig {
        check_variants: enable_variants,
        check_prefixes: enable_prefixes,
        check_catch_all: enable_catch_all_check,
        normalize,
        probe_concurrency,
        bulk_concurrency,
        smtp: SmtpSettings {
            timeout,
            ..SmtpSettings::default()
        },
        ..ScoutConfig::default()
    };
    config.validate()?;
    Ok(config)
}
