//! Configuration for issuance and transfer flows.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{PaperflowError, Result, SecureHash, constants};

/// Tunables for the coordinators. Plain values so tests can override any of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Content hash of the prospectus every issuance must attach.
    pub prospectus_hash: SecureHash,
    /// Time from issuance to maturity.
    pub validity_period: Duration,
    /// Width of the notarisation time-window opened at issuance.
    pub time_window_tolerance: Duration,
    /// Upper bound on one finality exchange.
    pub finality_timeout: Duration,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            prospectus_hash: SecureHash::parse(constants::PROSPECTUS_HASH_HEX)
                .unwrap_or(SecureHash([0; 32])),
            validity_period: Duration::from_secs(constants::DEFAULT_VALIDITY_DAYS * 24 * 60 * 60),
            time_window_tolerance: Duration::from_secs(constants::DEFAULT_TIME_WINDOW_SECS),
            finality_timeout: Duration::from_millis(constants::DEFAULT_FINALITY_TIMEOUT_MS),
        }
    }
}

impl FlowConfig {
    /// Parse a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    /// Returns [`PaperflowError::Serialization`] for malformed JSON and
    /// [`PaperflowError::Configuration`] if the result fails [`Self::validate`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject zero durations.
    ///
    /// # Errors
    /// Returns [`PaperflowError::Configuration`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("validity_period", self.validity_period),
            ("time_window_tolerance", self.time_window_tolerance),
            ("finality_timeout", self.finality_timeout),
        ] {
            if value.is_zero() {
                return Err(PaperflowError::Configuration(format!("{name} must be non-zero")));
            }
        }
        Ok(())
    }

    /// `validity_period` as a calendar duration.
    ///
    /// # Errors
    /// Returns [`PaperflowError::Configuration`] if it does not fit.
    pub fn validity(&self) -> Result<chrono::Duration> {
        to_chrono("validity_period", self.validity_period)
    }

    /// `time_window_tolerance` as a calendar duration.
    ///
    /// # Errors
    /// Returns [`PaperflowError::Configuration`] if it does not fit.
    pub fn tolerance(&self) -> Result<chrono::Duration> {
        to_chrono("time_window_tolerance", self.time_window_tolerance)
    }
}

fn to_chrono(name: &str, value: Duration) -> Result<chrono::Duration> {
    chrono::Duration::from_std(value)
        .map_err(|e| PaperflowError::Configuration(format!("{name} out of range: {e}")))
}
