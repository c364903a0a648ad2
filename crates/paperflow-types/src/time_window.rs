//! Notarisation time-windows.
//!
//! A [`TimeWindow`] is the half-open interval `[from, until)` inside which a
//! notary must see a transaction. `until > from` always holds: every
//! constructor rejects an empty or inverted interval.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{PaperflowError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeWindow")]
pub struct TimeWindow {
    from: DateTime<Utc>,
    until: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawTimeWindow {
    from: DateTime<Utc>,
    until: DateTime<Utc>,
}

impl TryFrom<RawTimeWindow> for TimeWindow {
    type Error = PaperflowError;

    fn try_from(raw: RawTimeWindow) -> Result<Self> {
        Self::between(raw.from, raw.until)
    }
}

impl TimeWindow {
    /// Window between two instants.
    ///
    /// # Errors
    /// Returns [`PaperflowError::InvalidTimeWindow`] unless `until > from`.
    pub fn between(from: DateTime<Utc>, until: DateTime<Utc>) -> Result<Self> {
        if until <= from {
            return Err(PaperflowError::InvalidTimeWindow {
                reason: format!("until {until} is not after from {from}"),
            });
        }
        Ok(Self { from, until })
    }

    /// Window starting at `from` and lasting `duration`.
    ///
    /// # Errors
    /// Returns [`PaperflowError::InvalidTimeWindow`] for a zero or negative
    /// duration, or one that overflows the calendar.
    pub fn from_start_and_duration(from: DateTime<Utc>, duration: Duration) -> Result<Self> {
        if duration <= Duration::zero() {
            return Err(PaperflowError::InvalidTimeWindow {
                reason: format!("duration {duration} is not positive"),
            });
        }
        let until = from
            .checked_add_signed(duration)
            .ok_or_else(|| PaperflowError::InvalidTimeWindow {
                reason: format!("{from} + {duration} overflows"),
            })?;
        Self::between(from, until)
    }

    #[must_use]
    pub fn from_time(&self) -> DateTime<Utc> {
        self.from
    }

    #[must_use]
    pub fn until_time(&self) -> DateTime<Utc> {
        self.until
    }

    #[must_use]
    pub fn length(&self) -> Duration {
        self.until - self.from
    }

    /// Whether `instant` falls inside `[from, until)`.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant < self.until
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} .. {})", self.from, self.until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn between_requires_strictly_later_end() {
        assert!(TimeWindow::between(t0(), t0() + Duration::seconds(1)).is_ok());

        let err = TimeWindow::between(t0(), t0()).unwrap_err();
        assert!(matches!(err, PaperflowError::InvalidTimeWindow { .. }));

        assert!(TimeWindow::between(t0(), t0() - Duration::seconds(1)).is_err());
    }

    #[test]
    fn non_positive_duration_rejected() {
        for secs in [0, -1, -3600] {
            let err = TimeWindow::from_start_and_duration(t0(), Duration::seconds(secs)).unwrap_err();
            assert!(
                matches!(err, PaperflowError::InvalidTimeWindow { .. }),
                "duration {secs}s should fail, got {err:?}"
            );
        }
    }

    #[test]
    fn duration_window_bounds() {
        let tw = TimeWindow::from_start_and_duration(t0(), Duration::seconds(30)).unwrap();
        assert_eq!(tw.from_time(), t0());
        assert_eq!(tw.until_time(), t0() + Duration::seconds(30));
        assert_eq!(tw.length(), Duration::seconds(30));
        assert!(tw.until_time() > tw.from_time());
    }

    #[test]
    fn contains_is_half_open() {
        let tw = TimeWindow::from_start_and_duration(t0(), Duration::seconds(30)).unwrap();
        assert!(tw.contains(t0()));
        assert!(tw.contains(t0() + Duration::seconds(29)));
        assert!(!tw.contains(t0() + Duration::seconds(30)));
        assert!(!tw.contains(t0() - Duration::milliseconds(1)));
    }

    #[test]
    fn deserialize_rejects_inverted_window() {
        let tw = TimeWindow::from_start_and_duration(t0(), Duration::seconds(30)).unwrap();
        let json = serde_json::to_string(&tw).unwrap();
        assert_eq!(serde_json::from_str::<TimeWindow>(&json).unwrap(), tw);

        let inverted = format!(
            r#"{{"from":"{}","until":"{}"}}"#,
            tw.until_time().to_rfc3339(),
            tw.from_time().to_rfc3339()
        );
        let err = serde_json::from_str::<TimeWindow>(&inverted).unwrap_err();
        assert!(err.to_string().contains("PF_ERR_300"), "{err}");
    }

    #[test]
    fn overflow_is_rejected() {
        let err = TimeWindow::from_start_and_duration(DateTime::<Utc>::MAX_UTC, Duration::seconds(1))
            .unwrap_err();
        assert!(matches!(err, PaperflowError::InvalidTimeWindow { .. }));
    }
}
