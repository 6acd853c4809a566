//! Time window resolution and membership.

use crate::error::{Error, Result};
use crate::record::Timestamp;

/// Half-open time window `[start, end)` with optional bounds.
///
/// A missing bound is unbounded on that side. Membership uses half-open
/// semantics: a message at exactly `end` is out, one at exactly `start` is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Inclusive lower bound, if any
    pub start: Option<Timestamp>,

    /// Exclusive upper bound, if any
    pub end: Option<Timestamp>,
}

impl TimeWindow {
    /// Window admitting every timestamp.
    pub fn unbounded() -> Self {
        TimeWindow {
            start: None,
            end: None,
        }
    }

    /// Resolve a window from either absolute bounds or a relative duration.
    ///
    /// A relative duration of `d` seconds resolved at `now` yields
    /// `[now - d, now)`. Supplying a relative duration together with any
    /// absolute bound is a configuration error, as is `start > end`.
    /// Supplying nothing at all yields the unbounded window.
    pub fn resolve(
        start: Option<Timestamp>,
        end: Option<Timestamp>,
        relative_secs: Option<u64>,
        now: Timestamp,
    ) -> Result<TimeWindow> {
        if let Some(secs) = relative_secs {
            if start.is_some() || end.is_some() {
                return Err(Error::Configuration(
                    "a relative time range cannot be combined with absolute start/end bounds"
                        .to_string(),
                ));
            }
            let span = secs.saturating_mul(1_000_000_000);
            return Ok(TimeWindow {
                start: Some(now.saturating_sub(span)),
                end: Some(now),
            });
        }

        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(Error::Configuration(format!(
                    "window start {} is after window end {}",
                    s, e
                )));
            }
        }

        Ok(TimeWindow { start, end })
    }

    /// Whether `t` lies inside the window.
    pub fn contains(&self, t: Timestamp) -> bool {
        if let Some(start) = self.start {
            if t < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if t >= end {
                return false;
            }
        }
        true
    }

    /// Whether the window has no bounds at all.
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_contains_everything() {
        let w = TimeWindow::unbounded();
        assert!(w.contains(0));
        assert!(w.contains(u64::MAX));
    }

    #[test]
    fn test_half_open_membership() {
        let w = TimeWindow::resolve(Some(100), Some(200), None, 0).unwrap();
        assert!(!w.contains(99));
        assert!(w.contains(100));
        assert!(w.contains(199));
        assert!(!w.contains(200));
    }

    #[test]
    fn test_partial_bounds() {
        let start_only = TimeWindow::resolve(Some(100), None, None, 0).unwrap();
        assert!(!start_only.contains(99));
        assert!(start_only.contains(u64::MAX));

        let end_only = TimeWindow::resolve(None, Some(100), None, 0).unwrap();
        assert!(end_only.contains(0));
        assert!(!end_only.contains(100));
    }

    #[test]
    fn test_relative_duration() {
        let now = 10_000_000_000_000;
        let w = TimeWindow::resolve(None, None, Some(3600), now).unwrap();
        assert_eq!(w.start, Some(now - 3600 * 1_000_000_000));
        assert_eq!(w.end, Some(now));

        // Exact start is included, exact end (= now) is excluded.
        assert!(w.contains(now - 3600 * 1_000_000_000));
        assert!(w.contains(now - 3599 * 1_000_000_000));
        assert!(!w.contains(now));
    }

    #[test]
    fn test_relative_with_absolute_is_error() {
        assert!(TimeWindow::resolve(Some(1), None, Some(60), 100).is_err());
        assert!(TimeWindow::resolve(None, Some(1), Some(60), 100).is_err());
    }

    #[test]
    fn test_start_after_end_is_error() {
        assert!(TimeWindow::resolve(Some(200), Some(100), None, 0).is_err());
    }

    #[test]
    fn test_no_bounds_is_unbounded() {
        let w = TimeWindow::resolve(None, None, None, 0).unwrap();
        assert!(w.is_unbounded());
    }

    #[test]
    fn test_relative_larger_than_now_saturates() {
        let w = TimeWindow::resolve(None, None, Some(3600), 5).unwrap();
        assert_eq!(w.start, Some(0));
        assert_eq!(w.end, Some(5));
    }
}
