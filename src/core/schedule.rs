//! # Scheduling
//!
//! Send mode and the window a scheduled send time must fall into.
//! The window is computed relative to "now" each time it is used: once when a
//! time is picked, and again when the schedule is committed.

use chrono::{DateTime, Duration, DurationRound, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendMode {
    #[default]
    Manual,
    Scheduled,
}

impl SendMode {
    pub fn toggled(self) -> Self {
        match self {
            SendMode::Manual => SendMode::Scheduled,
            SendMode::Scheduled => SendMode::Manual,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SendMode::Manual => "Send manually",
            SendMode::Scheduled => "Schedule",
        }
    }
}

/// Bounds for picking a scheduled send time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleRules {
    pub min_lead: Duration,
    pub max_ahead: Duration,
    pub step: Duration,
}

impl Default for ScheduleRules {
    fn default() -> Self {
        Self {
            min_lead: Duration::hours(1),
            max_ahead: Duration::days(30),
            step: Duration::minutes(15),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    TooSoon,
    TooFar,
}

impl ScheduleError {
    pub fn message(&self) -> &'static str {
        match self {
            ScheduleError::TooSoon => "Scheduled time must be at least 1 hour in the future",
            ScheduleError::TooFar => "Scheduled time must be within the next 30 days",
        }
    }
}

impl ScheduleRules {
    pub fn earliest(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.min_lead
    }

    pub fn latest(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.max_ahead
    }

    /// Check applied when a time is picked.
    pub fn validate_selection(
        &self,
        at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), ScheduleError> {
        if at < self.earliest(now) {
            return Err(ScheduleError::TooSoon);
        }
        if at > self.latest(now) {
            return Err(ScheduleError::TooFar);
        }
        Ok(())
    }

    /// Check applied at commit time. Only the lower bound is re-checked; a
    /// time that was in range when picked cannot drift past the upper bound.
    pub fn validate_commit(
        &self,
        at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), ScheduleError> {
        if at < self.earliest(now) {
            return Err(ScheduleError::TooSoon);
        }
        Ok(())
    }

    /// First grid slot at or after the earliest allowed time.
    pub fn default_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.snap_up(self.earliest(now))
    }

    /// Moves `from` by `steps` grid slots and clamps into the window.
    pub fn nudge(&self, from: DateTime<Utc>, steps: i32, now: DateTime<Utc>) -> DateTime<Utc> {
        let moved = self.snap_up(from) + self.step * steps;
        let earliest = self.snap_up(self.earliest(now));
        let latest = self.snap_down(self.latest(now));
        moved.clamp(earliest, latest.max(earliest))
    }

    fn snap_down(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        at.duration_trunc(self.step).unwrap_or(at)
    }

    fn snap_up(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        let down = self.snap_down(at);
        if down == at { at } else { down + self.step }
    }
}

/// Human-readable form used in notifications and audit entries.
pub fn format_send_time(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y at %-I:%M %p UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 7, 0).unwrap()
    }

    #[test]
    fn test_selection_window() {
        let rules = ScheduleRules::default();
        assert_eq!(
            rules.validate_selection(now() + Duration::minutes(30), now()),
            Err(ScheduleError::TooSoon)
        );
        assert!(rules.validate_selection(now() + Duration::hours(2), now()).is_ok());
        assert_eq!(
            rules.validate_selection(now() + Duration::days(31), now()),
            Err(ScheduleError::TooFar)
        );
    }

    #[test]
    fn test_commit_rechecks_lower_bound_only() {
        let rules = ScheduleRules::default();
        let picked = now() + Duration::minutes(61);
        assert!(rules.validate_commit(picked, now()).is_ok());
        // Ten minutes later the same pick is too close
        let later = now() + Duration::minutes(10);
        assert_eq!(rules.validate_commit(picked, later), Err(ScheduleError::TooSoon));
    }

    #[test]
    fn test_default_time_is_on_grid() {
        let rules = ScheduleRules::default();
        let at = rules.default_time(now());
        assert_eq!(at, Utc.with_ymd_and_hms(2026, 3, 10, 10, 15, 0).unwrap());
    }

    #[test]
    fn test_nudge_clamps_to_window() {
        let rules = ScheduleRules::default();
        let start = rules.default_time(now());
        assert_eq!(rules.nudge(start, -4, now()), start);
        assert_eq!(
            rules.nudge(start, 2, now()),
            start + Duration::minutes(30)
        );
        let far = rules.nudge(start, 10_000, now());
        assert!(far <= rules.latest(now()));
        assert!(rules.validate_selection(far, now()).is_ok());
    }

    #[test]
    fn test_format_send_time() {
        let at = Utc.with_ymd_and_hms(2026, 3, 10, 14, 30, 0).unwrap();
        assert_eq!(format_send_time(at), "Mar 10, 2026 at 2:30 PM UTC");
    }

    #[test]
    fn test_toggle_send_mode() {
        assert_eq!(SendMode::Manual.toggled(), SendMode::Scheduled);
        assert_eq!(SendMode::Scheduled.toggled(), SendMode::Manual);
    }
}
