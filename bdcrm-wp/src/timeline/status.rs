//! Schedule-health classification
//!
//! Pure date math over a phase's status and resolved dates. `now` is always
//! an injected parameter; nothing here reads a clock, which keeps the
//! classifier directly unit-testable.

use chrono::{Duration, NaiveDate};

use crate::models::{Phase, TimelineStatus, WorkStatus};

/// Days before the expected end inside which a phase counts as at risk
pub const DEFAULT_RISK_WINDOW_DAYS: i64 = 2;

/// Classify a phase's schedule health
///
/// Rules, in order:
/// 1. Completed phases are ON_TIME unless they finished after their
///    estimated baseline (no baseline counts as on time).
/// 2. No expected end date → UNSCHEDULED.
/// 3. More than `risk_window_days` left → ON_TRACK.
/// 4. Inside the window but not yet due → AT_RISK.
/// 5. Due today or past due → OVERDUE.
pub fn classify(
    status: WorkStatus,
    actual_end: Option<NaiveDate>,
    estimated_end: Option<NaiveDate>,
    expected_end: Option<NaiveDate>,
    now: NaiveDate,
    risk_window_days: i64,
) -> TimelineStatus {
    if status == WorkStatus::Completed {
        return match (actual_end, estimated_end) {
            (Some(actual), Some(baseline)) if actual > baseline => TimelineStatus::CompletedLate,
            _ => TimelineStatus::OnTime,
        };
    }

    let Some(expected) = expected_end else {
        return TimelineStatus::Unscheduled;
    };

    let days_left = (expected - now).num_days();
    if days_left > risk_window_days {
        TimelineStatus::OnTrack
    } else if days_left > 0 {
        TimelineStatus::AtRisk
    } else {
        TimelineStatus::Overdue
    }
}

/// Resolve the end date the classifier should measure against
///
/// Fallback cascade: actual end (completed phases) → estimated end →
/// effective start plus the phase's total duration (both must be known;
/// a zero total means no scheduled work) → none. Never errors; absent
/// schedule data degrades to UNSCHEDULED downstream.
pub fn resolve_expected_end(phase: &Phase, effective_start: Option<NaiveDate>) -> Option<NaiveDate> {
    if phase.status == WorkStatus::Completed {
        if let Some(actual) = phase.actual_end_date {
            return Some(actual);
        }
    }

    if let Some(estimated) = phase.estimated_end_date {
        return Some(estimated);
    }

    match effective_start {
        Some(start) if phase.total_duration_days > 0.0 => {
            Some(start + Duration::days(phase.total_duration_days.ceil() as i64))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn classify_in_progress(expected: Option<NaiveDate>) -> TimelineStatus {
        classify(
            WorkStatus::InProgress,
            None,
            None,
            expected,
            date(2024, 1, 10),
            DEFAULT_RISK_WINDOW_DAYS,
        )
    }

    #[test]
    fn boundary_cases_around_risk_window() {
        assert_eq!(
            classify_in_progress(Some(date(2024, 1, 9))),
            TimelineStatus::Overdue
        );
        assert_eq!(
            classify_in_progress(Some(date(2024, 1, 10))),
            TimelineStatus::Overdue
        );
        assert_eq!(
            classify_in_progress(Some(date(2024, 1, 11))),
            TimelineStatus::AtRisk
        );
        assert_eq!(
            classify_in_progress(Some(date(2024, 1, 12))),
            TimelineStatus::AtRisk
        );
        assert_eq!(
            classify_in_progress(Some(date(2024, 1, 20))),
            TimelineStatus::OnTrack
        );
        assert_eq!(classify_in_progress(None), TimelineStatus::Unscheduled);
    }

    #[test]
    fn completed_on_or_before_baseline_is_on_time() {
        let status = classify(
            WorkStatus::Completed,
            Some(date(2024, 1, 8)),
            Some(date(2024, 1, 8)),
            Some(date(2024, 1, 8)),
            date(2024, 1, 10),
            DEFAULT_RISK_WINDOW_DAYS,
        );
        assert_eq!(status, TimelineStatus::OnTime);
    }

    #[test]
    fn completed_after_baseline_is_late() {
        let status = classify(
            WorkStatus::Completed,
            Some(date(2024, 1, 12)),
            Some(date(2024, 1, 8)),
            Some(date(2024, 1, 12)),
            date(2024, 1, 15),
            DEFAULT_RISK_WINDOW_DAYS,
        );
        assert_eq!(status, TimelineStatus::CompletedLate);
    }

    #[test]
    fn completed_without_baseline_is_on_time() {
        let status = classify(
            WorkStatus::Completed,
            Some(date(2024, 1, 12)),
            None,
            None,
            date(2024, 1, 15),
            DEFAULT_RISK_WINDOW_DAYS,
        );
        assert_eq!(status, TimelineStatus::OnTime);
    }

    fn phase() -> Phase {
        Phase::new(Uuid::new_v4(), "Discovery", 1)
    }

    #[test]
    fn cascade_prefers_actual_end_when_completed() {
        let mut p = phase();
        p.status = WorkStatus::Completed;
        p.actual_end_date = Some(date(2024, 2, 1));
        p.estimated_end_date = Some(date(2024, 1, 20));

        assert_eq!(
            resolve_expected_end(&p, Some(date(2024, 1, 1))),
            Some(date(2024, 2, 1))
        );
    }

    #[test]
    fn cascade_ignores_actual_end_until_completed() {
        let mut p = phase();
        p.actual_end_date = Some(date(2024, 2, 1));
        p.estimated_end_date = Some(date(2024, 1, 20));

        assert_eq!(
            resolve_expected_end(&p, None),
            Some(date(2024, 1, 20))
        );
    }

    #[test]
    fn cascade_projects_from_effective_start_and_duration() {
        let mut p = phase();
        p.total_duration_days = 6.5;

        assert_eq!(
            resolve_expected_end(&p, Some(date(2024, 1, 1))),
            Some(date(2024, 1, 8))
        );
    }

    #[test]
    fn cascade_yields_none_without_dates_or_duration() {
        let p = phase();
        assert_eq!(resolve_expected_end(&p, None), None);
        // start known, zero duration
        assert_eq!(resolve_expected_end(&p, Some(date(2024, 1, 1))), None);
    }
}
