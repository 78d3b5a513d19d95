//! Duration normalization and phase-total aggregation
//!
//! All durations are carried internally as fractional days. Unit conversion
//! is table-driven and lenient: an unrecognized unit passes the raw value
//! through unconverted and logs a warning rather than failing the row.

use tracing::warn;

use crate::import::phase_grouper::ItemDraft;
use crate::models::Item;

/// Working hours that make up one day of effort
const HOURS_PER_DAY: f64 = 8.0;
/// Business days in one week
const DAYS_PER_WEEK: f64 = 5.0;

/// Convert a raw duration value into canonical days
///
/// Unit matching is case-insensitive and tolerates plurals. `None` and
/// count-like units ("item", "each") are treated as already day-valued.
pub fn normalize_duration(raw: f64, unit: Option<&str>) -> f64 {
    let Some(unit) = unit else {
        return raw;
    };

    let lowered = unit.trim().to_ascii_lowercase();
    match lowered.trim_end_matches('s') {
        "hour" | "hr" | "h" => raw / HOURS_PER_DAY,
        "day" | "d" => raw,
        "week" | "wk" | "w" => raw * DAYS_PER_WEEK,
        "item" | "each" | "unit" | "deliverable" => raw,
        other => {
            warn!(unit = other, value = raw, "Unrecognized duration unit, passing value through");
            raw
        }
    }
}

/// Anything that contributes duration to a phase total
///
/// Implemented by persisted items and import drafts so the aggregation rule
/// below has exactly one implementation across every call site.
pub trait DurationSource {
    fn duration_days(&self) -> f64;
    fn quantity(&self) -> i64;
}

impl DurationSource for Item {
    fn duration_days(&self) -> f64 {
        self.duration_days
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }
}

impl DurationSource for ItemDraft {
    fn duration_days(&self) -> f64 {
        self.duration_days
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }
}

/// Aggregate item durations into a phase total
///
/// Rule: Σ per-unit duration × quantity. Duration describes one deliverable
/// unit, so a phase holding 3 drafts at 2 days each carries 6 days of work.
/// Every write path (import commit, item create/update/delete) calls this
/// same function.
pub fn calculate_phase_total_duration<T: DurationSource>(items: &[T]) -> f64 {
    items
        .iter()
        .map(|item| item.duration_days() * item.quantity().max(1) as f64)
        .sum()
}
