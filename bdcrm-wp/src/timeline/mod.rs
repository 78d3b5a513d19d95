//! Duration normalization and schedule-health derivation

pub mod duration;
pub mod status;

pub use duration::{calculate_phase_total_duration, normalize_duration, DurationSource};
pub use status::{classify, resolve_expected_end, DEFAULT_RISK_WINDOW_DAYS};
