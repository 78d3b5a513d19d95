//! Work package hierarchy records
//!
//! A work package owns an ordered queue of phases; each phase owns items;
//! each item owns approvable collateral. Phase ordering is defined entirely
//! by `position` (ascending, ≥ 1).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status shared by phases and items
///
/// Transitions are monotonic: NOT_STARTED → IN_PROGRESS → COMPLETED.
/// The engine never moves a status backwards on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl WorkStatus {
    /// Database/wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            WorkStatus::NotStarted => "NOT_STARTED",
            WorkStatus::InProgress => "IN_PROGRESS",
            WorkStatus::Completed => "COMPLETED",
        }
    }

    /// Parse the database representation
    pub fn parse(s: &str) -> Option<WorkStatus> {
        match s {
            "NOT_STARTED" => Some(WorkStatus::NotStarted),
            "IN_PROGRESS" => Some(WorkStatus::InProgress),
            "COMPLETED" => Some(WorkStatus::Completed),
            _ => None,
        }
    }

    fn rank(self) -> u8 {
        match self {
            WorkStatus::NotStarted => 0,
            WorkStatus::InProgress => 1,
            WorkStatus::Completed => 2,
        }
    }

    /// True when moving to `next` does not regress the lifecycle
    pub fn is_forward_transition(self, next: WorkStatus) -> bool {
        next.rank() >= self.rank()
    }
}

/// Review status of a collateral artifact
///
/// Only APPROVED collateral counts toward item completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollateralStatus {
    Draft,
    InReview,
    Approved,
    Rejected,
}

impl CollateralStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CollateralStatus::Draft => "DRAFT",
            CollateralStatus::InReview => "IN_REVIEW",
            CollateralStatus::Approved => "APPROVED",
            CollateralStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<CollateralStatus> {
        match s {
            "DRAFT" => Some(CollateralStatus::Draft),
            "IN_REVIEW" => Some(CollateralStatus::InReview),
            "APPROVED" => Some(CollateralStatus::Approved),
            "REJECTED" => Some(CollateralStatus::Rejected),
            _ => None,
        }
    }
}

/// Derived schedule-health classification of a phase
///
/// Never persisted; computed at read time from status and resolved dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineStatus {
    OnTime,
    CompletedLate,
    Unscheduled,
    OnTrack,
    AtRisk,
    Overdue,
}

/// Work package record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkPackage {
    pub id: Uuid,
    pub name: String,
    /// Anchor date for the first phase when it has no explicit start
    pub effective_start_date: Option<NaiveDate>,
}

impl WorkPackage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            effective_start_date: None,
        }
    }
}

/// Phase record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub id: Uuid,
    pub work_package_id: Uuid,
    /// Unique per work package
    pub name: String,
    /// Queue position, ≥ 1
    pub position: i64,
    pub timeline_hint: Option<String>,
    pub estimated_start_date: Option<NaiveDate>,
    pub estimated_end_date: Option<NaiveDate>,
    pub actual_start_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub status: WorkStatus,
    /// Derived aggregate of item durations, in days
    pub total_duration_days: f64,
}

impl Phase {
    pub fn new(work_package_id: Uuid, name: impl Into<String>, position: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            work_package_id,
            name: name.into(),
            position,
            timeline_hint: None,
            estimated_start_date: None,
            estimated_end_date: None,
            actual_start_date: None,
            actual_end_date: None,
            status: WorkStatus::NotStarted,
            total_duration_days: 0.0,
        }
    }
}

/// Deliverable item record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub phase_id: Uuid,
    pub item_type: String,
    pub label: String,
    pub description: Option<String>,
    /// Number of deliverable units, ≥ 1
    pub quantity: i64,
    pub unit_of_measure: Option<String>,
    pub estimated_hours_each: Option<f64>,
    /// Canonical per-unit duration, in days
    pub duration_days: f64,
    pub status: WorkStatus,
    /// Stable position within the phase (import row order)
    pub sort_order: i64,
}

impl Item {
    pub fn new(phase_id: Uuid, item_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase_id,
            item_type: item_type.into(),
            label: label.into(),
            description: None,
            quantity: 1,
            unit_of_measure: None,
            estimated_hours_each: None,
            duration_days: 1.0,
            status: WorkStatus::NotStarted,
            sort_order: 0,
        }
    }
}

/// Collateral artifact record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collateral {
    pub id: Uuid,
    pub item_id: Uuid,
    pub status: CollateralStatus,
    pub label: Option<String>,
}

impl Collateral {
    pub fn new(item_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_id,
            status: CollateralStatus::Draft,
            label: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trip() {
        for status in [
            WorkStatus::NotStarted,
            WorkStatus::InProgress,
            WorkStatus::Completed,
        ] {
            assert_eq!(WorkStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(WorkStatus::parse("PAUSED"), None);
    }

    #[test]
    fn status_transitions_are_monotonic() {
        assert!(WorkStatus::NotStarted.is_forward_transition(WorkStatus::InProgress));
        assert!(WorkStatus::NotStarted.is_forward_transition(WorkStatus::Completed));
        assert!(WorkStatus::InProgress.is_forward_transition(WorkStatus::InProgress));
        assert!(!WorkStatus::InProgress.is_forward_transition(WorkStatus::NotStarted));
        assert!(!WorkStatus::Completed.is_forward_transition(WorkStatus::InProgress));
    }

    #[test]
    fn collateral_status_round_trip() {
        for status in [
            CollateralStatus::Draft,
            CollateralStatus::InReview,
            CollateralStatus::Approved,
            CollateralStatus::Rejected,
        ] {
            assert_eq!(CollateralStatus::parse(status.as_str()), Some(status));
        }
    }
}
