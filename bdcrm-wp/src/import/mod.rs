//! Bulk deliverable import pipeline
//!
//! Raw rows + mapping → row normalizer → phase grouper → drafts for review.
//! Nothing in this module persists; committing drafts is the store's job.

pub mod field_mapper;
pub mod phase_grouper;

pub use field_mapper::{normalize_row, transform_rows, validate_mappings, DEFAULT_PHASE_NAME};
pub use phase_grouper::{group_into_phases, ItemDraft, PhaseDraft};
