//! Data contracts for the bulk deliverable import pipeline
//!
//! The upload layer hands the engine raw CSV rows (header → cell) plus a
//! header → canonical-field mapping built in its mapping wizard. Everything
//! downstream of that wizard speaks these types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Canonical field names a CSV header can be mapped to
///
/// Wire names are camelCase to match the mapping wizard's payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    PhaseName,
    PhasePosition,
    PhaseTimelineHint,
    ItemType,
    ItemLabel,
    ItemDescription,
    Quantity,
    UnitOfMeasure,
    Duration,
}

impl CanonicalField {
    /// Fields a mapping must cover before any transform runs
    pub const REQUIRED: [CanonicalField; 2] = [CanonicalField::ItemLabel, CanonicalField::ItemType];

    /// Canonical (wire) name
    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::PhaseName => "phaseName",
            CanonicalField::PhasePosition => "phasePosition",
            CanonicalField::PhaseTimelineHint => "phaseTimelineHint",
            CanonicalField::ItemType => "itemType",
            CanonicalField::ItemLabel => "itemLabel",
            CanonicalField::ItemDescription => "itemDescription",
            CanonicalField::Quantity => "quantity",
            CanonicalField::UnitOfMeasure => "unitOfMeasure",
            CanonicalField::Duration => "duration",
        }
    }
}

/// Header → canonical field mapping supplied by the upload layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    pub headers: HashMap<String, CanonicalField>,
}

impl FieldMapping {
    /// Build a mapping from (header, field) pairs
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, CanonicalField)>,
        S: Into<String>,
    {
        Self {
            headers: pairs.into_iter().map(|(h, f)| (h.into(), f)).collect(),
        }
    }

    /// The header mapped to `field`, if any
    pub fn source_for(&self, field: CanonicalField) -> Option<&str> {
        self.headers
            .iter()
            .find(|(_, f)| **f == field)
            .map(|(h, _)| h.as_str())
    }
}

/// Result of checking a mapping against the uploaded headers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingValidation {
    pub is_valid: bool,
    /// Canonical names of required fields the mapping does not cover
    pub missing_required: Vec<String>,
}

/// One normalized CSV row, ready for phase grouping
#[derive(Debug, Clone, PartialEq)]
pub struct DeliverableRow {
    pub phase_name: String,
    pub phase_position: i64,
    pub phase_timeline_hint: Option<String>,
    pub item_type: String,
    pub item_label: String,
    pub item_description: Option<String>,
    pub quantity: i64,
    pub unit_of_measure: Option<String>,
    /// Raw duration value, unit-qualified by `unit_of_measure`
    pub duration: f64,
}

/// A row the normalizer could not use
///
/// Collected, never thrown; the batch continues on valid rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    /// 1-based row number in the uploaded file
    pub row: usize,
    pub reason: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row, self.reason)
    }
}

/// Outcome of a best-effort batch transform
#[derive(Debug, Clone, Default)]
pub struct TransformReport {
    pub rows: Vec<DeliverableRow>,
    pub errors: Vec<RowError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_match_wire_format() {
        assert_eq!(CanonicalField::ItemLabel.name(), "itemLabel");
        assert_eq!(
            serde_json::to_string(&CanonicalField::PhaseTimelineHint).unwrap(),
            "\"phaseTimelineHint\""
        );
    }

    #[test]
    fn source_lookup_finds_mapped_header() {
        let mapping = FieldMapping::from_pairs([
            ("Deliverable", CanonicalField::ItemLabel),
            ("Stage", CanonicalField::PhaseName),
        ]);
        assert_eq!(mapping.source_for(CanonicalField::ItemLabel), Some("Deliverable"));
        assert_eq!(mapping.source_for(CanonicalField::Quantity), None);
    }

    #[test]
    fn row_error_renders_one_based() {
        let err = RowError {
            row: 3,
            reason: "missing item label".to_string(),
        };
        assert_eq!(err.to_string(), "Row 3: missing item label");
    }
}
