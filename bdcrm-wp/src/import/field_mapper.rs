//! Field mapping validation and row normalization
//!
//! CSV headers are arbitrary; the upload layer supplies an explicit
//! header → canonical-field map and this module checks it exhaustively
//! before any transform runs. Row-level failures are collected per row,
//! never thrown, so one bad row cannot abort a batch.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{
    CanonicalField, DeliverableRow, FieldMapping, MappingValidation, RowError, TransformReport,
};

/// Phase assigned to rows whose mapping or cell carries no phase name
pub const DEFAULT_PHASE_NAME: &str = "Unnamed Phase";

/// Check a mapping against the uploaded header set
///
/// A required field is missing when no header maps to it, or when the
/// mapped header does not appear in `available_headers`. An invalid result
/// is fatal for the whole import; callers must not transform anything.
pub fn validate_mappings(mapping: &FieldMapping, available_headers: &[String]) -> MappingValidation {
    let mut missing_required = Vec::new();

    for field in CanonicalField::REQUIRED {
        let covered = mapping
            .source_for(field)
            .map(|header| available_headers.iter().any(|h| h == header))
            .unwrap_or(false);
        if !covered {
            missing_required.push(field.name().to_string());
        }
    }

    MappingValidation {
        is_valid: missing_required.is_empty(),
        missing_required,
    }
}

/// Convert one raw row into a canonical `DeliverableRow`
///
/// `index` is the 0-based position in the batch; errors report the 1-based
/// row number. A missing required cell fails the row; malformed numeric
/// cells substitute safe defaults instead (quantity 1, position 1,
/// duration 1.0).
pub fn normalize_row(
    index: usize,
    raw: &HashMap<String, String>,
    mapping: &FieldMapping,
) -> Result<DeliverableRow, RowError> {
    let item_label = required_cell(index, raw, mapping, CanonicalField::ItemLabel)?;
    let item_type = required_cell(index, raw, mapping, CanonicalField::ItemType)?;

    let phase_name = cell(raw, mapping, CanonicalField::PhaseName)
        .unwrap_or(DEFAULT_PHASE_NAME)
        .to_string();

    Ok(DeliverableRow {
        phase_name,
        phase_position: lenient_int(cell(raw, mapping, CanonicalField::PhasePosition), 1),
        phase_timeline_hint: cell(raw, mapping, CanonicalField::PhaseTimelineHint)
            .map(str::to_string),
        item_type: item_type.to_string(),
        item_label: item_label.to_string(),
        item_description: cell(raw, mapping, CanonicalField::ItemDescription).map(str::to_string),
        quantity: lenient_int(cell(raw, mapping, CanonicalField::Quantity), 1),
        unit_of_measure: cell(raw, mapping, CanonicalField::UnitOfMeasure).map(str::to_string),
        duration: lenient_float(cell(raw, mapping, CanonicalField::Duration), 1.0),
    })
}

/// Normalize a whole batch, best-effort
///
/// Valid rows and row errors are both returned; deciding whether zero valid
/// rows is fatal belongs to the caller.
pub fn transform_rows(
    rows: &[HashMap<String, String>],
    mapping: &FieldMapping,
) -> TransformReport {
    let mut report = TransformReport::default();

    for (index, raw) in rows.iter().enumerate() {
        match normalize_row(index, raw, mapping) {
            Ok(row) => report.rows.push(row),
            Err(error) => {
                debug!(row = error.row, reason = %error.reason, "Skipping unusable row");
                report.errors.push(error);
            }
        }
    }

    report
}

/// Mapped, trimmed, non-empty cell value for `field`
fn cell<'a>(
    raw: &'a HashMap<String, String>,
    mapping: &FieldMapping,
    field: CanonicalField,
) -> Option<&'a str> {
    mapping
        .source_for(field)
        .and_then(|header| raw.get(header))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn required_cell<'a>(
    index: usize,
    raw: &'a HashMap<String, String>,
    mapping: &FieldMapping,
    field: CanonicalField,
) -> Result<&'a str, RowError> {
    cell(raw, mapping, field).ok_or_else(|| RowError {
        row: index + 1,
        reason: format!("missing {}", field.name()),
    })
}

/// Lenient integer parse: accepts "3" and "3.0", floors at 1
fn lenient_int(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|v| {
            v.parse::<i64>()
                .ok()
                .or_else(|| v.parse::<f64>().ok().map(|f| f as i64))
        })
        .unwrap_or(default)
        .max(1)
}

/// Lenient float parse
fn lenient_float(value: Option<&str>, default: f64) -> f64 {
    value.and_then(|v| v.parse::<f64>().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> FieldMapping {
        FieldMapping::from_pairs([
            ("Stage", CanonicalField::PhaseName),
            ("Order", CanonicalField::PhasePosition),
            ("Deliverable", CanonicalField::ItemLabel),
            ("Type", CanonicalField::ItemType),
            ("Qty", CanonicalField::Quantity),
            ("Unit", CanonicalField::UnitOfMeasure),
            ("Days", CanonicalField::Duration),
        ])
    }

    fn headers() -> Vec<String> {
        ["Stage", "Order", "Deliverable", "Type", "Qty", "Unit", "Days"]
            .iter()
            .map(|h| h.to_string())
            .collect()
    }

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn valid_mapping_passes() {
        let result = validate_mappings(&mapping(), &headers());
        assert!(result.is_valid);
        assert!(result.missing_required.is_empty());
    }

    #[test]
    fn unmapped_item_label_is_reported() {
        let mapping = FieldMapping::from_pairs([("Type", CanonicalField::ItemType)]);
        let result = validate_mappings(&mapping, &headers());
        assert!(!result.is_valid);
        assert_eq!(result.missing_required, vec!["itemLabel".to_string()]);
    }

    #[test]
    fn mapped_but_absent_header_is_reported() {
        // Mapping points itemLabel at a header the upload does not contain
        let result = validate_mappings(&mapping(), &["Type".to_string(), "Stage".to_string()]);
        assert!(!result.is_valid);
        assert!(result
            .missing_required
            .contains(&"itemLabel".to_string()));
    }

    #[test]
    fn normalizes_complete_row() {
        let raw = row(&[
            ("Stage", "Discovery"),
            ("Order", "2"),
            ("Deliverable", "Stakeholder interviews"),
            ("Type", "research"),
            ("Qty", "4"),
            ("Unit", "hour"),
            ("Days", "6"),
        ]);
        let normalized = normalize_row(0, &raw, &mapping()).unwrap();
        assert_eq!(normalized.phase_name, "Discovery");
        assert_eq!(normalized.phase_position, 2);
        assert_eq!(normalized.item_label, "Stakeholder interviews");
        assert_eq!(normalized.quantity, 4);
        assert_eq!(normalized.duration, 6.0);
    }

    #[test]
    fn missing_label_fails_row_with_one_based_number() {
        let raw = row(&[("Type", "doc")]);
        let err = normalize_row(2, &raw, &mapping()).unwrap_err();
        assert_eq!(err.row, 3);
        assert_eq!(err.to_string(), "Row 3: missing itemLabel");
    }

    #[test]
    fn blank_phase_name_defaults() {
        let raw = row(&[("Stage", "  "), ("Deliverable", "Brief"), ("Type", "doc")]);
        let normalized = normalize_row(0, &raw, &mapping()).unwrap();
        assert_eq!(normalized.phase_name, DEFAULT_PHASE_NAME);
    }

    #[test]
    fn malformed_numerics_use_safe_defaults() {
        let raw = row(&[
            ("Deliverable", "Brief"),
            ("Type", "doc"),
            ("Qty", "a lot"),
            ("Order", "-3"),
            ("Days", "soon"),
        ]);
        let normalized = normalize_row(0, &raw, &mapping()).unwrap();
        assert_eq!(normalized.quantity, 1);
        assert_eq!(normalized.phase_position, 1);
        assert_eq!(normalized.duration, 1.0);
    }

    #[test]
    fn transform_is_best_effort() {
        let rows = vec![
            row(&[("Deliverable", "Brief"), ("Type", "doc")]),
            row(&[("Type", "doc")]),
            row(&[("Deliverable", "Deck"), ("Type", "presentation")]),
        ];
        let report = transform_rows(&rows, &mapping());
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 2);
    }
}
