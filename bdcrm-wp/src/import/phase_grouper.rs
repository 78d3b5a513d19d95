//! Phase grouping for bulk deliverable import
//!
//! Folds an ordered batch of normalized rows into deduplicated, ordered
//! phase drafts. Dedup key is the exact phase name; repeat occurrences keep
//! the maximum position seen (a later row may carry corrected sequencing,
//! and max-wins stops an earlier mis-keyed row from demoting the phase) and
//! the first non-null timeline hint.

use serde::Serialize;
use std::collections::HashMap;

use tracing::debug;

use crate::models::DeliverableRow;
use crate::timeline::duration::normalize_duration;

/// Item draft nested under a phase draft, duration already canonical
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemDraft {
    pub item_type: String,
    pub label: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub unit_of_measure: Option<String>,
    pub duration_days: f64,
}

/// Phase draft produced by grouping, pending human review and commit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseDraft {
    pub name: String,
    pub position: i64,
    pub timeline_hint: Option<String>,
    pub items: Vec<ItemDraft>,
}

/// Fold rows into ordered phase drafts
///
/// Iterates in file order. First occurrence of a name creates the draft at
/// that row's position; repeats update position to the max seen and set the
/// hint only if still unset. Every row's item is appended to its phase in
/// row order regardless of dedup. Output is sorted by final position,
/// ascending, with ties keeping first-seen order (stable sort).
pub fn group_into_phases(rows: &[DeliverableRow]) -> Vec<PhaseDraft> {
    let mut drafts: Vec<PhaseDraft> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let index = match by_name.get(&row.phase_name) {
            Some(&index) => {
                let draft = &mut drafts[index];
                draft.position = draft.position.max(row.phase_position);
                if draft.timeline_hint.is_none() {
                    draft.timeline_hint = row.phase_timeline_hint.clone();
                }
                index
            }
            None => {
                drafts.push(PhaseDraft {
                    name: row.phase_name.clone(),
                    position: row.phase_position,
                    timeline_hint: row.phase_timeline_hint.clone(),
                    items: Vec::new(),
                });
                by_name.insert(row.phase_name.clone(), drafts.len() - 1);
                drafts.len() - 1
            }
        };

        drafts[index].items.push(ItemDraft {
            item_type: row.item_type.clone(),
            label: row.item_label.clone(),
            description: row.item_description.clone(),
            quantity: row.quantity,
            unit_of_measure: row.unit_of_measure.clone(),
            duration_days: normalize_duration(row.duration, row.unit_of_measure.as_deref()),
        });
    }

    drafts.sort_by_key(|draft| draft.position);

    debug!(
        phases = drafts.len(),
        items = drafts.iter().map(|d| d.items.len()).sum::<usize>(),
        "Grouped deliverable rows"
    );

    drafts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(phase: &str, position: i64, label: &str) -> DeliverableRow {
        DeliverableRow {
            phase_name: phase.to_string(),
            phase_position: position,
            phase_timeline_hint: None,
            item_type: "deliverable".to_string(),
            item_label: label.to_string(),
            item_description: None,
            quantity: 1,
            unit_of_measure: None,
            duration: 1.0,
        }
    }

    #[test]
    fn repeat_phase_keeps_max_position() {
        let rows = vec![row("A", 1, "a1"), row("B", 1, "b1"), row("A", 3, "a2")];
        let drafts = group_into_phases(&rows);

        assert_eq!(drafts.len(), 2);
        // B (pos 1) sorts before A (pos 3)
        assert_eq!(drafts[0].name, "B");
        assert_eq!(drafts[0].position, 1);
        assert_eq!(drafts[1].name, "A");
        assert_eq!(drafts[1].position, 3);
        // A kept both its items in row order
        let labels: Vec<_> = drafts[1].items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["a1", "a2"]);
    }

    #[test]
    fn position_ties_keep_first_seen_order() {
        let rows = vec![row("Later", 2, "x"), row("Earlier", 2, "y")];
        let drafts = group_into_phases(&rows);
        assert_eq!(drafts[0].name, "Later");
        assert_eq!(drafts[1].name, "Earlier");
    }

    #[test]
    fn timeline_hint_is_first_wins() {
        let mut first = row("A", 1, "a1");
        first.phase_timeline_hint = Some("Q1".to_string());
        let mut second = row("A", 1, "a2");
        second.phase_timeline_hint = Some("Q3".to_string());

        let drafts = group_into_phases(&[first, second]);
        assert_eq!(drafts[0].timeline_hint.as_deref(), Some("Q1"));
    }

    #[test]
    fn hint_backfills_when_first_row_had_none() {
        let first = row("A", 1, "a1");
        let mut second = row("A", 1, "a2");
        second.phase_timeline_hint = Some("Q2".to_string());

        let drafts = group_into_phases(&[first, second]);
        assert_eq!(drafts[0].timeline_hint.as_deref(), Some("Q2"));
    }

    #[test]
    fn item_durations_are_normalized_per_unit() {
        let mut hourly = row("A", 1, "workshop");
        hourly.duration = 4.0;
        hourly.unit_of_measure = Some("hour".to_string());

        let drafts = group_into_phases(&[hourly]);
        assert_eq!(drafts[0].items[0].duration_days, 0.5);
    }

    #[test]
    fn empty_input_yields_no_drafts() {
        assert!(group_into_phases(&[]).is_empty());
    }
}
