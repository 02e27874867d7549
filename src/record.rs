use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ir::{ParentRef, Row};

static TARGET_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^target_(\d+)$").expect("valid regex"));

/// Converts keyed records (one map per parsed tabular row) into [`Row`]s.
///
/// The field convention comes from the CSV importer this engine was built
/// for: `id`, `label`, `bgColor`, `isLocked` ("1" means locked) plus
/// `target_<n>` fields each naming a child of the record, with an optional
/// sibling `target_<n>_path` carrying the connector path code. Target fields
/// are scanned in ascending `<n>` order so sibling order is reproducible.
///
/// Only targets whose path code is exactly `"bt"` define tree ancestry; any
/// other code (or a missing one) yields an edge-only ref, so the child is
/// drawn connected but placed independently. Records without an id are
/// skipped, and a target naming an id with no record of its own is dropped:
/// both are tolerated, never errors.
pub fn rows_from_records(records: &[BTreeMap<String, String>]) -> Vec<Row> {
    let mut rows: Vec<Row> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let Some(id) = record.get("id").filter(|id| !id.is_empty()) else {
            continue;
        };
        index.entry(id.clone()).or_insert(rows.len());
        rows.push(Row {
            id: id.clone(),
            label: record.get("label").cloned().unwrap_or_default(),
            bg_color: record.get("bgColor").cloned().filter(|c| !c.is_empty()),
            locked: record.get("isLocked").is_some_and(|v| v == "1"),
            parents: Vec::new(),
        });
    }

    // Targets name children, while Row carries parent refs; invert the link
    // onto the child's row. Record scan order then field order.
    for record in records {
        let Some(parent_id) = record.get("id").filter(|id| !id.is_empty()) else {
            continue;
        };
        let mut targets: Vec<(u64, &str, Option<&str>)> = Vec::new();
        for (key, value) in record {
            if value.is_empty() {
                continue;
            }
            if let Some(caps) = TARGET_KEY.captures(key) {
                let ordinal: u64 = caps[1].parse().unwrap_or(0);
                let path = record
                    .get(&format!("{key}_path"))
                    .filter(|p| !p.is_empty())
                    .map(String::as_str);
                targets.push((ordinal, value.as_str(), path));
            }
        }
        targets.sort_by_key(|(ordinal, ..)| *ordinal);
        for (_, child, path) in targets {
            if let Some(&row_idx) = index.get(child) {
                rows[row_idx].parents.push(ParentRef {
                    id: parent_id.clone(),
                    path: path.map(str::to_string),
                    edge_only: path != Some("bt"),
                });
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn targets_scan_in_numeric_order() {
        let records = vec![
            record(&[
                ("id", "p"),
                ("target_10", "b"),
                ("target_10_path", "bt"),
                ("target_2", "a"),
                ("target_2_path", "bt"),
            ]),
            record(&[("id", "a")]),
            record(&[("id", "b")]),
        ];
        let rows = rows_from_records(&records);
        // "a" (target_2) links before "b" (target_10) despite key order.
        assert_eq!(rows[1].id, "a");
        assert_eq!(rows[1].parents.len(), 1);
        assert_eq!(rows[2].id, "b");
        assert_eq!(rows[2].parents.len(), 1);
        let graph = crate::ir::Graph::from_rows(&rows).unwrap();
        assert_eq!(graph.children_of("p"), ["a", "b"]);
    }

    #[test]
    fn lock_flag_and_path_codes_carry_over() {
        let records = vec![
            record(&[
                ("id", "p"),
                ("target_1", "c"),
                ("target_1_path", "lr"),
            ]),
            record(&[("id", "c"), ("isLocked", "1"), ("bgColor", "#ff0000")]),
        ];
        let rows = rows_from_records(&records);
        assert!(rows[1].locked);
        assert_eq!(rows[1].bg_color.as_deref(), Some("#ff0000"));
        assert_eq!(rows[1].parents[0].path.as_deref(), Some("lr"));
        assert!(rows[1].parents[0].edge_only);
    }

    #[test]
    fn only_bt_targets_define_ancestry() {
        let records = vec![
            record(&[
                ("id", "p"),
                ("target_1", "a"),
                ("target_1_path", "bt"),
                ("target_2", "b"),
                ("target_2_path", "lr"),
                ("target_3", "c"),
            ]),
            record(&[("id", "a")]),
            record(&[("id", "b")]),
            record(&[("id", "c")]),
        ];
        let rows = rows_from_records(&records);
        let graph = crate::ir::Graph::from_rows(&rows).unwrap();
        // A side-entry code, or none at all, connects without reparenting.
        assert_eq!(graph.children_of("p"), ["a"]);
        assert!(!rows[1].parents[0].edge_only);
        assert!(rows[2].parents[0].edge_only);
        assert!(rows[3].parents[0].edge_only);
    }

    #[test]
    fn target_without_a_record_is_dropped() {
        let records = vec![record(&[("id", "p"), ("target_1", "ghost")])];
        let rows = rows_from_records(&records);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].parents.is_empty());
    }

    #[test]
    fn record_without_id_is_skipped() {
        let records = vec![record(&[("label", "nameless")]), record(&[("id", "a")])];
        let rows = rows_from_records(&records);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "a");
    }
}
