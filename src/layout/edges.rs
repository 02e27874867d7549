use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::ir::Row;

use super::types::{EdgeLayout, HandleSide};

/// Two-letter path codes to (source handle, target handle) pairs.
/// Unknown or absent codes fall back to the canonical bottom-to-top run.
static HANDLE_PAIRS: Lazy<HashMap<&'static str, (HandleSide, HandleSide)>> = Lazy::new(|| {
    use HandleSide::*;
    HashMap::from([
        ("lr", (Right, Left)),
        ("rl", (Left, Right)),
        ("bt", (Bottom, Top)),
        ("tb", (Top, Bottom)),
        ("br", (Bottom, Right)),
        ("bl", (Bottom, Left)),
        ("tr", (Top, Right)),
        ("tl", (Top, Left)),
        ("rb", (Right, Bottom)),
        ("rt", (Right, Top)),
        ("lb", (Left, Bottom)),
        ("lt", (Left, Top)),
    ])
});

pub(crate) const DEFAULT_HANDLES: (HandleSide, HandleSide) = (HandleSide::Bottom, HandleSide::Top);

pub(crate) fn handles_for(code: Option<&str>) -> (HandleSide, HandleSide) {
    code.and_then(|code| HANDLE_PAIRS.get(code).copied())
        .unwrap_or(DEFAULT_HANDLES)
}

/// Derives the edge list from the rows: one edge per non-empty parent ref,
/// id `"{parent}-{child}"`, source at the parent.
///
/// When a previous edge with the same endpoints exists and the child row is
/// locked, the previous record is reused wholesale so connector attributes a
/// user adjusted by hand survive a re-import.
pub fn synthesize_edges(rows: &[Row], previous: &[EdgeLayout]) -> Vec<EdgeLayout> {
    let prior: HashMap<(&str, &str), &EdgeLayout> = previous
        .iter()
        .map(|edge| ((edge.source.as_str(), edge.target.as_str()), edge))
        .collect();

    let mut edges = Vec::new();
    for row in rows {
        for parent in &row.parents {
            if parent.id.is_empty() {
                continue;
            }
            if row.locked
                && let Some(kept) = prior.get(&(parent.id.as_str(), row.id.as_str()))
            {
                edges.push((*kept).clone());
                continue;
            }
            let (source_handle, target_handle) = handles_for(parent.path.as_deref());
            edges.push(EdgeLayout {
                id: format!("{}-{}", parent.id, row.id),
                source: parent.id.clone(),
                target: row.id.clone(),
                source_handle,
                target_handle,
            });
        }
    }
    edges
}
