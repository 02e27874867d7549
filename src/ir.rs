use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One tabular input record: a card plus the parents it hangs under.
///
/// `label` and `bg_color` are display payload carried through untouched;
/// layout only reads `id`, `locked` and `parents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub bg_color: Option<String>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub parents: Vec<ParentRef>,
}

/// A reference from a row to one of its parents, with an optional
/// two-letter path code ("bt", "lr", ...) picking the connector handles.
///
/// An `edge_only` ref contributes a connector but no placement: the row is
/// not pulled into that parent's subtree. Side-entry connectors in imported
/// data work this way; only the canonical bottom-to-top link defines
/// ancestry there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub edge_only: bool,
}

impl ParentRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: None,
            edge_only: false,
        }
    }

    pub fn with_path(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: Some(path.into()),
            edge_only: false,
        }
    }

    pub fn edge_only(id: impl Into<String>, path: Option<String>) -> Self {
        Self {
            id: id.into(),
            path,
            edge_only: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub locked: bool,
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("duplicate node id `{id}`")]
    DuplicateNode { id: String },
}

/// Node set plus the parent-to-children relation derived from the rows.
///
/// `order` is row-scan order and `children` values keep encounter order;
/// both are what makes sibling placement reproducible for identical input.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub order: Vec<String>,
    pub nodes: BTreeMap<String, Node>,
    pub children: BTreeMap<String, Vec<String>>,
}

impl Graph {
    pub fn from_rows(rows: &[Row]) -> Result<Self, BuildError> {
        let mut graph = Graph::default();
        for row in rows {
            if graph.nodes.contains_key(&row.id) {
                return Err(BuildError::DuplicateNode { id: row.id.clone() });
            }
            graph.order.push(row.id.clone());
            graph.nodes.insert(
                row.id.clone(),
                Node {
                    id: row.id.clone(),
                    locked: row.locked,
                },
            );
            for parent in &row.parents {
                // A parent naming an id we never see is tolerated: the entry
                // exists in the relation but placement skips it. Edge-only
                // refs never enter the relation at all.
                if parent.id.is_empty() || parent.edge_only {
                    continue;
                }
                graph
                    .children
                    .entry(parent.id.clone())
                    .or_default()
                    .push(row.id.clone());
            }
        }
        Ok(graph)
    }

    pub fn children_of(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, parents: &[&str]) -> Row {
        Row {
            id: id.to_string(),
            label: id.to_string(),
            bg_color: None,
            locked: false,
            parents: parents.iter().map(|p| ParentRef::new(*p)).collect(),
        }
    }

    #[test]
    fn builds_adjacency_in_encounter_order() {
        let rows = vec![row("r1", &[]), row("r2", &["r1"]), row("r3", &["r1"])];
        let graph = Graph::from_rows(&rows).unwrap();
        assert_eq!(graph.order, vec!["r1", "r2", "r3"]);
        assert_eq!(graph.children_of("r1"), ["r2", "r3"]);
    }

    #[test]
    fn duplicate_id_is_an_error() {
        let rows = vec![row("r1", &[]), row("r1", &[])];
        let err = Graph::from_rows(&rows).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateNode { id } if id == "r1"));
    }

    #[test]
    fn dangling_parent_creates_no_node() {
        let rows = vec![row("r1", &["ghost"])];
        let graph = Graph::from_rows(&rows).unwrap();
        assert!(!graph.nodes.contains_key("ghost"));
        assert_eq!(graph.children_of("ghost"), ["r1"]);
    }

    #[test]
    fn edge_only_ref_contributes_no_adjacency() {
        let mut child = row("r2", &[]);
        child.parents.push(ParentRef::edge_only("r1", None));
        let rows = vec![row("r1", &[]), child];
        let graph = Graph::from_rows(&rows).unwrap();
        assert!(graph.children_of("r1").is_empty());
        // Both nodes still exist; the link lives only in the edge list.
        assert_eq!(graph.order, vec!["r1", "r2"]);
    }

    #[test]
    fn empty_parent_ref_is_ignored() {
        let rows = vec![row("r1", &[""])];
        let graph = Graph::from_rows(&rows).unwrap();
        assert!(graph.children.is_empty());
    }
}
