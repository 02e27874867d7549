use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::layout::{Layout, Position};

/// Positions committed from a previous layout run, keyed by node id.
///
/// The store belongs to the host session: layout only reads it, and the host
/// calls [`LockStore::commit`] afterwards to carry locked positions into the
/// next run. Clearing it is the full-reset path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LockStore {
    positions: BTreeMap<String, Position>,
}

impl LockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Position> {
        self.positions.get(id).copied()
    }

    pub fn insert(&mut self, id: impl Into<String>, position: Position) {
        self.positions.insert(id.into(), position);
    }

    /// Copies the positions of locked nodes out of a finished layout.
    pub fn commit(&mut self, layout: &Layout) {
        for node in layout.nodes.values() {
            if node.locked {
                self.positions.insert(node.id.clone(), node.position());
            }
        }
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl FromIterator<(String, Position)> for LockStore {
    fn from_iter<T: IntoIterator<Item = (String, Position)>>(iter: T) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::NodeLayout;

    #[test]
    fn commit_keeps_only_locked_nodes() {
        let mut layout = Layout {
            nodes: BTreeMap::new(),
            edges: Vec::new(),
            width: 1.0,
            height: 1.0,
        };
        layout.nodes.insert(
            "a".to_string(),
            NodeLayout {
                id: "a".to_string(),
                x: 10.0,
                y: 0.0,
                width: 100.0,
                height: 60.0,
                locked: true,
            },
        );
        layout.nodes.insert(
            "b".to_string(),
            NodeLayout {
                id: "b".to_string(),
                x: 20.0,
                y: 0.0,
                width: 100.0,
                height: 60.0,
                locked: false,
            },
        );

        let mut store = LockStore::new();
        store.commit(&layout);
        assert_eq!(store.get("a"), Some(Position::new(10.0, 0.0)));
        assert_eq!(store.get("b"), None);
        assert_eq!(store.len(), 1);
    }
}
