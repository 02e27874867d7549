use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::ir::Graph;
use crate::lock::LockStore;

use super::types::Position;

/// Positions accumulated during a layout run, in placement order.
///
/// Placement order (not id order) decides which of two colliding nodes
/// yields during overlap resolution, so it is tracked explicitly.
#[derive(Debug, Default)]
pub(super) struct PositionMap {
    order: Vec<String>,
    map: BTreeMap<String, Position>,
}

impl PositionMap {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn contains(&self, id: &str) -> bool {
        self.map.contains_key(id)
    }

    pub(super) fn get(&self, id: &str) -> Option<Position> {
        self.map.get(id).copied()
    }

    pub(super) fn insert(&mut self, id: &str, position: Position) {
        if self.map.insert(id.to_string(), position).is_none() {
            self.order.push(id.to_string());
        }
    }

    pub(super) fn set_x(&mut self, id: &str, x: f32) {
        if let Some(position) = self.map.get_mut(id) {
            position.x = x;
        }
    }

    pub(super) fn order(&self) -> &[String] {
        &self.order
    }

    pub(super) fn iter(&self) -> impl Iterator<Item = (&str, Position)> {
        self.order
            .iter()
            .filter_map(|id| self.map.get(id).map(|pos| (id.as_str(), *pos)))
    }

    pub(super) fn into_map(self) -> BTreeMap<String, Position> {
        self.map
    }
}

/// Recursive subtree placement over a shared position map.
///
/// Locked nodes with a stored position act as fixed anchors: they are
/// pinned before their children descend, they skip re-centering, and
/// overlap resolution never moves them.
pub(super) struct TreePlacer<'a> {
    graph: &'a Graph,
    widths: &'a BTreeMap<String, f32>,
    locks: &'a LockStore,
    config: &'a LayoutConfig,
}

impl<'a> TreePlacer<'a> {
    pub(super) fn new(
        graph: &'a Graph,
        widths: &'a BTreeMap<String, f32>,
        locks: &'a LockStore,
        config: &'a LayoutConfig,
    ) -> Self {
        Self {
            graph,
            widths,
            locks,
            config,
        }
    }

    pub(super) fn width_of(&self, id: &str) -> f32 {
        self.widths.get(id).copied().unwrap_or(0.0)
    }

    /// The stored position a node is pinned to, if it is locked and the
    /// lock store has an entry for it.
    pub(super) fn anchor(&self, id: &str) -> Option<Position> {
        let node = self.graph.nodes.get(id)?;
        if node.locked { self.locks.get(id) } else { None }
    }

    /// Places `id` at `(x, y)` and recurses into its children.
    ///
    /// A node already present in the map is left untouched: the guard makes
    /// placement idempotent, gives a node reachable from two parents to the
    /// first parent encountered, and breaks cycles.
    pub(super) fn place(&self, id: &str, x: f32, y: f32, positions: &mut PositionMap) {
        if positions.contains(id) {
            return;
        }
        if !self.graph.nodes.contains_key(id) {
            return;
        }

        let anchor = self.anchor(id);
        let start = anchor.unwrap_or(Position::new(x, y));
        positions.insert(id, start);

        let children = self.graph.children_of(id);
        let mut child_x =
            start.x - children.len().saturating_sub(1) as f32 * self.config.half_spacing;
        for child in children {
            self.place(child, child_x, start.y + self.config.row_height, positions);
            child_x += self.width_of(child) + self.config.sibling_gap;
        }

        if anchor.is_none() {
            self.recenter(id, children, positions);
            self.push_clear_of_row(id, positions);
        }
    }

    /// Re-centers a parent over the final span of its children. A single
    /// child pulls the parent onto itself adjusted for the width difference;
    /// two or more center the parent on the outermost pair. Children without
    /// a position (dangling refs) do not participate.
    fn recenter(&self, id: &str, children: &[String], positions: &mut PositionMap) {
        let placed: Vec<(&String, Position)> = children
            .iter()
            .filter_map(|child| positions.get(child).map(|pos| (child, pos)))
            .collect();
        match placed.as_slice() {
            [] => {}
            [(child, pos)] => {
                let x = pos.x + (self.width_of(child.as_str()) - self.width_of(id)) / 2.0;
                positions.set_x(id, x);
            }
            [(_, first), .., (_, last)] => {
                positions.set_x(id, (first.x + last.x) / 2.0);
            }
        }
    }

    /// Local overlap resolution: shifts `id` right until it clears every
    /// earlier-placed node on its row. Earlier nodes never move.
    fn push_clear_of_row(&self, id: &str, positions: &mut PositionMap) {
        let Some(me) = positions.get(id) else {
            return;
        };
        let my_width = self.width_of(id);
        let mut x = me.x;
        loop {
            let mut pushed_to: Option<f32> = None;
            for (other, other_pos) in positions.iter() {
                if other == id || other_pos.y != me.y {
                    continue;
                }
                let min_gap = (self.width_of(other) + my_width) / 2.0 + self.config.margin;
                if (other_pos.x - x).abs() < min_gap {
                    let shifted = other_pos.x + min_gap;
                    if shifted > x {
                        pushed_to = Some(pushed_to.map_or(shifted, |p: f32| p.max(shifted)));
                    }
                }
            }
            match pushed_to {
                Some(shifted) => x = shifted,
                None => break,
            }
        }
        if x != me.x {
            positions.set_x(id, x);
        }
    }

    /// Global row sweep: walks the map in placement order and shifts each
    /// later node right until it clears every earlier node sharing its row.
    /// Anchored nodes keep their stored position verbatim; they act as
    /// immovable obstacles for every unlocked node, even ones placed first,
    /// so lock fidelity and the no-overlap postcondition hold together.
    pub(super) fn resolve_row_overlaps(&self, positions: &mut PositionMap) {
        let order: Vec<String> = positions.order().to_vec();
        for (i, id) in order.iter().enumerate() {
            if self.anchor(id).is_some() {
                continue;
            }
            let Some(me) = positions.get(id) else {
                continue;
            };
            let my_width = self.width_of(id);
            let mut x = me.x;
            loop {
                let mut pushed_to: Option<f32> = None;
                for (j, obstacle) in order.iter().enumerate() {
                    if j >= i && self.anchor(obstacle).is_none() {
                        continue;
                    }
                    let Some(other) = positions.get(obstacle) else {
                        continue;
                    };
                    if other.y != me.y || obstacle == id {
                        continue;
                    }
                    let min_gap = (self.width_of(obstacle) + my_width) / 2.0 + self.config.margin;
                    if (other.x - x).abs() < min_gap {
                        let shifted = other.x + min_gap;
                        if shifted > x {
                            pushed_to = Some(pushed_to.map_or(shifted, |p: f32| p.max(shifted)));
                        }
                    }
                }
                match pushed_to {
                    Some(shifted) => x = shifted,
                    None => break,
                }
            }
            if x != me.x {
                positions.set_x(id, x);
            }
        }
    }
}
