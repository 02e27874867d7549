mod edges;
mod tree;
pub(crate) mod types;

pub use edges::synthesize_edges;
pub use types::*;

use std::collections::{BTreeMap, HashSet};

use crate::config::LayoutConfig;
use crate::ir::Graph;
use crate::lock::LockStore;

use tree::{PositionMap, TreePlacer};

/// Node ids never referenced as anyone's child, in row-scan order.
pub fn find_roots(graph: &Graph) -> Vec<String> {
    let mut referenced: HashSet<&str> = HashSet::new();
    for children in graph.children.values() {
        for child in children {
            referenced.insert(child.as_str());
        }
    }
    graph
        .order
        .iter()
        .filter(|id| !referenced.contains(id.as_str()))
        .cloned()
        .collect()
}

/// Computes a position for every node reachable from a root.
///
/// Roots are packed left to right: the cursor probes forward until the trial
/// slot clears every already-placed node (any depth — deliberately
/// conservative), the subtree is placed, and a global row sweep resolves
/// collisions between branches of different trees. Edges are synthesized
/// separately from the rows; see [`synthesize_edges`].
pub fn compute_layout(
    graph: &Graph,
    widths: &BTreeMap<String, f32>,
    locks: &LockStore,
    config: &LayoutConfig,
) -> Layout {
    let placer = TreePlacer::new(graph, widths, locks, config);
    let mut positions = PositionMap::new();

    let mut cursor_x = 0.0f32;
    for root in find_roots(graph) {
        let root_width = placer.width_of(&root);
        while collides_with_placed(&positions, &placer, cursor_x, root_width, config.margin) {
            cursor_x += config.cursor_step;
        }
        placer.place(&root, cursor_x, 0.0, &mut positions);
        placer.resolve_row_overlaps(&mut positions);
        cursor_x += root_width + config.root_gap;
    }

    build_layout(graph, widths, positions, config)
}

fn collides_with_placed(
    positions: &PositionMap,
    placer: &TreePlacer<'_>,
    trial_x: f32,
    trial_width: f32,
    margin: f32,
) -> bool {
    positions.iter().any(|(id, position)| {
        let min_gap = (placer.width_of(id) + trial_width) / 2.0 + margin;
        (position.x - trial_x).abs() < min_gap
    })
}

fn build_layout(
    graph: &Graph,
    widths: &BTreeMap<String, f32>,
    positions: PositionMap,
    config: &LayoutConfig,
) -> Layout {
    let positions = positions.into_map();
    let mut nodes: BTreeMap<String, NodeLayout> = BTreeMap::new();
    for id in &graph.order {
        let Some(position) = positions.get(id) else {
            continue;
        };
        let Some(node) = graph.nodes.get(id) else {
            continue;
        };
        nodes.insert(
            id.clone(),
            NodeLayout {
                id: id.clone(),
                x: position.x,
                y: position.y,
                width: widths.get(id).copied().unwrap_or(0.0),
                height: config.node_height,
                locked: node.locked,
            },
        );
    }

    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for node in nodes.values() {
        min_x = min_x.min(node.x - node.width / 2.0);
        min_y = min_y.min(node.y);
        max_x = max_x.max(node.x + node.width / 2.0);
        max_y = max_y.max(node.y + node.height);
    }
    let width = if min_x == f32::MAX {
        1.0
    } else {
        (max_x - min_x).max(1.0)
    };
    let height = if min_y == f32::MAX {
        1.0
    } else {
        (max_y - min_y).max(1.0)
    };

    Layout {
        nodes,
        edges: Vec::new(),
        width,
        height,
    }
}
