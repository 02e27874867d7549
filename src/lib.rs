pub mod config;
pub mod export;
pub mod ir;
pub mod layout;
pub mod lock;
pub mod record;
#[cfg(feature = "measure")]
pub mod text_metrics;

pub use config::{LayoutConfig, load_config};
pub use export::{LayoutDump, write_layout_json};
pub use ir::{BuildError, Graph, Node, ParentRef, Row};
pub use layout::{
    EdgeLayout, HandleSide, Layout, NodeLayout, Position, compute_layout, find_roots,
    synthesize_edges,
};
pub use lock::LockStore;
pub use record::rows_from_records;

use std::collections::BTreeMap;

/// One full pass: graph construction, forest placement, overlap resolution
/// and edge synthesis. `widths` maps node ids to rendered pixel widths and
/// `prev_edges` is the previous run's edge list (connector attributes on
/// edges into locked nodes survive through it).
pub fn layout_rows(
    rows: &[Row],
    widths: &BTreeMap<String, f32>,
    locks: &LockStore,
    prev_edges: &[EdgeLayout],
    config: &LayoutConfig,
) -> Result<Layout, BuildError> {
    let graph = Graph::from_rows(rows)?;
    let mut layout = compute_layout(&graph, widths, locks, config);
    layout.edges = synthesize_edges(rows, prev_edges);
    Ok(layout)
}
