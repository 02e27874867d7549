use serde::{Deserialize, Serialize};
use std::path::Path;

/// Spacing knobs for the layout engine. All distances are pixels.
///
/// Defaults match the card dimensions the engine was originally tuned for
/// (200x60 cards on a 150px row grid with 50px clearance).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Vertical distance between consecutive depth levels.
    pub row_height: f32,
    /// Fixed card height; never varies per node.
    pub node_height: f32,
    /// Horizontal advance between siblings beyond the child's own width.
    pub sibling_gap: f32,
    /// Extra clearance beyond half-widths required between same-row nodes.
    pub margin: f32,
    /// Leftward offset per child when starting a provisional child run,
    /// so the run begins roughly centered under the parent.
    pub half_spacing: f32,
    /// Cursor advance past a packed root's width before the next root.
    pub root_gap: f32,
    /// Probe step while hunting for a clear slot for the next root.
    pub cursor_step: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_height: 150.0,
            node_height: 60.0,
            sibling_gap: 50.0,
            margin: 50.0,
            half_spacing: 50.0,
            root_gap: 100.0,
            cursor_step: 100.0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    row_height: Option<f32>,
    node_height: Option<f32>,
    sibling_gap: Option<f32>,
    margin: Option<f32>,
    half_spacing: Option<f32>,
    root_gap: Option<f32>,
    cursor_step: Option<f32>,
}

/// Loads a config file, merging the named knobs over the defaults.
/// Accepts strict JSON and falls back to JSON5 for hand-edited files.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let mut config = LayoutConfig::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = match serde_json::from_str(&contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(&contents)?,
    };

    if let Some(v) = parsed.row_height {
        config.row_height = v;
    }
    if let Some(v) = parsed.node_height {
        config.node_height = v;
    }
    if let Some(v) = parsed.sibling_gap {
        config.sibling_gap = v;
    }
    if let Some(v) = parsed.margin {
        config.margin = v;
    }
    if let Some(v) = parsed.half_spacing {
        config.half_spacing = v;
    }
    if let Some(v) = parsed.root_gap {
        config.root_gap = v;
    }
    if let Some(v) = parsed.cursor_step {
        config.cursor_step = v;
    }

    Ok(config)
}
