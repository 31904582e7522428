use std::path::Path;

use anyhow::Context as _;

use crate::foundation::{
    core::Rect,
    error::{ChipVisError, ChipVisResult},
    ids::InstanceName,
};

/// One placed instance of the top cell.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutInstance {
    /// Instance name, matching the netlist cell name.
    pub name: InstanceName,
    /// Library cell placed.
    pub cell_type: String,
    /// Placed bounding box in layout units.
    pub bbox: Rect,
}

/// Flattened placement of the top cell, as exported from the layout database.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlacedLayout {
    /// Top cell name.
    #[serde(default)]
    pub top: String,
    /// Bounding box of the top cell.
    pub bbox: Rect,
    /// Every placed instance.
    pub instances: Vec<LayoutInstance>,
}

impl PlacedLayout {
    /// Parse a JSON layout document.
    pub fn from_json_str(s: &str) -> ChipVisResult<Self> {
        serde_json::from_str(s).map_err(|e| ChipVisError::serde(format!("layout: {e}")))
    }

    /// Read a JSON layout document from disk.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn from_path(path: &Path) -> ChipVisResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read layout '{}'", path.display()))?;
        let layout = Self::from_json_str(&text)?;
        tracing::info!(
            top = %layout.top,
            instances = layout.instances.len(),
            bbox = ?layout.bbox,
            "layout loaded"
        );
        Ok(layout)
    }
}
