use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    activity::mode::EncodingMode,
    foundation::error::{ChipVisError, ChipVisResult},
    render::pipeline::RenderThreading,
};

/// Complete run configuration.
///
/// Built once (from CLI flags or a JSON document), normalized by [`VisConfig::validated`], then
/// passed by reference to every component. Nothing reads configuration from ambient state.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VisConfig {
    /// Waveform path prefix of the design under observation, including the trailing dot
    /// (`tb.uut.`).
    pub prefix: String,
    /// Full waveform name (or unique name prefix) of the status-string signal.
    pub status_signal: String,
    /// Clock signal; looked up as given, then under `prefix`.
    pub clock_signal: String,
    /// Reset signal; `None` starts sampling at time 0.
    pub reset_signal: Option<String>,
    /// Sampling starts at the first cycle whose status contains this marker.
    pub start_status: String,
    /// Supply/bias pins excluded from connectivity checks.
    pub ignore_ports: Vec<String>,
    /// Module-name prefixes identifying standard-cell library modules.
    pub library_prefixes: Vec<String>,
    /// Instance-name prefixes of area filler cells.
    pub filler_prefixes: Vec<String>,
    /// Instance-name prefixes of physical infrastructure cells (clock buffers, antennas).
    pub phy_prefixes: Vec<String>,
    /// Integer pixels per layout unit (> 1).
    pub scale: u32,
    /// Output frame rate (> 0). One frame per clock cycle.
    pub fps: u32,
    /// Uniform downscale applied after rendering (> 0).
    pub downscale: f64,
    /// Box blur kernel size; coerced to an odd value >= 3.
    pub blur: u32,
    /// Status text stroke thickness per unit of text scale.
    pub font_thickness: f32,
    /// Growth factor for [`EncodingMode::ExpHeatmap`].
    pub exp_grow: f32,
    /// Decay factor for [`EncodingMode::ExpDecay`] and [`EncodingMode::ExpHeatmap`].
    pub exp_decay: f32,
    /// Growth step for [`EncodingMode::LinHeatmap`].
    pub lin_grow: f32,
    /// Decay step for [`EncodingMode::LinHeatmap`].
    pub lin_decay: f32,
    /// Encodings to render.
    pub modes: Vec<EncodingMode>,
    /// Font family requested for the status text.
    pub font_family: String,
    /// Extra directories scanned for `.ttf`/`.otf`/`.ttc` fonts.
    pub font_dirs: Vec<PathBuf>,
    /// Frame-level threading.
    pub threading: RenderThreading,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            status_signal: String::new(),
            clock_signal: String::new(),
            reset_signal: None,
            start_status: String::new(),
            ignore_ports: strings(&["VPWR", "VGND", "VPB", "VNB"]),
            library_prefixes: strings(&["sky130_"]),
            filler_prefixes: strings(&["FILLER_"]),
            phy_prefixes: strings(&["clkbuf_", "PHY_", "ANTENNA_"]),
            scale: 3,
            fps: 8,
            downscale: 1.0,
            blur: 7,
            font_thickness: 2.2,
            exp_grow: 1.2,
            exp_decay: 0.8,
            lin_grow: 0.15,
            lin_decay: 0.15,
            modes: EncodingMode::ALL.to_vec(),
            font_family: "sans-serif".to_string(),
            font_dirs: Vec::new(),
            threading: RenderThreading::default(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn split_list(items: Vec<String>) -> Vec<String> {
    items
        .iter()
        .flat_map(|s| s.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl VisConfig {
    /// Read a JSON configuration document. Missing fields take their defaults.
    pub fn from_path(path: &Path) -> ChipVisResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        serde_json::from_str(&text)
            .map_err(|e| ChipVisError::serde(format!("config '{}': {e}", path.display())))
    }

    /// Validate and normalize.
    ///
    /// Decay/growth factors keep only their magnitude and `exp_decay` must not exceed 1. The blur
    /// kernel becomes odd and at least 3, modes are sorted and deduplicated, list entries are
    /// trimmed.
    pub fn validated(mut self) -> ChipVisResult<Self> {
        if self.clock_signal.trim().is_empty() {
            return Err(ChipVisError::validation("clock signal name must be set"));
        }
        if self.status_signal.trim().is_empty() {
            return Err(ChipVisError::validation("status signal name must be set"));
        }
        if self.scale <= 1 {
            return Err(ChipVisError::validation("scale must be > 1"));
        }
        if self.fps == 0 {
            return Err(ChipVisError::validation("fps must be > 0"));
        }
        if !self.downscale.is_finite() || self.downscale <= 0.0 {
            return Err(ChipVisError::validation("downscale must be finite and > 0"));
        }
        if !self.font_thickness.is_finite() || self.font_thickness < 0.0 {
            return Err(ChipVisError::validation(
                "font thickness must be finite and >= 0",
            ));
        }
        for (name, v) in [
            ("exp_grow", self.exp_grow),
            ("exp_decay", self.exp_decay),
            ("lin_grow", self.lin_grow),
            ("lin_decay", self.lin_decay),
        ] {
            if !v.is_finite() {
                return Err(ChipVisError::validation(format!("{name} must be finite")));
            }
        }
        if self.modes.is_empty() {
            return Err(ChipVisError::validation(
                "at least one encoding mode must be requested",
            ));
        }
        if let Some(n) = self.threading.threads
            && n == 0
        {
            return Err(ChipVisError::validation(
                "render threading 'threads' must be >= 1 when set",
            ));
        }

        self.exp_grow = self.exp_grow.abs();
        self.exp_decay = self.exp_decay.abs();
        self.lin_grow = self.lin_grow.abs();
        self.lin_decay = self.lin_decay.abs();
        if self.exp_decay > 1.0 {
            return Err(ChipVisError::validation(format!(
                "exp_decay must be <= 1, got {}",
                self.exp_decay
            )));
        }

        self.blur = self.blur.max(3);
        if self.blur % 2 == 0 {
            self.blur += 1;
        }

        self.modes.sort();
        self.modes.dedup();

        self.reset_signal = self
            .reset_signal
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self.ignore_ports = split_list(self.ignore_ports);
        self.library_prefixes = split_list(self.library_prefixes);
        self.filler_prefixes = split_list(self.filler_prefixes);
        self.phy_prefixes = split_list(self.phy_prefixes);

        Ok(self)
    }

    /// Whether `port` is a bookkeeping pin excluded from connectivity.
    pub fn is_ignored_port(&self, port: &str) -> bool {
        self.ignore_ports.iter().any(|p| p == port)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
