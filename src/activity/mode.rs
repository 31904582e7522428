use crate::foundation::error::{ChipVisError, ChipVisResult};

/// One of the six activity encodings derived from the raw per-cycle samples.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum EncodingMode {
    /// Raw sampled value.
    Direct,
    /// Raw value with nets that never change forced off.
    DirectFiltered,
    /// On when the value differs from the previous cycle.
    Edge,
    /// Brightness resets to 1 on change, decays geometrically otherwise.
    ExpDecay,
    /// Exponential heatmap around a 0.5 offset.
    ExpHeatmap,
    /// Linear heatmap around a 0.5 offset.
    LinHeatmap,
}

impl EncodingMode {
    /// All modes in index order.
    pub const ALL: [EncodingMode; 6] = [
        EncodingMode::Direct,
        EncodingMode::DirectFiltered,
        EncodingMode::Edge,
        EncodingMode::ExpDecay,
        EncodingMode::ExpHeatmap,
        EncodingMode::LinHeatmap,
    ];

    /// Numeric mode index used on the command line and in output file names.
    pub fn index(self) -> u8 {
        match self {
            EncodingMode::Direct => 0,
            EncodingMode::DirectFiltered => 1,
            EncodingMode::Edge => 2,
            EncodingMode::ExpDecay => 3,
            EncodingMode::ExpHeatmap => 4,
            EncodingMode::LinHeatmap => 5,
        }
    }

    /// Look up a mode by index.
    pub fn from_index(idx: u8) -> ChipVisResult<Self> {
        Self::ALL
            .get(usize::from(idx))
            .copied()
            .ok_or_else(|| ChipVisError::validation(format!("unknown encoding mode {idx} (0-5)")))
    }

    /// Whether frames of this mode interpolate brightness instead of switching on/off.
    pub fn is_brightness(self) -> bool {
        matches!(
            self,
            EncodingMode::ExpDecay | EncodingMode::ExpHeatmap | EncodingMode::LinHeatmap
        )
    }

    /// Short human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            EncodingMode::Direct => "direct",
            EncodingMode::DirectFiltered => "direct-filtered",
            EncodingMode::Edge => "edge",
            EncodingMode::ExpDecay => "exp-decay",
            EncodingMode::ExpHeatmap => "exp-heatmap",
            EncodingMode::LinHeatmap => "lin-heatmap",
        }
    }

    /// Parse a comma-separated list such as `"0,2,5"`.
    pub fn parse_list(s: &str) -> ChipVisResult<Vec<Self>> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                let idx: u8 = part.parse().map_err(|_| {
                    ChipVisError::validation(format!("invalid encoding mode '{part}'"))
                })?;
                Self::from_index(idx)
            })
            .collect()
    }
}

impl TryFrom<u8> for EncodingMode {
    type Error = ChipVisError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value)
    }
}

impl From<EncodingMode> for u8 {
    fn from(mode: EncodingMode) -> Self {
        mode.index()
    }
}

impl std::fmt::Display for EncodingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.index(), self.name())
    }
}
