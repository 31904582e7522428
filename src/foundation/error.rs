/// Convenience result type used across chipvis.
pub type ChipVisResult<T> = Result<T, ChipVisError>;

/// Top-level error taxonomy.
///
/// Every variant is fatal for a run: there is no degraded rendering mode. Soft mismatches are
/// reported through `tracing` instead of this type.
#[derive(thiserror::Error, Debug)]
pub enum ChipVisError {
    /// Invalid user-provided configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Structural problems in the connectivity graph.
    #[error("netlist error: {0}")]
    Netlist(String),

    /// An output net resolves to more than one logic-bearing driver.
    #[error("netlist error: net '{net}' is driven by {} cells ({})", drivers.len(), drivers.join(", "))]
    AmbiguousDriver {
        /// Net name with conflicting drivers.
        net: String,
        /// All instances resolving to the net.
        drivers: Vec<String>,
    },

    /// Waveform contents could not be reconciled with the configuration.
    #[error("waveform error: {0}")]
    Waveform(String),

    /// The reset signal does not settle to logic-0.
    #[error("waveform error: reset signal '{signal}' never settles to 0 (last value '{last}')")]
    ResetNotReleased {
        /// Reset signal name as configured.
        signal: String,
        /// Last recorded value, rendered as logic levels.
        last: String,
    },

    /// No sampled cycle carries the configured start status.
    #[error("waveform error: status never contains starting marker '{marker}'")]
    StartStatusNotFound {
        /// Configured start marker.
        marker: String,
    },

    /// Layout/geometry inconsistencies.
    #[error("layout error: {0}")]
    Layout(String),

    /// Rendering-time invariant violations.
    #[error("render error: {0}")]
    Render(String),

    /// Output encoding failures.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing input documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChipVisError {
    /// Build a [`ChipVisError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ChipVisError::Netlist`] value.
    pub fn netlist(msg: impl Into<String>) -> Self {
        Self::Netlist(msg.into())
    }

    /// Build a [`ChipVisError::Waveform`] value.
    pub fn waveform(msg: impl Into<String>) -> Self {
        Self::Waveform(msg.into())
    }

    /// Build a [`ChipVisError::Layout`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`ChipVisError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ChipVisError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ChipVisError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
