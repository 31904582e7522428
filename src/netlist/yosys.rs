//! Serde model of the Yosys `write_json` netlist document.

use std::{collections::BTreeMap, path::Path};

use anyhow::Context as _;

use crate::foundation::error::{ChipVisError, ChipVisResult};

/// A whole Yosys JSON document.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct YosysDesign {
    /// Tool identification string.
    #[serde(default)]
    pub creator: String,
    /// Every module in the document, library cells included.
    #[serde(default)]
    pub modules: BTreeMap<String, YosysModule>,
}

/// One module definition.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct YosysModule {
    /// Module attributes (`blackbox`, `top`, source locations...).
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
    /// Module ports.
    #[serde(default)]
    pub ports: BTreeMap<String, YosysPort>,
    /// Declared net names; several names may alias the same bit.
    #[serde(default)]
    pub netnames: BTreeMap<String, YosysNetName>,
    /// Instantiated cells keyed by instance name.
    #[serde(default)]
    pub cells: BTreeMap<String, YosysCell>,
}

/// A module port.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct YosysPort {
    /// Port direction.
    pub direction: PortDirection,
    /// Bits, LSB first.
    pub bits: Vec<BitRef>,
}

/// A declared net name.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct YosysNetName {
    /// Set for auto-generated names.
    #[serde(default)]
    pub hide_name: u8,
    /// Bits, LSB first.
    pub bits: Vec<BitRef>,
}

/// A cell instance.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct YosysCell {
    /// Cell (module) type.
    #[serde(rename = "type")]
    pub cell_type: String,
    /// Direction of each pin.
    #[serde(default)]
    pub port_directions: BTreeMap<String, PortDirection>,
    /// Bits bound to each pin.
    #[serde(default)]
    pub connections: BTreeMap<String, Vec<BitRef>>,
}

/// Port or pin direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    /// Input.
    Input,
    /// Output.
    Output,
    /// Bidirectional.
    Inout,
}

/// A signal bit: either a numbered net bit or a constant (`"0"`, `"1"`, `"x"`, `"z"`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum BitRef {
    /// Net bit number.
    Net(u64),
    /// Constant driver.
    Const(String),
}

impl YosysDesign {
    /// Parse a document from JSON text.
    pub fn from_json_str(text: &str) -> ChipVisResult<Self> {
        serde_json::from_str(text).map_err(|e| ChipVisError::serde(format!("yosys json: {e}")))
    }

    /// Read and parse a document from disk.
    pub fn from_path(path: &Path) -> ChipVisResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read netlist json '{}'", path.display()))?;
        Self::from_json_str(&text)
    }
}

impl YosysModule {
    /// Whether the module is marked as a black box (library cell model).
    pub fn is_blackbox(&self) -> bool {
        match self.attributes.get("blackbox") {
            Some(serde_json::Value::String(s)) => s.chars().any(|c| c == '1'),
            Some(serde_json::Value::Number(n)) => n.as_u64().is_some_and(|v| v != 0),
            Some(serde_json::Value::Bool(b)) => *b,
            _ => false,
        }
    }
}
