use crate::config::VisConfig;

/// Partition of instances by role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellKind {
    /// Area filler; no logic.
    Filler,
    /// Clock buffers, antenna diodes, tap cells; no rendered logic.
    Physical,
    /// Logic-bearing cell with a rendered output net.
    Real,
}

/// Instance-name prefix rule shared by the netlist and the layout.
#[derive(Clone, Debug, Default)]
pub struct CellClassifier {
    filler_prefixes: Vec<String>,
    phy_prefixes: Vec<String>,
}

impl CellClassifier {
    /// Build from explicit prefix lists.
    pub fn new(filler_prefixes: Vec<String>, phy_prefixes: Vec<String>) -> Self {
        Self {
            filler_prefixes,
            phy_prefixes,
        }
    }

    /// Build from the run configuration.
    pub fn from_config(cfg: &VisConfig) -> Self {
        Self::new(cfg.filler_prefixes.clone(), cfg.phy_prefixes.clone())
    }

    /// Classify one instance name. Filler prefixes are checked first.
    pub fn classify(&self, instance: &str) -> CellKind {
        if starts_with_any(instance, &self.filler_prefixes) {
            CellKind::Filler
        } else if starts_with_any(instance, &self.phy_prefixes) {
            CellKind::Physical
        } else {
            CellKind::Real
        }
    }
}

fn starts_with_any(s: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|p| s.starts_with(p.as_str()))
}
