use std::sync::Arc;

use crate::foundation::ids::NetName;

/// Raw values of every net of interest at one clock cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    /// Decoded status label for the cycle.
    pub label: String,
    /// Collapsed value per net, aligned with [`SampleSequence::nets`].
    pub values: Vec<bool>,
}

/// Per-cycle samples, one per post-reset rising clock edge.
///
/// Values are columnar: every sample holds one value per entry of `nets`, in the same order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleSequence {
    /// Sampled nets, sorted.
    pub nets: Arc<[NetName]>,
    /// Samples in cycle order.
    pub cycles: Vec<Sample>,
}

impl SampleSequence {
    /// An empty sequence over `nets`.
    pub fn new(nets: impl Into<Arc<[NetName]>>) -> Self {
        Self {
            nets: nets.into(),
            cycles: Vec::new(),
        }
    }

    /// Number of cycles.
    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    /// Whether no cycle was sampled.
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    /// Column index of `net`.
    pub fn net_index(&self, net: &str) -> Option<usize> {
        self.nets.iter().position(|n| n.as_str() == net)
    }

    /// Value of `net` at `cycle`.
    pub fn value_of(&self, cycle: usize, net: &str) -> Option<bool> {
        let idx = self.net_index(net)?;
        self.cycles.get(cycle).map(|s| s.values[idx])
    }

    /// Drop every cycle before `first`.
    pub fn trim_front(&mut self, first: usize) {
        self.cycles.drain(..first.min(self.cycles.len()));
    }
}
