use crate::activity::sample::SampleSequence;

/// Per-net state machine driven by "did the value change this cycle".
///
/// Implementations are pure: `step` and `render` must not depend on anything but their arguments,
/// so every net can be folded independently in cycle order.
pub trait NetTransition {
    /// Tracked per-net state.
    type State: Copy;

    /// State before the first cycle.
    fn initial(&self) -> Self::State;

    /// Next state given whether the net changed in this cycle.
    fn step(&self, state: Self::State, changed: bool) -> Self::State;

    /// Rendered value of a state, in `[0, 1]`.
    fn render(&self, state: Self::State) -> f32;
}

/// Fold `transition` over every net of `seq` and return the rendered values per cycle.
///
/// Cycle 0 compares against an all-zero previous sample, so a net that starts high counts as
/// changed at cycle 0.
pub fn fold_per_net<T: NetTransition>(transition: &T, seq: &SampleSequence) -> Vec<Vec<f32>> {
    let width = seq.nets.len();
    let mut state = vec![transition.initial(); width];
    let mut prev = vec![false; width];
    let mut out = Vec::with_capacity(seq.cycles.len());

    for sample in &seq.cycles {
        let mut row = Vec::with_capacity(width);
        for (i, &value) in sample.values.iter().enumerate() {
            state[i] = transition.step(state[i], value != prev[i]);
            row.push(transition.render(state[i]));
        }
        prev.copy_from_slice(&sample.values);
        out.push(row);
    }
    out
}
