//! Placed layout input and its binding to sampled nets.

/// Binding of real cells to net columns.
pub mod bind;
/// Placed-layout document.
pub mod placed;

#[cfg(test)]
#[path = "../../tests/unit/layout/bind.rs"]
mod tests;
