//! Physical quantities and step-stamped samples.

use crate::id::StepId;

/// A scalar physical quantity produced by the solver.
///
/// The unit is carried by the leaf that stores the quantity, not by the
/// quantity itself: every sample of one variable shares the same unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quantity {
    /// Numeric value in the variable's unit.
    pub value: f64,
}

impl Quantity {
    /// Wrap a raw value.
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl From<f64> for Quantity {
    fn from(value: f64) -> Self {
        Self { value }
    }
}

/// One entry of a leaf's time series: the quantity observed at a step.
///
/// Leaves keep at most one sample per step; recording the same step twice
/// replaces the earlier value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// Step at which the quantity was observed.
    pub step: StepId,
    /// The observed quantity.
    pub quantity: Quantity,
}

impl Sample {
    /// Build a sample from a step and a raw value.
    pub fn new(step: StepId, value: f64) -> Self {
        Self {
            step,
            quantity: Quantity::new(value),
        }
    }

    /// Shorthand for `self.quantity.value`.
    pub fn value(&self) -> f64 {
        self.quantity.value
    }
}
