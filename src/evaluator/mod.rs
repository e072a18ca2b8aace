pub mod basis_function_strategy;
pub mod rational_projector;
pub mod recursive_de_boor_strategy;
pub use basis_function_strategy::*;
pub use rational_projector::*;
pub use recursive_de_boor_strategy::*;

use std::fmt::Debug;

use nalgebra::DVector;

use crate::{knot::KnotVector, misc::FloatingPoint};

/// A strategy to evaluate a (possibly homogeneous) B-spline control net.
///
/// Implementations borrow the curve data for the duration of a call and keep
/// no state between calls. `u` must lie in the knot domain; the curve clamps
/// and validates it before delegating.
pub trait CurveEvaluationStrategy<T: FloatingPoint>: Debug + Send + Sync {
    /// Human readable name of the strategy
    fn name(&self) -> &'static str;

    /// Evaluate the point and derivatives up to `order` at `u`
    /// Returns `order + 1` vectors, index 0 being the point.
    /// Derivatives of an order above `degree` are zero vectors.
    fn derivatives(
        &self,
        degree: usize,
        knots: &KnotVector<T>,
        control_points: &[DVector<T>],
        u: T,
        order: usize,
    ) -> Vec<DVector<T>>;

    /// Evaluate the point at `u`
    fn point(
        &self,
        degree: usize,
        knots: &KnotVector<T>,
        control_points: &[DVector<T>],
        u: T,
    ) -> DVector<T> {
        self.derivatives(degree, knots, control_points, u, 0)
            .swap_remove(0)
    }
}

#[cfg(test)]
mod tests;
