use crate::error::{CurveError, Result};
use crate::misc::FloatingPoint;

use super::NurbsCurve;

impl<T: FloatingPoint> NurbsCurve<T> {
    /// Create a rational copy of the curve
    /// A curve without weights gets a unit weight on every control point, the shape is unchanged.
    /// A curve that already carries weights is copied as is.
    pub fn to_rational(&self) -> Self {
        let mut cloned = self.clone();
        if cloned.weights().is_none() {
            let weights = vec![T::one(); cloned.control_points().len()];
            let knots = cloned.knots().clone();
            let control_points = cloned.control_points().to_vec();
            cloned.replace_definition(knots, control_points, Some(weights));
        }
        cloned
    }

    /// Create a non-rational copy of the curve by dropping its weights
    /// # Failures
    /// - if any weight differs from one, as dropping it would change the curve
    ///
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// use nalgebra::dvector;
    /// let curve = NurbsCurve::try_new_rational(
    ///     1,
    ///     vec![dvector![0., 0.], dvector![1., 0.]],
    ///     vec![1., 2.],
    ///     vec![0., 0., 1., 1.],
    /// ).unwrap();
    /// assert!(curve.try_to_non_rational().is_err());
    /// ```
    pub fn try_to_non_rational(&self) -> Result<Self> {
        if let Some(weights) = self.weights() {
            if let Some((index, weight)) = weights
                .iter()
                .enumerate()
                .find(|(_, w)| !self.tolerance().is_unit_weight(**w))
            {
                return Err(CurveError::LossyConversion {
                    index,
                    weight: weight.as_f64(),
                });
            }
        }
        let mut cloned = self.clone();
        let knots = cloned.knots().clone();
        let control_points = cloned.control_points().to_vec();
        cloned.replace_definition(knots, control_points, None);
        Ok(cloned)
    }
}
