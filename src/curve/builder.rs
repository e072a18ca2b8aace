use std::sync::Arc;

use nalgebra::{DVector, Point};

use crate::error::{CurveError, Result};
use crate::evaluator::CurveEvaluationStrategy;
use crate::misc::{FloatingPoint, Tolerance};

use super::NurbsCurve;

/// Incremental construction of a [`NurbsCurve`]
/// Starts out empty and only becomes a curve once the degree, the knots and
/// the control points are set and consistent with each other.
///
/// # Example
/// ```
/// use spliner::prelude::*;
/// use nalgebra::Point2;
///
/// let curve = NurbsCurveBuilder::new()
///     .with_degree(2)
///     .with_points(&[Point2::new(0., 0.), Point2::new(1., 1.), Point2::new(2., 0.)])
///     .with_knots(vec![0., 0., 0., 1., 1., 1.])
///     .with_weights(vec![1., 2., 1.])
///     .with_strategy(RecursiveDeBoorStrategy)
///     .build()
///     .unwrap();
/// assert!(curve.is_rational());
/// assert_eq!(curve.strategy().name(), "recursive-de-boor");
/// ```
#[derive(Clone, Debug)]
pub struct NurbsCurveBuilder<T: FloatingPoint> {
    degree: Option<usize>,
    knots: Option<Vec<T>>,
    control_points: Vec<DVector<T>>,
    weights: Option<Vec<T>>,
    strategy: Option<Arc<dyn CurveEvaluationStrategy<T>>>,
    tolerance: Option<Tolerance<T>>,
}

impl<T: FloatingPoint> Default for NurbsCurveBuilder<T> {
    fn default() -> Self {
        Self {
            degree: None,
            knots: None,
            control_points: vec![],
            weights: None,
            strategy: None,
            tolerance: None,
        }
    }
}

impl<T: FloatingPoint> NurbsCurveBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_degree(mut self, degree: usize) -> Self {
        self.degree = Some(degree);
        self
    }

    pub fn with_knots(mut self, knots: Vec<T>) -> Self {
        self.knots = Some(knots);
        self
    }

    pub fn with_control_points(mut self, control_points: Vec<DVector<T>>) -> Self {
        self.control_points = control_points;
        self
    }

    pub fn with_points<const D: usize>(mut self, points: &[Point<T, D>]) -> Self {
        self.control_points = points
            .iter()
            .map(|p| DVector::from_column_slice(p.coords.as_slice()))
            .collect();
        self
    }

    pub fn with_weights(mut self, weights: Vec<T>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn with_strategy<S: CurveEvaluationStrategy<T> + 'static>(mut self, strategy: S) -> Self {
        self.strategy = Some(Arc::new(strategy));
        self
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance<T>) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Validate the collected fields and build the curve
    /// Fails if the degree, the knots or the control points are missing or inconsistent.
    pub fn build(self) -> Result<NurbsCurve<T>> {
        let degree = self.degree.ok_or(CurveError::InvalidDegree(0))?;
        let knots = self.knots.ok_or_else(|| {
            CurveError::InvalidKnotVector("knot vector is not set".to_string())
        })?;
        let mut curve = NurbsCurve::try_from_parts(degree, self.control_points, self.weights, knots)?;
        if let Some(tolerance) = self.tolerance {
            curve = curve.with_tolerance(tolerance);
        }
        if let Some(strategy) = self.strategy {
            curve.set_shared_strategy(strategy);
        }
        Ok(curve)
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::dvector;

    use super::NurbsCurveBuilder;
    use crate::error::CurveError;
    use crate::misc::Tolerance;

    #[test]
    fn empty_builder_is_not_a_curve() {
        let builder = NurbsCurveBuilder::<f64>::new();
        assert_eq!(builder.build().unwrap_err(), CurveError::InvalidDegree(0));
    }

    #[test]
    fn missing_fields() {
        let missing_knots = NurbsCurveBuilder::<f64>::new()
            .with_degree(1)
            .with_control_points(vec![dvector![0.], dvector![1.]]);
        assert!(matches!(
            missing_knots.build(),
            Err(CurveError::InvalidKnotVector(_))
        ));

        let missing_points = NurbsCurveBuilder::<f64>::new()
            .with_degree(1)
            .with_knots(vec![0., 0., 1., 1.]);
        assert!(matches!(
            missing_points.build(),
            Err(CurveError::InvalidControlPoints(_))
        ));
    }

    #[test]
    fn carries_tolerance() {
        let curve = NurbsCurveBuilder::<f64>::new()
            .with_degree(1)
            .with_control_points(vec![dvector![0.], dvector![1.]])
            .with_knots(vec![0., 0., 1., 1.])
            .with_tolerance(Tolerance::default().with_knot(1e-3))
            .build()
            .unwrap();
        assert_eq!(curve.tolerance().knot, 1e-3);
        // within the knot tolerance outside of the domain
        assert!(curve.evaluate(1.0005).is_ok());
        assert!(curve.evaluate(1.01).is_err());
    }
}
