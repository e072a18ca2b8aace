use crate::error::{CurveError, Result};
use crate::misc::FloatingPoint;

use super::NurbsCurve;

impl<T: FloatingPoint> NurbsCurve<T> {
    /// Split the curve into two curves before and after the parameter
    /// The knot `u` is first inserted up to full multiplicity, so both pieces are clamped at `u`
    /// and share the point of the curve at `u`.
    ///
    /// # Failures
    /// - if `u` is not strictly inside the domain
    ///
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// use nalgebra::Point2;
    ///
    /// let points = vec![
    ///     Point2::new(0., 0.),
    ///     Point2::new(1., 2.),
    ///     Point2::new(3., 2.),
    ///     Point2::new(4., 0.),
    /// ];
    /// let curve = NurbsCurve::try_from_points(3, &points, vec![0., 0., 0., 0., 1., 1., 1., 1.]).unwrap();
    /// let (left, right) = curve.try_split(0.5).unwrap();
    /// assert_eq!(left.knots_domain().1, 0.5);
    /// assert_eq!(right.knots_domain().0, 0.5);
    /// ```
    pub fn try_split(&self, u: T) -> Result<(Self, Self)> {
        let (start, end) = self.knots_domain();
        let tolerance = *self.tolerance();
        let u = self
            .knots()
            .iter()
            .find(|k| tolerance.knot_eq(**k, u))
            .copied()
            .unwrap_or(u);
        if !u.is_finite() || u <= start || u >= end {
            return Err(CurveError::ParameterOutOfDomain {
                parameter: u.as_f64(),
                start: start.as_f64(),
                end: end.as_f64(),
            });
        }

        let p = self.degree();
        let s = self.multiplicity(u);
        let mut refined = self.clone();
        if s < p {
            refined.try_insert_knot(u, p - s)?;
        }

        let knots = refined.knots().as_slice();
        let k = refined.knots().find_span(p, u);

        let mut left_knots = knots[..=k].to_vec();
        left_knots.push(u);
        let mut right_knots = vec![u];
        right_knots.extend_from_slice(&knots[(k - p + 1)..]);

        let control_points = refined.control_points();
        let left_points = control_points[..=(k - p)].to_vec();
        let right_points = control_points[(k - p)..].to_vec();

        let (left_weights, right_weights) = match refined.weights() {
            Some(w) => (Some(w[..=(k - p)].to_vec()), Some(w[(k - p)..].to_vec())),
            None => (None, None),
        };

        log::debug!("splitting curve at {}", u);

        let mut left = Self::try_from_parts(p, left_points, left_weights, left_knots)?
            .with_tolerance(tolerance);
        let mut right = Self::try_from_parts(p, right_points, right_weights, right_knots)?
            .with_tolerance(tolerance);
        left.set_shared_strategy(refined.shared_strategy());
        right.set_shared_strategy(refined.shared_strategy());
        Ok((left, right))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    use crate::curve::NurbsCurve;
    use crate::error::CurveError;
    use crate::evaluator::RecursiveDeBoorStrategy;

    fn curve() -> NurbsCurve<f64> {
        let points = vec![
            Point2::new(5., 5.),
            Point2::new(10., 10.),
            Point2::new(20., 15.),
            Point2::new(35., 15.),
            Point2::new(45., 10.),
            Point2::new(50., 5.),
        ];
        NurbsCurve::try_from_points(3, &points, vec![0., 0., 0., 0., 0.33, 0.66, 1., 1., 1., 1.])
            .unwrap()
    }

    fn assert_pieces_match(curve: &NurbsCurve<f64>, u: f64) {
        let (left, right) = curve.try_split(u).unwrap();
        assert_eq!(left.knots_domain(), (0., u));
        assert_eq!(right.knots_domain(), (u, 1.));
        assert!(left.is_clamped());
        assert!(right.is_clamped());

        for i in 0..=20 {
            let t = u * i as f64 / 20.;
            assert_relative_eq!(
                left.evaluate(t).unwrap(),
                curve.evaluate(t).unwrap(),
                epsilon = 1e-9
            );
            let t = u + (1. - u) * i as f64 / 20.;
            assert_relative_eq!(
                right.evaluate(t).unwrap(),
                curve.evaluate(t).unwrap(),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn split_between_knots() {
        assert_pieces_match(&curve(), 0.5);
        assert_pieces_match(&curve(), 0.1);
    }

    #[test]
    fn split_at_existing_knot() {
        assert_pieces_match(&curve(), 0.33);
        let mut full = curve();
        full.try_insert_knot(0.66, 2).unwrap();
        assert_pieces_match(&full, 0.66);
    }

    #[test]
    fn split_rational() {
        let mut rational = curve().to_rational();
        rational
            .try_set_weights(vec![0.5, 1., 0.75, 1., 0.25, 1.])
            .unwrap();
        assert_pieces_match(&rational, 0.4);
        let (left, right) = rational.try_split(0.4).unwrap();
        assert!(left.is_rational());
        assert_eq!(right.weights().map(|w| w.len()), Some(right.control_points().len()));
    }

    #[test]
    fn keeps_strategy() {
        let curve = curve().with_evaluation_strategy(RecursiveDeBoorStrategy);
        let (left, right) = curve.try_split(0.5).unwrap();
        assert_eq!(left.strategy().name(), "recursive-de-boor");
        assert_eq!(right.strategy().name(), "recursive-de-boor");
    }

    #[test]
    fn split_at_boundaries() {
        let curve = curve();
        for u in [0., 1., -0.5, 2.] {
            assert!(matches!(
                curve.try_split(u),
                Err(CurveError::ParameterOutOfDomain { .. })
            ));
        }
    }
}
