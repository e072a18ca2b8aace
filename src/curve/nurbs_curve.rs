use std::sync::Arc;

use nalgebra::{DVector, Point};
use rayon::prelude::*;

use crate::error::{CurveError, Result};
use crate::evaluator::{BasisFunctionStrategy, CurveEvaluationStrategy, RationalProjector};
use crate::knot::KnotVector;
use crate::misc::{dehomogenize, homogenize, FloatingPoint, Invertible, Tolerance};

use super::{KnotInserter, SampleCache};

/// B-spline / NURBS curve representation
/// By generics, it can be used with f32 or f64 scalar types.
/// The dimension of the curve is the dimension of its control points.
///
/// A curve without weights (or with unit weights only) is a plain B-spline curve,
/// any non-unit weight makes it rational.
///
/// Control points are `DVector`s rather than fixed size points, so the dimension is
/// checked when the curve is built instead of being carried by the type.
#[derive(Clone, Debug)]
pub struct NurbsCurve<T: FloatingPoint> {
    degree: usize,
    /// knot vector for the curve
    /// the length of the knot vector is equal to the `# of control points + degree + 1`
    knots: KnotVector<T>,
    /// euclidean control points
    control_points: Vec<DVector<T>>,
    /// positive weight per control point
    weights: Option<Vec<T>>,
    /// control points in homogeneous coordinates `(w * p, w)`, derived from the weights
    homogeneous: Option<Vec<DVector<T>>>,
    strategy: Arc<dyn CurveEvaluationStrategy<T>>,
    tolerance: Tolerance<T>,
    samples: SampleCache<T>,
}

impl<T: FloatingPoint> NurbsCurve<T> {
    /// Create a new B-spline curve
    /// # Failures
    /// - if the degree is zero
    /// - if the control points are empty, fewer than `degree + 1` or of mixed dimensions
    /// - if the knots are not non-decreasing or their number is not `# of control points + degree + 1`
    ///
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// use nalgebra::dvector;
    ///
    /// let control_points = vec![
    ///     dvector![5., 5.],
    ///     dvector![10., 10.],
    ///     dvector![20., 15.],
    ///     dvector![35., 15.],
    ///     dvector![45., 10.],
    ///     dvector![50., 5.],
    /// ];
    /// let knots = vec![0., 0., 0., 0., 0.33, 0.66, 1., 1., 1., 1.];
    /// let curve = NurbsCurve::try_new(3, control_points, knots).unwrap();
    /// assert_eq!(curve.dimension(), 2);
    /// assert_eq!(curve.knots_domain(), (0., 1.));
    /// ```
    pub fn try_new(degree: usize, control_points: Vec<DVector<T>>, knots: Vec<T>) -> Result<Self> {
        Self::try_from_parts(degree, control_points, None, knots)
    }

    /// Create a new rational curve with a weight for each control point
    /// # Failures
    /// - same as [`NurbsCurve::try_new`]
    /// - if the number of weights differs from the number of control points, or any weight is not positive
    pub fn try_new_rational(
        degree: usize,
        control_points: Vec<DVector<T>>,
        weights: Vec<T>,
        knots: Vec<T>,
    ) -> Result<Self> {
        Self::try_from_parts(degree, control_points, Some(weights), knots)
    }

    /// Create a new B-spline curve from fixed size points
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// use nalgebra::Point3;
    ///
    /// let points = vec![
    ///     Point3::new(0., 0., 0.),
    ///     Point3::new(1., 1., 0.),
    ///     Point3::new(2., 0., 1.),
    /// ];
    /// let curve = NurbsCurve::try_from_points(2, &points, vec![0., 0., 0., 1., 1., 1.]).unwrap();
    /// assert_eq!(curve.dimension(), 3);
    /// ```
    pub fn try_from_points<const D: usize>(
        degree: usize,
        points: &[Point<T, D>],
        knots: Vec<T>,
    ) -> Result<Self> {
        let control_points = points
            .iter()
            .map(|p| DVector::from_column_slice(p.coords.as_slice()))
            .collect();
        Self::try_new(degree, control_points, knots)
    }

    pub(crate) fn try_from_parts(
        degree: usize,
        control_points: Vec<DVector<T>>,
        weights: Option<Vec<T>>,
        knots: Vec<T>,
    ) -> Result<Self> {
        let knots = KnotVector::try_new(knots)?;
        validate(degree, &control_points, weights.as_deref(), &knots)?;
        let homogeneous = homogeneous_net(&control_points, weights.as_deref());
        Ok(Self {
            degree,
            knots,
            control_points,
            weights,
            homogeneous,
            strategy: Arc::new(BasisFunctionStrategy),
            tolerance: Tolerance::default(),
            samples: SampleCache::new(),
        })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn knots(&self) -> &KnotVector<T> {
        &self.knots
    }

    pub fn control_points(&self) -> &[DVector<T>] {
        &self.control_points
    }

    pub fn weights(&self) -> Option<&[T]> {
        self.weights.as_deref()
    }

    /// Control points in homogeneous coordinates `(w * p, w)`
    /// A curve without weights is lifted with unit weights.
    pub fn homogeneous_control_points(&self) -> Vec<DVector<T>> {
        match &self.homogeneous {
            Some(h) => h.clone(),
            None => self
                .control_points
                .iter()
                .map(|p| homogenize(p, T::one()))
                .collect(),
        }
    }

    /// The dimension of the control points
    pub fn dimension(&self) -> usize {
        self.control_points[0].len()
    }

    /// Get the parameter domain `[knots[degree], knots[len - degree - 1]]`
    pub fn knots_domain(&self) -> (T, T) {
        self.knots.domain(self.degree)
    }

    pub fn tolerance(&self) -> &Tolerance<T> {
        &self.tolerance
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance<T>) -> Self {
        self.tolerance = tolerance;
        self.invalidate();
        self
    }

    /// Check if any weight differs from one
    pub fn is_rational(&self) -> bool {
        self.weights
            .as_ref()
            .is_some_and(|w| w.iter().any(|w| !self.tolerance.is_unit_weight(*w)))
    }

    /// Check if the curve is clamped
    pub fn is_clamped(&self) -> bool {
        self.knots.is_clamped(self.degree, self.tolerance.knot)
    }

    /// Count how many times `u` occurs in the knot vector
    pub fn multiplicity(&self, u: T) -> usize {
        self.knots.multiplicity(u, self.tolerance.knot)
    }

    pub fn strategy(&self) -> &dyn CurveEvaluationStrategy<T> {
        self.strategy.as_ref()
    }

    /// Swap the evaluation strategy
    /// Strategies agree within the comparison tolerance, cached samples are discarded.
    pub fn set_evaluation_strategy<S: CurveEvaluationStrategy<T> + 'static>(&mut self, strategy: S) {
        log::debug!(
            "evaluation strategy changed from {} to {}",
            self.strategy.name(),
            strategy.name()
        );
        self.strategy = Arc::new(strategy);
        self.invalidate();
    }

    pub fn with_evaluation_strategy<S: CurveEvaluationStrategy<T> + 'static>(
        mut self,
        strategy: S,
    ) -> Self {
        self.set_evaluation_strategy(strategy);
        self
    }

    pub(crate) fn shared_strategy(&self) -> Arc<dyn CurveEvaluationStrategy<T>> {
        Arc::clone(&self.strategy)
    }

    pub(crate) fn set_shared_strategy(&mut self, strategy: Arc<dyn CurveEvaluationStrategy<T>>) {
        self.strategy = strategy;
        self.invalidate();
    }

    /// Replace the control points, keeping the knot vector and weights
    /// # Failures
    /// - if the new control points break the invariants checked by [`NurbsCurve::try_new`]
    pub fn try_set_control_points(&mut self, control_points: Vec<DVector<T>>) -> Result<()> {
        validate(
            self.degree,
            &control_points,
            self.weights.as_deref(),
            &self.knots,
        )?;
        self.control_points = control_points;
        self.refresh();
        Ok(())
    }

    /// Replace the knot vector, keeping the control points and weights
    pub fn try_set_knots(&mut self, knots: Vec<T>) -> Result<()> {
        let knots = KnotVector::try_new(knots)?;
        validate(
            self.degree,
            &self.control_points,
            self.weights.as_deref(),
            &knots,
        )?;
        self.knots = knots;
        self.refresh();
        Ok(())
    }

    /// Replace the weights, keeping the knot vector and control points
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// use nalgebra::dvector;
    /// let mut curve = NurbsCurve::try_new(
    ///     1,
    ///     vec![dvector![0., 0.], dvector![1., 0.]],
    ///     vec![0., 0., 1., 1.],
    /// ).unwrap();
    /// assert!(!curve.is_rational());
    /// curve.try_set_weights(vec![1., 2.]).unwrap();
    /// assert!(curve.is_rational());
    /// assert!(curve.try_set_weights(vec![1., 0.]).is_err());
    /// ```
    pub fn try_set_weights(&mut self, weights: Vec<T>) -> Result<()> {
        validate(
            self.degree,
            &self.control_points,
            Some(&weights),
            &self.knots,
        )?;
        self.weights = Some(weights);
        self.refresh();
        Ok(())
    }

    /// Replace the whole definition at once
    pub(crate) fn replace_definition(
        &mut self,
        knots: KnotVector<T>,
        control_points: Vec<DVector<T>>,
        weights: Option<Vec<T>>,
    ) {
        self.knots = knots;
        self.control_points = control_points;
        self.weights = weights;
        self.refresh();
    }

    /// Validate a parameter against the domain
    /// Parameters within the knot tolerance outside of the domain are snapped onto it.
    fn check_parameter(&self, u: T) -> Result<T> {
        let (start, end) = self.knots_domain();
        let eps = self.tolerance.knot;
        if !u.is_finite() || u < start - eps || u > end + eps {
            return Err(CurveError::ParameterOutOfDomain {
                parameter: u.as_f64(),
                start: start.as_f64(),
                end: end.as_f64(),
            });
        }
        Ok(self.knots.clamp(self.degree, u))
    }

    /// Evaluate the curve at a given parameter to get a point
    /// # Failures
    /// - if `u` is outside of the domain
    ///
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// use nalgebra::{dvector, Point2};
    /// use approx::assert_relative_eq;
    ///
    /// let points = vec![Point2::new(0., 0.), Point2::new(1., 2.), Point2::new(2., 0.)];
    /// let curve = NurbsCurve::try_from_points(2, &points, vec![0., 0., 0., 1., 1., 1.]).unwrap();
    /// assert_relative_eq!(curve.evaluate(0.5).unwrap(), dvector![1., 1.]);
    /// assert!(curve.evaluate(1.5).is_err());
    /// ```
    pub fn evaluate(&self, u: T) -> Result<DVector<T>> {
        let u = self.check_parameter(u)?;
        match self.rational_net() {
            Some(homogeneous) => {
                let h = self
                    .strategy
                    .point(self.degree, &self.knots, homogeneous, u);
                let w = h[h.len() - 1];
                match dehomogenize(&h) {
                    Some((p, w)) if w > T::zero() => Ok(p),
                    _ => Err(CurveError::DegenerateWeight(w.as_f64())),
                }
            }
            None => Ok(self
                .strategy
                .point(self.degree, &self.knots, &self.control_points, u)),
        }
    }

    /// Evaluate the curve at each parameter
    /// Fails on the first invalid parameter without returning partial results.
    pub fn evaluate_list(&self, parameters: &[T]) -> Result<Vec<DVector<T>>> {
        parameters.iter().map(|u| self.evaluate(*u)).collect()
    }

    /// Evaluate the curve at each parameter in parallel
    /// Same semantics as [`NurbsCurve::evaluate_list`].
    pub fn par_evaluate_list(&self, parameters: &[T]) -> Result<Vec<DVector<T>>> {
        parameters.par_iter().map(|u| self.evaluate(*u)).collect()
    }

    /// Evaluate the point and derivatives up to `order` at a given parameter
    /// Returns `order + 1` vectors: index 0 is the point, index k the kth derivative.
    ///
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// use nalgebra::{dvector, Point2};
    /// use approx::assert_relative_eq;
    ///
    /// let points = vec![Point2::new(0., 0.), Point2::new(1., 2.), Point2::new(2., 0.)];
    /// let curve = NurbsCurve::try_from_points(2, &points, vec![0., 0., 0., 1., 1., 1.]).unwrap();
    /// let ders = curve.derivatives(0.5, 3).unwrap();
    /// assert_eq!(ders.len(), 4);
    /// assert_relative_eq!(ders[1], dvector![2., 0.]);
    /// assert_relative_eq!(ders[2], dvector![0., -8.]);
    /// assert_eq!(ders[3], dvector![0., 0.]);
    /// ```
    pub fn derivatives(&self, u: T, order: usize) -> Result<Vec<DVector<T>>> {
        let u = self.check_parameter(u)?;
        match self.rational_net() {
            Some(homogeneous) => {
                let ders = self
                    .strategy
                    .derivatives(self.degree, &self.knots, homogeneous, u, order);
                RationalProjector::with_order(order).project(&ders)
            }
            None => Ok(self.strategy.derivatives(
                self.degree,
                &self.knots,
                &self.control_points,
                u,
                order,
            )),
        }
    }

    /// Evaluate the unit tangent vector at a given parameter
    /// A vanishing first derivative is returned as is.
    pub fn tangent_at(&self, u: T) -> Result<DVector<T>> {
        let mut ders = self.derivatives(u, 1)?;
        let d = ders.swap_remove(1);
        let norm = d.norm();
        if norm > T::default_epsilon() {
            Ok(d / norm)
        } else {
            Ok(d)
        }
    }

    /// Sample the whole domain at a regular `step` in (0, 1] of its length
    /// Samples are cached per step until the curve is mutated.
    /// A step yielding more than [`SampleCache::MAX_SAMPLES`] points is rejected.
    ///
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// use nalgebra::Point2;
    ///
    /// let points = vec![Point2::new(0., 0.), Point2::new(1., 2.), Point2::new(2., 0.)];
    /// let mut curve = NurbsCurve::try_from_points(2, &points, vec![0., 0., 0., 1., 1., 1.]).unwrap();
    /// let samples = curve.sample(0.25).unwrap();
    /// assert_eq!(samples.len(), 5);
    /// ```
    pub fn sample(&mut self, step: T) -> Result<&[DVector<T>]> {
        if !(step > T::zero() && step <= T::one()) {
            return Err(CurveError::InvalidSamplingStep(step.as_f64()));
        }
        let index = match self.samples.position(step) {
            Some(index) => {
                log::trace!("sample cache hit for step {}", step);
                index
            }
            None => {
                log::trace!("sample cache miss for step {}", step);
                let count = (T::one() / step + self.tolerance.knot)
                    .floor()
                    .to_usize()
                    .filter(|n| *n < SampleCache::<T>::MAX_SAMPLES)
                    .ok_or(CurveError::InvalidSamplingStep(step.as_f64()))?
                    + 1;
                let (start, end) = self.knots_domain();
                let parameters = linspace(start, end, count);
                let points = self.par_evaluate_list(&parameters)?;
                self.samples.push(step, points)
            }
        };
        Ok(self.samples.points(index))
    }

    /// Sample the curve at a given number of points between the start and end parameters
    pub fn sample_regular_range(&self, start: T, end: T, samples: usize) -> Result<Vec<DVector<T>>> {
        self.evaluate_list(&linspace(start, end, samples))
    }

    /// Number of cached sample sequences
    pub fn cached_samples(&self) -> usize {
        self.samples.len()
    }

    /// Try to insert a knot `times` times, refining the representation without changing the curve
    /// # Failures
    /// - if `u` is not inside the domain
    /// - if the multiplicity of `u` would exceed the degree
    ///
    /// On failure the curve is left untouched.
    ///
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// use nalgebra::Point2;
    ///
    /// let points = vec![
    ///     Point2::new(5., 5.),
    ///     Point2::new(10., 10.),
    ///     Point2::new(20., 15.),
    ///     Point2::new(35., 15.),
    ///     Point2::new(45., 10.),
    ///     Point2::new(50., 5.),
    /// ];
    /// let knots = vec![0., 0., 0., 0., 0.33, 0.66, 1., 1., 1., 1.];
    /// let mut curve = NurbsCurve::try_from_points(3, &points, knots).unwrap();
    /// curve.try_insert_knot(0.66, 2).unwrap();
    /// assert_eq!(curve.multiplicity(0.66), 3);
    /// assert_eq!(curve.knots()[5], 0.66);
    /// assert!(curve.try_insert_knot(0.66, 1).is_err());
    /// ```
    pub fn try_insert_knot(&mut self, u: T, times: usize) -> Result<()> {
        let inserter = KnotInserter::new(self.tolerance);
        let (knots, control_points, weights) = match &self.homogeneous {
            Some(homogeneous) => {
                let (knots, refined) =
                    inserter.insert(self.degree, &self.knots, homogeneous, u, times)?;
                let (control_points, weights) = split_homogeneous(&refined)?;
                (knots, control_points, Some(weights))
            }
            None => {
                let (knots, control_points) =
                    inserter.insert(self.degree, &self.knots, &self.control_points, u, times)?;
                (knots, control_points, None)
            }
        };
        log::debug!(
            "inserted knot {} {} time(s), {} control points",
            u,
            times,
            control_points.len()
        );
        self.replace_definition(knots, control_points, weights);
        Ok(())
    }

    /// The homogeneous control net when the curve has non-unit weights
    fn rational_net(&self) -> Option<&[DVector<T>]> {
        if self.is_rational() {
            self.homogeneous.as_deref()
        } else {
            None
        }
    }

    /// Rebuild derived data after a mutation of the definition
    fn refresh(&mut self) {
        self.homogeneous = homogeneous_net(&self.control_points, self.weights.as_deref());
        self.invalidate();
    }

    fn invalidate(&mut self) {
        if !self.samples.is_empty() {
            log::debug!("invalidating {} cached sample sequence(s)", self.samples.len());
        }
        self.samples.clear();
    }
}

impl<T: FloatingPoint> Invertible for NurbsCurve<T> {
    /// Reverse the direction of the curve
    /// The reversed curve passes through the same points, `u` maps onto `start + end - u`.
    fn invert(&mut self) {
        let mut knots = self.knots.clone();
        knots.invert();
        let mut control_points = self.control_points.clone();
        control_points.reverse();
        let weights = self.weights.clone().map(|mut w| {
            w.reverse();
            w
        });
        self.replace_definition(knots, control_points, weights);
    }
}

fn validate<T: FloatingPoint>(
    degree: usize,
    control_points: &[DVector<T>],
    weights: Option<&[T]>,
    knots: &KnotVector<T>,
) -> Result<()> {
    if degree < 1 {
        return Err(CurveError::InvalidDegree(degree));
    }

    let Some(first) = control_points.first() else {
        return Err(CurveError::InvalidControlPoints(
            "no control points".to_string(),
        ));
    };
    if control_points.len() <= degree {
        return Err(CurveError::InvalidControlPoints(format!(
            "too few control points for degree {}, got {}, expected at least {}",
            degree,
            control_points.len(),
            degree + 1
        )));
    }
    let dim = first.len();
    if dim == 0 {
        return Err(CurveError::InvalidControlPoints(
            "control points have no coordinates".to_string(),
        ));
    }
    if let Some(i) = control_points.iter().position(|p| p.len() != dim) {
        return Err(CurveError::InvalidControlPoints(format!(
            "control point {} has dimension {}, expected {}",
            i,
            control_points[i].len(),
            dim
        )));
    }
    if let Some(i) = control_points
        .iter()
        .position(|p| p.iter().any(|v| !v.is_finite()))
    {
        return Err(CurveError::InvalidControlPoints(format!(
            "control point {} is not finite",
            i
        )));
    }

    knots.validate(degree, control_points.len())?;

    if let Some(weights) = weights {
        if weights.len() != control_points.len() {
            return Err(CurveError::WeightLengthMismatch(format!(
                "got {} weights for {} control points",
                weights.len(),
                control_points.len()
            )));
        }
        if let Some(i) = weights
            .iter()
            .position(|w| !w.is_finite() || *w <= T::zero())
        {
            return Err(CurveError::WeightLengthMismatch(format!(
                "weight {} at index {} is not positive",
                weights[i], i
            )));
        }
    }

    Ok(())
}

fn homogeneous_net<T: FloatingPoint>(
    control_points: &[DVector<T>],
    weights: Option<&[T]>,
) -> Option<Vec<DVector<T>>> {
    weights.map(|weights| {
        control_points
            .iter()
            .zip(weights.iter())
            .map(|(p, w)| homogenize(p, *w))
            .collect()
    })
}

/// Split refined homogeneous points back into euclidean points and weights
fn split_homogeneous<T: FloatingPoint>(
    homogeneous: &[DVector<T>],
) -> Result<(Vec<DVector<T>>, Vec<T>)> {
    homogeneous
        .iter()
        .map(|h| match dehomogenize(h) {
            Some((p, w)) if w > T::zero() => Ok((p, w)),
            _ => Err(CurveError::DegenerateWeight(h[h.len() - 1].as_f64())),
        })
        .collect::<Result<Vec<_>>>()
        .map(|pairs| pairs.into_iter().unzip())
}

/// `count` evenly spaced parameters from `start` to `end`, both included
fn linspace<T: FloatingPoint>(start: T, end: T, count: usize) -> Vec<T> {
    match count {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / nalgebra::convert::<f64, T>((count - 1) as f64);
            (0..count)
                .map(|i| {
                    if i + 1 == count {
                        end
                    } else {
                        start + step * nalgebra::convert::<f64, T>(i as f64)
                    }
                })
                .collect()
        }
    }
}
