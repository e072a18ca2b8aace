use nalgebra::DVector;

use crate::error::{CurveError, Result};
use crate::knot::KnotVector;
use crate::misc::{FloatingPoint, Tolerance};

/// Knot insertion by Boehm's algorithm
///
/// Works on any control net: euclidean control points of a B-spline curve or
/// homogeneous `(w * p, w)` control points of a rational one, whose weights are
/// then recovered by dehomogenizing the refined net.
#[derive(Clone, Copy, Debug)]
pub struct KnotInserter<T> {
    tolerance: Tolerance<T>,
}

impl<T: FloatingPoint> KnotInserter<T> {
    pub fn new(tolerance: Tolerance<T>) -> Self {
        Self { tolerance }
    }

    /// Insert the knot `u` `times` times
    /// Returns the refined knot vector and control net, the inputs are left untouched.
    /// Inserting zero times returns copies of the inputs.
    ///
    /// # Failures
    /// - if `u` is not strictly inside the domain of the knot vector
    /// - if the multiplicity of `u` plus `times` exceeds `degree`
    pub fn insert(
        &self,
        degree: usize,
        knots: &KnotVector<T>,
        control_points: &[DVector<T>],
        u: T,
        times: usize,
    ) -> Result<(KnotVector<T>, Vec<DVector<T>>)> {
        let (start, end) = knots.domain(degree);
        let out_of_domain = || CurveError::ParameterOutOfDomain {
            parameter: u.as_f64(),
            start: start.as_f64(),
            end: end.as_f64(),
        };
        if !u.is_finite() || u < start - self.tolerance.knot || u > end + self.tolerance.knot {
            return Err(out_of_domain());
        }

        // snap onto an existing knot so that the multiplicity grows exactly
        let u = knots
            .iter()
            .find(|k| self.tolerance.knot_eq(**k, u))
            .copied()
            .unwrap_or(u);

        let s = knots.multiplicity(u, self.tolerance.knot);
        if s + times > degree {
            return Err(CurveError::KnotMultiplicityExceeded {
                knot: u.as_f64(),
                times,
                multiplicity: s,
                degree,
            });
        }
        if u <= start || u >= end {
            return Err(out_of_domain());
        }

        if times == 0 {
            return Ok((knots.clone(), control_points.to_vec()));
        }

        let p = degree;
        let r = times;
        let np = control_points.len() - 1;
        let k = knots.find_span(p, u);

        let mut knots_post = Vec::with_capacity(knots.len() + r);
        knots_post.extend_from_slice(&knots.as_slice()[..=k]);
        knots_post.extend(std::iter::repeat_n(u, r));
        knots_post.extend_from_slice(&knots.as_slice()[(k + 1)..]);

        let dim = control_points[0].len();
        let mut control_points_post = vec![DVector::<T>::zeros(dim); np + 1 + r];
        for i in 0..=(k - p) {
            control_points_post[i] = control_points[i].clone();
        }
        for i in (k - s)..=np {
            control_points_post[i + r] = control_points[i].clone();
        }

        // affected window
        let mut window: Vec<_> = (0..=(p - s))
            .map(|i| control_points[k - p + i].clone())
            .collect();

        for j in 1..=r {
            let l = k - p + j;
            for i in 0..=(p - j - s) {
                let alpha = (u - knots[l + i]) / (knots[i + k + 1] - knots[l + i]);
                window[i] = &window[i + 1] * alpha + &window[i] * (T::one() - alpha);
            }
            control_points_post[l] = window[0].clone();
            control_points_post[k + r - j - s] = window[p - j - s].clone();
        }

        let l = k - p + r;
        for i in (l + 1)..(k - s) {
            control_points_post[i] = window[i - l].clone();
        }

        Ok((KnotVector::new(knots_post), control_points_post))
    }
}
