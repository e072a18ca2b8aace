use nalgebra::DVector;

use crate::{
    error::{CurveError, Result},
    misc::{Binomial, FloatingPoint},
};

/// Recovers the euclidean derivatives of a rational curve from the derivatives
/// of its homogeneous representation by the quotient rule
///
/// `C(k) = (A(k) - sum_{i=1..k} binom(k, i) * w(i) * C(k - i)) / w(0)`
///
/// where `A` is the weighted position part and `w` the weight part of the
/// homogeneous derivatives.
#[derive(Clone, Debug)]
pub struct RationalProjector<T> {
    binomial: Binomial<T>,
}

impl<T: FloatingPoint> RationalProjector<T> {
    pub fn new() -> Self {
        Self {
            binomial: Binomial::new(),
        }
    }

    /// Create a projector with binomial coefficients up to `order` precomputed
    pub fn with_order(order: usize) -> Self {
        Self {
            binomial: Binomial::with_order(order),
        }
    }

    /// Project homogeneous derivatives `(A(k), w(k))` onto euclidean derivatives
    /// The last coordinate of each input vector is the weight part.
    /// # Failures
    /// - if the input vectors have no weight coordinate
    /// - if the leading weight `w(0)` is zero or negative
    ///
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// use nalgebra::dvector;
    /// let mut projector = RationalProjector::new();
    /// let ders = projector.project(&[dvector![2., 4., 2.], dvector![0., 0., 0.]]).unwrap();
    /// assert_eq!(ders[0], dvector![1., 2.]);
    /// assert_eq!(ders[1], dvector![0., 0.]);
    /// ```
    pub fn project(&mut self, homogeneous: &[DVector<T>]) -> Result<Vec<DVector<T>>> {
        let Some(first) = homogeneous.first() else {
            return Ok(vec![]);
        };
        let dim = first.len().checked_sub(1).ok_or_else(|| {
            CurveError::InvalidControlPoints("homogeneous point without a weight".to_string())
        })?;

        let w_ders: Vec<T> = homogeneous.iter().map(|d| d[dim]).collect();
        let w0 = w_ders[0];
        if w0 <= T::zero() {
            return Err(CurveError::DegenerateWeight(w0.as_f64()));
        }

        let mut ck: Vec<DVector<T>> = Vec::with_capacity(homogeneous.len());
        for (k, d) in homogeneous.iter().enumerate() {
            let mut v = d.rows(0, dim).into_owned();
            for i in 1..=k {
                let coef = self.binomial.get(k, i) * w_ders[i];
                v -= &ck[k - i] * coef;
            }
            ck.push(v / w0);
        }
        Ok(ck)
    }
}

impl<T: FloatingPoint> Default for RationalProjector<T> {
    fn default() -> Self {
        Self::new()
    }
}
