use std::ops::Index;

use itertools::Itertools;
use nalgebra::convert;
use simba::scalar::SupersetOf;

use crate::error::{CurveError, Result};
use crate::misc::{FloatingPoint, Invertible};

use super::KnotMultiplicity;

/// Knot vector representation
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KnotVector<T>(Vec<T>);

impl<T: FloatingPoint> KnotVector<T> {
    /// Create a knot vector without any validation
    pub fn new(knots: Vec<T>) -> Self {
        Self(knots)
    }

    /// Create a knot vector, checking that every knot is finite and the sequence is non-decreasing
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// assert!(KnotVector::try_new(vec![0., 0., 1., 1.]).is_ok());
    /// assert!(KnotVector::try_new(vec![0., 1., 0.5, 1.]).is_err());
    /// ```
    pub fn try_new(knots: Vec<T>) -> Result<Self> {
        if let Some(i) = knots.iter().position(|k| !k.is_finite()) {
            return Err(CurveError::InvalidKnotVector(format!(
                "knot at index {} is not finite",
                i
            )));
        }
        if let Some((i, (a, b))) = knots
            .iter()
            .tuple_windows()
            .enumerate()
            .find(|(_, (a, b))| b < a)
        {
            return Err(CurveError::InvalidKnotVector(format!(
                "knots must be non-decreasing, got {} at index {} after {}",
                b,
                i + 1,
                a
            )));
        }
        Ok(Self(knots))
    }

    /// Create a clamped knot vector with uniformly spaced interior knots on [0, 1]
    /// for `count` control points of the given degree
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// let knots: KnotVector<f64> = KnotVector::uniform_clamped(5, 2);
    /// assert_eq!(knots.to_vec(), vec![0., 0., 0., 1. / 3., 2. / 3., 1., 1., 1.]);
    /// ```
    pub fn uniform_clamped(count: usize, degree: usize) -> Self {
        let segments = count.saturating_sub(degree).max(1);
        let inv = T::one() / convert::<f64, T>(segments as f64);
        let mut knots = vec![T::zero(); degree + 1];
        knots.extend((1..segments).map(|i| inv * convert::<f64, T>(i as f64)));
        knots.extend(std::iter::repeat_n(T::one(), degree + 1));
        Self(knots)
    }

    /// Check the structural invariants of a knot vector for a curve
    /// with `degree` and `control_points` control points
    pub fn validate(&self, degree: usize, control_points: usize) -> Result<()> {
        let expected = control_points + degree + 1;
        if self.len() != expected {
            return Err(CurveError::InvalidKnotVector(format!(
                "invalid number of knots, got {}, expected {}",
                self.len(),
                expected
            )));
        }
        let (start, end) = self.domain(degree);
        if end <= start {
            return Err(CurveError::InvalidKnotVector(format!(
                "empty parameter domain [{}, {}]",
                start, end
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.0.clone()
    }

    /// # Panics
    /// - if the knot vector is empty
    pub fn first(&self) -> T {
        self.0[0]
    }

    /// # Panics
    /// - if the knot vector is empty
    pub fn last(&self) -> T {
        self.0[self.0.len() - 1]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    /// Get the domain of the knot vector by degree
    /// # Panics
    /// - if the knot vector has fewer than `2 * degree + 1` knots
    pub fn domain(&self, degree: usize) -> (T, T) {
        (self.0[degree], self.0[self.0.len() - 1 - degree])
    }

    /// Clamp `u` onto the domain of the knot vector
    pub fn clamp(&self, degree: usize, u: T) -> T {
        let (min, max) = self.domain(degree);
        u.clamp(min, max)
    }

    /// Count how many times `u` occurs in the knot vector within `tolerance`
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// let knots = KnotVector::new(vec![0., 0., 0., 0., 0.33, 0.66, 1., 1., 1., 1.]);
    /// assert_eq!(knots.multiplicity(0.66, 1e-8), 1);
    /// assert_eq!(knots.multiplicity(1., 1e-8), 4);
    /// assert_eq!(knots.multiplicity(0.5, 1e-8), 0);
    /// ```
    pub fn multiplicity(&self, u: T, tolerance: T) -> usize {
        self.iter().filter(|k| (**k - u).abs() <= tolerance).count()
    }

    /// Get the multiplicity of each distinct knot
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// let knots = KnotVector::new(vec![0., 0., 0., 1., 2., 3., 3., 3.]);
    /// let mult = knots.multiplicities(1e-8);
    /// assert_eq!(mult.len(), 4);
    /// assert_eq!(mult[0].multiplicity(), 3);
    /// assert_eq!(mult[1].multiplicity(), 1);
    /// assert_eq!(mult[3].multiplicity(), 3);
    /// ```
    pub fn multiplicities(&self, tolerance: T) -> Vec<KnotMultiplicity<T>> {
        let mut mult: Vec<KnotMultiplicity<T>> = vec![];
        for knot in self.iter() {
            match mult.last_mut() {
                Some(current) if (*knot - current.knot()).abs() <= tolerance => {
                    current.increment();
                }
                _ => mult.push(KnotMultiplicity::new(*knot, 1)),
            }
        }
        mult
    }

    /// Check if the knot vector is clamped
    /// `clamped` means the first and last knots have a multiplicity greater than the degree
    /// e.g. [0, 0, 0, 1, 2, 3, 3, 3] with degree 2 is clamped
    pub fn is_clamped(&self, degree: usize, tolerance: T) -> bool {
        let mult = self.multiplicities(tolerance);
        match (mult.first(), mult.last()) {
            (Some(start), Some(end)) => {
                start.multiplicity() > degree && end.multiplicity() > degree
            }
            _ => false,
        }
    }

    /// Find the knot span index `i` such that `knots[i] <= u < knots[i + 1]`
    /// The end of the domain maps to the last non-empty span.
    ///
    /// # Panics
    /// - if the knot vector has fewer than `degree + 2` knots; [`KnotVector::validate`]
    ///   rules this out for the knots of a curve
    ///
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// let knots = KnotVector::new(vec![0., 0., 0., 1., 2., 3., 3., 3.]);
    /// assert_eq!(knots.find_span(2, 2.5), 4);
    /// assert_eq!(knots.find_span(2, 0.), 2);
    /// assert_eq!(knots.find_span(2, 3.), 4);
    /// ```
    pub fn find_span(&self, degree: usize, u: T) -> usize {
        let n = self.len() - degree - 2;

        if u >= self[n + 1] {
            let mut span = n;
            while span > degree && self[span] >= self[span + 1] {
                span -= 1;
            }
            return span;
        }

        if u < self[degree] {
            return degree;
        }

        // binary search, keeping knots[low] <= u < knots[high]
        let mut low = degree;
        let mut high = n + 1;
        let mut mid = (low + high) / 2;
        while u < self[mid] || u >= self[mid + 1] {
            if u < self[mid] {
                high = mid;
            } else {
                low = mid;
            }
            mid = (low + high) / 2;
        }
        mid
    }

    /// Rescale the knot vector to the [0, 1] interval
    /// Empty or zero length knot vectors are returned unchanged.
    pub fn normalized(&self) -> Self {
        let (Some(first), Some(last)) = (self.0.first().copied(), self.0.last().copied()) else {
            return self.clone();
        };
        let length = last - first;
        if length <= T::zero() {
            return self.clone();
        }
        self.iter().map(|k| (*k - first) / length).collect()
    }

    /// Cast the knot vector to another floating point type
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// let knots: KnotVector<f64> = KnotVector::new(vec![0., 0., 0.5, 1., 1.]);
    /// let knots2 = knots.cast::<f32>();
    /// assert_eq!(knots2.as_slice()[2], 0.5f32);
    /// ```
    pub fn cast<F: FloatingPoint + SupersetOf<T>>(&self) -> KnotVector<F> {
        KnotVector::new(self.0.iter().map(|v| convert(*v)).collect())
    }
}

impl<T> Index<usize> for KnotVector<T> {
    type Output = T;
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<T> FromIterator<T> for KnotVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T: FloatingPoint> Invertible for KnotVector<T> {
    /// Reverses the knot vector, keeping its first knot in place
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// let mut knot = KnotVector::new(vec![0., 0., 0., 1., 2., 2.5, 3.5, 4.0, 4.0]);
    /// knot.invert();
    ///
    /// let dst = vec![0.0, 0.0, 0.5, 1.5, 2.0, 3.0, 4.0, 4.0, 4.0];
    /// knot.iter().enumerate().for_each(|(i, v)| {
    ///     assert_eq!(*v, dst[i]);
    /// });
    /// ```
    fn invert(&mut self) {
        if self.is_empty() {
            return;
        }
        let mut next = Vec::with_capacity(self.len());
        next.push(self.first());
        let len = self.len();
        for i in 1..len {
            next.push(next[i - 1] + (self[len - i] - self[len - i - 1]));
        }
        self.0 = next;
    }
}
