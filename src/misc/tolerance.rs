use nalgebra::convert;

use super::FloatingPoint;

/// Tolerances used by the structural checks of the curve kernel.
///
/// `knot` governs knot equality (multiplicity counting, span lookup at the
/// domain end, snapping parameters that sit marginally outside the domain).
/// `weight` governs the unit weight test of the rational representation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerance<T> {
    pub knot: T,
    pub weight: T,
}

impl<T: FloatingPoint> Tolerance<T> {
    pub const DEFAULT: f64 = 1e-8;

    pub fn new(knot: T, weight: T) -> Self {
        Self { knot, weight }
    }

    pub fn with_knot(mut self, knot: T) -> Self {
        self.knot = knot;
        self
    }

    pub fn with_weight(mut self, weight: T) -> Self {
        self.weight = weight;
        self
    }

    /// Check if two knot values coincide
    pub fn knot_eq(&self, a: T, b: T) -> bool {
        (a - b).abs() <= self.knot
    }

    /// Check if a weight is a unit weight
    pub fn is_unit_weight(&self, w: T) -> bool {
        (w - T::one()).abs() <= self.weight
    }
}

impl<T: FloatingPoint> Default for Tolerance<T> {
    fn default() -> Self {
        let eps = convert(Self::DEFAULT);
        Self::new(eps, eps)
    }
}

#[cfg(test)]
mod tests {
    use super::Tolerance;

    #[test]
    fn default_tolerance() {
        let tol = Tolerance::<f64>::default();
        assert_eq!(tol.knot, 1e-8);
        assert!(tol.knot_eq(0.66, 0.66 + 1e-9));
        assert!(!tol.knot_eq(0.66, 0.6601));
        assert!(tol.is_unit_weight(1.0 - 1e-10));
        assert!(!tol.is_unit_weight(0.75));
    }
}
