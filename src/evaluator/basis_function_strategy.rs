use nalgebra::DVector;

use crate::{knot::KnotVector, misc::FloatingPoint};

use super::CurveEvaluationStrategy;

/// Evaluates a curve as the weighted sum of the non-vanishing basis functions
/// over the `degree + 1` control points active in the knot span.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BasisFunctionStrategy;

impl<T: FloatingPoint> CurveEvaluationStrategy<T> for BasisFunctionStrategy {
    fn name(&self) -> &'static str {
        "basis-function"
    }

    fn derivatives(
        &self,
        degree: usize,
        knots: &KnotVector<T>,
        control_points: &[DVector<T>],
        u: T,
        order: usize,
    ) -> Vec<DVector<T>> {
        let dim = control_points[0].len();
        let mut derivatives = vec![DVector::<T>::zeros(dim); order + 1];

        let knot_span_index = knots.find_span(degree, u);
        let nders = knots.derivative_basis_functions(knot_span_index, u, degree, order);
        let offset = knot_span_index - degree;
        for k in 0..=order.min(degree) {
            for j in 0..=degree {
                derivatives[k] += &control_points[offset + j] * nders[k][j];
            }
        }

        derivatives
    }

    fn point(
        &self,
        degree: usize,
        knots: &KnotVector<T>,
        control_points: &[DVector<T>],
        u: T,
    ) -> DVector<T> {
        let knot_span_index = knots.find_span(degree, u);
        let basis = knots.basis_functions(knot_span_index, u, degree);
        let offset = knot_span_index - degree;
        let mut position = DVector::<T>::zeros(control_points[0].len());
        for (i, b) in basis.into_iter().enumerate() {
            position += &control_points[offset + i] * b;
        }
        position
    }
}
