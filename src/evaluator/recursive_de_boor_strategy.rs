use nalgebra::{convert, DVector};

use crate::{knot::KnotVector, misc::FloatingPoint};

use super::CurveEvaluationStrategy;

/// Evaluates a curve with de Boor's triangle of affine interpolations on a local
/// copy of the active control points, without forming any basis function value.
///
/// The kth derivative is the degree `p - k` B-spline whose control points are the
/// scaled kth finite differences of the active window, evaluated by the same triangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecursiveDeBoorStrategy;

impl<T: FloatingPoint> CurveEvaluationStrategy<T> for RecursiveDeBoorStrategy {
    fn name(&self) -> &'static str {
        "recursive-de-boor"
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

        let span = knots.find_span(degree, u);
        let mut window = control_points[(span - degree)..=span].to_vec();

        for k in 0..=order.min(degree) {
            if k > 0 {
                window = difference(knots, span, degree, k, &window);
            }
            derivatives[k] = de_boor(knots, span, degree - k, u, window.clone());
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
        let span = knots.find_span(degree, u);
        let window = control_points[(span - degree)..=span].to_vec();
        de_boor(knots, span, degree, u, window)
    }
}

/// Run de Boor's triangle of degree `q` over the `q + 1` points of `d` in `span`
fn de_boor<T: FloatingPoint>(
    knots: &KnotVector<T>,
    span: usize,
    q: usize,
    u: T,
    mut d: Vec<DVector<T>>,
) -> DVector<T> {
    for r in 1..=q {
        for j in (r..=q).rev() {
            let lo = knots[span + j - q];
            let hi = knots[span + j + 1 - r];
            let alpha = (u - lo) / (hi - lo);
            d[j] = &d[j - 1] * (T::one() - alpha) + &d[j] * alpha;
        }
    }
    d.swap_remove(q)
}

/// Control points of the kth derivative curve from those of the (k - 1)th
fn difference<T: FloatingPoint>(
    knots: &KnotVector<T>,
    span: usize,
    degree: usize,
    k: usize,
    prev: &[DVector<T>],
) -> Vec<DVector<T>> {
    let scale = convert::<f64, T>((degree - k + 1) as f64);
    (0..=(degree - k))
        .map(|i| {
            let delta = knots[span + i + 1] - knots[span + i + k - degree];
            (&prev[i + 1] - &prev[i]) * (scale / delta)
        })
        .collect()
}
