use approx::assert_relative_eq;
use nalgebra::{dvector, DVector};

use super::*;
use crate::knot::KnotVector;

fn cubic() -> (usize, KnotVector<f64>, Vec<DVector<f64>>) {
    (
        3,
        KnotVector::new(vec![0., 0., 0., 0., 0.33, 0.66, 1., 1., 1., 1.]),
        vec![
            dvector![5., 5.],
            dvector![10., 10.],
            dvector![20., 15.],
            dvector![35., 15.],
            dvector![45., 10.],
            dvector![50., 5.],
        ],
    )
}

fn assert_strategies_agree(
    degree: usize,
    knots: &KnotVector<f64>,
    control_points: &[DVector<f64>],
    order: usize,
) {
    let (start, end) = knots.domain(degree);
    for i in 0..=40 {
        let u = start + (end - start) * i as f64 / 40.;
        let a = BasisFunctionStrategy.derivatives(degree, knots, control_points, u, order);
        let b = RecursiveDeBoorStrategy.derivatives(degree, knots, control_points, u, order);
        assert_eq!(a.len(), order + 1);
        assert_eq!(b.len(), order + 1);
        for (da, db) in a.iter().zip(b.iter()) {
            for (x, y) in da.iter().zip(db.iter()) {
                assert_relative_eq!(*x, *y, epsilon = 1e-3, max_relative = 1e-9);
            }
        }
    }
}

#[test]
fn strategies_agree_on_cubic() {
    let (degree, knots, control_points) = cubic();
    for order in 0..=5 {
        assert_strategies_agree(degree, &knots, &control_points, order);
    }
}

#[test]
fn strategies_agree_on_non_uniform_quartic() {
    let knots = KnotVector::new(vec![
        0., 0., 0., 0., 0., 0.1, 0.15, 0.5, 0.5, 0.9, 1., 1., 1., 1., 1.,
    ]);
    let control_points: Vec<_> = (0..10)
        .map(|i| {
            let t = i as f64;
            dvector![t, (t * 0.7).sin() * 3., (t * 0.3).cos()]
        })
        .collect();
    for order in 0..=4 {
        assert_strategies_agree(4, &knots, &control_points, order);
    }
}

#[test]
fn strategies_agree_on_homogeneous_net() {
    let (degree, knots, control_points) = cubic();
    let weights = [0.5, 1.0, 0.75, 1.0, 0.25, 1.0];
    let homogeneous: Vec<_> = control_points
        .iter()
        .zip(weights.iter())
        .map(|(p, w)| crate::misc::homogenize(p, *w))
        .collect();
    assert_strategies_agree(degree, &knots, &homogeneous, 3);
}

#[test]
fn point_matches_order_zero() {
    let (degree, knots, control_points) = cubic();
    for u in [0., 0.2, 0.33, 0.5, 0.8, 1.] {
        let a = BasisFunctionStrategy.point(degree, &knots, &control_points, u);
        let b = RecursiveDeBoorStrategy.point(degree, &knots, &control_points, u);
        let da = BasisFunctionStrategy.derivatives(degree, &knots, &control_points, u, 0);
        assert_relative_eq!(a, da[0], epsilon = 1e-10);
        assert_relative_eq!(a, b, epsilon = 1e-10);
    }
}

#[test]
fn derivatives_above_degree_are_zero() {
    let (degree, knots, control_points) = cubic();
    let strategies: [&dyn CurveEvaluationStrategy<f64>; 2] =
        [&BasisFunctionStrategy, &RecursiveDeBoorStrategy];
    for strategy in strategies {
        let ders = strategy.derivatives(degree, &knots, &control_points, 0.4, 6);
        for d in ders.iter().skip(degree + 1) {
            assert!(d.iter().all(|v| *v == 0.), "{}", strategy.name());
        }
    }
}

#[test]
fn linear_derivative() {
    let knots = KnotVector::new(vec![0., 0., 1., 2., 2.]);
    let control_points = vec![dvector![0., 0.], dvector![1., 0.], dvector![1., 1.]];
    let ders = RecursiveDeBoorStrategy.derivatives(1, &knots, &control_points, 1.5, 1);
    assert_relative_eq!(ders[0], dvector![1., 0.5], epsilon = 1e-12);
    assert_relative_eq!(ders[1], dvector![0., 1.], epsilon = 1e-12);
}
