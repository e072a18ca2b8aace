use approx::assert_relative_eq;
use nalgebra::{dvector, Point3};
use spliner::prelude::*;

fn quarter_circle() -> NurbsCurve<f64> {
    let w = std::f64::consts::FRAC_1_SQRT_2;
    NurbsCurve::try_new_rational(
        2,
        vec![dvector![1., 0.], dvector![1., 1.], dvector![0., 1.]],
        vec![1., w, 1.],
        vec![0., 0., 0., 1., 1., 1.],
    )
    .unwrap()
}

#[test]
fn rational_quarter_circle() {
    for curve in [
        quarter_circle(),
        quarter_circle().with_evaluation_strategy(RecursiveDeBoorStrategy),
    ] {
        for i in 0..=32 {
            let u = i as f64 / 32.;
            let p = curve.evaluate(u).unwrap();
            assert_relative_eq!(p.norm(), 1., epsilon = 1e-12);

            // tangent is orthogonal to the radius
            let t = curve.tangent_at(u).unwrap();
            assert_relative_eq!(t.dot(&p), 0., epsilon = 1e-9);
            assert_relative_eq!(t.norm(), 1., epsilon = 1e-12);
        }
    }
}

#[test]
fn refined_circle_stays_on_circle() {
    let mut curve = quarter_circle();
    curve.try_insert_knot(0.25, 1).unwrap();
    curve.try_insert_knot(0.5, 2).unwrap();
    assert_eq!(curve.control_points().len(), 6);
    assert!(curve.weights().is_some_and(|w| w.iter().all(|w| *w > 0.)));
    let samples = curve.sample(1. / 64.).unwrap();
    assert_eq!(samples.len(), 65);
    for p in samples {
        assert_relative_eq!(p.norm(), 1., epsilon = 1e-12);
    }
}

#[test]
fn split_circle() {
    let curve = quarter_circle();
    let (left, right) = curve.try_split(0.5).unwrap();
    let mid = curve.evaluate(0.5).unwrap();
    assert_relative_eq!(left.evaluate(0.5).unwrap(), mid, epsilon = 1e-12);
    assert_relative_eq!(right.evaluate(0.5).unwrap(), mid, epsilon = 1e-12);
    assert_relative_eq!(mid[0], mid[1], epsilon = 1e-12);
}

#[test]
fn spatial_curve() {
    let points = vec![
        Point3::new(0., 0., 0.),
        Point3::new(1., 0., 1.),
        Point3::new(2., 1., 2.),
        Point3::new(3., 1., 1.),
        Point3::new(4., 0., 0.),
    ];
    let knots = KnotVector::<f64>::uniform_clamped(points.len(), 3);
    let curve = NurbsCurve::try_from_points(3, &points, knots.to_vec()).unwrap();
    assert_eq!(curve.dimension(), 3);
    assert_relative_eq!(curve.evaluate(0.).unwrap(), dvector![0., 0., 0.], epsilon = 1e-12);
    assert_relative_eq!(curve.evaluate(1.).unwrap(), dvector![4., 0., 0.], epsilon = 1e-12);

    let a = curve.derivatives(0.3, 4).unwrap();
    let b = curve
        .clone()
        .with_evaluation_strategy(RecursiveDeBoorStrategy)
        .derivatives(0.3, 4)
        .unwrap();
    for (da, db) in a.iter().zip(b.iter()) {
        assert_relative_eq!(da, db, epsilon = 1e-9);
    }
    assert!(a[4].iter().all(|v| *v == 0.));
}

#[test]
fn single_precision() {
    let curve = NurbsCurve::<f32>::try_new(
        1,
        vec![dvector![0., 0.], dvector![2., 2.]],
        vec![0., 0., 1., 1.],
    )
    .unwrap();
    assert_relative_eq!(curve.evaluate(0.25).unwrap(), dvector![0.5f32, 0.5]);
    assert_relative_eq!(curve.derivatives(0.25, 1).unwrap()[1], dvector![2f32, 2.]);
}

#[test]
fn non_rational_conversion() {
    let curve = quarter_circle();
    assert!(matches!(
        curve.try_to_non_rational(),
        Err(CurveError::LossyConversion { index: 1, .. })
    ));
    let line = NurbsCurve::try_new(
        1,
        vec![dvector![0., 0.], dvector![1., 1.]],
        vec![0., 0., 1., 1.],
    )
    .unwrap();
    let plain = line.to_rational().try_to_non_rational().unwrap();
    assert!(plain.weights().is_none());
}
