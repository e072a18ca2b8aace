use nalgebra::DVector;

use super::FloatingPoint;

/// Lift a euclidean point into homogeneous coordinates `(w * p, w)`
pub fn homogenize<T: FloatingPoint>(point: &DVector<T>, weight: T) -> DVector<T> {
    let dim = point.len();
    DVector::from_fn(dim + 1, |i, _| if i < dim { point[i] * weight } else { weight })
}

/// Split a homogeneous point `(w * p, w)` into its euclidean point and weight
/// Returns `None` when the weight is zero.
pub fn dehomogenize<T: FloatingPoint>(point: &DVector<T>) -> Option<(DVector<T>, T)> {
    let dim = point.len().checked_sub(1)?;
    let w = point[dim];
    if w != T::zero() {
        Some((point.rows(0, dim) / w, w))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::dvector;

    use super::*;

    #[test]
    fn homogeneous_round_trip() {
        let p = dvector![20., 15.];
        let h = homogenize(&p, 0.75);
        assert_eq!(h, dvector![15., 11.25, 0.75]);
        let (q, w) = dehomogenize(&h).unwrap();
        assert_eq!(q, p);
        assert_eq!(w, 0.75);
        assert!(dehomogenize(&dvector![1., 2., 0.]).is_none());
    }
}
