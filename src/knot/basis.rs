use nalgebra::convert;

use crate::misc::FloatingPoint;

use super::KnotVector;

impl<T: FloatingPoint> KnotVector<T> {
    /// Values of the `degree + 1` basis functions that do not vanish at `u`,
    /// ordered from `N(span - degree)` to `N(span)`
    /// `knot_span_index` is the span holding `u`, as returned by [`KnotVector::find_span`].
    ///
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// let knots = KnotVector::new(vec![0., 0., 0., 1., 2., 3., 4., 4., 5., 5., 5.]);
    /// let span = knots.find_span(2, 2.5);
    /// let basis = knots.basis_functions(span, 2.5, 2);
    /// assert_eq!(basis, vec![0.125, 0.75, 0.125]);
    /// ```
    pub fn basis_functions(&self, knot_span_index: usize, u: T, degree: usize) -> Vec<T> {
        let span = knot_span_index;
        let mut values = Vec::with_capacity(degree + 1);
        values.push(T::one());
        // distances from u to the knots below and above the span
        let mut below = Vec::with_capacity(degree + 1);
        let mut above = Vec::with_capacity(degree + 1);
        below.push(T::zero());
        above.push(T::zero());

        // raise the degree one step at a time, each step adds one more value
        for q in 1..=degree {
            below.push(u - self[span + 1 - q]);
            above.push(self[span + q] - u);

            let mut carry = T::zero();
            for i in 0..q {
                let ratio = values[i] / (above[i + 1] + below[q - i]);
                values[i] = carry + above[i + 1] * ratio;
                carry = below[q - i] * ratio;
            }
            values.push(carry);
        }

        values
    }

    /// Compute the non-vanishing basis functions and their derivatives up to `order`
    /// Returns a table of size (order + 1, degree + 1): the kth row holds the kth derivatives,
    /// the first row the basis function values.
    /// Rows above `degree` are zero, as the (degree + 1)th derivative of a piecewise polynomial
    /// of `degree` vanishes.
    pub fn derivative_basis_functions(
        &self,
        knot_span_index: usize,
        u: T,
        degree: usize,
        order: usize,
    ) -> Vec<Vec<T>> {
        let p = degree;
        let mut ndu = vec![vec![T::zero(); p + 1]; p + 1];
        let mut left = vec![T::zero(); p + 1];
        let mut right = vec![T::zero(); p + 1];

        ndu[0][0] = T::one();

        for j in 1..=p {
            left[j] = u - self[knot_span_index + 1 - j];
            right[j] = self[knot_span_index + j] - u;

            let mut saved = T::zero();
            for r in 0..j {
                // lower triangle
                ndu[j][r] = right[r + 1] + left[j - r];
                let temp = ndu[r][j - 1] / ndu[j][r];

                // upper triangle
                ndu[r][j] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            ndu[j][j] = saved;
        }

        let mut ders = vec![vec![T::zero(); p + 1]; order + 1];
        for j in 0..=p {
            ders[0][j] = ndu[j][p];
        }

        let du = order.min(p);
        let mut a = vec![vec![T::zero(); p + 1]; 2];

        for r in 0..=p {
            // alternate rows in array a
            let mut s1 = 0;
            let mut s2 = 1;
            a[0][0] = T::one();

            for k in 1..=du {
                let mut d = T::zero();
                let pk = p - k;

                if r >= k {
                    let rk = r - k;
                    a[s2][0] = a[s1][0] / ndu[pk + 1][rk];
                    d = a[s2][0] * ndu[rk][pk];
                }

                let j1 = if r + 1 >= k { 1 } else { k - r };
                let j2 = if r <= pk + 1 { k - 1 } else { p - r };

                for j in j1..=j2 {
                    let rkj = r + j - k;
                    a[s2][j] = (a[s1][j] - a[s1][j - 1]) / ndu[pk + 1][rkj];
                    d += a[s2][j] * ndu[rkj][pk];
                }

                if r <= pk {
                    a[s2][k] = -a[s1][k - 1] / ndu[pk + 1][r];
                    d += a[s2][k] * ndu[r][pk];
                }

                ders[k][r] = d;

                std::mem::swap(&mut s1, &mut s2);
            }
        }

        // multiply through by degree! / (degree - k)!
        let mut factor = T::one();
        for k in 1..=du {
            factor *= convert::<f64, T>((p - k + 1) as f64);
            for j in 0..=p {
                ders[k][j] *= factor;
            }
        }

        ders
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::knot::KnotVector;

    fn knots() -> KnotVector<f64> {
        KnotVector::new(vec![0., 0., 0., 1., 2., 3., 4., 4., 5., 5., 5.])
    }

    #[test]
    fn partition_of_unity() {
        let knots = knots();
        for i in 0..=50 {
            let u = i as f64 * 0.1;
            let span = knots.find_span(2, u);
            let sum: f64 = knots.basis_functions(span, u, 2).iter().sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn derivatives_at_known_parameter() {
        let knots = knots();
        let span = knots.find_span(2, 2.5);
        assert_eq!(span, 4);
        let ders = knots.derivative_basis_functions(span, 2.5, 2, 2);
        let expected = [[0.125, 0.75, 0.125], [-0.5, 0., 0.5], [1., -2., 1.]];
        for (row, exp) in ders.iter().zip(expected.iter()) {
            for (v, e) in row.iter().zip(exp.iter()) {
                assert_relative_eq!(*v, *e, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn first_row_matches_basis_functions() {
        let knots = KnotVector::new(vec![0., 0., 0., 0., 0.33, 0.66, 1., 1., 1., 1.]);
        for u in [0., 0.1, 0.33, 0.5, 0.75, 1.] {
            let span = knots.find_span(3, u);
            let basis = knots.basis_functions(span, u, 3);
            let ders = knots.derivative_basis_functions(span, u, 3, 1);
            for (b, d) in basis.iter().zip(ders[0].iter()) {
                assert_relative_eq!(*b, *d, epsilon = 1e-12);
            }
            // derivatives of a partition of unity sum to zero
            let sum: f64 = ders[1].iter().sum();
            assert_relative_eq!(sum, 0., epsilon = 1e-9);
        }
    }

    #[test]
    fn orders_above_degree_vanish() {
        let knots = knots();
        let span = knots.find_span(2, 1.5);
        let ders = knots.derivative_basis_functions(span, 1.5, 2, 5);
        assert_eq!(ders.len(), 6);
        for row in ders.iter().skip(3) {
            assert!(row.iter().all(|v| *v == 0.));
        }
    }
}
