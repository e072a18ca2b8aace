use super::FloatingPoint;

/// Binomial coefficient table used by the rational derivative recurrence.
/// Rows of Pascal's triangle are memoized and grown on demand, so a
/// projector evaluating derivatives up to order `k` computes each
/// coefficient once.
#[derive(Clone, Debug)]
pub struct Binomial<T> {
    rows: Vec<Vec<T>>,
}

impl<T: FloatingPoint> Binomial<T> {
    pub fn new() -> Self {
        Self {
            rows: vec![vec![T::one()]],
        }
    }

    /// Create a table with rows up to `n` already filled
    pub fn with_order(n: usize) -> Self {
        let mut binomial = Self::new();
        binomial.grow(n);
        binomial
    }

    /// Returns the binomial coefficient of `n` and `k`.
    pub fn get(&mut self, n: usize, k: usize) -> T {
        if k > n {
            return T::zero();
        }
        self.grow(n);
        self.rows[n][k]
    }

    fn grow(&mut self, n: usize) {
        while self.rows.len() <= n {
            let prev = &self.rows[self.rows.len() - 1];
            let mut row = Vec::with_capacity(prev.len() + 1);
            row.push(T::one());
            for i in 1..prev.len() {
                row.push(prev[i - 1] + prev[i]);
            }
            row.push(T::one());
            self.rows.push(row);
        }
    }
}

impl<T: FloatingPoint> Default for Binomial<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Binomial;

    #[test]
    fn pascal_row() {
        let mut binomial = Binomial::<f64>::new();
        assert_eq!(binomial.get(5, 0), 1.);
        assert_eq!(binomial.get(5, 1), 5.);
        assert_eq!(binomial.get(5, 2), 10.);
        assert_eq!(binomial.get(5, 3), 10.);
        assert_eq!(binomial.get(5, 4), 5.);
        assert_eq!(binomial.get(5, 5), 1.);
        assert_eq!(binomial.get(5, 6), 0.);
    }

    #[test]
    fn symmetric() {
        let mut binomial = Binomial::<f64>::with_order(12);
        for n in 0..12 {
            for k in 0..=n {
                assert_eq!(binomial.get(n, k), binomial.get(n, n - k));
            }
        }
    }
}
