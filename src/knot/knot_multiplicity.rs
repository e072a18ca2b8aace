/// Run of equal knots: a distinct knot value and how many times it repeats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KnotMultiplicity<T> {
    value: T,
    count: usize,
}

impl<T: Copy> KnotMultiplicity<T> {
    pub fn new(value: T, count: usize) -> Self {
        Self { value, count }
    }

    pub fn knot(&self) -> T {
        self.value
    }

    pub fn multiplicity(&self) -> usize {
        self.count
    }

    /// Account for one more occurrence of the knot
    pub fn increment(&mut self) {
        self.count += 1;
    }
}
