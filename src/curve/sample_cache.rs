use nalgebra::DVector;

use crate::misc::FloatingPoint;

/// Evaluated sample sequences keyed by their sampling step.
/// The owning curve clears the cache on every mutation of its definition.
#[derive(Clone, Debug)]
pub struct SampleCache<T> {
    entries: Vec<(T, Vec<DVector<T>>)>,
}

impl<T: FloatingPoint> SampleCache<T> {
    /// Upper bound on the number of points of a single sequence
    pub const MAX_SAMPLES: usize = 1 << 24;

    pub fn new() -> Self {
        Self { entries: vec![] }
    }

    /// Index of the sequence sampled at exactly `step`
    pub fn position(&self, step: T) -> Option<usize> {
        self.entries.iter().position(|(s, _)| *s == step)
    }

    /// Store a sequence and return its index
    pub fn push(&mut self, step: T, points: Vec<DVector<T>>) -> usize {
        self.entries.push((step, points));
        self.entries.len() - 1
    }

    pub fn points(&self, index: usize) -> &[DVector<T>] {
        &self.entries[index].1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: FloatingPoint> Default for SampleCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
