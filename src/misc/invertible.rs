/// A trait for reversing the direction of a parametric object in place
pub trait Invertible {
    fn invert(&mut self);

    /// Return an inverted copy of the object
    fn inverse(&self) -> Self
    where
        Self: Clone,
    {
        let mut cloned = self.clone();
        cloned.invert();
        cloned
    }
}
