pub mod binomial;
pub mod floating_point;
pub mod homogeneous;
pub mod invertible;
pub mod tolerance;

pub use binomial::*;
pub use floating_point::*;
pub use homogeneous::*;
pub use invertible::*;
pub use tolerance::*;
