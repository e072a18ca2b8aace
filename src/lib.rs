#![allow(clippy::needless_range_loop)]

mod curve;
mod error;
mod evaluator;
mod knot;
mod misc;

pub mod prelude {
    pub use crate::curve::*;
    pub use crate::error::*;
    pub use crate::evaluator::*;
    pub use crate::knot::*;
    pub use crate::misc::*;
}
