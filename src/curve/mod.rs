pub mod builder;
pub mod conversion;
pub mod knot_insertion;
pub mod nurbs_curve;
pub mod sample_cache;
pub mod split;
pub use builder::*;
pub use knot_insertion::*;
pub use nurbs_curve::*;
pub use sample_cache::*;
