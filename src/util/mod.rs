mod piecewise_linear;
pub use piecewise_linear::*;

pub mod stats;
