mod feedback;
pub use feedback::*;

pub mod motion;

pub mod schedule;

mod scoring;
pub use scoring::*;

mod session;
pub use session::*;

pub mod smooth;
pub use smooth::smooth;
