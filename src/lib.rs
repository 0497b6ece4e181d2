pub mod config;
pub mod engine;
pub mod geom;
pub(crate) mod util;

pub use config::{ConfigError, Settings, Tolerance};
pub use engine::{score, DrawingSession, ScoreResult};
pub use geom::{Point, TargetCircle};
