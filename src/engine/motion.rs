use crate::geom::Point;

/// Weight of a new speed sample in the speed average.
pub const SPEED_SMOOTHING: f32 = 0.2;
/// Weight of a new consistency sample in the quality average.
pub const QUALITY_SMOOTHING: f32 = 0.05;
/// Samples closer together than this are treated as noise for statistics.
pub const MIN_SAMPLE_INTERVAL_MS: f64 = 1.0;

const CONSISTENCY_FLOOR: f32 = 0.5;
const SPEED_EPSILON: f32 = 0.1;

/// A pointer sample with its monotonic timestamp in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedPoint {
	pub position: Point,
	pub t_ms: f64,
}

impl TimedPoint {
	pub fn new(x: f32, y: f32, t_ms: f64) -> Self {
		Self {
			position: Point::new(x, y),
			t_ms,
		}
	}

	pub fn is_finite(&self) -> bool {
		self.position.x.is_finite() && self.position.y.is_finite() && self.t_ms.is_finite()
	}
}

/// Running averages of drawing speed and speed consistency for the active stroke.
///
/// Speeds are in device units per millisecond. `quality_ema` stays in `[0.5, 1]` once a
/// stroke begins, since consistency never drops below one half.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionStats {
	pub speed_ema: f32,
	pub quality_ema: f32,
}

impl Default for MotionStats {
	fn default() -> Self {
		Self {
			speed_ema: 0.0,
			quality_ema: 1.0,
		}
	}
}

/// How much a speed sample agrees with the running average, in `[0.5, 1]`.
pub fn consistency(speed: f32, speed_ema: f32) -> f32 {
	let relative = (speed - speed_ema).abs() / (speed_ema + SPEED_EPSILON);
	(1.0 - relative.min(1.0)).max(CONSISTENCY_FLOOR)
}

/// Outcome of feeding one sample interval into [`MotionStats`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotionUpdate {
	Updated { speed: f32 },
	/// The interval was too short to produce a meaningful speed.
	Skipped,
}

impl MotionStats {
	/// Folds the motion from `prev` to `next` into the averages.
	///
	/// `stroke_len` is the number of points in the stroke including `next`; quality only moves
	/// once there are at least two.
	pub fn observe(&mut self, prev: TimedPoint, next: TimedPoint, stroke_len: usize) -> MotionUpdate {
		let dt = next.t_ms - prev.t_ms;
		if !(dt >= MIN_SAMPLE_INTERVAL_MS) {
			return MotionUpdate::Skipped;
		}
		let distance = prev.position.distance(next.position);
		let speed = (distance as f64 / dt.max(MIN_SAMPLE_INTERVAL_MS)) as f32;

		self.speed_ema = SPEED_SMOOTHING * speed + (1.0 - SPEED_SMOOTHING) * self.speed_ema;
		if stroke_len >= 2 {
			let c = consistency(speed, self.speed_ema);
			self.quality_ema = QUALITY_SMOOTHING * c + (1.0 - QUALITY_SMOOTHING) * self.quality_ema;
		}
		MotionUpdate::Updated { speed }
	}
}
