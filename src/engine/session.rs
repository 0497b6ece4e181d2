use std::ops::Deref;

use crate::config::Settings;
use crate::engine::motion::{MotionStats, MotionUpdate, TimedPoint};
use crate::engine::schedule::LatestOnly;
use crate::engine::smooth::smooth;
use crate::geom::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq, derive_more::Display)]
pub enum CaptureState {
	Idle,
	Active,
}

/// Why a sample or call was ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, derive_more::Display)]
pub enum Rejection {
	/// A coordinate or timestamp was NaN or infinite.
	MalformedSample,
	/// The timestamp went backwards.
	NonMonotonicTimestamp,
	/// `begin` while a stroke is in progress.
	AlreadyActive,
	/// `extend` with no stroke in progress.
	NotActive,
}

/// Result of handing one sample to the session. Never an error: bad samples are dropped and the
/// stroke carries on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ingest {
	Accepted,
	/// The point was stored but came too soon after the previous one to update statistics.
	StatsSkipped,
	Dropped(Rejection),
}

impl Ingest {
	pub fn is_stored(self) -> bool {
		!matches!(self, Ingest::Dropped(_))
	}
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
	#[error("no stroke in progress")]
	NotActive,

	#[error("stroke has {points} point(s), at least 2 are needed")]
	InsufficientData { points: usize },
}

static_assertions::assert_impl_all!(CaptureError: std::error::Error, Send, Sync);

/// The ordered points of one finished pointer-down-to-up gesture.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stroke {
	points: Vec<Point>,
}

impl Stroke {
	pub fn new(points: Vec<Point>) -> Self {
		Self { points }
	}

	pub fn points(&self) -> &[Point] {
		&self.points
	}
}

impl Deref for Stroke {
	type Target = [Point];
	fn deref(&self) -> &[Point] {
		&self.points
	}
}

impl From<Vec<Point>> for Stroke {
	fn from(points: Vec<Point>) -> Self {
		Self::new(points)
	}
}

/// Live state of the stroke being drawn.
///
/// Samples go in through [`begin`](Self::begin) and [`extend`](Self::extend). The host calls
/// [`on_frame`](Self::on_frame) once per display refresh to run the single pending smoothing
/// pass. `begin` while a stroke is active is ignored rather than restarting the stroke.
#[derive(Debug)]
pub struct DrawingSession {
	settings: Settings,
	state: CaptureState,
	raw: Vec<Point>,
	smoothed: Vec<Point>,
	last: Option<TimedPoint>,
	started_at_ms: f64,
	motion: MotionStats,
	smoothing: LatestOnly,
	dropped: u64,
}

impl DrawingSession {
	pub fn new(settings: Settings) -> Self {
		Self {
			settings,
			state: CaptureState::Idle,
			raw: Vec::new(),
			smoothed: Vec::new(),
			last: None,
			started_at_ms: 0.0,
			motion: MotionStats::default(),
			smoothing: LatestOnly::new(),
			dropped: 0,
		}
	}

	pub fn begin(&mut self, x: f32, y: f32, t_ms: f64) -> Ingest {
		let sample = TimedPoint::new(x, y, t_ms);
		if self.state == CaptureState::Active {
			tracing::debug!(?sample, "begin ignored, stroke already active");
			return Ingest::Dropped(Rejection::AlreadyActive);
		}
		if !sample.is_finite() {
			return self.drop_sample(sample, Rejection::MalformedSample);
		}

		self.raw.clear();
		self.raw.push(sample.position);
		self.smoothed.clear();
		self.last = Some(sample);
		self.started_at_ms = t_ms;
		self.motion = MotionStats::default();
		self.state = CaptureState::Active;
		self.smoothing.request();
		tracing::debug!(?sample, "stroke started");
		Ingest::Accepted
	}

	pub fn extend(&mut self, x: f32, y: f32, t_ms: f64) -> Ingest {
		let sample = TimedPoint::new(x, y, t_ms);
		let (CaptureState::Active, Some(prev)) = (self.state, self.last) else {
			tracing::debug!(?sample, "extend ignored, no active stroke");
			return Ingest::Dropped(Rejection::NotActive);
		};
		if !sample.is_finite() {
			return self.drop_sample(sample, Rejection::MalformedSample);
		}
		if sample.t_ms < prev.t_ms {
			return self.drop_sample(sample, Rejection::NonMonotonicTimestamp);
		}

		self.raw.push(sample.position);
		self.last = Some(sample);
		let update = self.motion.observe(prev, sample, self.raw.len());
		self.smoothing.request();
		match update {
			MotionUpdate::Updated { .. } => Ingest::Accepted,
			MotionUpdate::Skipped => Ingest::StatsSkipped,
		}
	}

	/// Ends the stroke and hands it over. The session is idle afterwards either way.
	pub fn finish(&mut self) -> Result<Stroke, CaptureError> {
		if self.state != CaptureState::Active {
			return Err(CaptureError::NotActive);
		}
		let points = std::mem::take(&mut self.raw);
		self.clear();
		if points.len() < 2 {
			tracing::debug!(points = points.len(), "stroke too short to score");
			return Err(CaptureError::InsufficientData {
				points: points.len(),
			});
		}
		tracing::debug!(points = points.len(), "stroke finished");
		Ok(Stroke::new(points))
	}

	/// Discards any stroke in progress.
	pub fn reset(&mut self) {
		if self.state == CaptureState::Active {
			tracing::debug!(points = self.raw.len(), "stroke discarded");
		}
		self.clear();
	}

	/// Runs the pending smoothing pass, if any, and returns the refreshed path.
	pub fn on_frame(&mut self) -> Option<&[Point]> {
		let task = self.smoothing.take_due()?;
		tracing::trace!(?task, points = self.raw.len(), "smoothing stroke");
		self.smoothed = smooth(&self.raw, self.settings.precision.get());
		Some(self.smoothed.as_slice())
	}

	pub fn state(&self) -> CaptureState {
		self.state
	}

	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	pub fn raw(&self) -> &[Point] {
		&self.raw
	}

	/// The most recently smoothed path. May lag [`raw`](Self::raw) by one frame.
	pub fn smoothed(&self) -> &[Point] {
		&self.smoothed
	}

	pub fn motion(&self) -> MotionStats {
		self.motion
	}

	/// Time since `begin`, up to the latest accepted sample. Zero when idle.
	pub fn elapsed_ms(&self) -> f64 {
		match (self.state, self.last) {
			(CaptureState::Active, Some(last)) => last.t_ms - self.started_at_ms,
			_ => 0.0,
		}
	}

	/// Number of malformed samples dropped over the session's lifetime.
	pub fn dropped_samples(&self) -> u64 {
		self.dropped
	}

	pub fn smoothing(&self) -> &LatestOnly {
		&self.smoothing
	}

	fn drop_sample(&mut self, sample: TimedPoint, reason: Rejection) -> Ingest {
		self.dropped += 1;
		tracing::warn!(?sample, %reason, "dropped sample");
		Ingest::Dropped(reason)
	}

	fn clear(&mut self) {
		self.state = CaptureState::Idle;
		self.raw.clear();
		self.smoothed.clear();
		self.last = None;
		self.motion = MotionStats::default();
		self.smoothing.cancel();
	}
}

impl Default for DrawingSession {
	fn default() -> Self {
		Self::new(Settings::default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;

	#[test]
	fn begin_starts_stroke() {
		let mut session = DrawingSession::default();
		assert_eq!(session.state(), CaptureState::Idle);
		assert_eq!(session.begin(10.0, 20.0, 5.0), Ingest::Accepted);
		assert_eq!(session.state(), CaptureState::Active);
		assert_eq!(session.raw(), &[Point::new(10.0, 20.0)]);
		assert_eq!(session.motion(), MotionStats::default());
	}

	#[test]
	fn begin_while_active_is_ignored() {
		let mut session = DrawingSession::default();
		session.begin(0.0, 0.0, 0.0);
		session.extend(5.0, 0.0, 10.0);
		let motion = session.motion();

		assert_eq!(
			session.begin(100.0, 100.0, 20.0),
			Ingest::Dropped(Rejection::AlreadyActive)
		);
		assert_eq!(session.state(), CaptureState::Active);
		assert_eq!(session.raw(), &[Point::new(0.0, 0.0), Point::new(5.0, 0.0)]);
		assert_eq!(session.motion(), motion);
		assert_eq!(session.dropped_samples(), 0);
	}

	#[test]
	fn begin_after_finish_starts_fresh() {
		let mut session = DrawingSession::default();
		session.begin(0.0, 0.0, 0.0);
		session.extend(10.0, 0.0, 10.0);
		session.finish().unwrap();
		assert_eq!(session.begin(50.0, 50.0, 100.0), Ingest::Accepted);
		assert_eq!(session.raw(), &[Point::new(50.0, 50.0)]);
		assert_eq!(session.motion(), MotionStats::default());
	}

	#[test]
	fn extend_requires_active_stroke() {
		let mut session = DrawingSession::default();
		assert_eq!(
			session.extend(1.0, 1.0, 1.0),
			Ingest::Dropped(Rejection::NotActive)
		);
		assert!(session.raw().is_empty());
	}

	#[test]
	fn zero_interval_keeps_point_but_not_statistics() {
		let mut session = DrawingSession::default();
		session.begin(10.0, 10.0, 100.0);
		let before = session.motion();
		assert_eq!(session.extend(10.0, 10.0, 100.0), Ingest::StatsSkipped);
		assert_eq!(session.raw().len(), 2);
		assert_eq!(session.motion().speed_ema, before.speed_ema);
		assert_eq!(session.motion(), before);
	}

	#[test]
	fn malformed_samples_are_dropped() {
		let mut session = DrawingSession::default();
		assert_eq!(
			session.begin(f32::NAN, 0.0, 0.0),
			Ingest::Dropped(Rejection::MalformedSample)
		);
		assert_eq!(session.state(), CaptureState::Idle);

		session.begin(0.0, 0.0, 0.0);
		session.extend(4.0, 0.0, 10.0);
		let motion = session.motion();
		assert_eq!(
			session.extend(f32::INFINITY, 0.0, 20.0),
			Ingest::Dropped(Rejection::MalformedSample)
		);
		assert_eq!(
			session.extend(0.0, 0.0, f64::NAN),
			Ingest::Dropped(Rejection::MalformedSample)
		);
		assert_eq!(
			session.extend(8.0, 0.0, 5.0),
			Ingest::Dropped(Rejection::NonMonotonicTimestamp)
		);
		assert_eq!(session.raw().len(), 2);
		assert_eq!(session.motion(), motion);
		assert_eq!(session.dropped_samples(), 4);

		// The stroke carries on.
		assert_eq!(session.extend(8.0, 0.0, 20.0), Ingest::Accepted);
		assert_eq!(session.raw().len(), 3);
	}

	#[test]
	fn extend_updates_motion() {
		let mut session = DrawingSession::default();
		session.begin(0.0, 0.0, 0.0);
		assert_eq!(session.extend(30.0, 40.0, 10.0), Ingest::Accepted);
		assert_abs_diff_eq!(session.motion().speed_ema, 1.0, epsilon = 1e-6);
		assert!(session.motion().quality_ema < 1.0);
		assert_abs_diff_eq!(session.elapsed_ms(), 10.0);
	}

	#[test]
	fn finish_hands_over_stroke() {
		let mut session = DrawingSession::default();
		session.begin(0.0, 0.0, 0.0);
		session.extend(1.0, 0.0, 10.0);
		session.extend(2.0, 0.0, 20.0);
		let stroke = session.finish().unwrap();
		assert_eq!(
			stroke.points(),
			&[Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)]
		);
		assert_eq!(session.state(), CaptureState::Idle);
		assert!(session.raw().is_empty());
		assert!(session.smoothed().is_empty());
		assert_eq!(session.elapsed_ms(), 0.0);
	}

	#[test]
	fn finish_single_point_is_insufficient() {
		let mut session = DrawingSession::default();
		session.begin(10.0, 10.0, 0.0);
		assert_eq!(
			session.finish(),
			Err(CaptureError::InsufficientData { points: 1 })
		);
		assert_eq!(session.state(), CaptureState::Idle);
		assert_eq!(session.finish(), Err(CaptureError::NotActive));
	}

	#[test]
	fn reset_discards_stroke() {
		let mut session = DrawingSession::default();
		session.begin(0.0, 0.0, 0.0);
		session.extend(1.0, 1.0, 10.0);
		session.reset();
		assert_eq!(session.state(), CaptureState::Idle);
		assert!(session.raw().is_empty());
		assert!(session.on_frame().is_none());
		assert_eq!(session.finish(), Err(CaptureError::NotActive));
	}

	#[test]
	fn smoothing_is_coalesced_per_frame() {
		let mut session = DrawingSession::new(Settings::builder().precision(20).build().unwrap());
		assert!(session.on_frame().is_none());

		session.begin(0.0, 0.0, 0.0);
		for i in 1..10 {
			session.extend(i as f32, if i % 2 == 0 { 1.0 } else { -1.0 }, i as f64 * 4.0);
		}
		assert!(session.smoothed().is_empty());
		assert_eq!(session.smoothing().superseded(), 9);

		let smoothed = session.on_frame().unwrap().to_vec();
		assert_eq!(smoothed.len(), 10);
		assert_eq!(smoothed[0], Point::new(0.0, 0.0));
		assert_eq!(smoothed[9], session.raw()[9]);
		assert_eq!(session.smoothing().executed(), 1);

		// Nothing new arrived, so the next frame does no work.
		assert!(session.on_frame().is_none());
		assert_eq!(session.smoothing().executed(), 1);

		session.extend(10.0, 0.0, 40.0);
		assert_eq!(session.smoothed().len(), 10);
		assert_eq!(session.on_frame().map(<[Point]>::len), Some(11));
	}

	#[test]
	fn finish_cancels_pending_smoothing() {
		let mut session = DrawingSession::default();
		session.begin(0.0, 0.0, 0.0);
		session.extend(1.0, 0.0, 10.0);
		assert!(session.smoothing().is_pending());
		session.finish().unwrap();
		assert!(!session.smoothing().is_pending());
		assert!(session.on_frame().is_none());
	}

	#[test]
	fn stroke_derefs_to_points() {
		let stroke = Stroke::from(vec![Point::ZERO, Point::ONE]);
		assert_eq!(stroke.len(), 2);
		assert_eq!(stroke.first(), Some(&Point::ZERO));
		assert_eq!(stroke.points(), &[Point::ZERO, Point::ONE]);
	}
}
