use std::f32::consts::{FRAC_PI_4, TAU};

use itertools::Itertools;

use crate::config::Tolerance;
use crate::engine::feedback::{deviation_ratio, Feedback, FeedbackTally, GOOD_BAND, MEDIUM_BAND};
use crate::geom::{is_finite_point, normalize_angle, positive_angle, Point, TargetCircle};
use crate::util::{stats, PiecewiseLinear};

/// Share of the sorted deviations dropped from each end before averaging.
const DEVIATION_TRIM: f32 = 0.1;

/// Points closer to the center than this fraction of the radius have no usable angle.
const CENTER_DEAD_ZONE: f32 = 0.05;
/// Number of equal sectors used to measure how much of the circle was swept.
const COVERAGE_SECTORS: usize = 36;
/// A single step sweeping more than this does not count as covering the sectors in between.
const MAX_COVERING_STEP: f32 = FRAC_PI_4;
/// Angular velocities are measured between means of this many index blocks.
const VELOCITY_BLOCKS: usize = 36;

/// Start-to-end gaps up to this fraction of the radius always count as a closed loop.
const CLOSURE_SLACK: f32 = 0.05;
/// A gap of this many typical sample steps also counts as closed.
const CLOSURE_STEPS: f32 = 1.5;
/// Upper bound on the closure slack, as a fraction of the radius, however sparse the samples.
const MAX_CLOSURE_SLACK: f32 = 0.2;
/// Start-to-end gap, as a fraction of the radius, that scores zero.
const CLOSURE_LIMIT: f32 = 1.0;

/// Relative weight of each sub-score in the overall score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreWeights {
	pub stroke_deviation: f32,
	pub angular_smoothness: f32,
	pub completion_offset: f32,
}

impl ScoreWeights {
	pub const DEFAULT: Self = Self {
		stroke_deviation: 0.5,
		angular_smoothness: 0.25,
		completion_offset: 0.25,
	};

	fn total(&self) -> f32 {
		self.stroke_deviation + self.angular_smoothness + self.completion_offset
	}
}

impl Default for ScoreWeights {
	fn default() -> Self {
		Self::DEFAULT
	}
}

/// Percentages in `[0, 100]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometricSubscores {
	pub stroke_deviation: f32,
	pub angular_smoothness: f32,
	pub completion_offset: f32,
}

impl GeometricSubscores {
	pub fn weighted(&self, weights: &ScoreWeights) -> f32 {
		let total = weights.total();
		if !(total > 0.0) {
			return 0.0;
		}
		let sum = weights.stroke_deviation * self.stroke_deviation
			+ weights.angular_smoothness * self.angular_smoothness
			+ weights.completion_offset * self.completion_offset;
		percentage(sum / total)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreResult {
	pub subscores: GeometricSubscores,
	pub overall: f32,
	/// Per-point severity buckets behind `stroke_deviation`.
	pub feedback: FeedbackTally,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
	#[error("stroke has {usable} usable point(s), at least 2 are needed")]
	InsufficientData { usable: usize },
}

static_assertions::assert_impl_all!(ScoreError: std::error::Error, Send, Sync);

/// Scores a finished stroke against the target with [`ScoreWeights::DEFAULT`].
pub fn score(
	stroke: &[Point],
	target: &TargetCircle,
	tolerance: Tolerance,
) -> Result<ScoreResult, ScoreError> {
	score_with_weights(stroke, target, tolerance, &ScoreWeights::DEFAULT)
}

/// Scores a finished stroke. Non-finite points are skipped.
#[tracing::instrument(level = "debug", skip_all, fields(points = stroke.len()))]
pub fn score_with_weights(
	stroke: &[Point],
	target: &TargetCircle,
	tolerance: Tolerance,
	weights: &ScoreWeights,
) -> Result<ScoreResult, ScoreError> {
	let points: Vec<Point> = stroke.iter().copied().filter(|&p| is_finite_point(p)).collect();
	if points.len() != stroke.len() {
		tracing::warn!(skipped = stroke.len() - points.len(), "skipped non-finite points");
	}
	if points.len() < 2 {
		return Err(ScoreError::InsufficientData {
			usable: points.len(),
		});
	}

	let ratios: Vec<f32> = points
		.iter()
		.map(|&p| deviation_ratio(p, target, tolerance))
		.collect();
	let subscores = GeometricSubscores {
		stroke_deviation: stroke_deviation(&ratios),
		angular_smoothness: angular_smoothness(&points, target),
		completion_offset: completion_offset(&points, target),
	};
	let result = ScoreResult {
		subscores,
		overall: subscores.weighted(weights),
		feedback: ratios.iter().map(|&r| Feedback::classify(r)).collect(),
	};
	tracing::debug!(?result, "scored stroke");
	Ok(result)
}

fn percentage(value: f32) -> f32 {
	if value.is_finite() {
		value.clamp(0.0, 100.0)
	} else {
		0.0
	}
}

/// Score for a deviation ratio. Continuous and non-increasing, with knots on the feedback bands.
pub fn deviation_falloff() -> Option<PiecewiseLinear> {
	PiecewiseLinear::new([
		(0.0, 100.0),
		(GOOD_BAND, 85.0),
		(MEDIUM_BAND, 45.0),
		(1.0, 2.0),
		(1.25, 0.0),
	])
	.filter(PiecewiseLinear::is_non_increasing)
}

/// `ratios` are per-point deviations divided by the tolerance band.
fn stroke_deviation(ratios: &[f32]) -> f32 {
	let (Some(typical), Some(falloff)) =
		(stats::trimmed_mean(ratios, DEVIATION_TRIM), deviation_falloff())
	else {
		return 0.0;
	};
	percentage(falloff.evaluate(typical))
}

/// Accumulates wrapped angle differences so that crossing ±π does not produce a jump.
pub fn unwrap_angles(angles: impl IntoIterator<Item = f32>) -> Vec<f32> {
	let mut angles = angles.into_iter();
	let Some(first) = angles.next() else {
		return Vec::new();
	};
	let mut unwrapped = vec![first];
	let mut previous = first;
	let mut total = first;
	for angle in angles {
		total += normalize_angle(angle - previous);
		previous = angle;
		unwrapped.push(total);
	}
	unwrapped
}

fn sector_of(theta: f32) -> usize {
	let width = TAU / COVERAGE_SECTORS as f32;
	((positive_angle(theta) / width) as usize).min(COVERAGE_SECTORS - 1)
}

/// Fraction of the circle's sectors swept by the unwrapped angle sequence.
fn angular_coverage(unwrapped: &[f32]) -> f32 {
	let width = TAU / COVERAGE_SECTORS as f32;
	let mut visited = [false; COVERAGE_SECTORS];
	for &theta in unwrapped {
		visited[sector_of(theta)] = true;
	}
	for (&a, &b) in unwrapped.iter().tuple_windows() {
		let step = b - a;
		if step.abs() > MAX_COVERING_STEP {
			continue;
		}
		let substeps = (step.abs() / width).ceil() as usize;
		for k in 1..substeps {
			visited[sector_of(a + step * (k as f32 / substeps as f32))] = true;
		}
	}
	visited.iter().filter(|&&v| v).count() as f32 / COVERAGE_SECTORS as f32
}

/// In `[0, 1]`. One for a sweep that never moves against its net direction.
fn direction_consistency(velocities: &[f32]) -> f32 {
	let net: f32 = velocities.iter().sum();
	let travel: f32 = velocities.iter().map(|v| v.abs()).sum();
	if !(travel > 0.0) || net == 0.0 {
		return 0.0;
	}
	let backtrack: f32 = velocities
		.iter()
		.filter(|v| v.signum() != net.signum() && **v != 0.0)
		.map(|v| v.abs())
		.sum();
	let moving: Vec<f32> = velocities.iter().copied().filter(|v| *v != 0.0).collect();
	let flips = moving
		.iter()
		.tuple_windows()
		.filter(|(a, b)| a.signum() != b.signum())
		.count();
	let flip_rate = if moving.len() > 1 {
		flips as f32 / (moving.len() - 1) as f32
	} else {
		0.0
	};
	((1.0 - 2.0 * backtrack / travel) * (1.0 - 0.5 * flip_rate)).clamp(0.0, 1.0)
}

/// In `[0, 1]`. One when every step sweeps the same angle.
fn sweep_uniformity(velocities: &[f32]) -> f32 {
	let (Some(mean), Some(variance)) = (stats::mean(velocities), stats::variance(velocities)) else {
		return 0.0;
	};
	if mean == 0.0 {
		return 0.0;
	}
	1.0 / (1.0 + variance / (mean * mean))
}

/// Means of consecutive runs of `block` values. The last run absorbs any remainder.
fn block_means(values: &[f32], block: usize) -> Vec<f32> {
	let block = block.max(1);
	let count = (values.len() / block).max(1);
	(0..count)
		.filter_map(|i| {
			let end = if i + 1 == count { values.len() } else { (i + 1) * block };
			values.get(i * block..end).and_then(stats::mean)
		})
		.collect()
}

fn angular_smoothness(points: &[Point], target: &TargetCircle) -> f32 {
	let min_distance = CENTER_DEAD_ZONE * target.radius();
	let unwrapped = unwrap_angles(
		points
			.iter()
			.filter(|p| p.distance(target.center()) >= min_distance)
			.map(|&p| target.angle_of(p)),
	);
	if unwrapped.len() < 2 {
		return 0.0;
	}

	let coverage = angular_coverage(&unwrapped);

	// Averaging over blocks keeps per-sample jitter from reading as reversals.
	let positions = block_means(&unwrapped, (unwrapped.len() / VELOCITY_BLOCKS).max(1));
	let velocities: Vec<f32> = positions.iter().tuple_windows().map(|(a, b)| b - a).collect();

	let smoothness = coverage * direction_consistency(&velocities) * sweep_uniformity(&velocities);
	percentage(100.0 * smoothness)
}

/// Gap, as a fraction of the radius, still treated as closed.
///
/// Evenly sampled loops that do not repeat their first point end one step short of it, so the
/// slack grows with the typical distance between samples.
fn closure_slack(points: &[Point], radius: f32) -> f32 {
	let steps: Vec<f32> = points
		.iter()
		.tuple_windows()
		.map(|(a, b)| a.distance(*b))
		.collect();
	let typical = stats::trimmed_mean(&steps, DEVIATION_TRIM).unwrap_or(0.0);
	(CLOSURE_STEPS * typical / radius).clamp(CLOSURE_SLACK, MAX_CLOSURE_SLACK)
}

fn completion_offset(points: &[Point], target: &TargetCircle) -> f32 {
	let (Some(first), Some(last)) = (points.first(), points.last()) else {
		return 0.0;
	};
	let gap = first.distance(*last) / target.radius();
	let slack = closure_slack(points, target.radius());
	let open = (gap - slack).max(0.0) / (CLOSURE_LIMIT - slack);
	percentage(100.0 * (1.0 - open))
}
