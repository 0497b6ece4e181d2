use glam::DVec2;

use crate::config::{MAX_PRECISION, MIN_PRECISION};
use crate::geom::Point;

/// Half-window at the lowest precision.
const MAX_HALF_WINDOW: u32 = 8;

/// Number of neighbors averaged on each side of a point at the given precision.
///
/// Precision is clamped to `[MIN_PRECISION, MAX_PRECISION]`. The top of the range disables
/// smoothing entirely.
pub fn half_window(precision: u32) -> usize {
	let precision = precision.clamp(MIN_PRECISION, MAX_PRECISION);
	let slack = MAX_PRECISION - precision;
	let range = MAX_PRECISION - MIN_PRECISION;
	((slack * MAX_HALF_WINDOW + range / 2) / range) as usize
}

/// Denoises a stroke with a centered moving average.
///
/// Near either end the window shrinks symmetrically, so the first and last points are kept
/// exactly and the output has the same length and order as the input. Runs in linear time.
pub fn smooth(points: &[Point], precision: u32) -> Vec<Point> {
	let half = half_window(precision);
	if points.len() < 2 || half == 0 {
		return points.to_vec();
	}

	// prefix[i] is the sum of the first i points.
	let prefix: Vec<DVec2> = std::iter::once(DVec2::ZERO)
		.chain(points.iter().scan(DVec2::ZERO, |sum, p| {
			*sum += p.as_dvec2();
			Some(*sum)
		}))
		.collect();

	let last = points.len() - 1;
	(0..points.len())
		.map(|i| {
			let h = half.min(i).min(last - i);
			let window = prefix[i + h + 1] - prefix[i - h];
			(window / (2 * h + 1) as f64).as_vec2()
		})
		.collect()
}
