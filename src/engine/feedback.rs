use itertools::Itertools;

use crate::config::Tolerance;
use crate::geom::{Point, TargetCircle};

/// Deviation ratios below this are good.
pub const GOOD_BAND: f32 = 0.3;
/// Deviation ratios below this (and at least [`GOOD_BAND`]) are medium.
pub const MEDIUM_BAND: f32 = 0.7;

/// Severity bucket for a deviation from the target circle.
///
/// Scoring and rendering both go through [`Feedback::classify`] so a segment drawn in the
/// "good" color always counts as good in the score breakdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum Feedback {
	Good,
	Medium,
	Poor,
}

impl Feedback {
	/// `deviation_ratio` is the radial deviation divided by the tolerance band.
	pub fn classify(deviation_ratio: f32) -> Self {
		if deviation_ratio < GOOD_BAND {
			Feedback::Good
		} else if deviation_ratio < MEDIUM_BAND {
			Feedback::Medium
		} else {
			// Includes NaN.
			Feedback::Poor
		}
	}

	pub fn for_point(point: Point, target: &TargetCircle, tolerance: Tolerance) -> Self {
		Self::classify(deviation_ratio(point, target, tolerance))
	}
}

pub fn deviation_ratio(point: Point, target: &TargetCircle, tolerance: Tolerance) -> f32 {
	target.radial_deviation(point) / tolerance.band(target.radius())
}

/// One bucket per consecutive pair of points, using the mean deviation of the endpoints.
pub fn segment_feedback(
	stroke: &[Point],
	target: &TargetCircle,
	tolerance: Tolerance,
) -> Vec<Feedback> {
	stroke
		.iter()
		.map(|&p| deviation_ratio(p, target, tolerance))
		.tuple_windows()
		.map(|(a, b)| Feedback::classify(0.5 * (a + b)))
		.collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeedbackTally {
	pub good: usize,
	pub medium: usize,
	pub poor: usize,
}

impl FeedbackTally {
	pub fn total(&self) -> usize {
		self.good + self.medium + self.poor
	}

	pub fn add(&mut self, feedback: Feedback) {
		match feedback {
			Feedback::Good => self.good += 1,
			Feedback::Medium => self.medium += 1,
			Feedback::Poor => self.poor += 1,
		}
	}
}

impl FromIterator<Feedback> for FeedbackTally {
	fn from_iter<I: IntoIterator<Item = Feedback>>(iter: I) -> Self {
		iter.into_iter().fold(Self::default(), |mut tally, f| {
			tally.add(f);
			tally
		})
	}
}
