use core::f32;
use glam::Vec2;

use crate::config::ConfigError;

/// A device-space coordinate.
pub type Point = Vec2;

/// Wraps an angle into `[-π, π)`.
pub fn normalize_angle(theta: f32) -> f32 {
	(theta + f32::consts::PI).rem_euclid(f32::consts::TAU) - f32::consts::PI
}

/// Wraps an angle into `[0, 2π)`.
pub fn positive_angle(theta: f32) -> f32 {
	theta.rem_euclid(f32::consts::TAU)
}

pub fn is_finite_point(point: Point) -> bool {
	point.x.is_finite() && point.y.is_finite()
}

/// The reference circle a stroke is traced against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetCircle {
	center: Point,
	radius: f32,
}

impl TargetCircle {
	pub fn new(center: Point, radius: f32) -> Result<Self, ConfigError> {
		if !is_finite_point(center) {
			Err(ConfigError::InvalidCenter(center))?;
		}
		if !(radius.is_finite() && radius > 0.0) {
			Err(ConfigError::InvalidRadius(radius))?;
		}
		Ok(Self { center, radius })
	}

	pub fn center(&self) -> Point {
		self.center
	}

	pub fn radius(&self) -> f32 {
		self.radius
	}

	/// Absolute difference between the point's distance from the center and the radius.
	pub fn radial_deviation(&self, point: Point) -> f32 {
		(point.distance(self.center) - self.radius).abs()
	}

	/// Signed angle of the point around the center, in `(-π, π]`.
	pub fn angle_of(&self, point: Point) -> f32 {
		let d = point - self.center;
		d.y.atan2(d.x)
	}

	/// Point on the circle at angle `theta`.
	pub fn point_at(&self, theta: f32) -> Point {
		self.center + self.radius * Vec2::from_angle(theta)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;

	#[test]
	fn normalize_angle_wraps() {
		assert_abs_diff_eq!(normalize_angle(0.0), 0.0);
		assert_abs_diff_eq!(normalize_angle(f32::consts::TAU), 0.0, epsilon = 1e-6);
		assert_abs_diff_eq!(
			normalize_angle(1.5 * f32::consts::PI),
			-0.5 * f32::consts::PI,
			epsilon = 1e-6
		);
		assert_abs_diff_eq!(
			normalize_angle(-1.5 * f32::consts::PI),
			0.5 * f32::consts::PI,
			epsilon = 1e-6
		);
	}

	#[test]
	fn target_circle_rejects_degenerate_parameters() {
		assert!(matches!(
			TargetCircle::new(Vec2::ZERO, 0.0),
			Err(ConfigError::InvalidRadius(_))
		));
		assert!(matches!(
			TargetCircle::new(Vec2::ZERO, -3.0),
			Err(ConfigError::InvalidRadius(_))
		));
		assert!(matches!(
			TargetCircle::new(Vec2::ZERO, f32::NAN),
			Err(ConfigError::InvalidRadius(_))
		));
		assert!(matches!(
			TargetCircle::new(Vec2::new(f32::INFINITY, 0.0), 10.0),
			Err(ConfigError::InvalidCenter(_))
		));
	}

	#[test]
	fn circle_relative_measurements() {
		let circle = TargetCircle::new(Vec2::new(200.0, 200.0), 100.0).unwrap();
		assert_abs_diff_eq!(circle.radial_deviation(Vec2::new(300.0, 200.0)), 0.0);
		assert_abs_diff_eq!(circle.radial_deviation(Vec2::new(200.0, 200.0)), 100.0);
		assert_abs_diff_eq!(circle.radial_deviation(Vec2::new(200.0, 320.0)), 20.0);
		assert_abs_diff_eq!(circle.angle_of(Vec2::new(200.0, 300.0)), f32::consts::FRAC_PI_2);
		assert_abs_diff_eq!(circle.angle_of(Vec2::new(100.0, 200.0)), f32::consts::PI);
		let p = circle.point_at(f32::consts::FRAC_PI_2);
		assert_abs_diff_eq!(p.x, 200.0, epsilon = 1e-3);
		assert_abs_diff_eq!(p.y, 300.0, epsilon = 1e-3);
	}
}
