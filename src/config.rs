use bon::bon;
use glam::Vec2;

pub const MIN_PRECISION: u32 = 20;
pub const MAX_PRECISION: u32 = 100;
pub const DEFAULT_PRECISION: u32 = 60;
pub const DEFAULT_TOLERANCE: f32 = 0.15;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
	#[error("precision {0} outside [{min}, {max}]", min = MIN_PRECISION, max = MAX_PRECISION)]
	PrecisionOutOfRange(u32),

	#[error("tolerance {0} must lie strictly between 0 and 1")]
	InvalidTolerance(f32),

	#[error("radius {0} must be finite and positive")]
	InvalidRadius(f32),

	#[error("center {0} must be finite")]
	InvalidCenter(Vec2),
}

static_assertions::assert_impl_all!(ConfigError: std::error::Error, Send, Sync);

/// Smoothing precision. Higher values follow the raw input more closely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Precision(u32);

impl Precision {
	pub fn new(value: u32) -> Result<Self, ConfigError> {
		if !(MIN_PRECISION..=MAX_PRECISION).contains(&value) {
			Err(ConfigError::PrecisionOutOfRange(value))?;
		}
		Ok(Self(value))
	}

	pub fn get(self) -> u32 {
		self.0
	}
}

impl Default for Precision {
	fn default() -> Self {
		Self(DEFAULT_PRECISION)
	}
}

/// Width of the acceptable deviation band, as a fraction of the target radius.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Tolerance(f32);

impl Tolerance {
	pub fn new(fraction: f32) -> Result<Self, ConfigError> {
		if !(fraction.is_finite() && fraction > 0.0 && fraction < 1.0) {
			Err(ConfigError::InvalidTolerance(fraction))?;
		}
		Ok(Self(fraction))
	}

	pub fn fraction(self) -> f32 {
		self.0
	}

	/// The band in device units for a circle of the given radius.
	pub fn band(self, radius: f32) -> f32 {
		self.0 * radius
	}
}

impl Default for Tolerance {
	fn default() -> Self {
		Self(DEFAULT_TOLERANCE)
	}
}

/// Tunables owned by the settings collaborator and injected into a round.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Settings {
	pub precision: Precision,
	pub tolerance: Tolerance,
}

#[bon]
impl Settings {
	#[builder]
	pub fn new(
		#[builder(default = DEFAULT_PRECISION)] precision: u32,
		#[builder(default = DEFAULT_TOLERANCE)] tolerance: f32,
	) -> Result<Self, ConfigError> {
		Ok(Self {
			precision: Precision::new(precision)?,
			tolerance: Tolerance::new(tolerance)?,
		})
	}
}
