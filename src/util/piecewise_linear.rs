use ordered_float::OrderedFloat;

/// A continuous scalar function through a set of knots, constant beyond the outermost ones.
#[derive(Clone, Debug, PartialEq)]
pub struct PiecewiseLinear {
	knots: Vec<(OrderedFloat<f32>, f32)>,
}

impl PiecewiseLinear {
	/// Returns `None` if there are no knots or any coordinate is not finite.
	pub fn new(knots: impl IntoIterator<Item = (f32, f32)>) -> Option<Self> {
		let mut knots: Vec<_> = knots
			.into_iter()
			.map(|(x, y)| (x.is_finite() && y.is_finite()).then_some((OrderedFloat(x), y)))
			.collect::<Option<_>>()?;
		if knots.is_empty() {
			return None;
		}
		knots.sort_by_key(|k| k.0);
		Some(Self { knots })
	}

	pub fn evaluate(&self, x: f32) -> f32 {
		let next = self.knots.partition_point(|k| !(x < *k.0));
		match (next.checked_sub(1).map(|i| self.knots[i]), self.knots.get(next)) {
			(Some((x0, y0)), Some(&(x1, y1))) => {
				let span = *x1 - *x0;
				if span > 0.0 {
					y0 + (y1 - y0) * ((x - *x0) / span)
				} else {
					y1
				}
			}
			(Some((_, y)), None) | (None, Some(&(_, y))) => y,
			// `new` guarantees at least one knot.
			(None, None) => f32::NAN,
		}
	}

	/// True if no knot is followed by a larger value.
	pub fn is_non_increasing(&self) -> bool {
		self.knots.windows(2).all(|w| w[1].1 <= w[0].1)
	}
}
