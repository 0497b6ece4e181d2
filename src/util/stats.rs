use ordered_float::OrderedFloat;

pub fn mean(data: &[f32]) -> Option<f32> {
	match data.len() {
		0 => None,
		count => Some(data.iter().map(|&v| v as f64).sum::<f64>() as f32 / count as f32),
	}
}

/// Population variance.
pub fn variance(data: &[f32]) -> Option<f32> {
	let data_mean = mean(data)?;
	let sum = data
		.iter()
		.map(|&value| {
			let diff = (value - data_mean) as f64;
			diff * diff
		})
		.sum::<f64>();
	Some((sum / data.len() as f64) as f32)
}

/// Mean after discarding `fraction` of the samples from each end of the sorted data.
///
/// Falls back to the plain mean when trimming would leave nothing.
pub fn trimmed_mean(data: &[f32], fraction: f32) -> Option<f32> {
	let mut sorted = data.to_vec();
	sorted.sort_by_key(|&v| OrderedFloat(v));
	let trim = (sorted.len() as f32 * fraction.clamp(0.0, 0.5)).floor() as usize;
	match sorted.get(trim..sorted.len().saturating_sub(trim)) {
		Some(kept) if !kept.is_empty() => mean(kept),
		_ => mean(&sorted),
	}
}
