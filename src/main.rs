use std::f32::consts::TAU;

use enso::engine::{score, DrawingSession, ScoreResult};
use enso::{Settings, TargetCircle};
use glam::Vec2;

#[derive(thiserror::Error, Debug)]
#[error("no global tracing subscriber set")]
struct NoTracingSubscriber;

fn configure_tracing() -> anyhow::Result<()> {
	let result = Err(NoTracingSubscriber);

	let result = result.or_else(|_| {
		let max_level = if cfg!(debug_assertions) {
			tracing::Level::DEBUG
		} else {
			tracing::Level::INFO
		};
		tracing::subscriber::set_global_default(
			tracing_subscriber::FmtSubscriber::builder()
				.with_max_level(max_level)
				.finish(),
		)
	});

	Ok(result?)
}

const SAMPLE_INTERVAL_MS: f64 = 1000.0 / 120.0;
const SAMPLES_PER_FRAME: usize = 2;
const SAMPLES_PER_LOOP: usize = 240;

/// Replays one synthetic loop around `target` through a capture session and scores it.
///
/// `wobble` is the maximum radial jitter in device units.
fn replay(
	session: &mut DrawingSession,
	target: &TargetCircle,
	rng: &mut fastrand::Rng,
	wobble: f32,
) -> anyhow::Result<ScoreResult> {
	let start = rng.f32() * TAU;
	for i in 0..=SAMPLES_PER_LOOP {
		let theta = start + TAU * i as f32 / SAMPLES_PER_LOOP as f32;
		let radius = target.radius() + wobble * (2.0 * rng.f32() - 1.0);
		let p = target.center() + radius * Vec2::from_angle(theta);
		let t_ms = i as f64 * SAMPLE_INTERVAL_MS;
		let ingest = if i == 0 {
			session.begin(p.x, p.y, t_ms)
		} else {
			session.extend(p.x, p.y, t_ms)
		};
		if !ingest.is_stored() {
			tracing::warn!(?ingest, i, "sample not stored");
		}
		if i % SAMPLES_PER_FRAME == 0 {
			if let Some(preview) = session.on_frame() {
				tracing::trace!(points = preview.len(), "preview updated");
			}
		}
	}

	let motion = session.motion();
	let stroke = session.finish()?;
	tracing::debug!(
		points = stroke.len(),
		speed = motion.speed_ema,
		quality = motion.quality_ema,
		"captured stroke"
	);
	Ok(score(&stroke, target, session.settings().tolerance)?)
}

fn main() -> anyhow::Result<()> {
	if let Err(error) = configure_tracing() {
		// We can technically continue without logging.
		eprintln!("{error}");
	}

	let settings = Settings::builder().build()?;
	let target = TargetCircle::new(Vec2::new(400.0, 300.0), 150.0)?;
	let mut session = DrawingSession::new(settings);
	let mut rng = fastrand::Rng::with_seed(7);

	for (name, wobble) in [("steady", 2.0), ("shaky", 25.0)] {
		let result = replay(&mut session, &target, &mut rng, wobble)?;
		let subscores = result.subscores;
		tracing::info!(round = name, overall = result.overall, "round scored");
		println!(
			"{name:>6}: overall {:5.1}  deviation {:5.1}  angular {:5.1}  completion {:5.1}  (good {}, medium {}, poor {})",
			result.overall,
			subscores.stroke_deviation,
			subscores.angular_smoothness,
			subscores.completion_offset,
			result.feedback.good,
			result.feedback.medium,
			result.feedback.poor,
		);
	}
	Ok(())
}
