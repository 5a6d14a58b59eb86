//! Headless demo: drives a synthetic walking waveform through the full
//! sensing pipeline and logs everything it emits.
//!
//! Run with `RUST_LOG=debug` to also see per-step detector output.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use stridesense_events::SensorCallbacks;
use stridesense_platform::{MotionReading, ScriptedSource};
use stridesense_sensing::SensorMonitor;

/// Samples per second of the synthetic stream.
const SAMPLE_RATE_HZ: i64 = 60;
/// Walk cadence of the synthetic stream, steps per second.
const STEPS_PER_SECOND: i64 = 2;
/// How much synthetic walking to generate.
const WALK_SECONDS: i64 = 10;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let source = ScriptedSource::default();
    let feeder = source.clone();
    let mut monitor = SensorMonitor::new(source);

    monitor.set_callbacks(
        SensorCallbacks::new()
            .on_step(|event| {
                tracing::info!(
                    step = event.step_count,
                    cadence = event.cadence,
                    interval_ms = event.step_interval,
                    "step",
                );
            })
            .on_gait(|metrics| {
                tracing::info!(
                    speed_mps = metrics.speed,
                    cadence = metrics.cadence,
                    step_length_cm = metrics.step_length,
                    rhythm = metrics.rhythm,
                    symmetry = metrics.symmetry,
                    stability = metrics.stability,
                    double_support_pct = metrics.double_support,
                    "gait snapshot",
                );
            })
            .on_error(|message| tracing::error!(%message, "sensor error")),
    );

    monitor.start().await?;
    tracing::info!(
        session_id = ?monitor.session_id(),
        walk_seconds = WALK_SECONDS,
        "session running, feeding synthetic walking",
    );

    let base = chrono::Utc::now().timestamp_millis();
    for i in 0..WALK_SECONDS * SAMPLE_RATE_HZ {
        feeder.deliver(synthetic_reading(base, i));
    }

    let data = monitor.current_data();
    tracing::info!(
        accel_samples = data.accelerometer.len(),
        gyro_samples = data.gyroscope.len(),
        "walk complete",
    );

    monitor.stop();
    Ok(())
}

/// One 60 Hz sample of a square-ish 2 Hz stride pattern: a hard heel-strike
/// magnitude for the first half of each step cycle, a quiet swing phase for
/// the rest, plus a mild constant rotation.
fn synthetic_reading(base_ms: i64, i: i64) -> MotionReading {
    let samples_per_step = SAMPLE_RATE_HZ / STEPS_PER_SECOND;
    let in_strike = (i % samples_per_step) < samples_per_step / 2;
    let magnitude = if in_strike { 3.0 } else { 0.5 };

    MotionReading::at(base_ms + i * 1000 / SAMPLE_RATE_HZ)
        .with_acceleration(magnitude * 0.2, magnitude * 0.1, magnitude)
        .with_rotation_rate(0.5, 0.2, 0.1)
}
