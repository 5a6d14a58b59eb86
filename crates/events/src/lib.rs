//! Shared event contracts for the sensing pipeline.
//!
//! This crate defines the formal contracts (DTOs) for everything the motion
//! pipeline computes, plus the callback set through which consumers receive
//! them. Using shared types keeps the producer and the downstream dashboard
//! code from drifting apart on field names.
//!
//! Also provides the `EventSink` trait for decoupled event consumption.

mod sink;

pub use sink::{channel_sink, ChannelSink, CollectingSink, EventSink, EventSinkRef, NullSink};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single accelerometer sample.
///
/// `magnitude` is the Euclidean norm of the three axes, computed once when
/// the sample is constructed and carried with it from then on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccelSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Timestamp in milliseconds, monotonic within a session.
    pub timestamp: i64,
    /// Euclidean norm of (x, y, z), fixed at construction.
    pub magnitude: f64,
}

impl AccelSample {
    pub fn new(x: f64, y: f64, z: f64, timestamp: i64) -> Self {
        Self {
            x,
            y,
            z,
            timestamp,
            magnitude: (x * x + y * y + z * z).sqrt(),
        }
    }
}

/// A single gyroscope (rotation rate) sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationSample {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    /// Timestamp in milliseconds, monotonic within a session.
    pub timestamp: i64,
}

/// Emitted by the streaming step detector each time a step is registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEvent {
    /// Session-cumulative step count, monotonic non-decreasing.
    pub step_count: u64,
    /// Steps per minute over the recent-step window, 0 until two steps exist.
    pub cadence: f64,
    /// Timestamp (ms) of this step.
    pub last_step_time: i64,
    /// Milliseconds since the previous step, 0 for the first step.
    pub step_interval: i64,
}

/// Windowed gait-quality snapshot.
///
/// Produced once per analysis window; point-in-time only, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GaitMetrics {
    /// Walking speed estimate in m/s, clamped to 0..=3.
    pub speed: f64,
    /// Steps per minute since session start.
    pub cadence: f64,
    /// Step length estimate in cm, clamped to 40..=80.
    pub step_length: f64,
    /// Rhythm consistency score, 0..=100.
    pub rhythm: f64,
    /// Left-right balance score, 0..=100.
    pub symmetry: f64,
    /// Vertical stability score, 0..=100.
    pub stability: f64,
    /// Double-support phase percentage. Currently an estimate drawn from the
    /// typical 10-15% range, not derived from sensor data.
    pub double_support: f64,
}

/// Everything the pipeline can emit, as a single payload type for sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SensorEvent {
    Step(StepEvent),
    Gait(GaitMetrics),
    /// The latest gyroscope sample paired with the most recent accelerometer
    /// sample at the time it arrived.
    Sample {
        accel: AccelSample,
        rotation: RotationSample,
    },
    Error {
        message: String,
    },
}

pub type StepCallback = Arc<dyn Fn(StepEvent) + Send + Sync + 'static>;
pub type GaitCallback = Arc<dyn Fn(GaitMetrics) + Send + Sync + 'static>;
pub type SensorDataCallback = Arc<dyn Fn(AccelSample, RotationSample) + Send + Sync + 'static>;
pub type ErrorCallback = Arc<dyn Fn(String) + Send + Sync + 'static>;

/// The single callback set held by a monitor.
///
/// Every slot is optional; registering a new set replaces the previous one
/// wholesale. Slots are invoked synchronously at the point of computation.
#[derive(Default, Clone)]
pub struct SensorCallbacks {
    pub on_step: Option<StepCallback>,
    pub on_gait: Option<GaitCallback>,
    pub on_sensor_data: Option<SensorDataCallback>,
    pub on_error: Option<ErrorCallback>,
}

impl SensorCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_step<F>(mut self, f: F) -> Self
    where
        F: Fn(StepEvent) + Send + Sync + 'static,
    {
        self.on_step = Some(Arc::new(f));
        self
    }

    pub fn on_gait<F>(mut self, f: F) -> Self
    where
        F: Fn(GaitMetrics) + Send + Sync + 'static,
    {
        self.on_gait = Some(Arc::new(f));
        self
    }

    pub fn on_sensor_data<F>(mut self, f: F) -> Self
    where
        F: Fn(AccelSample, RotationSample) + Send + Sync + 'static,
    {
        self.on_sensor_data = Some(Arc::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(f));
        self
    }

    /// Build a set whose four slots all forward into `sink`.
    ///
    /// Bridges the single-subscriber callback model onto the sink
    /// abstraction when consumers want events on a channel instead.
    pub fn forward_to(sink: EventSinkRef) -> Self {
        let step_sink = Arc::clone(&sink);
        let gait_sink = Arc::clone(&sink);
        let sample_sink = Arc::clone(&sink);
        let error_sink = sink;
        Self::new()
            .on_step(move |event| step_sink.emit(SensorEvent::Step(event)))
            .on_gait(move |metrics| gait_sink.emit(SensorEvent::Gait(metrics)))
            .on_sensor_data(move |accel, rotation| {
                sample_sink.emit(SensorEvent::Sample { accel, rotation })
            })
            .on_error(move |message| error_sink.emit(SensorEvent::Error { message }))
    }

    /// Route an event to its slot, if that slot is populated.
    pub fn dispatch(&self, event: SensorEvent) {
        match event {
            SensorEvent::Step(step) => {
                if let Some(cb) = &self.on_step {
                    cb(step);
                }
            }
            SensorEvent::Gait(metrics) => {
                if let Some(cb) = &self.on_gait {
                    cb(metrics);
                }
            }
            SensorEvent::Sample { accel, rotation } => {
                if let Some(cb) = &self.on_sensor_data {
                    cb(accel, rotation);
                }
            }
            SensorEvent::Error { message } => {
                if let Some(cb) = &self.on_error {
                    cb(message);
                }
            }
        }
    }
}

impl std::fmt::Debug for SensorCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorCallbacks")
            .field("on_step", &self.on_step.is_some())
            .field("on_gait", &self.on_gait.is_some())
            .field("on_sensor_data", &self.on_sensor_data.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn test_magnitude_computed_at_construction() {
        let sample = AccelSample::new(3.0, 4.0, 0.0, 1000);
        assert!((sample.magnitude - 5.0).abs() < 1e-12);

        let sample = AccelSample::new(1.0, 2.0, 2.0, 1000);
        assert!((sample.magnitude - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_step_event_serialization() {
        let event = StepEvent {
            step_count: 7,
            cadence: 112.5,
            last_step_time: 123456,
            step_interval: 540,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"stepCount\":7"));
        assert!(json.contains("\"lastStepTime\":123456"));
        assert!(json.contains("\"stepInterval\":540"));
    }

    #[test]
    fn test_gait_metrics_serialization() {
        let metrics = GaitMetrics {
            speed: 1.2,
            cadence: 110.0,
            step_length: 62.0,
            rhythm: 88.0,
            symmetry: 91.0,
            stability: 85.0,
            double_support: 12.4,
        };
        let json = serde_json::to_string(&metrics).unwrap();
        assert!(json.contains("\"stepLength\":62.0"));
        assert!(json.contains("\"doubleSupport\":12.4"));
    }

    #[test]
    fn test_sensor_event_tagging() {
        let event = SensorEvent::Error {
            message: "permission denied".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"error\""));
    }

    #[test]
    fn test_dispatch_routes_to_slot() {
        let steps = Arc::new(AtomicU64::new(0));
        let counted = Arc::clone(&steps);
        let callbacks = SensorCallbacks::new().on_step(move |event| {
            counted.store(event.step_count, Ordering::SeqCst);
        });

        callbacks.dispatch(SensorEvent::Step(StepEvent {
            step_count: 3,
            cadence: 0.0,
            last_step_time: 10,
            step_interval: 0,
        }));
        // No gait slot registered: dispatch must be a silent no-op.
        callbacks.dispatch(SensorEvent::Gait(GaitMetrics {
            speed: 0.0,
            cadence: 0.0,
            step_length: 40.0,
            rhythm: 100.0,
            symmetry: 100.0,
            stability: 100.0,
            double_support: 10.0,
        }));

        assert_eq!(steps.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_forward_to_fills_all_slots() {
        let sink = Arc::new(CollectingSink::new());
        let callbacks = SensorCallbacks::forward_to(sink.clone());

        assert!(callbacks.on_step.is_some());
        assert!(callbacks.on_gait.is_some());
        assert!(callbacks.on_sensor_data.is_some());
        assert!(callbacks.on_error.is_some());

        callbacks.dispatch(SensorEvent::Error {
            message: "boom".to_string(),
        });
        assert_eq!(sink.len(), 1);
    }
}
