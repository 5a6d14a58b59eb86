//! Motion-sensing gait analysis core.
//!
//! Converts raw accelerometer/gyroscope readings into two real-time signals
//! used for fall-risk assessment:
//! - Discrete step events from a streaming peak-crossing detector
//! - Windowed gait-quality metrics (speed, cadence, rhythm, symmetry,
//!   stability, step length, double-support fraction)
//!
//! `SensorMonitor` owns the session lifecycle: it negotiates sensor
//! permission with a [`stridesense_platform::MotionSource`], feeds every
//! delivered reading through bounded histories and both analyzers, and
//! dispatches results through a [`stridesense_events::SensorCallbacks`] set.

mod config;
mod gait;
mod history;
mod session;
mod step;

pub use config::MonitorConfig;
pub use gait::GaitAnalyzer;
pub use history::SampleHistory;
pub use session::{CurrentData, SensorMonitor};
pub use step::StepDetector;

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("motion sensors are not available on this platform")]
    UnsupportedPlatform,
    #[error("motion sensor permission denied")]
    PermissionDenied,
}

pub type Result<T> = std::result::Result<T, MonitorError>;
