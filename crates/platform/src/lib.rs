//! Host motion-sensor abstraction.
//!
//! A `MotionSource` is whatever the host platform exposes for device motion:
//! it reports sensor availability, negotiates user permission where the
//! platform gates access, and delivers raw readings to an attached handler.
//! The readings carry nullable axes because hosts really do deliver partial
//! events; resolving them is the consumer's job.

mod scripted;

pub use scripted::{ScriptedSource, SourceProfile};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One axis triple from the motion stream. Any component may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisTriple {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

impl AxisTriple {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    /// All three components, or `None` if any axis is missing.
    pub fn resolve(&self) -> Option<(f64, f64, f64)> {
        Some((self.x?, self.y?, self.z?))
    }
}

/// One rotation-rate triple. Any component may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationTriple {
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub gamma: Option<f64>,
}

impl RotationTriple {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self {
            alpha: Some(alpha),
            beta: Some(beta),
            gamma: Some(gamma),
        }
    }

    /// All three components, or `None` if any axis is missing.
    pub fn resolve(&self) -> Option<(f64, f64, f64)> {
        Some((self.alpha?, self.beta?, self.gamma?))
    }
}

/// A raw host motion event: acceleration and/or rotation rate.
///
/// Either half may be absent, and any axis inside a present half may still
/// be null. Hosts deliver readings in monotonically non-decreasing
/// timestamp order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionReading {
    pub acceleration: Option<AxisTriple>,
    pub rotation_rate: Option<RotationTriple>,
    /// Timestamp in milliseconds.
    pub timestamp: i64,
}

impl MotionReading {
    pub fn at(timestamp: i64) -> Self {
        Self {
            timestamp,
            ..Default::default()
        }
    }

    /// A reading stamped with the current wall clock.
    pub fn now() -> Self {
        Self::at(chrono::Utc::now().timestamp_millis())
    }

    pub fn with_acceleration(mut self, x: f64, y: f64, z: f64) -> Self {
        self.acceleration = Some(AxisTriple::new(x, y, z));
        self
    }

    pub fn with_rotation_rate(mut self, alpha: f64, beta: f64, gamma: f64) -> Self {
        self.rotation_rate = Some(RotationTriple::new(alpha, beta, gamma));
        self
    }
}

/// What the host exposes, and whether access is granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorAvailability {
    /// Host exposes a motion event stream.
    pub motion: bool,
    /// Host exposes an orientation event stream.
    pub orientation: bool,
    /// Access is granted. On ungated platforms this mirrors `motion`.
    pub permissions: bool,
}

pub type MotionHandler = Arc<dyn Fn(MotionReading) + Send + Sync + 'static>;

pub fn new_handler<F>(f: F) -> MotionHandler
where
    F: Fn(MotionReading) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A platform motion-event source.
///
/// Permission negotiation is the only asynchronous surface; handler
/// attach/detach is synchronous, and after `detach` returns no further
/// readings are delivered.
#[async_trait::async_trait]
pub trait MotionSource: Send + Sync {
    /// Report whether motion/orientation streams exist and whether access
    /// is granted. Where the platform gates access this actively requests
    /// the grant; ungated platforms report `permissions = motion`.
    async fn check_availability(&self) -> SensorAvailability;

    /// Request motion permission, then orientation permission where the
    /// platform gates it. `true` only if everything requested was granted;
    /// `true` immediately on ungated platforms. Never panics — any failure
    /// collapses to `false`.
    async fn request_permissions(&self) -> bool;

    /// Register the handler that receives every subsequent reading.
    /// Replaces any previously attached handler.
    fn attach(&mut self, handler: MotionHandler);

    /// Remove the handler. Readings delivered after this returns are lost.
    fn detach(&mut self);
}
