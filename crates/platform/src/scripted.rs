//! Scripted in-memory motion source for tests and demos.

use std::sync::{Arc, Mutex};

use crate::{MotionHandler, MotionReading, MotionSource, SensorAvailability};

/// Describes the platform a `ScriptedSource` pretends to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceProfile {
    /// Host exposes a motion event stream.
    pub has_motion: bool,
    /// Host exposes an orientation event stream.
    pub has_orientation: bool,
    /// Access sits behind a permission prompt.
    pub gated: bool,
    /// Outcome of the motion permission prompt.
    pub grant_motion: bool,
    /// Outcome of the orientation permission prompt.
    pub grant_orientation: bool,
}

impl Default for SourceProfile {
    fn default() -> Self {
        // An ungated device with both sensors, the common Android shape.
        Self {
            has_motion: true,
            has_orientation: true,
            gated: false,
            grant_motion: true,
            grant_orientation: true,
        }
    }
}

impl SourceProfile {
    /// Gated platform where the user grants every prompt.
    pub fn gated_granted() -> Self {
        Self {
            gated: true,
            ..Default::default()
        }
    }

    /// Gated platform where the user refuses the motion prompt.
    pub fn gated_denied() -> Self {
        Self {
            gated: true,
            grant_motion: false,
            grant_orientation: false,
            ..Default::default()
        }
    }

    /// Host with no motion API at all.
    pub fn unsupported() -> Self {
        Self {
            has_motion: false,
            has_orientation: false,
            gated: false,
            grant_motion: false,
            grant_orientation: false,
        }
    }
}

/// In-memory `MotionSource` driven by the test or demo itself.
///
/// Clones share the handler slot, so one clone can be handed to a monitor
/// while another delivers readings into it.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    profile: SourceProfile,
    handler: Arc<Mutex<Option<MotionHandler>>>,
}

impl ScriptedSource {
    pub fn new(profile: SourceProfile) -> Self {
        Self {
            profile,
            handler: Arc::new(Mutex::new(None)),
        }
    }

    /// Synchronously deliver one reading to the attached handler, if any.
    pub fn deliver(&self, reading: MotionReading) {
        let handler = {
            let Ok(guard) = self.handler.lock() else {
                return;
            };
            guard.clone()
        };
        if let Some(handler) = handler {
            handler(reading);
        } else {
            tracing::trace!("reading delivered with no handler attached");
        }
    }

    /// Whether a handler is currently attached.
    pub fn is_attached(&self) -> bool {
        self.handler.lock().map(|g| g.is_some()).unwrap_or(false)
    }
}

#[async_trait::async_trait]
impl MotionSource for ScriptedSource {
    async fn check_availability(&self) -> SensorAvailability {
        let permissions = if !self.profile.has_motion {
            false
        } else if self.profile.gated {
            // The gate exists, so probing availability requests the grant.
            self.profile.grant_motion
        } else {
            self.profile.has_motion
        };

        SensorAvailability {
            motion: self.profile.has_motion,
            orientation: self.profile.has_orientation,
            permissions,
        }
    }

    async fn request_permissions(&self) -> bool {
        if !self.profile.gated {
            return true;
        }
        if !self.profile.grant_motion {
            return false;
        }
        if self.profile.has_orientation {
            return self.profile.grant_orientation;
        }
        true
    }

    fn attach(&mut self, handler: MotionHandler) {
        if let Ok(mut guard) = self.handler.lock() {
            *guard = Some(handler);
        }
    }

    fn detach(&mut self) {
        if let Ok(mut guard) = self.handler.lock() {
            *guard = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::new_handler;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_ungated_platform_grants_immediately() {
        let source = ScriptedSource::default();
        assert!(source.request_permissions().await);

        let availability = source.check_availability().await;
        assert!(availability.motion);
        assert!(availability.permissions);
    }

    #[tokio::test]
    async fn test_gated_denial_collapses_to_false() {
        let source = ScriptedSource::new(SourceProfile::gated_denied());
        assert!(!source.request_permissions().await);

        let availability = source.check_availability().await;
        assert!(availability.motion);
        assert!(!availability.permissions);
    }

    #[tokio::test]
    async fn test_gated_orientation_refusal_fails_the_pair() {
        let source = ScriptedSource::new(SourceProfile {
            gated: true,
            grant_orientation: false,
            ..Default::default()
        });
        assert!(!source.request_permissions().await);
    }

    #[tokio::test]
    async fn test_unsupported_platform() {
        let source = ScriptedSource::new(SourceProfile::unsupported());
        let availability = source.check_availability().await;
        assert!(!availability.motion);
        assert!(!availability.permissions);
    }

    #[test]
    fn test_deliver_reaches_attached_handler() {
        let mut source = ScriptedSource::default();
        let feeder = source.clone();

        let seen = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&seen);
        source.attach(new_handler(move |_| {
            counted.fetch_add(1, Ordering::SeqCst);
        }));

        feeder.deliver(MotionReading::at(1).with_acceleration(0.0, 0.0, 1.0));
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        source.detach();
        feeder.deliver(MotionReading::at(2).with_acceleration(0.0, 0.0, 1.0));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(!source.is_attached());
    }
}
