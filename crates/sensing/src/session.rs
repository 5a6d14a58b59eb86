//! Session lifecycle and ingestion.
//!
//! `SensorMonitor` coordinates three focused components per session:
//! - `SampleHistory`: bounded accelerometer/gyroscope histories
//! - `StepDetector`: streaming step events on every sample
//! - `GaitAnalyzer`: one gait snapshot per accumulated window
//!
//! Readings are processed synchronously inside the source's delivery call;
//! state mutation finishes and the guard is dropped before any callback
//! runs.

use std::sync::{Arc, Mutex};

use uuid::Uuid;

use stridesense_events::{AccelSample, RotationSample, SensorCallbacks, SensorEvent};
use stridesense_platform::{new_handler, MotionReading, MotionSource};

use crate::{GaitAnalyzer, MonitorConfig, MonitorError, Result, SampleHistory, StepDetector};

/// Copy of the live histories plus the session flag.
#[derive(Debug, Clone)]
pub struct CurrentData {
    pub accelerometer: Vec<AccelSample>,
    pub gyroscope: Vec<RotationSample>,
    pub active: bool,
}

struct SessionState {
    id: Uuid,
    started_at: i64,
    accel: SampleHistory<AccelSample>,
    gyro: SampleHistory<RotationSample>,
    steps: StepDetector,
    gait: GaitAnalyzer,
    config: MonitorConfig,
}

impl SessionState {
    fn new(config: MonitorConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: chrono::Utc::now().timestamp_millis(),
            accel: SampleHistory::new(config.history_capacity),
            gyro: SampleHistory::new(config.history_capacity),
            steps: StepDetector::new(&config),
            gait: GaitAnalyzer::new(&config),
            config,
        }
    }

    /// Process one raw reading; returns whatever it produced.
    fn ingest(&mut self, reading: MotionReading) -> Vec<SensorEvent> {
        let mut events = Vec::new();

        match reading.acceleration.map(|a| a.resolve()) {
            Some(Some((x, y, z))) => {
                let sample = AccelSample::new(x, y, z, reading.timestamp);
                self.accel.push(sample.clone());

                if let Some(step) = self.steps.process(&sample) {
                    events.push(SensorEvent::Step(step));
                }

                let window = self.config.gait_window as u64;
                if window > 0 && self.accel.total() % window == 0 {
                    let samples: Vec<AccelSample> =
                        self.accel.recent(self.config.gait_window).cloned().collect();
                    if let Some(metrics) = self.gait.analyze(&samples) {
                        events.push(SensorEvent::Gait(metrics));
                    }
                }
            }
            Some(None) => {
                tracing::trace!("dropping acceleration with missing axis");
            }
            None => {}
        }

        match reading.rotation_rate.map(|r| r.resolve()) {
            Some(Some((alpha, beta, gamma))) => {
                let rotation = RotationSample {
                    alpha,
                    beta,
                    gamma,
                    timestamp: reading.timestamp,
                };
                self.gyro.push(rotation.clone());

                // Live sensor feed pairs the rotation with the freshest
                // accelerometer sample; nothing to pair before one arrives.
                if let Some(accel) = self.accel.latest() {
                    events.push(SensorEvent::Sample {
                        accel: accel.clone(),
                        rotation,
                    });
                }
            }
            Some(None) => {
                tracing::trace!("dropping rotation rate with missing axis");
            }
            None => {}
        }

        events
    }
}

/// Owns the sensor session: permission negotiation, source attachment,
/// ingestion, and dispatch. At most one session is active per monitor;
/// `start` while active is an idempotent success.
pub struct SensorMonitor<S: MotionSource> {
    source: S,
    config: MonitorConfig,
    callbacks: Arc<Mutex<SensorCallbacks>>,
    session: Arc<Mutex<Option<SessionState>>>,
}

impl<S: MotionSource> SensorMonitor<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, MonitorConfig::default())
    }

    pub fn with_config(source: S, config: MonitorConfig) -> Self {
        Self {
            source,
            config,
            callbacks: Arc::new(Mutex::new(SensorCallbacks::default())),
            session: Arc::new(Mutex::new(None)),
        }
    }

    /// Register the callback set, replacing any previously registered one.
    pub fn set_callbacks(&self, callbacks: SensorCallbacks) {
        if let Ok(mut guard) = self.callbacks.lock() {
            *guard = callbacks;
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.lock().map(|g| g.is_some()).unwrap_or(false)
    }

    /// Id of the active session, if any.
    pub fn session_id(&self) -> Option<Uuid> {
        self.session
            .lock()
            .ok()
            .and_then(|g| g.as_ref().map(|s| s.id))
    }

    /// Wall-clock start instant (ms) of the active session, if any.
    pub fn started_at(&self) -> Option<i64> {
        self.session
            .lock()
            .ok()
            .and_then(|g| g.as_ref().map(|s| s.started_at))
    }

    /// Negotiate access and begin a session.
    ///
    /// Already active is an immediate success. Denial and missing-platform
    /// failures are also reported through the `on_error` slot before the
    /// error returns, and allocate nothing.
    pub async fn start(&mut self) -> Result<()> {
        if self.is_active() {
            return Ok(());
        }

        let availability = self.source.check_availability().await;
        if !availability.motion {
            return Err(self.report(MonitorError::UnsupportedPlatform));
        }
        if !availability.permissions {
            return Err(self.report(MonitorError::PermissionDenied));
        }

        let state = SessionState::new(self.config);
        tracing::info!(session_id = %state.id, "sensor session started");
        if let Ok(mut guard) = self.session.lock() {
            *guard = Some(state);
        }

        let session = Arc::clone(&self.session);
        let callbacks = Arc::clone(&self.callbacks);
        self.source.attach(new_handler(move |reading| {
            let events = {
                let Ok(mut guard) = session.lock() else {
                    return;
                };
                let Some(state) = guard.as_mut() else {
                    return;
                };
                state.ingest(reading)
            };
            if events.is_empty() {
                return;
            }

            let current = {
                let Ok(guard) = callbacks.lock() else {
                    return;
                };
                guard.clone()
            };
            for event in events {
                current.dispatch(event);
            }
        }));

        Ok(())
    }

    /// End the session. Detaches the handler before any state is torn down,
    /// so no further readings are accepted once this returns. No-op when
    /// idle.
    pub fn stop(&mut self) {
        self.source.detach();

        let Ok(mut guard) = self.session.lock() else {
            return;
        };
        if let Some(state) = guard.take() {
            tracing::info!(session_id = %state.id, "sensor session stopped");
        }
    }

    /// Snapshot of both histories and the active flag.
    pub fn current_data(&self) -> CurrentData {
        match self.session.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(state) => CurrentData {
                    accelerometer: state.accel.snapshot(),
                    gyroscope: state.gyro.snapshot(),
                    active: true,
                },
                None => CurrentData {
                    accelerometer: Vec::new(),
                    gyroscope: Vec::new(),
                    active: false,
                },
            },
            Err(_) => CurrentData {
                accelerometer: Vec::new(),
                gyroscope: Vec::new(),
                active: false,
            },
        }
    }

    fn report(&self, error: MonitorError) -> MonitorError {
        tracing::warn!(%error, "sensor session failed to start");
        let current = self
            .callbacks
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default();
        current.dispatch(SensorEvent::Error {
            message: error.to_string(),
        });
        error
    }
}
