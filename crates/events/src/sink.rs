//! Event sink abstraction for decoupled event consumption.
//!
//! The callback set delivers events synchronously on the ingestion path. A
//! sink lets a consumer take events off that path instead: collected for
//! inspection in tests, discarded, or pushed onto a channel drained at the
//! consumer's own pace.

use std::sync::{Arc, Mutex};

use crate::SensorEvent;

/// Trait for receiving pipeline events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: SensorEvent);
}

/// Type alias for shared sink reference.
pub type EventSinkRef = Arc<dyn EventSink>;

/// In-memory sink for testing.
///
/// Captures all emitted events for later inspection.
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<SensorEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all captured events.
    pub fn events(&self) -> Vec<SensorEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Get only the captured step events.
    pub fn steps(&self) -> Vec<crate::StepEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                SensorEvent::Step(step) => Some(step.clone()),
                _ => None,
            })
            .collect()
    }

    /// Get only the captured gait snapshots.
    pub fn gait_updates(&self) -> Vec<crate::GaitMetrics> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                SensorEvent::Gait(metrics) => Some(metrics.clone()),
                _ => None,
            })
            .collect()
    }

    /// Get only the captured error messages.
    pub fn errors(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                SensorEvent::Error { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Clear all captured events.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Get the number of captured events.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Check if no events have been captured.
    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: SensorEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// No-op sink that discards all events.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: SensorEvent) {
        // Intentionally empty
    }
}

/// Sink that pushes events onto a crossbeam channel.
///
/// The receiver half drains independently of the ingestion execution
/// context, so a slow consumer never adds latency to sample handling.
pub struct ChannelSink {
    sender: crossbeam_channel::Sender<SensorEvent>,
}

impl EventSink for ChannelSink {
    fn emit(&self, event: SensorEvent) {
        // A disconnected receiver just means nobody is listening anymore.
        let _ = self.sender.send(event);
    }
}

/// Create an unbounded channel sink and its receiving half.
pub fn channel_sink() -> (ChannelSink, crossbeam_channel::Receiver<SensorEvent>) {
    let (sender, receiver) = crossbeam_channel::unbounded();
    (ChannelSink { sender }, receiver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StepEvent;

    fn step(n: u64) -> SensorEvent {
        SensorEvent::Step(StepEvent {
            step_count: n,
            cadence: 0.0,
            last_step_time: n as i64 * 500,
            step_interval: 500,
        })
    }

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingSink::new();

        sink.emit(step(1));
        sink.emit(step(2));
        sink.emit(SensorEvent::Error {
            message: "oops".to_string(),
        });

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.steps().len(), 2);
        assert_eq!(sink.errors(), vec!["oops".to_string()]);
        assert!(sink.gait_updates().is_empty());
    }

    #[test]
    fn test_collecting_sink_clear() {
        let sink = CollectingSink::new();

        sink.emit(step(1));
        assert!(!sink.is_empty());

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_null_sink() {
        let sink = NullSink;
        // Should not panic
        sink.emit(step(1));
    }

    #[test]
    fn test_channel_sink_delivers_in_order() {
        let (sink, receiver) = channel_sink();

        sink.emit(step(1));
        sink.emit(step(2));

        let first = receiver.recv().unwrap();
        let second = receiver.recv().unwrap();
        assert_eq!(first, step(1));
        assert_eq!(second, step(2));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (sink, receiver) = channel_sink();
        drop(receiver);
        // Should not panic
        sink.emit(step(1));
    }
}
