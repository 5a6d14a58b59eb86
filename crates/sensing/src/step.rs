//! Streaming step detection.

use std::collections::VecDeque;

use stridesense_events::{AccelSample, StepEvent};

use crate::MonitorConfig;

/// Single-pass peak-crossing step detector.
///
/// A sample raises the peak reference when it exceeds it by the threshold;
/// a sample falling below the reference by the same threshold registers a
/// step and re-anchors the reference at the current magnitude. There is no
/// refractory interval beyond the threshold itself, so a sufficiently noisy
/// signal can register more than one step per physical stride.
#[derive(Debug)]
pub struct StepDetector {
    last_peak: f64,
    // Tracked alongside the peak reference; the crossing test does not
    // consult it.
    last_valley: f64,
    step_count: u64,
    last_step_time: i64,
    recent_step_times: VecDeque<i64>,
    threshold: f64,
    cadence_window: usize,
}

impl StepDetector {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            last_peak: 0.0,
            last_valley: 0.0,
            step_count: 0,
            last_step_time: 0,
            recent_step_times: VecDeque::with_capacity(config.cadence_window),
            threshold: config.step_threshold,
            cadence_window: config.cadence_window,
        }
    }

    /// Feed one sample; returns the step event if this sample completed one.
    pub fn process(&mut self, sample: &AccelSample) -> Option<StepEvent> {
        let magnitude = sample.magnitude;
        let timestamp = sample.timestamp;

        if magnitude > self.last_peak + self.threshold {
            self.last_peak = magnitude;
            return None;
        }

        if magnitude < self.last_peak - self.threshold && self.last_peak > self.threshold {
            self.step_count += 1;

            self.recent_step_times.push_back(timestamp);
            if self.recent_step_times.len() > self.cadence_window {
                self.recent_step_times.pop_front();
            }

            let step_interval = if self.last_step_time > 0 {
                timestamp - self.last_step_time
            } else {
                0
            };
            self.last_step_time = timestamp;

            let cadence = self.cadence();
            self.last_peak = magnitude;

            tracing::debug!(step = self.step_count, cadence, "step detected");

            return Some(StepEvent {
                step_count: self.step_count,
                cadence,
                last_step_time: timestamp,
                step_interval,
            });
        }

        None
    }

    /// Steps per minute over the recent-step ring, 0 until two steps exist.
    fn cadence(&self) -> f64 {
        if self.recent_step_times.len() < 2 {
            return 0.0;
        }
        let (Some(first), Some(last)) = (
            self.recent_step_times.front(),
            self.recent_step_times.back(),
        ) else {
            return 0.0;
        };

        let span_ms = last - first;
        if span_ms <= 0 {
            return 0.0;
        }

        let steps = (self.recent_step_times.len() - 1) as f64;
        steps / (span_ms as f64 / 1000.0) * 60.0
    }

    pub fn reset(&mut self) {
        self.last_peak = 0.0;
        self.last_valley = 0.0;
        self.step_count = 0;
        self.last_step_time = 0;
        self.recent_step_times.clear();
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn last_peak(&self) -> f64 {
        self.last_peak
    }

    pub fn last_valley(&self) -> f64 {
        self.last_valley
    }
}
