//! Windowed gait-quality analysis.

use rand::Rng;

use stridesense_events::{AccelSample, GaitMetrics};

use crate::MonitorConfig;

/// Batch analyzer producing one [`GaitMetrics`] snapshot per window.
///
/// Keeps its own cumulative step count, found with a 3-sample local-maximum
/// test debounced to one step per spacing interval. This is deliberately
/// independent of [`crate::StepDetector`]'s streaming count: the two
/// algorithms disagree on noisy input and both remain observable.
#[derive(Debug)]
pub struct GaitAnalyzer {
    step_count: u64,
    /// First analyzed sample timestamp; anchors the session-elapsed clock.
    session_start: Option<i64>,
    last_step_time: i64,
    peak_threshold: f64,
    step_spacing_ms: i64,
    min_window: usize,
}

impl GaitAnalyzer {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            step_count: 0,
            session_start: None,
            last_step_time: 0,
            peak_threshold: config.gait_peak_threshold,
            step_spacing_ms: config.gait_step_spacing_ms,
            min_window: config.min_gait_window,
        }
    }

    /// Analyze one window of accelerometer samples, oldest first.
    ///
    /// Returns `None` for windows too short to score. The newest sample's
    /// timestamp stands in for "now" when computing session cadence, so the
    /// analyzer stays on the host timeline.
    pub fn analyze(&mut self, window: &[AccelSample]) -> Option<GaitMetrics> {
        if window.len() < self.min_window {
            return None;
        }
        let first = window.first()?;
        let last = window.last()?;

        if self.session_start.is_none() {
            self.session_start = Some(first.timestamp);
        }

        self.update_step_count(window);

        let magnitudes: Vec<f64> = window.iter().map(|s| s.magnitude).collect();
        let lateral: Vec<f64> = window.iter().map(|s| s.x.abs()).collect();
        let vertical: Vec<f64> = window.iter().map(|s| s.z.abs()).collect();

        let mean_magnitude = mean(&magnitudes);
        let now = last.timestamp;

        let metrics = GaitMetrics {
            speed: (mean_magnitude * 0.1).clamp(0.0, 3.0),
            cadence: self.cadence(now),
            step_length: (50.0 + mean_magnitude * 2.0).clamp(40.0, 80.0),
            rhythm: (100.0 - spread(&magnitudes) * 10.0).clamp(0.0, 100.0),
            symmetry: (100.0 - spread(&lateral) * 20.0).clamp(0.0, 100.0),
            stability: (100.0 - spread(&vertical) * 15.0).clamp(0.0, 100.0),
            // Placeholder estimate in the typical range; double support is
            // not derivable from a single wrist/hand accelerometer here.
            double_support: rand::thread_rng().gen_range(10.0..15.0),
        };

        tracing::debug!(
            steps = self.step_count,
            cadence = metrics.cadence,
            rhythm = metrics.rhythm,
            "gait window analyzed"
        );

        Some(metrics)
    }

    /// Count local magnitude maxima above the threshold, at most one per
    /// spacing interval.
    fn update_step_count(&mut self, window: &[AccelSample]) {
        for i in 1..window.len().saturating_sub(1) {
            let current = &window[i];
            if current.magnitude > window[i - 1].magnitude
                && current.magnitude > window[i + 1].magnitude
                && current.magnitude > self.peak_threshold
                && current.timestamp - self.last_step_time > self.step_spacing_ms
            {
                self.step_count += 1;
                self.last_step_time = current.timestamp;
            }
        }
    }

    /// Whole steps per minute since the session's first analyzed sample.
    fn cadence(&self, now: i64) -> f64 {
        let Some(start) = self.session_start else {
            return 0.0;
        };
        let minutes = (now - start) as f64 / 60_000.0;
        if minutes > 0.0 {
            (self.step_count as f64 / minutes).round()
        } else {
            0.0
        }
    }

    pub fn reset(&mut self) {
        self.step_count = 0;
        self.session_start = None;
        self.last_step_time = 0;
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
fn spread(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> GaitAnalyzer {
        GaitAnalyzer::new(&MonitorConfig::default())
    }

    /// Samples every 100 ms with the given magnitudes on the x axis.
    fn window_from(magnitudes: &[f64]) -> Vec<AccelSample> {
        magnitudes
            .iter()
            .enumerate()
            .map(|(i, &m)| AccelSample::new(m, 0.0, 0.0, 1000 + i as i64 * 100))
            .collect()
    }

    #[test]
    fn test_flat_window_scores_perfect_consistency() {
        let mut analyzer = analyzer();
        let window = window_from(&[1.0; 100]);

        let metrics = analyzer.analyze(&window).expect("snapshot");

        // No value exceeds the peak threshold, so no steps and no cadence.
        assert_eq!(analyzer.step_count(), 0);
        assert_eq!(metrics.cadence, 0.0);
        // Zero variance everywhere scores 100 across the board.
        assert_eq!(metrics.rhythm, 100.0);
        assert_eq!(metrics.symmetry, 100.0);
        assert_eq!(metrics.stability, 100.0);
        assert!((metrics.speed - 0.1).abs() < 1e-9);
        assert!((metrics.step_length - 52.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_window_is_skipped() {
        let mut analyzer = analyzer();
        let window = window_from(&[1.0; 49]);
        assert!(analyzer.analyze(&window).is_none());
        assert_eq!(analyzer.step_count(), 0);
    }

    #[test]
    fn test_local_maxima_counted_with_debounce() {
        let mut analyzer = analyzer();

        // Peaks at samples 5, 7, and 12: 200 ms apart the middle one is
        // inside the spacing interval, 500 ms later the third one counts.
        let mut magnitudes = vec![1.0; 50];
        magnitudes[5] = 3.0;
        magnitudes[7] = 3.0;
        magnitudes[12] = 3.0;

        analyzer.analyze(&window_from(&magnitudes));
        assert_eq!(analyzer.step_count(), 2);
    }

    #[test]
    fn test_step_count_accumulates_across_windows() {
        let mut analyzer = analyzer();

        let mut magnitudes = vec![1.0; 50];
        magnitudes[25] = 3.0;
        analyzer.analyze(&window_from(&magnitudes));
        assert_eq!(analyzer.step_count(), 1);

        // Second window is far enough in the future for its peak to count.
        let later: Vec<AccelSample> = window_from(&magnitudes)
            .into_iter()
            .map(|s| AccelSample::new(s.x, s.y, s.z, s.timestamp + 60_000))
            .collect();
        analyzer.analyze(&later);
        assert_eq!(analyzer.step_count(), 2);
    }

    #[test]
    fn test_cadence_counts_steps_per_elapsed_minute() {
        let mut analyzer = analyzer();

        // One clean peak per 500 ms over a 10-second window: 19 interior
        // peaks, 9.9 elapsed seconds => round(19 / 0.165) = 115.
        let mut magnitudes = vec![0.5; 100];
        for i in (5..100).step_by(5) {
            magnitudes[i] = 3.0;
        }
        let metrics = analyzer.analyze(&window_from(&magnitudes)).expect("snapshot");

        assert_eq!(analyzer.step_count(), 19);
        assert_eq!(metrics.cadence, 115.0);
    }

    #[test]
    fn test_double_support_stays_in_placeholder_range() {
        let mut analyzer = analyzer();
        let window = window_from(&[1.0; 100]);

        for _ in 0..20 {
            let metrics = analyzer.analyze(&window).expect("snapshot");
            assert!((10.0..15.0).contains(&metrics.double_support));
        }
    }

    #[test]
    fn test_reset_clears_count_and_clock() {
        let mut analyzer = analyzer();

        let mut magnitudes = vec![1.0; 50];
        magnitudes[25] = 3.0;
        analyzer.analyze(&window_from(&magnitudes));
        assert_eq!(analyzer.step_count(), 1);

        analyzer.reset();
        assert_eq!(analyzer.step_count(), 0);

        // After reset the same window counts again from scratch.
        analyzer.analyze(&window_from(&magnitudes));
        assert_eq!(analyzer.step_count(), 1);
    }
}
