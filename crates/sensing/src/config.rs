use serde::{Deserialize, Serialize};

/// Tunable parameters for a monitor session.
///
/// Defaults are the reference values the gait heuristics were calibrated
/// with; tests may build custom configs, production code should not need to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitorConfig {
    /// Capacity of each sample history (accelerometer and gyroscope).
    pub history_capacity: usize,
    /// Accelerometer samples per gait-analysis window.
    pub gait_window: usize,
    /// Windows shorter than this produce no gait snapshot.
    pub min_gait_window: usize,
    /// Magnitude delta for the streaming step detector's crossing test.
    pub step_threshold: f64,
    /// Recent step timestamps kept for the live cadence estimate.
    pub cadence_window: usize,
    /// Magnitude floor a local maximum must clear in the batch step count.
    pub gait_peak_threshold: f64,
    /// Minimum ms between batch-counted steps.
    pub gait_step_spacing_ms: i64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            history_capacity: 1000,
            gait_window: 100,
            min_gait_window: 50,
            step_threshold: 1.5,
            cadence_window: 20,
            gait_peak_threshold: 1.5,
            gait_step_spacing_ms: 300,
        }
    }
}
