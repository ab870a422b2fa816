//! Frame timing for the FPS overlay.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Averages over the recent frame window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceMetrics {
    pub fps: f32,
    pub frame_time_ms: f32,
    pub min_frame_time_ms: f32,
    pub max_frame_time_ms: f32,
}

/// Ring buffer of frame durations, summarised at a fixed interval so the
/// overlay text stays readable.
pub struct PerformanceMonitor {
    frame_times: VecDeque<Duration>,
    max_samples: usize,
    current_metrics: PerformanceMetrics,
    last_update: Option<Instant>,
    update_interval: Duration,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::with_config(120, Duration::from_millis(250))
    }

    pub fn with_config(max_samples: usize, update_interval: Duration) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            frame_times: VecDeque::with_capacity(max_samples),
            max_samples,
            current_metrics: PerformanceMetrics::default(),
            last_update: None,
            update_interval,
        }
    }

    pub fn record_frame(&mut self, frame_time: Duration) {
        if self.frame_times.len() >= self.max_samples {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_time);

        let due = self
            .last_update
            .map_or(true, |last| last.elapsed() >= self.update_interval);
        if due {
            self.update_metrics();
            self.last_update = Some(Instant::now());
        }
    }

    fn update_metrics(&mut self) {
        if self.frame_times.is_empty() {
            return;
        }

        let total: Duration = self.frame_times.iter().sum();
        let average_ms = total.as_secs_f32() * 1000.0 / self.frame_times.len() as f32;

        self.current_metrics.frame_time_ms = average_ms;
        self.current_metrics.fps = if average_ms > 0.0 {
            1000.0 / average_ms
        } else {
            0.0
        };

        let extremes = (self.frame_times.iter().min(), self.frame_times.iter().max());
        if let (Some(min), Some(max)) = extremes {
            self.current_metrics.min_frame_time_ms = min.as_secs_f32() * 1000.0;
            self.current_metrics.max_frame_time_ms = max.as_secs_f32() * 1000.0;
        }
    }

    pub fn get_metrics(&self) -> &PerformanceMetrics {
        &self.current_metrics
    }

    pub fn sample_count(&self) -> usize {
        self.frame_times.len()
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}
