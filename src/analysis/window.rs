// Window module - Sliding-window segmentation of a normalized series
//
// Window size and overlap are given in seconds / fraction and converted to
// sample counts using the inferred rate. Disjoint windows are the
// overlap = 0 case of the same step formula.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::NormalizedSeries;
use crate::error::AnalysisError;

/// Which sample of a window provides its x-axis time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeAnchor {
    First,
    Center,
    #[default]
    Last,
}

impl TimeAnchor {
    /// Index of the anchoring sample within `[start, end)`; `end > start`.
    pub fn index(&self, start: usize, end: usize) -> usize {
        match self {
            TimeAnchor::First => start,
            TimeAnchor::Center => start + (end - start - 1) / 2,
            TimeAnchor::Last => end - 1,
        }
    }
}

/// Half-open sample range `[start, end)` with its representative time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
    pub time: f64,
}

impl Window {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Converts window duration / overlap into sample-domain boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSegmenter {
    window_size: usize,
    step: usize,
    anchor: TimeAnchor,
}

impl WindowSegmenter {
    /// Create a segmenter for a series sampled at `rate` Hz.
    ///
    /// # Errors
    /// * `InvalidWindow` - `window_seconds` not a positive finite number
    /// * `InvalidOverlap` - `overlap_fraction` outside `[0, 1)`
    /// * `UnusableSeries` - `rate` not positive
    pub fn new(
        window_seconds: f64,
        overlap_fraction: f64,
        rate: f64,
        anchor: TimeAnchor,
    ) -> Result<Self, AnalysisError> {
        if !(window_seconds.is_finite() && window_seconds > 0.0) {
            return Err(AnalysisError::InvalidWindow { window_seconds });
        }
        if !(0.0..1.0).contains(&overlap_fraction) {
            return Err(AnalysisError::InvalidOverlap { overlap_fraction });
        }
        if !(rate.is_finite() && rate > 0.0) {
            return Err(AnalysisError::UnusableSeries {
                sample_count: 0,
                span_seconds: 0.0,
            });
        }

        let window_size = ((window_seconds * rate).round() as usize).max(1);
        let overlap = (window_size as f64 * overlap_fraction).floor() as usize;
        let step = window_size.saturating_sub(overlap).max(1);

        Ok(Self {
            window_size,
            step,
            anchor,
        })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// Number of samples shared by two consecutive full windows.
    pub fn overlap(&self) -> usize {
        self.window_size.saturating_sub(self.step)
    }

    /// Split `series` into windows starting at `0, step, 2·step, …`.
    ///
    /// The final window is truncated at the end of the series.
    pub fn segment(&self, series: &NormalizedSeries) -> Vec<Window> {
        let n = series.len();
        let samples = series.samples();

        let windows: Vec<Window> = (0..n)
            .step_by(self.step)
            .map(|start| {
                let end = start.saturating_add(self.window_size).min(n);
                Window {
                    start,
                    end,
                    time: samples[self.anchor.index(start, end)].time,
                }
            })
            .filter(|window| !window.is_empty())
            .collect();

        debug!(
            "[WindowSegmenter] {} samples -> {} windows (size={}, step={})",
            n,
            windows.len(),
            self.window_size,
            self.step
        );

        windows
    }
}
