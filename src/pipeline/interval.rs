use std::ops::Range;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Interval – open wavelength window
// ---------------------------------------------------------------------------

/// An open wavelength window `(low, high)`; a pixel is inside when
/// `low < wavelength < high` (both bounds strict).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

impl Interval {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Whether a single wavelength lies strictly inside the window.
    pub fn contains(&self, wavelength: f64) -> bool {
        self.low < wavelength && wavelength < self.high
    }

    /// Index range of an ascending wavelength array strictly inside the
    /// window.  Two binary searches; the range may be empty.
    ///
    /// On a sorted axis the selected indices are contiguous, so the result is
    /// a `Range` rather than an index list.
    pub fn indices_within(&self, wavelength: &[f64]) -> Range<usize> {
        let start = wavelength.partition_point(|&w| w <= self.low);
        let end = wavelength.partition_point(|&w| w < self.high);
        start..end.max(start)
    }
}
