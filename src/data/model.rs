use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CleanError;

/// Canonical pixel count of the reference instrument configuration.
pub const CANONICAL_PIXELS: usize = 8575;

// ---------------------------------------------------------------------------
// StarSpectrum – the raw per-star arrays
// ---------------------------------------------------------------------------

/// One star's raw observation: four index-aligned arrays of equal length.
///
/// `wavelength` is strictly ascending (log-spaced by the instrument grid);
/// `bitmask` packs the per-pixel quality flags of the survey pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarSpectrum {
    /// Wavelength axis, strictly ascending.
    pub wavelength: Vec<f64>,
    /// Flux per pixel – same length as `wavelength`.
    pub flux: Vec<f64>,
    /// Uncertainty per pixel – same length as `wavelength`.
    pub errors: Vec<f64>,
    /// Bit-packed quality flags per pixel – same length as `wavelength`.
    pub bitmask: Vec<u32>,
}

impl StarSpectrum {
    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.wavelength.len()
    }

    /// Whether the spectrum holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.wavelength.is_empty()
    }

    /// Check that the four arrays are aligned and the wavelength axis is
    /// strictly ascending.
    pub fn validate(&self) -> Result<(), CleanError> {
        let n = self.wavelength.len();
        for (what, len) in [
            ("flux", self.flux.len()),
            ("errors", self.errors.len()),
            ("bitmask", self.bitmask.len()),
        ] {
            if len != n {
                return Err(CleanError::ShapeMismatch {
                    what,
                    expected: n,
                    actual: len,
                });
            }
        }
        ensure_ascending(&self.wavelength, "spectrum wavelengths")
    }
}

/// Reconstruct the instrument wavelength grid from calibration header values.
///
/// The grid is linear in log space: `wavelength[i] = 10^(start + delta * i)`.
/// `start` and `delta` are the header's log10 start wavelength and per-pixel
/// log10 step.
pub fn wavelength_grid(start: f64, delta: f64, pixels: usize) -> Vec<f64> {
    (0..pixels)
        .map(|i| 10f64.powf(start + delta * i as f64))
        .collect()
}

/// Error if `values` is not finite and strictly ascending; reports the first
/// offending index.
///
/// Non-finite entries are rejected explicitly: `NaN <= x` is false for every
/// `x`, so a plain pairwise comparison would wave NaN axes through and let
/// them corrupt matching and fitting downstream.
pub(crate) fn ensure_ascending(values: &[f64], what: &'static str) -> Result<(), CleanError> {
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(CleanError::UnsortedInput { what, index });
    }
    for (i, pair) in values.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(CleanError::UnsortedInput { what, index: i + 1 });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// StarRecord – one star with its survey metadata
// ---------------------------------------------------------------------------

/// A star as the extraction stage hands it over: the raw spectrum plus the
/// survey metadata used to decide whether the observation is usable.
///
/// `labels` holds the numeric stellar parameters (signal-to-noise, effective
/// temperature, surface gravity, abundances, …) keyed by name; the pipeline
/// itself never interprets them – only [`crate::data::filter`] does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarRecord {
    /// Archive identifier (the per-star file stem in the source survey).
    pub identifier: String,
    /// Observation field or cluster name.
    pub field: String,
    /// Named numeric stellar parameters.
    pub labels: BTreeMap<String, f64>,
    /// The raw observation arrays.
    pub spectrum: StarSpectrum,
}

// ---------------------------------------------------------------------------
// ContinuumReference – persisted continuum-pixel table
// ---------------------------------------------------------------------------

/// The persisted table of wavelengths flagged as continuum, loaded once and
/// shared read-only across all stars.
#[derive(Debug, Clone)]
pub struct ContinuumReference {
    wavelength: Vec<f64>,
    is_continuum: Vec<bool>,
}

impl ContinuumReference {
    /// Build a reference from parallel columns, validating alignment and
    /// wavelength order.
    pub fn new(wavelength: Vec<f64>, is_continuum: Vec<bool>) -> Result<Self, CleanError> {
        if wavelength.len() != is_continuum.len() {
            return Err(CleanError::ShapeMismatch {
                what: "is_continuum",
                expected: wavelength.len(),
                actual: is_continuum.len(),
            });
        }
        ensure_ascending(&wavelength, "reference wavelengths")?;
        Ok(Self {
            wavelength,
            is_continuum,
        })
    }

    /// Load a reference table from disk, dispatching by file extension.
    pub fn load(path: &Path) -> Result<Self, CleanError> {
        super::reference::load_reference(path).map_err(|source| CleanError::MissingReference {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Number of table rows.
    pub fn len(&self) -> usize {
        self.wavelength.len()
    }

    /// Whether the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.wavelength.is_empty()
    }

    /// The wavelengths flagged as continuum, in ascending order.
    pub fn continuum_wavelengths(&self) -> Vec<f64> {
        self.wavelength
            .iter()
            .zip(&self.is_continuum)
            .filter(|(_, &flag)| flag)
            .map(|(&w, _)| w)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// NormalizedSpectrum – the pipeline output
// ---------------------------------------------------------------------------

/// Continuum-normalized output, restricted to the requested interval.
///
/// The wavelength axis is carried along so consumers can re-associate
/// normalized values with wavelengths without repeating the cut.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedSpectrum {
    /// Wavelengths inside the interval, ascending.
    pub wavelength: Vec<f64>,
    /// Flux divided by the fitted continuum model.
    pub flux: Vec<f64>,
    /// Errors divided by the fitted continuum model.
    pub errors: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_log_spaced_per_pixel() {
        let grid = wavelength_grid(4.179, 6e-6, 4);
        assert_eq!(grid.len(), 4);
        for (i, w) in grid.iter().enumerate() {
            let expected = 10f64.powf(4.179 + 6e-6 * i as f64);
            assert!((w - expected).abs() < 1e-9);
        }
        // strictly ascending for positive delta
        assert!(grid.windows(2).all(|p| p[1] > p[0]));
    }

    #[test]
    fn validate_rejects_misaligned_arrays() {
        let star = StarSpectrum {
            wavelength: vec![1.0, 2.0, 3.0],
            flux: vec![1.0, 1.0, 1.0],
            errors: vec![0.1, 0.1],
            bitmask: vec![0, 0, 0],
        };
        match star.validate() {
            Err(CleanError::ShapeMismatch {
                what,
                expected,
                actual,
            }) => {
                assert_eq!(what, "errors");
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_unsorted_wavelengths() {
        let star = StarSpectrum {
            wavelength: vec![1.0, 3.0, 2.0],
            flux: vec![1.0; 3],
            errors: vec![0.1; 3],
            bitmask: vec![0; 3],
        };
        assert!(matches!(
            star.validate(),
            Err(CleanError::UnsortedInput { index: 2, .. })
        ));
    }

    #[test]
    fn validate_rejects_nan_wavelengths() {
        let star = StarSpectrum {
            wavelength: vec![1.0, f64::NAN, 3.0],
            flux: vec![1.0; 3],
            errors: vec![0.1; 3],
            bitmask: vec![0; 3],
        };
        assert!(matches!(
            star.validate(),
            Err(CleanError::UnsortedInput { index: 1, .. })
        ));
    }

    #[test]
    fn reference_rejects_nan_wavelengths() {
        let result =
            ContinuumReference::new(vec![1.0, f64::NAN, 3.0], vec![true, true, true]);
        assert!(matches!(
            result,
            Err(CleanError::UnsortedInput { index: 1, .. })
        ));
    }

    #[test]
    fn reference_exposes_flagged_subset() {
        let reference = ContinuumReference::new(
            vec![100.0, 200.0, 300.0, 400.0],
            vec![true, false, true, false],
        )
        .unwrap();
        assert_eq!(reference.continuum_wavelengths(), vec![100.0, 300.0]);
    }

    #[test]
    fn reference_rejects_column_length_mismatch() {
        let result = ContinuumReference::new(vec![100.0, 200.0], vec![true]);
        assert!(matches!(result, Err(CleanError::ShapeMismatch { .. })));
    }
}
