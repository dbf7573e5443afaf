//! Continuum normalization for stellar survey spectra.
//!
//! Takes the raw per-star arrays a survey archive hands out (wavelength,
//! flux, errors, quality bitmask), inflates the errors of pixels flagged
//! bad, crops everything to a wavelength window, anchors a low-order
//! weighted polynomial on known continuum wavelengths and divides the
//! spectrum by the fitted continuum model.

pub mod data;
pub mod error;
pub mod pipeline;

pub use data::model::{ContinuumReference, NormalizedSpectrum, StarSpectrum};
pub use error::CleanError;
pub use pipeline::bitmask::{BadPixelSpec, SENTINEL_ERROR};
pub use pipeline::interval::Interval;
pub use pipeline::normalize::{normalize, NormalizeConfig};
