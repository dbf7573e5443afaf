//! The spectral cleaning pipeline.
//!
//! Raw arrays flow one way through the stages:
//!
//! ```text
//! (wavelength, flux, errors, bitmask)
//!     │ bitmask   – inflate errors of flagged pixels
//!     │ interval  – crop everything to the wavelength window
//!     │ matching  – pick the spectrum pixel nearest each continuum anchor
//!     │ polynomial – weighted degree-2 fit through the anchors
//!     ▼ normalize – divide flux and errors by the fitted continuum
//! (normalized flux, normalized errors)
//! ```

pub mod bitmask;
pub mod interval;
pub mod matching;
pub mod normalize;
pub mod polynomial;

pub use bitmask::{inflate_errors, BadPixelSpec, SENTINEL_ERROR};
pub use interval::Interval;
pub use matching::{match_mask, nearest_indices};
pub use normalize::{normalize, NormalizeConfig};
pub use polynomial::ContinuumFit;
