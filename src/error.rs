use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Pipeline error taxonomy
// ---------------------------------------------------------------------------

/// Everything the cleaning pipeline can fail with.
///
/// Each variant carries enough context (lengths, bounds, counts) to diagnose
/// the failure without re-running the pipeline.
#[derive(Debug, Error)]
pub enum CleanError {
    /// Aligned input arrays disagree in length.
    #[error("shape mismatch: {what} has length {actual}, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A wavelength sequence is not strictly ascending.
    #[error("{what} is not strictly ascending at index {index}")]
    UnsortedInput { what: &'static str, index: usize },

    /// A wavelength window selected zero spectrum points.
    #[error("no spectrum points inside the open interval ({low}, {high})")]
    EmptyInterval { low: f64, high: f64 },

    /// A non-empty continuum query set was matched against an empty
    /// spectrum axis.
    #[error("cannot match {queries} continuum wavelengths against an empty spectrum axis")]
    EmptyMatchTarget { queries: usize },

    /// The continuum fit is underdetermined or produced an unusable model.
    #[error("degenerate continuum fit: {reason}")]
    DegenerateFit { reason: String },

    /// The persisted continuum reference table could not be loaded.
    #[error("failed to load continuum reference from {}", path.display())]
    MissingReference {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}
