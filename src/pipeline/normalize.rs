use log::debug;

use crate::data::model::{ContinuumReference, NormalizedSpectrum, StarSpectrum};
use crate::error::CleanError;
use crate::pipeline::bitmask::{inflate_errors, BadPixelSpec};
use crate::pipeline::interval::Interval;
use crate::pipeline::matching::nearest_indices;
use crate::pipeline::polynomial::ContinuumFit;

// ---------------------------------------------------------------------------
// Continuum normalization – the pipeline orchestrator
// ---------------------------------------------------------------------------

/// How one normalization run is parameterized.
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Wavelength window everything is restricted to.
    pub interval: Interval,
    /// Which bitmask bits mark a pixel as bad.
    pub bad_pixels: BadPixelSpec,
    /// Continuum polynomial degree.  The default of 2 reflects a
    /// locally-smooth continuum over a survey detector window.
    pub degree: usize,
}

impl NormalizeConfig {
    pub fn new(interval: Interval) -> Self {
        Self {
            interval,
            bad_pixels: BadPixelSpec::default(),
            degree: 2,
        }
    }
}

/// Produce the continuum-normalized spectrum of one star.
///
/// Stages, in order: validate the input arrays, inflate the errors of
/// bitmask-flagged pixels, crop spectrum and reference to the window, match
/// each continuum wavelength to its nearest spectrum pixel, fit a weighted
/// polynomial through those anchors over the full cropped wavelength range,
/// and divide flux and errors by the evaluated model.
///
/// Flagged pixels stay in the output at their index; their sentinel errors
/// give them ~1e-10 weight in the fit, which excludes them from the
/// continuum model without breaking array alignment.
pub fn normalize(
    star: &StarSpectrum,
    reference: &ContinuumReference,
    config: &NormalizeConfig,
) -> Result<NormalizedSpectrum, CleanError> {
    star.validate()?;
    let errors = inflate_errors(&star.errors, &star.bitmask, &config.bad_pixels)?;

    let cut = config.interval.indices_within(&star.wavelength);
    if cut.is_empty() {
        return Err(CleanError::EmptyInterval {
            low: config.interval.low,
            high: config.interval.high,
        });
    }
    let wavelength = &star.wavelength[cut.clone()];
    let flux = &star.flux[cut.clone()];
    let errors = &errors[cut];

    let continuum_all = reference.continuum_wavelengths();
    let cont_cut = config.interval.indices_within(&continuum_all);
    let continuum = &continuum_all[cont_cut];
    debug!(
        "normalize: interval ({}, {}), {} pixels, {} continuum anchors",
        config.interval.low,
        config.interval.high,
        wavelength.len(),
        continuum.len()
    );

    // anchor triples: the spectrum pixel nearest each continuum wavelength
    let anchors = nearest_indices(continuum, wavelength)?;
    let anchor_w: Vec<f64> = anchors.iter().map(|&i| wavelength[i]).collect();
    let anchor_flux: Vec<f64> = anchors.iter().map(|&i| flux[i]).collect();
    let anchor_weights: Vec<f64> = anchors.iter().map(|&i| 1.0 / errors[i]).collect();

    // the fitting window is the full cropped range, not the anchor span,
    // so fit and evaluation share one basis mapping
    let window = (wavelength[0], wavelength[wavelength.len() - 1]);
    let fit = ContinuumFit::fit(&anchor_w, &anchor_flux, &anchor_weights, window, config.degree)?;

    let mut norm_flux = Vec::with_capacity(wavelength.len());
    let mut norm_errors = Vec::with_capacity(wavelength.len());
    for ((&w, &f), &e) in wavelength.iter().zip(flux).zip(errors) {
        let model = fit.eval(w);
        if model == 0.0 || !model.is_finite() {
            return Err(CleanError::DegenerateFit {
                reason: format!("continuum model is {model} at wavelength {w}"),
            });
        }
        norm_flux.push(f / model);
        norm_errors.push(e / model);
    }

    Ok(NormalizedSpectrum {
        wavelength: wavelength.to_vec(),
        flux: norm_flux,
        errors: norm_errors,
    })
}
