use crate::error::CleanError;

// ---------------------------------------------------------------------------
// Weighted polynomial continuum fit
// ---------------------------------------------------------------------------

/// A fitted low-order polynomial continuum model.
///
/// The fit variable is not the wavelength itself: the fitting window is
/// mapped onto `[-1, 1]` before building the basis, which keeps the normal
/// equations well conditioned for the narrow, large-valued wavelength ranges
/// survey spectra live on.  Evaluation applies the same mapping, so the
/// window must be the one the fit was built with – it is stored here.
#[derive(Debug, Clone)]
pub struct ContinuumFit {
    /// Coefficients in the mapped variable, lowest order first.
    coeffs: Vec<f64>,
    window: (f64, f64),
}

impl ContinuumFit {
    /// Weighted least-squares fit of a degree-`degree` polynomial to
    /// `(x, y)` points over `window = (low, high)`.
    ///
    /// Each point's residual is scaled by its weight before squaring, so a
    /// weight of `1/error` reproduces the usual inverse-variance weighting
    /// and pixels with sentinel errors contribute ~1e-20 to every sum.
    ///
    /// Fails with [`CleanError::DegenerateFit`] when fewer than `degree + 1`
    /// distinct x values are supplied or the normal equations are singular.
    pub fn fit(
        x: &[f64],
        y: &[f64],
        weights: &[f64],
        window: (f64, f64),
        degree: usize,
    ) -> Result<Self, CleanError> {
        for (what, len) in [("fit y values", y.len()), ("fit weights", weights.len())] {
            if len != x.len() {
                return Err(CleanError::ShapeMismatch {
                    what,
                    expected: x.len(),
                    actual: len,
                });
            }
        }
        let needed = degree + 1;
        let distinct = count_distinct(x);
        if distinct < needed {
            return Err(CleanError::DegenerateFit {
                reason: format!(
                    "{distinct} distinct anchor wavelengths, need at least {needed} \
                     for a degree-{degree} fit"
                ),
            });
        }
        let (low, high) = window;
        if !(high > low) {
            return Err(CleanError::DegenerateFit {
                reason: format!("fitting window ({low}, {high}) has no width"),
            });
        }

        // Normal equations in the mapped variable t ∈ [-1, 1]:
        //   A[j][k] = Σ w² t^(j+k),  b[j] = Σ w² t^j y
        let mut a = vec![vec![0.0; needed]; needed];
        let mut b = vec![0.0; needed];
        for ((&xi, &yi), &wi) in x.iter().zip(y).zip(weights) {
            let t = map_to_unit(xi, low, high);
            let w2 = wi * wi;
            let mut powers = Vec::with_capacity(2 * degree + 1);
            let mut p = 1.0;
            for _ in 0..=2 * degree {
                powers.push(p);
                p *= t;
            }
            for j in 0..needed {
                for k in 0..needed {
                    a[j][k] += w2 * powers[j + k];
                }
                b[j] += w2 * powers[j] * yi;
            }
        }

        let coeffs = solve(a, b)?;
        Ok(Self {
            coeffs,
            window,
        })
    }

    /// Evaluate the model at a wavelength via Horner on the mapped variable.
    pub fn eval(&self, wavelength: f64) -> f64 {
        let t = map_to_unit(wavelength, self.window.0, self.window.1);
        self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * t + c)
    }

    /// The fitting window this model was built over.
    pub fn window(&self) -> (f64, f64) {
        self.window
    }
}

fn map_to_unit(x: f64, low: f64, high: f64) -> f64 {
    2.0 * (x - low) / (high - low) - 1.0
}

fn count_distinct(x: &[f64]) -> usize {
    let mut sorted = x.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.windows(2).filter(|p| p[0] != p[1]).count() + usize::from(!sorted.is_empty())
}

/// Solve `A c = b` by Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, CleanError> {
    let n = b.len();
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&r, &s| a[r][col].abs().total_cmp(&a[s][col].abs()))
            .unwrap_or(col);
        if a[pivot_row][col].abs() < f64::EPSILON {
            return Err(CleanError::DegenerateFit {
                reason: "singular normal equations (anchors carry no usable weight \
                         or coincide in the basis)"
                    .to_string(),
            });
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut coeffs = vec![0.0; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for k in row + 1..n {
            sum -= a[row][k] * coeffs[k];
        }
        coeffs[row] = sum / a[row][row];
    }
    Ok(coeffs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-8, "{a} != {b}");
    }

    #[test]
    fn recovers_an_exact_parabola() {
        // y = 2 + 3(x - 5) + 0.5(x - 5)²  sampled exactly
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|&xi| 2.0 + 3.0 * (xi - 5.0) + 0.5 * (xi - 5.0).powi(2))
            .collect();
        let w = vec![1.0; x.len()];
        let fit = ContinuumFit::fit(&x, &y, &w, (0.0, 9.0), 2).unwrap();
        for (&xi, &yi) in x.iter().zip(&y) {
            assert_close(fit.eval(xi), yi);
        }
        // extrapolation within the same model
        assert_close(fit.eval(4.5), 2.0 + 3.0 * (-0.5) + 0.5 * 0.25);
    }

    #[test]
    fn near_zero_weight_points_are_ignored() {
        // parabola plus one wild outlier carrying sentinel-level weight
        let x = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let mut y: Vec<f64> = x.iter().map(|&xi| 1.0 + 0.1 * xi * xi).collect();
        y[2] = 1e6;
        let mut w = vec![1.0; 5];
        w[2] = 1e-10;
        let fit = ContinuumFit::fit(&x, &y, &w, (0.0, 4.0), 2).unwrap();
        assert_close(fit.eval(2.0), 1.0 + 0.4);
    }

    #[test]
    fn too_few_distinct_anchors_is_degenerate() {
        let result = ContinuumFit::fit(
            &[1.0, 1.0, 2.0],
            &[5.0, 5.0, 6.0],
            &[1.0, 1.0, 1.0],
            (1.0, 2.0),
            2,
        );
        assert!(matches!(result, Err(CleanError::DegenerateFit { .. })));
    }

    #[test]
    fn zero_width_window_is_degenerate() {
        let result = ContinuumFit::fit(
            &[1.0, 2.0, 3.0],
            &[1.0, 2.0, 3.0],
            &[1.0, 1.0, 1.0],
            (2.0, 2.0),
            2,
        );
        assert!(matches!(result, Err(CleanError::DegenerateFit { .. })));
    }

    #[test]
    fn mismatched_inputs_are_rejected() {
        let result = ContinuumFit::fit(&[1.0, 2.0], &[1.0], &[1.0, 1.0], (1.0, 2.0), 1);
        assert!(matches!(result, Err(CleanError::ShapeMismatch { .. })));
    }

    #[test]
    fn weighted_fit_follows_the_heavy_points() {
        // two populations; the heavy one defines the line
        let x = vec![0.0, 1.0, 2.0, 3.0];
        let y = vec![0.0, 1.0, 10.0, 11.0];
        let w = vec![1e3, 1e3, 1e-6, 1e-6];
        let fit = ContinuumFit::fit(&x, &y, &w, (0.0, 3.0), 1).unwrap();
        assert!((fit.eval(0.5) - 0.5).abs() < 1e-3);
    }
}
