use crate::data::model::ensure_ascending;
use crate::error::CleanError;

// ---------------------------------------------------------------------------
// Nearest-wavelength matching
// ---------------------------------------------------------------------------

/// For each continuum wavelength, the index of the closest spectrum
/// wavelength by absolute difference.
///
/// Both inputs must be strictly ascending; this is validated up front
/// because an unsorted input would produce silently wrong matches.  The
/// sweep keeps a single forward-only cursor into the spectrum axis, so the
/// whole match runs in O(n + m) rather than one binary search per query.
///
/// Tie rule: the cursor advances only while the next pixel is *strictly*
/// closer, so when two pixels are equidistant the lower index wins.
pub fn nearest_indices(continuum: &[f64], spectrum: &[f64]) -> Result<Vec<usize>, CleanError> {
    ensure_ascending(continuum, "continuum wavelengths")?;
    ensure_ascending(spectrum, "spectrum wavelengths")?;
    if continuum.is_empty() {
        return Ok(Vec::new());
    }
    if spectrum.is_empty() {
        // no index can be valid for a non-empty query set
        return Err(CleanError::EmptyMatchTarget {
            queries: continuum.len(),
        });
    }

    let mut matches = Vec::with_capacity(continuum.len());
    let mut j = 0;
    for &c in continuum {
        while j + 1 < spectrum.len() && (spectrum[j + 1] - c).abs() < (spectrum[j] - c).abs() {
            j += 1;
        }
        matches.push(j);
    }
    Ok(matches)
}

/// Boolean mask over the spectrum axis marking exactly the matched indices.
///
/// Same matcher as [`nearest_indices`], reshaped for callers that index the
/// spectrum arrays directly instead of walking the anchor list.
pub fn match_mask(continuum: &[f64], spectrum: &[f64]) -> Result<Vec<bool>, CleanError> {
    let mut mask = vec![false; spectrum.len()];
    for index in nearest_indices(continuum, spectrum)? {
        mask[index] = true;
    }
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_favor_the_lower_index() {
        let spectrum = [4000.0, 4001.0, 4002.0, 4003.0, 4004.0];
        let continuum = [4000.5, 4003.5];
        assert_eq!(nearest_indices(&continuum, &spectrum).unwrap(), vec![0, 3]);
    }

    #[test]
    fn matches_are_true_nearest_neighbors() {
        let spectrum = [1.0, 2.0, 4.0, 8.0, 16.0, 32.0];
        let continuum = [0.5, 2.9, 3.1, 11.0, 100.0];
        let matches = nearest_indices(&continuum, &spectrum).unwrap();
        for (&c, &m) in continuum.iter().zip(&matches) {
            let best = (spectrum[m] - c).abs();
            if m > 0 {
                assert!(best <= (spectrum[m - 1] - c).abs());
            }
            if m + 1 < spectrum.len() {
                assert!(best <= (spectrum[m + 1] - c).abs());
            }
        }
        assert_eq!(matches, vec![0, 1, 2, 3, 5]);
    }

    #[test]
    fn cursor_stops_at_the_last_pixel() {
        let spectrum = [1.0, 2.0];
        let continuum = [5.0, 50.0, 500.0];
        assert_eq!(nearest_indices(&continuum, &spectrum).unwrap(), vec![1, 1, 1]);
    }

    #[test]
    fn empty_continuum_gives_empty_output() {
        assert!(nearest_indices(&[], &[1.0, 2.0]).unwrap().is_empty());
    }

    #[test]
    fn empty_spectrum_axis_is_a_dedicated_error() {
        assert!(matches!(
            nearest_indices(&[1.0, 2.0], &[]),
            Err(CleanError::EmptyMatchTarget { queries: 2 })
        ));
    }

    #[test]
    fn nan_wavelengths_are_rejected() {
        assert!(matches!(
            nearest_indices(&[1.0, f64::NAN], &[1.0, 2.0]),
            Err(CleanError::UnsortedInput {
                what: "continuum wavelengths",
                index: 1,
            })
        ));
    }

    #[test]
    fn unsorted_input_fails_fast() {
        assert!(matches!(
            nearest_indices(&[2.0, 1.0], &[1.0, 2.0]),
            Err(CleanError::UnsortedInput {
                what: "continuum wavelengths",
                ..
            })
        ));
        assert!(matches!(
            nearest_indices(&[1.0], &[2.0, 2.0]),
            Err(CleanError::UnsortedInput {
                what: "spectrum wavelengths",
                ..
            })
        ));
    }

    #[test]
    fn mask_marks_exactly_the_matched_pixels() {
        let spectrum = [4000.0, 4001.0, 4002.0, 4003.0, 4004.0];
        let continuum = [4000.9, 4001.1, 4004.0];
        let mask = match_mask(&continuum, &spectrum).unwrap();
        // two anchors collapse onto pixel 1
        assert_eq!(mask, vec![false, true, false, false, true]);
    }
}
