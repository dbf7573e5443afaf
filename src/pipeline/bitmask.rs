use crate::error::CleanError;

/// Error assigned to flagged pixels so they contribute negligible weight to
/// the continuum fit without being removed from the array.
pub const SENTINEL_ERROR: f64 = 1e10;

/// Highest bit position a quality bitmask can carry.
pub const MAX_BIT: u8 = 14;

// ---------------------------------------------------------------------------
// BadPixelSpec – which bitmask bits mark a pixel unusable
// ---------------------------------------------------------------------------

/// Fixed bitset over bit positions 0–14 selecting which quality flags mark a
/// pixel as bad.
///
/// The default marks the survey pipeline's fatal flags: bits 0–7 and 12
/// (combined mask `0b1000011111111` = 4351).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadPixelSpec {
    significant: [bool; MAX_BIT as usize + 1],
}

impl Default for BadPixelSpec {
    fn default() -> Self {
        let mut spec = Self::empty();
        for bit in 0..=7 {
            spec.mark(bit);
        }
        spec.mark(12);
        spec
    }
}

impl BadPixelSpec {
    /// A spec with no significant bits: no pixel is ever flagged.
    pub fn empty() -> Self {
        Self {
            significant: [false; MAX_BIT as usize + 1],
        }
    }

    /// Build a spec from an explicit list of significant bit positions.
    /// Positions above [`MAX_BIT`] are ignored.
    pub fn from_bits(bits: impl IntoIterator<Item = u8>) -> Self {
        let mut spec = Self::empty();
        for bit in bits {
            spec.mark(bit);
        }
        spec
    }

    /// Mark one bit position as significant.
    pub fn mark(&mut self, bit: u8) {
        if bit <= MAX_BIT {
            self.significant[bit as usize] = true;
        }
    }

    /// OR of `2^bit` over all significant bits – the single mask tested
    /// against each pixel.
    pub fn combined_mask(&self) -> u32 {
        self.significant
            .iter()
            .enumerate()
            .filter(|(_, &on)| on)
            .fold(0u32, |mask, (bit, _)| mask | (1 << bit))
    }
}

// ---------------------------------------------------------------------------
// Error inflation
// ---------------------------------------------------------------------------

/// Return a new error array where every pixel whose bitmask intersects the
/// spec's combined mask is set to [`SENTINEL_ERROR`]; all other entries pass
/// through unchanged.
///
/// One `&` per pixel against the precomputed mask; applying the inflation
/// twice with the same spec gives the same result as once.
pub fn inflate_errors(
    errors: &[f64],
    bitmask: &[u32],
    spec: &BadPixelSpec,
) -> Result<Vec<f64>, CleanError> {
    if errors.len() != bitmask.len() {
        return Err(CleanError::ShapeMismatch {
            what: "bitmask",
            expected: errors.len(),
            actual: bitmask.len(),
        });
    }
    let mask = spec.combined_mask();
    Ok(errors
        .iter()
        .zip(bitmask)
        .map(|(&err, &flags)| if flags & mask != 0 { SENTINEL_ERROR } else { err })
        .collect())
}
