use std::sync::Arc;

use arrow::array::{BooleanArray, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use stellar_continuum::data::model::{
    wavelength_grid, StarRecord, StarSpectrum, CANONICAL_PIXELS,
};

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Smooth synthetic continuum with a handful of absorption dips.
fn generate_flux(
    wavelengths: &[f64],
    lines: &[(f64, f64, f64)],
    noise_level: f64,
    rng: &mut SimpleRng,
) -> Vec<f64> {
    let mid = (wavelengths[0] + wavelengths[wavelengths.len() - 1]) / 2.0;
    wavelengths
        .iter()
        .map(|&w| {
            let continuum = 1.0 + 2e-5 * (w - mid) - 3e-9 * (w - mid).powi(2);
            let absorption: f64 = lines
                .iter()
                .map(|&(mu, sigma, depth)| gaussian(w, mu, sigma, depth))
                .sum();
            continuum - absorption + rng.gauss(0.0, noise_level)
        })
        .collect()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    // The full canonical log-spaced grid in the near-infrared:
    // log10(start) = 4.179, 6e-6 dex per pixel.
    let pixels = CANONICAL_PIXELS;
    let wavelengths = wavelength_grid(4.179, 6e-6, pixels);

    // ---- Continuum reference table: every 8th pixel is continuum, except
    //      near the absorption lines ----
    let lines = [
        (15200.0, 2.5, 0.35),
        (15290.0, 1.8, 0.25),
        (15400.0, 3.0, 0.45),
    ];
    let is_continuum: Vec<bool> = wavelengths
        .iter()
        .enumerate()
        .map(|(i, &w)| i % 8 == 0 && lines.iter().all(|&(mu, sigma, _)| (w - mu).abs() > 4.0 * sigma))
        .collect();

    let wavelength_array = Float64Array::from(wavelengths.clone());
    let flag_array = BooleanArray::from(is_continuum.clone());

    let schema = Arc::new(Schema::new(vec![
        Field::new("wavelength", DataType::Float64, false),
        Field::new("is_continuum", DataType::Boolean, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(wavelength_array), Arc::new(flag_array)],
    )
    .expect("Failed to create RecordBatch");

    let reference_path = "continuum_reference.parquet";
    let file = std::fs::File::create(reference_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    // ---- One synthetic star record with a few bitmask-flagged pixels ----
    let flux = generate_flux(&wavelengths, &lines, 0.002, &mut rng);
    let errors = vec![0.002; pixels];
    let mut bitmask = vec![0u32; pixels];
    for i in (0..pixels).step_by(137) {
        bitmask[i] = 1 << 12; // cosmic-ray flag
    }

    let record = StarRecord {
        identifier: "synthetic-0001".to_string(),
        field: "SYNTH".to_string(),
        labels: [
            ("snr".to_string(), 180.0),
            ("teff".to_string(), 4800.0),
            ("logg".to_string(), 2.4),
            ("fe_h".to_string(), -0.3),
        ]
        .into_iter()
        .collect(),
        spectrum: StarSpectrum {
            wavelength: wavelengths.clone(),
            flux,
            errors,
            bitmask,
        },
    };

    let star_path = "sample_star.json";
    let json = serde_json::to_string_pretty(&record).expect("Failed to serialize star record");
    std::fs::write(star_path, json).expect("Failed to write star record");

    println!(
        "Wrote {} continuum rows to {reference_path} and 1 star ({pixels} pixels) to {star_path}",
        wavelengths.len()
    );
}
