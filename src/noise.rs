//! Calibrated additive-noise injection.

use rand::Rng;
use rand_distr::StandardNormal;

/// Maps |dBFS| to a linear noise amplitude factor.
const DB_TO_AMPLITUDE: f32 = 1.0 / 200.0;

/// Map a noise level in dBFS to its linear amplitude factor.
///
/// Monotonically non-decreasing in |noise_level_db|: 0 dBFS → 0.0, −20 dBFS → 0.1,
/// −80 dBFS → 0.4.
pub fn noise_factor(noise_level_db: f32) -> f32 {
    noise_level_db.abs() * DB_TO_AMPLITUDE
}

/// Add standard-normal noise scaled by [`noise_factor`] to `signal`.
///
/// The output has the same length as the input. No clipping is applied; downstream stages
/// tolerate out-of-range samples until the encoder normalizes for playback.
///
/// Each call draws fresh randomness. Use [`add_noise_with_rng`] with a seeded RNG when a
/// reproducible fixture is needed.
pub fn add_noise(signal: &[f32], noise_level_db: f32) -> Vec<f32> {
    add_noise_with_rng(signal, noise_level_db, &mut rand::thread_rng())
}

/// Seedable variant of [`add_noise`].
pub fn add_noise_with_rng<R: Rng + ?Sized>(
    signal: &[f32],
    noise_level_db: f32,
    rng: &mut R,
) -> Vec<f32> {
    let factor = noise_factor(noise_level_db);

    signal
        .iter()
        .map(|&sample| {
            let draw: f32 = rng.sample(StandardNormal);
            sample + draw * factor
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn noise_factor_matches_known_points() {
        assert_eq!(noise_factor(0.0), 0.0);
        assert!((noise_factor(-20.0) - 0.1).abs() < 1e-6);
        assert!((noise_factor(-80.0) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn noise_factor_is_monotonic_over_domain() {
        let mut previous = noise_factor(0.0);
        for db in 1..=80 {
            let current = noise_factor(-(db as f32));
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn output_length_matches_input() {
        let signal = vec![0.0; 1234];
        assert_eq!(add_noise(&signal, -40.0).len(), signal.len());
    }

    #[test]
    fn zero_level_is_identity() {
        let signal = vec![0.25, -0.5, 0.75];
        assert_eq!(add_noise(&signal, 0.0), signal);
    }

    #[test]
    fn seeded_rng_reproduces_output() {
        let signal = vec![0.1; 256];
        let a = add_noise_with_rng(&signal, -20.0, &mut StdRng::seed_from_u64(7));
        let b = add_noise_with_rng(&signal, -20.0, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn injected_noise_has_expected_scale() {
        let signal = vec![0.0; 50_000];
        let noisy = add_noise_with_rng(&signal, -20.0, &mut StdRng::seed_from_u64(42));

        let mean = noisy.iter().sum::<f32>() / noisy.len() as f32;
        let variance =
            noisy.iter().map(|s| (s - mean).powi(2)).sum::<f32>() / noisy.len() as f32;

        // Standard-normal draws scaled by 0.1 → stddev ≈ 0.1.
        assert!(mean.abs() < 0.01);
        assert!((variance.sqrt() - 0.1).abs() < 0.01);
    }
}
