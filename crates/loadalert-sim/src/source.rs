//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Injectable randomness for telemetry generation."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use rand::Rng;

/// Randomness consumed by the point generator.
///
/// Every `rand` generator implements this trait, so a seeded `StdRng` gives a
/// reproducible stream while [`FixedSource`] gives exact, hand-computable output.
pub trait TelemetrySource {
    /// Draw uniformly from `[low, high]`. A degenerate or non-finite range
    /// yields `low`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Return `true` with the given probability.
    fn chance(&mut self, probability: f64) -> bool;
}

fn drawable(low: f64, high: f64) -> bool {
    low < high && (high - low).is_finite()
}

impl<R: Rng + ?Sized> TelemetrySource for R {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if !drawable(low, high) {
            return low;
        }
        self.gen_range(low..=high)
    }

    fn chance(&mut self, probability: f64) -> bool {
        if probability <= 0.0 {
            return false;
        }
        self.gen::<f64>() < probability
    }
}

/// Deterministic source: every draw lands at the same fraction of its range and
/// burst events either always or never fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSource {
    fraction: f64,
    bursts: bool,
}

impl FixedSource {
    pub fn new(fraction: f64, bursts: bool) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 1.0),
            bursts,
        }
    }

    /// Range midpoints and no bursts: no drift, no jitter.
    pub fn quiet() -> Self {
        Self::new(0.5, false)
    }
}

impl TelemetrySource for FixedSource {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if !drawable(low, high) {
            return low;
        }
        low + self.fraction * (high - low)
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.bursts && probability > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn rng_draws_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let value = rng.uniform(-0.0005, 0.0005);
            assert!((-0.0005..=0.0005).contains(&value));
        }
    }

    #[test]
    fn degenerate_range_returns_low() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(rng.uniform(0.0, 0.0), 0.0);
        assert_eq!(FixedSource::quiet().uniform(3.0, 3.0), 3.0);
    }

    #[test]
    fn non_finite_range_returns_low_instead_of_panicking() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(rng.uniform(f64::NEG_INFINITY, f64::INFINITY), f64::NEG_INFINITY);
        assert_eq!(rng.uniform(-1.7e308, 1.7e308), -1.7e308);
        assert!(rng.uniform(f64::NAN, 1.0).is_nan());
        assert_eq!(FixedSource::quiet().uniform(-1.7e308, 1.7e308), -1.7e308);
    }

    #[test]
    fn zero_probability_never_fires() {
        let mut rng = StdRng::seed_from_u64(11);
        assert!((0..1_000).all(|_| !rng.chance(0.0)));
        assert!(!FixedSource::new(0.5, true).chance(0.0));
    }

    #[test]
    fn fixed_source_is_exact() {
        let mut source = FixedSource::new(1.0, true);
        assert_eq!(source.uniform(-2.0, 2.0), 2.0);
        assert!(source.chance(0.08));
        let mut quiet = FixedSource::quiet();
        assert_eq!(quiet.uniform(-0.01, 0.01), 0.0);
        assert!(!quiet.chance(0.08));
    }
}
