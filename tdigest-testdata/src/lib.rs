//! tdigest-testdata
//! Seeded synthetic data generators shared by tests and benches.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

/// Available synthetic distributions.
#[derive(Clone, Copy, Debug)]
pub enum DistKind {
    /// Uniform in `[lo, hi)`.
    Uniform { lo: f64, hi: f64 },
    /// Gaussian with the given mean and standard deviation.
    Normal { mu: f64, sigma: f64 },
    /// exp(N(0, sigma^2)); heavy right tail.
    LogNormal { sigma: f64 },
}

/// Generate `n` samples for the chosen distribution.
pub fn gen_dataset(kind: DistKind, n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(n);

    match kind {
        DistKind::Uniform { lo, hi } => {
            for _ in 0..n {
                out.push(lo + rng.random::<f64>() * (hi - lo));
            }
        }
        DistKind::Normal { mu, sigma } => {
            let normal = Normal::new(mu, sigma).unwrap();
            for _ in 0..n {
                out.push(normal.sample(&mut rng));
            }
        }
        DistKind::LogNormal { sigma } => {
            let normal = Normal::new(0.0, 1.0).unwrap();
            for _ in 0..n {
                let z: f64 = normal.sample(&mut rng);
                out.push((sigma * z).exp());
            }
        }
    }
    out
}

/// Exact quantile of a dataset by sorting (type-7 interpolation).
pub fn exact_quantile(data: &[f64], q: f64) -> f64 {
    assert!(!data.is_empty(), "exact_quantile requires non-empty data");
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let r = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = r.floor() as usize;
    let hi = r.ceil() as usize;
    let frac = r - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_gen() {
        for kind in [
            DistKind::Uniform { lo: 0.0, hi: 100.0 },
            DistKind::Normal { mu: 10.0, sigma: 3.0 },
            DistKind::LogNormal { sigma: 1.0 },
        ] {
            let xs = gen_dataset(kind, 10_000, 123);
            assert_eq!(xs.len(), 10_000);
            assert!(xs.iter().all(|x| x.is_finite()));
        }
    }

    #[test]
    fn deterministic_for_seed() {
        let a = gen_dataset(DistKind::Normal { mu: 10.0, sigma: 3.0 }, 1_000, 42);
        let b = gen_dataset(DistKind::Normal { mu: 10.0, sigma: 3.0 }, 1_000, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn exact_quantile_interpolates() {
        let data = vec![5.0, 1.0, 3.0, 2.0, 4.0];
        assert_eq!(exact_quantile(&data, 0.0), 1.0);
        assert_eq!(exact_quantile(&data, 0.5), 3.0);
        assert_eq!(exact_quantile(&data, 1.0), 5.0);
    }
}
