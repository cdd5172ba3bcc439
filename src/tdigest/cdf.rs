use super::quantile::weighted_average;
use super::TDigest;

impl TDigest {
    /// Estimate the cumulative probability at `x`, i.e. the fraction of the
    /// ingested weight at or below `x`.
    ///
    /// Returns 0 for an empty digest. Forces a compression pass if staged
    /// data exists.
    pub fn cdf(&mut self, x: f64) -> f64 {
        self.process();
        match self.processed.len() {
            0 => 0.0,
            1 => {
                if x <= self.min {
                    return 0.0;
                }
                if x >= self.max {
                    return 1.0;
                }
                let width = self.max - self.min;
                if width < f64::EPSILON {
                    // min and max too close together for viable interpolation
                    return 0.5;
                }
                (x - self.min) / width
            }
            n => {
                if x <= self.min {
                    return 0.0;
                }
                if x >= self.max {
                    return 1.0;
                }

                // Left tail: ramp from the global minimum up to half the
                // first centroid's weight.
                let first = self.processed[0];
                if x <= first.mean() {
                    if first.mean() - self.min > 0.0 {
                        return (x - self.min) / (first.mean() - self.min) * first.weight()
                            / self.processed_weight
                            / 2.0;
                    }
                    return 0.0;
                }

                // Right tail, symmetric to the left.
                let last = self.processed[n - 1];
                if x >= last.mean() {
                    if self.max - last.mean() > 0.0 {
                        return 1.0
                            - (self.max - x) / (self.max - last.mean()) * last.weight()
                                / self.processed_weight
                                / 2.0;
                    }
                    return 1.0;
                }

                // Interior: interpolate between the half-weight sums of the
                // bracketing centroids. `upper` is in 1..n because both tails
                // were handled above.
                let upper = self.processed.partition_point(|c| c.mean() <= x);
                let z1 = x - self.processed[upper - 1].mean();
                let z2 = self.processed[upper].mean() - x;
                weighted_average(self.cumulative[upper - 1], z2, self.cumulative[upper], z1)
                    / self.processed_weight
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::tdigest::test_helpers::{assert_exact, assert_monotone_chain, assert_rel_close};
    use crate::tdigest::TDigest;

    fn digest_of(values: &[f64]) -> TDigest {
        let mut td = TDigest::with_compression(1000.0).unwrap();
        for &x in values {
            td.add(x, 1.0);
        }
        td
    }

    #[test]
    fn empty_digest_reports_zero() {
        let mut td = TDigest::with_compression(1000.0).unwrap();
        assert_exact("cdf(0)", 0.0, td.cdf(0.0));
    }

    #[test]
    fn single_centroid_steps() {
        let mut td = TDigest::with_compression(1000.0).unwrap();
        td.add(5.0, 2.0);
        assert_exact("below", 0.0, td.cdf(4.0));
        // min == max == 5, so the lower guard wins at the point mass itself.
        assert_exact("at", 0.0, td.cdf(5.0));
        assert_exact("above", 1.0, td.cdf(6.0));
    }

    #[test]
    fn single_centroid_interpolates_between_extrema() {
        // Compress after the first point so min stays at 0, then let the
        // second pass fold both points into one centroid at the midpoint.
        let mut td = TDigest::with_compression(1.0).unwrap();
        td.add(0.0, 1.0);
        let _ = td.cdf(0.0);
        td.add(10.0, 1.0);

        assert_exact("below min", 0.0, td.cdf(-1.0));
        assert_exact("above max", 1.0, td.cdf(7.0));
        assert_rel_close("interior", 0.5, td.cdf(2.5), 1e-9);
    }

    #[test]
    fn increasing_five_values() {
        let mut td = digest_of(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_exact("cdf(3)", 0.5, td.cdf(3.0));
    }

    #[test]
    fn small_with_duplicates() {
        let mut td = digest_of(&[1.0, 2.0, 3.0, 4.0, 5.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
        assert_exact("cdf(4)", 0.75, td.cdf(4.0));
        assert_exact("cdf(5)", 1.0, td.cdf(5.0));
    }

    #[test]
    fn out_of_range_clamps() {
        let mut td = digest_of(&[-2.0, 0.0, 3.0, 9.0]);
        assert_exact("far left", 0.0, td.cdf(-100.0));
        assert_exact("far right", 1.0, td.cdf(100.0));
    }

    #[test]
    fn cdf_is_monotone() {
        let values: Vec<f64> = (-30..=69).map(f64::from).collect();
        let mut td = digest_of(&values);
        let chain: Vec<f64> = (-35..=75).map(|x| td.cdf(x as f64)).collect();
        assert_monotone_chain("cdf chain", &chain);
        assert!(chain.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }
}
