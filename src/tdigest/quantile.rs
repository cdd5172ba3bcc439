use super::TDigest;

impl TDigest {
    /// Estimate the value located at quantile `q`.
    ///
    /// Returns NaN for an empty digest or `q` outside `[0, 1]`. Forces a
    /// compression pass if staged data exists.
    pub fn quantile(&mut self, q: f64) -> f64 {
        self.process();
        if !(0.0..=1.0).contains(&q) || self.processed.is_empty() {
            return f64::NAN;
        }
        if self.processed.len() == 1 {
            return self.processed[0].mean();
        }

        let index = q * self.processed_weight;
        let first = self.processed[0];
        if index <= first.weight() / 2.0 {
            // Left tail: interpolate between the global minimum and the
            // first centroid's mean.
            return self.min + 2.0 * index / first.weight() * (first.mean() - self.min);
        }

        // Smallest i with cumulative[i] >= index; the final entry is the
        // total weight, so this lands within bounds for q <= 1.
        let lower = self
            .cumulative
            .partition_point(|&c| c < index)
            .min(self.cumulative.len() - 1);

        if lower + 1 < self.cumulative.len() {
            let z1 = index - self.cumulative[lower - 1];
            let z2 = self.cumulative[lower] - index;
            return weighted_average(
                self.processed[lower - 1].mean(),
                z2,
                self.processed[lower].mean(),
                z1,
            );
        }

        // Upper tail: interpolate between the last centroid's mean and the
        // global maximum.
        let last = self.processed[self.processed.len() - 1];
        let z1 = index - self.processed_weight - last.weight() / 2.0;
        let z2 = last.weight() / 2.0 - z1;
        weighted_average(last.mean(), z1, self.max, z2)
    }
}

/// Weighted average of `x1` and `x2`, clamped into their interval. Endpoints
/// are reordered if needed.
pub(crate) fn weighted_average(x1: f64, w1: f64, x2: f64, w2: f64) -> f64 {
    if x1 <= x2 {
        weighted_average_sorted(x1, w1, x2, w2)
    } else {
        weighted_average_sorted(x2, w2, x1, w1)
    }
}

fn weighted_average_sorted(x1: f64, w1: f64, x2: f64, w2: f64) -> f64 {
    let x = (x1 * w1 + x2 * w2) / (w1 + w2);
    // f64::min/max ignore NaN, so degenerate interpolation (e.g. between two
    // infinities) resolves to the endpoints instead of poisoning the result.
    x1.max(x.min(x2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tdigest::test_helpers::{assert_exact, assert_monotone_chain};
    use crate::tdigest::TDigest;

    fn digest_of(values: &[f64]) -> TDigest {
        let mut td = TDigest::with_compression(1000.0).unwrap();
        for &x in values {
            td.add(x, 1.0);
        }
        td
    }

    #[test]
    fn weighted_average_clamps_and_reorders() {
        assert_exact("midpoint", 1.5, weighted_average(1.0, 1.0, 2.0, 1.0));
        assert_exact("reordered", 1.5, weighted_average(2.0, 1.0, 1.0, 1.0));
        // Negative partial weights stay inside the interval.
        assert_exact("clamped low", 1.0, weighted_average(1.0, 5.0, 2.0, -4.0));
        assert_exact(
            "infinite endpoints",
            f64::INFINITY,
            weighted_average(f64::INFINITY, -0.5, f64::INFINITY, 1.5),
        );
    }

    #[test]
    fn empty_and_out_of_range_are_nan() {
        let mut td = TDigest::with_compression(1000.0).unwrap();
        assert!(td.quantile(0.5).is_nan());

        td.add(1.0, 1.0);
        assert!(td.quantile(-0.1).is_nan());
        assert!(td.quantile(1.1).is_nan());
        assert!(td.quantile(f64::NAN).is_nan());
    }

    #[test]
    fn single_centroid_returns_its_mean() {
        let mut td = TDigest::with_compression(1000.0).unwrap();
        td.add(42.5, 3.0);
        assert_exact("Q(0.0)", 42.5, td.quantile(0.0));
        assert_exact("Q(0.5)", 42.5, td.quantile(0.5));
        assert_exact("Q(1.0)", 42.5, td.quantile(1.0));
    }

    #[test]
    fn increasing_five_values() {
        let mut td = digest_of(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_exact("Q(0.5)", 3.0, td.quantile(0.5));
    }

    #[test]
    fn decreasing_order_pair() {
        let mut td = digest_of(&[555.349107, 432.842597]);
        assert_exact("Q(0.25)", 432.842597, td.quantile(0.25));
    }

    #[test]
    fn small_with_duplicates() {
        let mut td = digest_of(&[1.0, 2.0, 3.0, 4.0, 5.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
        assert_exact("Q(0.5)", 3.0, td.quantile(0.5));
        assert_exact("Q(0.99)", 5.0, td.quantile(0.99));
    }

    #[test]
    fn edges_hit_the_extrema() {
        let mut td = digest_of(&[-10.0, -1.0, 0.0, 2.0, 7.0, 11.0]);
        assert_exact("Q(0)", -10.0, td.quantile(0.0));
        assert_exact("Q(1)", 11.0, td.quantile(1.0));
    }

    #[test]
    fn quantile_grid_is_monotone() {
        let values: Vec<f64> = (-30..=69).map(f64::from).collect();
        let mut td = digest_of(&values);
        let grid: Vec<f64> = (0..=100).map(|i| td.quantile(i as f64 / 100.0)).collect();
        assert_monotone_chain("quantile grid", &grid);
        assert!(grid[0] >= -30.0 && grid[100] <= 69.0);
    }
}
