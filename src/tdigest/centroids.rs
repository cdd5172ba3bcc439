//! Centroid representation and the ordered centroid buffer.
//!
//! A centroid is a `(mean, weight)` pair summarizing a cluster of
//! observations. Centroids are plain `Copy` values stored contiguously in a
//! [`CentroidList`]; the list is the storage unit for both the processed
//! (compressed) and unprocessed (staging) halves of a digest.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::{Deref, DerefMut};

use crate::error::{TdError, TdResult};

/// A weighted mean value: `weight` observations approximately equal to `mean`.
///
/// `weight` is never negative; `mean` may be ±inf but never NaN once inside a
/// digest (ingestion filters NaN before construction).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Centroid {
    mean: OrderedFloat<f64>,
    weight: OrderedFloat<f64>,
}

impl PartialOrd for Centroid {
    fn partial_cmp(&self, other: &Centroid) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Centroid {
    fn cmp(&self, other: &Centroid) -> Ordering {
        // Buffer order is by mean; equal means stay adjacent and are fused
        // (or not) by the compression pass, so weight is irrelevant here.
        self.mean.cmp(&other.mean)
    }
}

impl Centroid {
    pub fn new(mean: f64, weight: f64) -> Self {
        Centroid {
            mean: OrderedFloat::from(mean),
            weight: OrderedFloat::from(weight),
        }
    }

    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean.into_inner()
    }

    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight.into_inner()
    }

    /// Absorb `r` into `self`, updating the weighted mean in place.
    ///
    /// A zero-weight centroid simply becomes `r`. Negative weights are the
    /// one operational error this library surfaces.
    pub fn add(&mut self, r: &Centroid) -> TdResult<()> {
        if r.weight() < 0.0 {
            return Err(TdError::WeightNegative);
        }
        let w = self.weight.into_inner();
        if w == 0.0 {
            self.mean = r.mean;
            self.weight = r.weight;
        } else {
            let new_w = w + r.weight();
            let m = self.mean.into_inner();
            self.weight = OrderedFloat::from(new_w);
            self.mean = OrderedFloat::from(m + r.weight() * (r.mean() - m) / new_w);
        }
        Ok(())
    }
}

/// An ordered sequence of centroids with sort/append/clear operations.
///
/// Derefs to `[Centroid]`, so all slice accessors apply. Length-changing
/// operations go through the inherent methods to keep callers honest about
/// when ordering is (re)established.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CentroidList {
    centroids: Vec<Centroid>,
}

impl CentroidList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        CentroidList {
            centroids: Vec::with_capacity(cap),
        }
    }

    #[inline]
    pub fn push(&mut self, c: Centroid) {
        self.centroids.push(c);
    }

    #[inline]
    pub fn extend_from_slice(&mut self, other: &[Centroid]) {
        self.centroids.extend_from_slice(other);
    }

    /// Sort in place by ascending mean. Tie order among equal means is
    /// unspecified.
    #[inline]
    pub fn sort_by_mean(&mut self) {
        self.centroids.sort_unstable();
    }

    #[inline]
    pub fn clear(&mut self) {
        self.centroids.clear();
    }

    /// Summed weight of all centroids in the buffer.
    pub fn total_weight(&self) -> f64 {
        self.centroids.iter().map(Centroid::weight).sum()
    }

    #[inline]
    pub(crate) fn inner_mut(&mut self) -> &mut Vec<Centroid> {
        &mut self.centroids
    }
}

impl Deref for CentroidList {
    type Target = [Centroid];

    #[inline]
    fn deref(&self) -> &[Centroid] {
        &self.centroids
    }
}

impl DerefMut for CentroidList {
    #[inline]
    fn deref_mut(&mut self) -> &mut [Centroid] {
        &mut self.centroids
    }
}

impl From<Vec<Centroid>> for CentroidList {
    fn from(centroids: Vec<Centroid>) -> Self {
        CentroidList { centroids }
    }
}

impl FromIterator<Centroid> for CentroidList {
    fn from_iter<I: IntoIterator<Item = Centroid>>(iter: I) -> Self {
        CentroidList {
            centroids: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CentroidList {
    type Item = &'a Centroid;
    type IntoIter = std::slice::Iter<'a, Centroid>;

    fn into_iter(self) -> Self::IntoIter {
        self.centroids.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_negative_weight_errors() {
        let mut c = Centroid::new(0.0, 0.0);
        let err = c.add(&Centroid::new(0.0, -1.0)).unwrap_err();
        assert_eq!(err, TdError::WeightNegative);
        assert_eq!(
            err.to_string(),
            "centroid weight cannot be less than zero"
        );
        // Failed absorption leaves the target untouched.
        assert_eq!(c, Centroid::new(0.0, 0.0));
    }

    #[test]
    fn add_into_zero_weight_becomes_other() {
        let mut c = Centroid::new(1.0, 0.0);
        c.add(&Centroid::new(2.0, 1.0)).unwrap();
        assert_eq!(c, Centroid::new(2.0, 1.0));
    }

    #[test]
    fn add_weight_order_of_magnitude() {
        let mut c = Centroid::new(1.0, 1.0);
        c.add(&Centroid::new(12.0, 10.0)).unwrap();
        assert_eq!(c.weight(), 11.0);
        assert_eq!(c.mean(), 10.0);
    }

    #[test]
    fn list_sorts_by_mean() {
        let mut l = CentroidList::new();
        l.push(Centroid::new(3.0, 1.0));
        l.push(Centroid::new(1.0, 2.0));
        l.push(Centroid::new(2.0, 4.0));
        l.sort_by_mean();
        let means: Vec<f64> = l.iter().map(Centroid::mean).collect();
        assert_eq!(means, vec![1.0, 2.0, 3.0]);
        assert_eq!(l.total_weight(), 7.0);
    }

    #[test]
    fn list_slice_accessors() {
        let l: CentroidList = vec![Centroid::new(1.0, 1.0), Centroid::new(2.0, 1.0)].into();
        assert_eq!(l.len(), 2);
        assert_eq!(l.first(), Some(&Centroid::new(1.0, 1.0)));
        assert_eq!(l.last(), Some(&Centroid::new(2.0, 1.0)));
        assert_eq!(l[1].mean(), 2.0);
    }
}
