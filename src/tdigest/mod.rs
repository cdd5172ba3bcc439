pub mod cdf;
pub mod centroids;
pub mod exporters;
pub mod quantile;
pub mod scale;
pub mod test_helpers;
pub mod wire;

pub use centroids::{Centroid, CentroidList};
pub use scale::ScaleFamily;

use serde::{Deserialize, Serialize};

use crate::error::{TdError, TdResult};

/// Weights decayed below `0.9^100` are numerically negligible and purged.
pub(crate) const DECAY_LIMIT: f64 = 2.656_139_888_758_754_4e-5;

/// Streaming t-digest: a bounded-memory quantile sketch.
///
/// # Design: two halves, one pipeline
///
/// Observations land in the `unprocessed` staging buffer; when either buffer
/// overflows its cap, a compression pass merges both halves into a fresh
/// `processed` sequence sorted by mean, allotting cumulative weight per
/// centroid under the scale function's `k` budget. Queries run against the
/// processed half (plus the `cumulative` half-weight index) and force a
/// compression pass first, so an idle digest answers in O(log n) while
/// ingestion stays amortized O(1).
///
/// Accuracy is highest in the tails and controlled by `compression`
/// (typically 100–1000); memory is O(compression). With decay configured,
/// every `decay_every`-th ingested observation multiplies all centroid
/// weights by `decay_value`, exponentially forgetting old data for
/// non-stationary streams.
///
/// A digest is a single-threaded mutable object; callers sharing one across
/// threads must serialize externally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TDigest {
    compression: f64,
    scale: ScaleFamily,
    max_processed: usize,
    max_unprocessed: usize,
    processed: CentroidList,
    unprocessed: CentroidList,
    cumulative: Vec<f64>,
    processed_weight: f64,
    unprocessed_weight: f64,
    min: f64,
    max: f64,
    count: i64,
    decay_value: f64,
    decay_every: i32,
    decay_count: i32,
}

impl Default for TDigest {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent construction for [`TDigest`].
#[derive(Debug, Clone)]
pub struct TDigestBuilder {
    compression: f64,
    scale: ScaleFamily,
    decay_value: f64,
    decay_every: i32,
}

impl Default for TDigestBuilder {
    fn default() -> Self {
        TDigestBuilder {
            compression: 1000.0,
            scale: ScaleFamily::K1,
            decay_value: 0.0,
            decay_every: 0,
        }
    }
}

impl TDigestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compression(mut self, compression: f64) -> Self {
        self.compression = compression;
        self
    }

    pub fn scale(mut self, scale: ScaleFamily) -> Self {
        self.scale = scale;
        self
    }

    /// Enable exponential forgetting: every `every`-th ingested observation
    /// multiplies all centroid weights by `value`.
    pub fn decay(mut self, value: f64, every: i32) -> Self {
        self.decay_value = value;
        self.decay_every = every;
        self
    }

    pub fn build(self) -> TdResult<TDigest> {
        if !self.compression.is_finite() || self.compression <= 0.0 {
            return Err(TdError::InvalidConfig {
                context: "compression must be finite and > 0",
            });
        }
        if !(0.0..1.0).contains(&self.decay_value) {
            return Err(TdError::InvalidConfig {
                context: "decay value must be within [0, 1)",
            });
        }
        if self.decay_every < 0 {
            return Err(TdError::InvalidConfig {
                context: "decay interval cannot be negative",
            });
        }
        Ok(self.build_unchecked())
    }

    /// Construction without the parameter checks; for callers whose inputs
    /// are valid by construction (the default configuration).
    fn build_unchecked(self) -> TDigest {
        let max_processed = (2.0 * self.compression).ceil() as usize;
        let max_unprocessed = (8.0 * self.compression).ceil() as usize;
        TDigest {
            compression: self.compression,
            scale: self.scale,
            max_processed,
            max_unprocessed,
            processed: CentroidList::with_capacity(max_processed),
            unprocessed: CentroidList::with_capacity(max_unprocessed + 1),
            cumulative: Vec::new(),
            processed_weight: 0.0,
            unprocessed_weight: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            count: 0,
            decay_value: self.decay_value,
            decay_every: self.decay_every,
            decay_count: 0,
        }
    }
}

impl TDigest {
    /// Entry point for fluent construction.
    pub fn builder() -> TDigestBuilder {
        TDigestBuilder::default()
    }

    /// New empty digest with the default compression of 1000.
    pub fn new() -> Self {
        TDigestBuilder::default().build_unchecked()
    }

    /// New empty digest with the given compression parameter, which must be
    /// finite and positive.
    pub fn with_compression(compression: f64) -> TdResult<Self> {
        Self::builder().compression(compression).build()
    }

    /// New empty digest with exponential forgetting enabled.
    pub fn with_decay(compression: f64, decay_value: f64, decay_every: i32) -> TdResult<Self> {
        Self::builder()
            .compression(compression)
            .decay(decay_value, decay_every)
            .build()
    }

    /* ===========================
     * Ingestion
     * =========================== */

    /// Record one observation of value `x` with weight `w`.
    ///
    /// NaN values, NaN weights and non-positive weights are silently dropped:
    /// a stream source producing an occasional bad sample should not halt
    /// aggregation. Infinite `x` flows through normally.
    pub fn add(&mut self, x: f64, w: f64) {
        if x.is_nan() || w.is_nan() || w <= 0.0 {
            return;
        }
        self.add_centroid(Centroid::new(x, w));
        self.count += 1;
        if self.decay_value > 0.0 && self.decay_every > 0 {
            self.decay_count += 1;
            if self.decay_count >= self.decay_every {
                self.decay();
                self.decay_count = 0;
            }
        }
    }

    /// Stage a pre-formed centroid. Does not count as an observation and
    /// never triggers decay.
    pub fn add_centroid(&mut self, c: Centroid) {
        self.unprocessed.push(c);
        self.unprocessed_weight += c.weight();

        if self.processed.len() > self.max_processed
            || self.unprocessed.len() > self.max_unprocessed
        {
            self.process();
        }
    }

    /// Stage every centroid of `cs` in order; compression triggers as the
    /// staging buffer fills.
    pub fn add_centroid_list(&mut self, cs: &CentroidList) {
        for &c in cs.iter() {
            self.add_centroid(c);
        }
    }

    /// Fold another digest into this one by streaming its compressed view.
    /// An empty `other` leaves this digest untouched.
    pub fn merge(&mut self, other: &mut TDigest) {
        other.process();
        if other.processed.is_empty() {
            return;
        }
        for &c in other.processed.iter() {
            self.add_centroid(c);
        }
    }

    /* ===========================
     * Compression pass
     * =========================== */

    pub(crate) fn process(&mut self) {
        self.compress(true);
    }

    fn compress(&mut self, rebuild_cumulative: bool) {
        if self.unprocessed.is_empty() && self.processed.len() <= self.max_processed {
            return;
        }

        self.unprocessed.extend_from_slice(&self.processed);
        self.unprocessed.sort_by_mean();
        self.processed.clear();
        self.processed_weight += self.unprocessed_weight;
        self.unprocessed_weight = 0.0;

        self.processed.push(self.unprocessed[0]);
        let mut so_far = self.unprocessed[0].weight();
        let mut limit = self.processed_weight * self.scale.q(1.0, self.compression);
        for i in 1..self.unprocessed.len() {
            let c = self.unprocessed[i];
            let projected = so_far + c.weight();
            if projected <= limit {
                so_far = projected;
                if let Some(last) = self.processed.last_mut() {
                    // Weights in the buffers are never negative, so
                    // absorption cannot fail here.
                    let _ = last.add(&c);
                }
            } else {
                let k1 = self.scale.k(so_far / self.processed_weight, self.compression);
                limit = self.processed_weight * self.scale.q(k1 + 1.0, self.compression);
                so_far = projected;
                self.processed.push(c);
            }
        }

        self.min = self.min.min(self.processed[0].mean());
        self.max = self.max.max(self.processed[self.processed.len() - 1].mean());
        if rebuild_cumulative {
            self.update_cumulative();
        }
        self.unprocessed.clear();
        self.unprocessed_weight = 0.0;
    }

    /// Rebuild the half-weight partial-sum index: one entry per centroid at
    /// `prev + weight/2`, then the total weight. Capacity is reused across
    /// passes.
    fn update_cumulative(&mut self) {
        self.cumulative.clear();
        self.cumulative.reserve(self.processed.len() + 1);
        let mut prev = 0.0;
        for c in self.processed.iter() {
            let cur = c.weight();
            self.cumulative.push(prev + cur / 2.0);
            prev += cur;
        }
        self.cumulative.push(prev);
    }

    /* ===========================
     * Decay
     * =========================== */

    fn decay(&mut self) {
        // Compress without the cumulative rebuild; it is rebuilt below from
        // the surviving centroids.
        self.compress(false);
        self.cumulative.clear();

        let decay_value = self.decay_value;
        let mut prev = 0.0;
        let mut dropped = false;
        let cumulative = &mut self.cumulative;
        self.processed.inner_mut().retain_mut(|c| {
            let w = c.weight() * decay_value;
            if w < DECAY_LIMIT {
                dropped = true;
                return false;
            }
            *c = Centroid::new(c.mean(), w);
            cumulative.push(prev + w / 2.0);
            prev += w;
            true
        });
        if !self.processed.is_empty() {
            self.cumulative.push(prev);
        }
        self.processed_weight = prev;

        if dropped {
            match (self.processed.first(), self.processed.last()) {
                (Some(first), Some(last)) => {
                    self.min = first.mean();
                    self.max = last.mean();
                }
                _ => {
                    self.min = f64::INFINITY;
                    self.max = f64::NEG_INFINITY;
                }
            }
        }

        // The preceding compression already emptied the staging buffer, but
        // that is not an invariant worth relying on.
        self.unprocessed.clear();
        self.unprocessed_weight = 0.0;
    }

    /* ===========================
     * Snapshot / reset / accessors
     * =========================== */

    /// Force a compression pass, then return an independent deep copy with an
    /// empty staging buffer.
    pub fn snapshot(&mut self) -> TDigest {
        self.process();
        self.clone()
    }

    /// Drop all centroids and restore the freshly-constructed state.
    /// Compression, scale and decay configuration survive.
    pub fn reset(&mut self) {
        self.processed.clear();
        self.unprocessed.clear();
        self.cumulative.clear();
        self.processed_weight = 0.0;
        self.unprocessed_weight = 0.0;
        self.min = f64::INFINITY;
        self.max = f64::NEG_INFINITY;
        self.count = 0;
        self.decay_count = 0;
    }

    #[inline]
    pub fn compression(&self) -> f64 {
        self.compression
    }

    #[inline]
    pub fn scale(&self) -> ScaleFamily {
        self.scale
    }

    /// Number of `add` calls that produced an ingestion.
    #[inline]
    pub fn count(&self) -> i64 {
        self.count
    }

    /// Summed weight of everything ingested (and not yet decayed away).
    #[inline]
    pub fn total_weight(&self) -> f64 {
        self.processed_weight + self.unprocessed_weight
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processed.is_empty() && self.unprocessed.is_empty()
    }

    /// Smallest ingested mean, or NaN for an empty digest.
    pub fn min(&mut self) -> f64 {
        self.process();
        if self.processed.is_empty() {
            f64::NAN
        } else {
            self.min
        }
    }

    /// Largest ingested mean, or NaN for an empty digest.
    pub fn max(&mut self) -> f64 {
        self.process();
        if self.processed.is_empty() {
            f64::NAN
        } else {
            self.max
        }
    }

    /// Append the compressed centroid view into a caller-owned buffer,
    /// returning the extended buffer. Reusing one buffer across calls makes
    /// repeated merges and custom exporters allocation-free.
    pub fn centroids(&mut self, mut into: CentroidList) -> CentroidList {
        self.process();
        into.extend_from_slice(&self.processed);
        into
    }
}
