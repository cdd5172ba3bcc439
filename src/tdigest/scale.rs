use serde::{Deserialize, Serialize};

/// Scale families define the `q → k` mapping that controls compression
/// density: `k` grows slowly near q=0.5 and steeply near the tails, so the
/// merge pass allots small centroids (high resolution) at the extremes and
/// large centroids in the middle.
///
/// The digest core only depends on the `{k, q}` pair, so further families can
/// be added without touching it. The scale is a construction parameter and is
/// never serialized.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScaleFamily {
    /// k1: arcsine scale (DEFAULT).
    #[default]
    K1,
}

impl ScaleFamily {
    /// `k(q, δ)`: map `q ∈ [0, 1]` monotonically onto `[0, δ]`.
    #[inline]
    pub fn k(&self, q: f64, delta: f64) -> f64 {
        use std::f64::consts::PI;
        match self {
            ScaleFamily::K1 => {
                let s = (2.0 * q - 1.0).clamp(-1.0, 1.0).asin();
                delta * (s + PI / 2.0) / PI
            }
        }
    }

    /// `q(k, δ)`: the inverse of [`ScaleFamily::k`] on `[0, δ]`.
    #[inline]
    pub fn q(&self, k: f64, delta: f64) -> f64 {
        use std::f64::consts::PI;
        match self {
            ScaleFamily::K1 => ((k.min(delta) * PI / delta - PI / 2.0).sin() + 1.0) / 2.0,
        }
    }
}
