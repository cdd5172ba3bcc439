//! Streaming quantile estimation with the t-digest sketch.
//!
//! A [`TDigest`](tdigest::TDigest) ingests a stream of weighted observations
//! in bounded memory and answers approximate quantile and CDF queries at any
//! time, with accuracy concentrated in the distribution tails. An optional
//! exponential-decay mode biases the summary toward recent data for
//! non-stationary streams, and the compact binary wire format in
//! [`tdigest::wire`] covers durability and transport.
//!
//! ```
//! use tdigest_stream::tdigest::TDigest;
//!
//! let mut td = TDigest::with_compression(100.0).unwrap();
//! for i in 1..=1000 {
//!     td.add(f64::from(i), 1.0);
//! }
//! let p99 = td.quantile(0.99);
//! assert!((p99 - 990.0).abs() < 5.0);
//! ```

pub mod error;
pub mod tdigest;

pub use error::{TdError, TdResult};
pub use tdigest::{Centroid, CentroidList, ScaleFamily, TDigest, TDigestBuilder};
