//! Assertion helpers shared by unit and integration tests.

/// Bitwise-exact comparison, except that NaN matches NaN so fixtures can
/// assert the empty-digest outcome directly.
pub fn assert_exact(label: &str, expected: f64, got: f64) {
    let same = expected == got || (expected.is_nan() && got.is_nan());
    assert!(same, "{label}: expected exactly {expected}, got {got}");
}

/// Relative comparison against the larger magnitude of the two operands,
/// so it is symmetric in `expected` and `got`. Rejects non-finite inputs
/// outright; use [`assert_exact`] for NaN/infinity fixtures.
pub fn assert_rel_close(label: &str, expected: f64, got: f64, rtol: f64) {
    assert!(
        expected.is_finite() && got.is_finite(),
        "{label}: non-finite comparison: expected {expected}, got {got}"
    );
    let scale = expected.abs().max(got.abs()).max(f64::MIN_POSITIVE);
    let rel = (expected - got).abs() / scale;
    assert!(
        rel <= rtol,
        "{label}: {got} is not within rtol {rtol:e} of {expected} (relative error {rel:e})"
    );
}

pub fn assert_abs_close(label: &str, expected: f64, got: f64, atol: f64) {
    let abs = (expected - got).abs();
    assert!(
        abs <= atol,
        "{label}: {got} differs from {expected} by {abs:e} (allowed {atol:e})"
    );
}

/// Verify the sequence never decreases.
pub fn assert_monotone_chain(label: &str, values: &[f64]) {
    for (i, pair) in values.windows(2).enumerate() {
        assert!(
            pair[0] <= pair[1],
            "{label}: decreases between {i} and {}: {} -> {}",
            i + 1,
            pair[0],
            pair[1]
        );
    }
}
