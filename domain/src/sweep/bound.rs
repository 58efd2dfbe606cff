//! Closed-form estimate of the boundary.
//!
//! Each party draws its error polynomial from `[-⌊ζ⌋, ⌊ζ⌋]`, where `ζ` is the
//! positive root of `n²ζ² + nζ − q/8 = 0`, and refuses to vote once `⌊ζ⌋ ≤ 2`.
//! Treating `ζ ≥ 3` as the success condition, that is `9n² + 3n ≤ q/8` or in
//! integers `72n² + 24n ≤ q`, gives an analytical estimate of the boundary.
//! It is not a hard limit: measured boundaries can sit above it, e.g. small
//! moduli such as `q = 257` have been observed to pass with two parties.

/// Smallest error bound a party accepts
const MIN_ERROR_BOUND: u64 = 3;

/// `⌊ζ⌋` for `n` parties under modulus `q`. `None` for `n = 0`.
pub fn error_bound(q: u64, n: usize) -> Option<u64> {
    if n == 0 {
        return None;
    }

    let a = (n as f64) * (n as f64);
    let b = n as f64;
    let c = -(q as f64) / 8.0;
    let disc = b * b - 4.0 * a * c;
    let zeta = (-b + disc.sqrt()) / (2.0 * a);

    Some(zeta.max(0.0).floor() as u64)
}

/// Estimated largest party count whose error bound is still acceptable (`0` if none).
///
/// Compare with the measured `m_max`; the two can differ.
pub fn predicted_max_safe(q: u64) -> usize {
    let k = MIN_ERROR_BOUND as u128;
    let q = q as u128;
    let fits = |n: u128| 8 * (k * k * n * n + k * n) <= q;

    // Seed from the real root and correct for rounding in both directions.
    let approx = ((q as f64) / (8.0 * (k * k) as f64)).sqrt() as u128;
    let mut n = approx.saturating_add(1);
    while n > 0 && !fits(n) {
        n -= 1;
    }
    while fits(n + 1) {
        n += 1;
    }
    n as usize
}
