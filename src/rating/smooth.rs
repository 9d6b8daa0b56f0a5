//! Windowed smoothing operators shared by the rating stages.
//!
//! Both operators use the same centered window: 500 samples each side,
//! clipped at the curve bounds. The window width materially changes the
//! output magnitude, so it is pinned, not configurable.

use crate::rating::constants::SMOOTH_HALF_WINDOW;

/// Centered moving sum over `±SMOOTH_HALF_WINDOW`, scaled by the 1 ms
/// sample spacing (0.001 s). Computed via prefix sums so a full pass is
/// O(n) regardless of window width.
pub(crate) fn smooth(curve: &[f64]) -> Vec<f64> {
    let n = curve.len();
    let mut prefix = vec![0.0; n + 1];
    for (i, &v) in curve.iter().enumerate() {
        prefix[i + 1] = prefix[i] + v;
    }

    (0..n)
        .map(|t| {
            let lo = t.saturating_sub(SMOOTH_HALF_WINDOW);
            let hi = (t + SMOOTH_HALF_WINDOW).min(n - 1);
            0.001 * (prefix[hi + 1] - prefix[lo])
        })
        .collect()
}

/// Centered moving average over the same clipped window, maintained
/// incrementally: one sample enters and one leaves per step. Used only
/// for the anchor curve, which is a multiplier rather than a rate.
pub(crate) fn smooth_avg(curve: &[f64]) -> Vec<f64> {
    let n = curve.len();
    if n == 0 {
        return Vec::new();
    }

    let mut out = vec![0.0; n];
    let mut hi = (SMOOTH_HALF_WINDOW).min(n - 1);
    let mut sum: f64 = curve[..=hi].iter().sum();
    out[0] = sum / (hi + 1) as f64;

    for t in 1..n {
        let lo = t.saturating_sub(SMOOTH_HALF_WINDOW);
        if t > SMOOTH_HALF_WINDOW {
            sum -= curve[lo - 1];
        }
        if t + SMOOTH_HALF_WINDOW < n {
            hi = t + SMOOTH_HALF_WINDOW;
            sum += curve[hi];
        }
        out[t] = sum / (hi - lo + 1) as f64;
    }

    out
}
