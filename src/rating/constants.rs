//! Pinned numeric constants of the rating model.
//!
//! Every value here is load-bearing: downstream formulas were tuned
//! against these exact numbers and the smoothing window width, so none
//! of them is a tunable default.

/// Power-mean exponent for the jack column mean and the final
/// density-weighted reduction.
pub(crate) const LAMBDA_N: f64 = 5.0;

/// Jack delta offset weight (scaled by `x^0.25`).
pub(crate) const LAMBDA_1: f64 = 0.11;

/// Press-stage weight of the concurrent hold-body integral.
pub(crate) const LAMBDA_2: f64 = 7.0;

/// Press-stage gap-penalty curvature, also in the zero-gap burst term.
pub(crate) const LAMBDA_3: f64 = 24.0;

/// Release-stage weight of the blended interval scores.
pub(crate) const LAMBDA_4: f64 = 0.8;

/// Aggregator mixing weights and exponents.
pub(crate) const W_0: f64 = 0.4;
pub(crate) const W_1: f64 = 2.7;
pub(crate) const W_2: f64 = 0.27;
pub(crate) const P_0: f64 = 1.0;
pub(crate) const P_1: f64 = 1.5;

/// Half-width of the Smooth/Smooth2/density windows, in samples (ms).
/// 500 each side, clipped at the curve bounds.
pub(crate) const SMOOTH_HALF_WINDOW: usize = 500;

/// Per-column delta sentinel meaning "no recent activity in this column".
pub(crate) const DELTA_SENTINEL: f64 = 1e9;

/// Cross-column interaction weights, one row per supported key count.
/// Row `K` holds `K + 1` coefficients, one per column boundary (0 = left
/// edge, `K` = right edge, interior boundary `k` between columns `k-1`
/// and `k`). Wide double-play modes only exist for even key counts, so
/// 11/13/15/17 have no row.
#[rustfmt::skip]
const CROSS_MATRIX: [&[f64]; 19] = [
    &[],                                                                // 0 keys: unsupported
    &[0.075, 0.075],
    &[0.125, 0.05, 0.125],
    &[0.125, 0.125, 0.125, 0.125],
    &[0.175, 0.25, 0.05, 0.25, 0.175],
    &[0.175, 0.25, 0.175, 0.175, 0.25, 0.175],
    &[0.225, 0.35, 0.25, 0.05, 0.25, 0.35, 0.225],
    &[0.225, 0.35, 0.25, 0.225, 0.225, 0.25, 0.35, 0.225],
    &[0.275, 0.45, 0.35, 0.25, 0.05, 0.25, 0.35, 0.45, 0.275],
    &[0.275, 0.45, 0.35, 0.25, 0.275, 0.275, 0.25, 0.35, 0.45, 0.275],
    &[0.325, 0.55, 0.45, 0.35, 0.25, 0.05, 0.25, 0.35, 0.45, 0.55, 0.325],
    &[],                                                                // 11 keys: unsupported
    &[0.325, 0.55, 0.45, 0.35, 0.25, 0.325, 0.325, 0.25, 0.35, 0.45, 0.55, 0.325],
    &[],                                                                // 13 keys: unsupported
    &[0.375, 0.65, 0.55, 0.45, 0.35, 0.25, 0.375, 0.375, 0.25, 0.35, 0.45, 0.55, 0.65, 0.375],
    &[],                                                                // 15 keys: unsupported
    &[0.425, 0.75, 0.65, 0.55, 0.45, 0.35, 0.25, 0.425, 0.425, 0.25, 0.35, 0.45, 0.55, 0.65, 0.75, 0.425],
    &[],                                                                // 17 keys: unsupported
    &[0.475, 0.85, 0.75, 0.65, 0.55, 0.45, 0.35, 0.25, 0.475, 0.475, 0.25, 0.35, 0.45, 0.55, 0.65, 0.75, 0.85, 0.475],
];

/// Boundary coefficient row for `key_count`, or `None` when the key
/// count has no defined rating. The tagged lookup replaces a throwing
/// path: unsupported modes are an expected classification outcome.
pub(crate) fn cross_matrix_row(key_count: usize) -> Option<&'static [f64]> {
    let row = CROSS_MATRIX.get(key_count).copied()?;
    if row.is_empty() { None } else { Some(row) }
}
