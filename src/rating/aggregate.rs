//! Final aggregation: combine the five stage curves into one difficulty
//! curve, reduce it to a scalar with a density-weighted power mean, and
//! apply the closed-form corrective transforms.

use rayon::prelude::*;

use crate::model::ChartTimeline;
use crate::rating::anchor::AnchorOutput;
use crate::rating::constants::{LAMBDA_N, P_0, P_1, SMOOTH_HALF_WINDOW, W_0, W_1, W_2};

/// Sliding count of note heads within `t ± 500 ms`.
fn note_density(timeline: &ChartTimeline) -> Vec<f64> {
    let duration = timeline.duration as i32;
    let mut diff = vec![0i32; timeline.duration + 1];
    for note in &timeline.notes {
        let start = (note.head - SMOOTH_HALF_WINDOW as i32).max(0) as usize;
        let end = ((note.head + SMOOTH_HALF_WINDOW as i32 + 1).min(duration)) as usize;
        diff[start] += 1;
        diff[end] -= 1;
    }
    let mut density = vec![0.0; timeline.duration];
    let mut depth = 0;
    for (t, slot) in density.iter_mut().enumerate() {
        depth += diff[t];
        *slot = depth as f64;
    }
    density
}

/// Replace zero or non-finite samples with the last valid value, leaving
/// any leading run untouched. Handles chart edges with no nearby notes.
fn forward_fill(curve: &mut [f64]) {
    let mut last_valid = None;
    for v in curve.iter_mut() {
        if *v > 0.0 && v.is_finite() {
            last_valid = Some(*v);
        } else if let Some(fill) = last_valid {
            *v = fill;
        }
    }
}

/// Reduce the stage curves to the final star rating.
pub(crate) fn compute(
    timeline: &ChartTimeline,
    jbar: &[f64],
    xbar: &[f64],
    pbar: &[f64],
    anchor: &AnchorOutput,
    rbar: &[f64],
) -> f64 {
    let mut difficulty: Vec<f64> = (0..timeline.duration)
        .into_par_iter()
        .map(|t| {
            let a = anchor.abar[t].max(0.0);
            let j = jbar[t].max(0.0);
            let x = xbar[t].max(0.0);
            let p = pbar[t].max(0.0);
            let r = rbar[t].max(0.0);
            let ks = anchor.ks[t];

            let term1 = W_0 * (a.powf(3.0 / ks) * j).powf(1.5);
            let term2 = (1.0 - W_0) * (a.powf(2.0 / 3.0) * (0.8 * p + r)).powf(1.5);
            let s = (term1 + term2).powf(2.0 / 3.0);
            let twist = a.powf(3.0 / ks) * x / (x + s + 1.0);
            W_1 * s.sqrt() * twist.powf(P_1) + s * W_2
        })
        .collect();

    let mut density = note_density(timeline);
    forward_fill(&mut difficulty);
    forward_fill(&mut density);

    let weight_sum: f64 = density.iter().sum();
    if weight_sum <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = difficulty
        .iter()
        .zip(&density)
        .map(|(d, c)| d.powf(LAMBDA_N) * c)
        .sum();
    let mut sr = (weighted / weight_sum).powf(LAMBDA_N.recip());

    // Corrective transforms, in pinned order.
    sr = (sr / 8.0).powf(P_0) * 8.0;
    let taps = timeline.tap_count() as f64;
    let holds = timeline.hold_count() as f64;
    sr *= (taps + 0.5 * holds) / (taps + 0.5 * holds + 60.0);
    if sr <= 2.0 {
        sr = (2.0 * sr).sqrt();
    }
    sr * (0.96 + 0.01 * timeline.key_count as f64)
}
