//! Anchor stage: per-sample unevenness of timing across simultaneously
//! active columns. Closely matched (or absent) neighbouring deltas mark
//! robotic anchor patterns and pull the multiplier below 1.

use rayon::prelude::*;

use crate::model::ChartTimeline;
use crate::rating::smooth::smooth_avg;

/// Half-width of the activity window: a column counts as active at `t`
/// if a note touches `t ± 500 ms`.
const ACTIVE_HALF_WINDOW: i32 = 500;

pub(crate) struct AnchorOutput {
    /// Windowed-average anchor multiplier curve.
    pub abar: Vec<f64>,
    /// Active-column count per sample, floored at 1.
    pub ks: Vec<f64>,
}

/// Per-column activity masks. Taps cover `head ± 500`; holds stay active
/// from `head - 500` through `tail + 500` (the body keeps the finger
/// committed until after release).
fn activity_masks(timeline: &ChartTimeline) -> Vec<Vec<bool>> {
    let duration = timeline.duration as i32;
    timeline
        .columns
        .par_iter()
        .map(|column| {
            let mut diff = vec![0i32; timeline.duration + 1];
            for note in column {
                let start = (note.head - ACTIVE_HALF_WINDOW).max(0) as usize;
                let end_time = if note.is_hold() { note.tail } else { note.head };
                let end = ((end_time + ACTIVE_HALF_WINDOW + 1).min(duration)) as usize;
                diff[start] += 1;
                diff[end] -= 1;
            }
            let mut mask = vec![false; timeline.duration];
            let mut depth = 0;
            for (t, slot) in mask.iter_mut().enumerate() {
                depth += diff[t];
                *slot = depth > 0;
            }
            mask
        })
        .collect()
}

/// Multiplier for one adjacent pair of active columns. Two columns with
/// near-identical deltas (a locked anchor) or an oversized shared delta
/// are easier than their raw jack values suggest.
fn pair_multiplier(d0: f64, d1: f64) -> f64 {
    let d_max = d0.max(d1);
    let diff = (d0 - d1).abs() + (d_max - 0.3).max(0.0);
    if diff < 0.02 {
        (0.75 + 0.5 * d_max).min(1.0)
    } else if diff < 0.07 {
        (0.65 + 5.0 * diff + 0.5 * d_max).min(1.0)
    } else {
        1.0
    }
}

/// Compute the anchor curve. `deltas` is the jack stage's per-column
/// raw-delta array.
pub(crate) fn compute(timeline: &ChartTimeline, deltas: &[Vec<f64>]) -> AnchorOutput {
    let masks = activity_masks(timeline);

    let (a, ks): (Vec<f64>, Vec<f64>) = (0..timeline.duration)
        .into_par_iter()
        .map(|t| {
            let mut multiplier = 1.0;
            let mut active = 0usize;
            let mut prev_column: Option<usize> = None;
            for (column, mask) in masks.iter().enumerate() {
                if !mask[t] {
                    continue;
                }
                active += 1;
                if let Some(prev) = prev_column {
                    multiplier *= pair_multiplier(deltas[prev][t], deltas[column][t]);
                }
                prev_column = Some(column);
            }
            (multiplier, active.max(1) as f64)
        })
        .unzip();

    AnchorOutput {
        abar: smooth_avg(&a),
        ks,
    }
}
