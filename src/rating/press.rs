//! Press/density stage: chord and stream press difficulty, loaded by the
//! bodies of any holds sustained through each gap.

use rayon::prelude::*;

use crate::model::ChartTimeline;
use crate::rating::constants::{LAMBDA_2, LAMBDA_3};
use crate::rating::smooth::smooth;

/// Tempo correction, non-unity only for gaps whose equivalent stream
/// tempo `7.5/δ` falls in (160, 360).
fn tempo_correction(delta: f64) -> f64 {
    let q = 7.5 / delta;
    if q > 160.0 && q < 360.0 {
        1.0 + 1.7e-7 * (q - 160.0) * (q - 360.0).powi(2)
    } else {
        1.0
    }
}

/// Accumulated hold-body load per sample: each hold contributes 0.5
/// during its first 80 ms (attack ramp) and 1.0 until release.
/// Holds can overlap, so each worker accumulates into its own difference
/// array and the shards are merged before a single prefix pass.
fn body_load(timeline: &ChartTimeline) -> Vec<f64> {
    let duration = timeline.duration;
    let diff = timeline
        .holds
        .par_iter()
        .fold(
            || vec![0.0; duration + 1],
            |mut diff, hold| {
                let head = hold.head as usize;
                let tail = hold.tail as usize;
                let ramp_end = (head + 80).min(tail);
                diff[head] += 0.5;
                diff[ramp_end] += 0.5;
                diff[tail] -= 1.0;
                diff
            },
        )
        .reduce(
            || vec![0.0; duration + 1],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b) {
                    *x += y;
                }
                a
            },
        );

    let mut body = vec![0.0; duration];
    let mut acc = 0.0;
    for (t, slot) in body.iter_mut().enumerate() {
        acc += diff[t];
        *slot = acc;
    }
    body
}

/// Compute the smoothed press curve.
pub(crate) fn compute(timeline: &ChartTimeline, x: f64) -> Vec<f64> {
    let body = body_load(timeline);

    // Running integral of the body load, for O(1) per-gap sums.
    let mut body_prefix = vec![0.0; timeline.duration + 1];
    for (t, &v) in body.iter().enumerate() {
        body_prefix[t + 1] = body_prefix[t] + v;
    }

    // Value of the gap-penalized formula frozen at its validity edge
    // δ = 2x/3; gaps wider than that sit on this floor.
    let floor_base = (0.08 / x * (1.0 - LAMBDA_3 / x * (x / 6.0).powi(2))).powf(0.25);

    let mut curve = vec![0.0; timeline.duration];
    for pair in timeline.notes.windows(2) {
        let head = pair[0].head as usize;
        let next_head = pair[1].head as usize;

        if next_head == head {
            // Chorded press: a burst term at the shared sample.
            curve[head] += 1000.0 * (0.02 * (4.0 / x - LAMBDA_3)).powf(0.25);
            continue;
        }

        let d = (next_head - head) as f64 / 1000.0;
        let body_term = 1.0 + LAMBDA_2 * (body_prefix[next_head] - body_prefix[head]) / 1000.0;
        let base = if d < 2.0 * x / 3.0 {
            (0.08 / x * (1.0 - LAMBDA_3 / x * (d - x / 2.0).powi(2))).powf(0.25)
        } else {
            floor_base
        };
        let val = base * body_term * tempo_correction(d) / d;
        for slot in &mut curve[head..next_head] {
            *slot += val;
        }
    }

    smooth(&curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Note;

    #[test]
    fn body_load_ramps_then_sustains() {
        let timeline = ChartTimeline::build(vec![Note::hold(0, 100, 400)], 1);
        let body = body_load(&timeline);
        assert_eq!(body[99], 0.0);
        assert_eq!(body[100], 0.5);
        assert_eq!(body[179], 0.5);
        assert_eq!(body[180], 1.0);
        assert_eq!(body[399], 1.0);
        assert_eq!(body[400], 0.0);
    }

    #[test]
    fn overlapping_holds_accumulate() {
        let timeline = ChartTimeline::build(
            vec![Note::hold(0, 0, 1000), Note::hold(1, 0, 1000)],
            2,
        );
        let body = body_load(&timeline);
        assert_eq!(body[500], 2.0);
    }

    #[test]
    fn short_hold_never_leaves_ramp() {
        let timeline = ChartTimeline::build(vec![Note::hold(0, 0, 50)], 1);
        let body = body_load(&timeline);
        assert_eq!(body[25], 0.5);
        assert_eq!(body[50], 0.0);
    }

    #[test]
    fn tempo_correction_is_a_bounded_boost() {
        assert_eq!(tempo_correction(0.2), 1.0); // 37.5 "BPM"
        assert_eq!(tempo_correction(0.02), 1.0); // 375
        let boosted = tempo_correction(7.5 / 260.0);
        assert!(boosted > 1.0 && boosted < 1.3);
    }

    #[test]
    fn chord_bursts_do_not_produce_nan() {
        let timeline = ChartTimeline::build(
            vec![Note::tap(0, 100), Note::tap(1, 100), Note::tap(2, 100)],
            4,
        );
        let pbar = compute(&timeline, 0.085);
        assert!(pbar.iter().all(|v| v.is_finite()));
        assert!(pbar[100] > 0.0);
    }

    #[test]
    fn held_body_raises_press_difficulty() {
        let x = 0.085;
        let plain = ChartTimeline::build(
            vec![Note::tap(0, 50), Note::tap(1, 200), Note::tap(0, 350)],
            4,
        );
        let loaded = ChartTimeline::build(
            vec![
                Note::hold(3, 40, 360),
                Note::tap(0, 50),
                Note::tap(1, 200),
                Note::tap(0, 350),
            ],
            4,
        );
        let peak = |tl: &ChartTimeline| compute(tl, x).iter().cloned().fold(0.0, f64::max);
        assert!(peak(&loaded) > peak(&plain));
    }
}
