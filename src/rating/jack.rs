//! Jack/stamina stage: repeat-press difficulty per column, smoothed and
//! combined across columns with activity-weighted power means.

use rayon::prelude::*;

use crate::model::ChartTimeline;
use crate::rating::constants::{DELTA_SENTINEL, LAMBDA_1, LAMBDA_N};
use crate::rating::smooth::smooth;

pub(crate) struct JackOutput {
    /// Combined jack difficulty curve.
    pub jbar: Vec<f64>,
    /// Raw per-column inter-press deltas in seconds, `DELTA_SENTINEL`
    /// where a column has no surrounding note pair. Reused by the anchor
    /// stage.
    pub deltas: Vec<Vec<f64>>,
}

/// Penalty suppressing unrealistically fast jacks: the raw `1/δ²` term
/// would otherwise rate sub-80ms jacks as near-infinite difficulty.
fn jack_nerfer(delta: f64) -> f64 {
    1.0 - 7e-5 * (0.15 + (delta - 0.08).abs()).powi(-4)
}

fn column_curves(column: &[crate::model::Note], duration: usize, x: f64) -> (Vec<f64>, Vec<f64>) {
    let mut curve = vec![0.0; duration];
    let mut delta = vec![DELTA_SENTINEL; duration];

    for pair in column.windows(2) {
        let head = pair[0].head as usize;
        let next_head = pair[1].head as usize;
        let d = (pair[1].head - pair[0].head) as f64 / 1000.0;
        if next_head <= head {
            // Duplicate press on the same sample; the half-open interval
            // is empty and contributes nothing.
            continue;
        }
        let val = (d * (d + LAMBDA_1 * x.powf(0.25))).recip() * jack_nerfer(d);
        curve[head..next_head].fill(val);
        delta[head..next_head].fill(d);
    }

    (smooth(&curve), delta)
}

/// Walk every column's consecutive note pairs, smooth each column curve,
/// then take a per-sample power mean weighted by inverse local delta so
/// columns with tighter recent activity dominate.
pub(crate) fn compute(timeline: &ChartTimeline, x: f64) -> JackOutput {
    let per_column: Vec<(Vec<f64>, Vec<f64>)> = timeline
        .columns
        .par_iter()
        .map(|column| column_curves(column, timeline.duration, x))
        .collect();

    let jbar = (0..timeline.duration)
        .into_par_iter()
        .map(|t| {
            let mut weighted = 0.0;
            let mut weight_sum = 0.0;
            for (curve, delta) in &per_column {
                let w = delta[t].recip();
                weighted += curve[t].max(0.0).powf(LAMBDA_N) * w;
                weight_sum += w;
            }
            (weighted / weight_sum).powf(LAMBDA_N.recip())
        })
        .collect();

    let deltas = per_column.into_iter().map(|(_, delta)| delta).collect();
    JackOutput { jbar, deltas }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Note;

    fn single_column_chart(gap: i32) -> ChartTimeline {
        ChartTimeline::build(vec![Note::tap(0, 0), Note::tap(0, gap)], 4)
    }

    #[test]
    fn nerfer_dips_at_fastest_jacks() {
        assert!(jack_nerfer(0.08) < jack_nerfer(0.2));
        assert!(jack_nerfer(0.08) > 0.8);
        assert!((jack_nerfer(1.0) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn empty_columns_stay_at_sentinel() {
        let timeline = single_column_chart(200);
        let out = compute(&timeline, 0.085);
        assert_eq!(out.deltas.len(), 4);
        assert!(out.deltas[1].iter().all(|&d| d == DELTA_SENTINEL));
        assert!((out.deltas[0][100] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn tighter_jacks_rate_higher_until_nerfed() {
        let x = 0.085;
        let peak = |gap: i32| {
            let timeline = single_column_chart(gap);
            let out = compute(&timeline, x);
            out.jbar.iter().cloned().fold(0.0, f64::max)
        };
        // Denser jacks are harder across the playable range.
        assert!(peak(150) > peak(300));
        assert!(peak(300) > peak(450));
    }

    #[test]
    fn curve_is_finite_everywhere() {
        let timeline = ChartTimeline::build(
            vec![
                Note::tap(0, 0),
                Note::tap(0, 90),
                Note::tap(1, 45),
                Note::tap(1, 135),
            ],
            4,
        );
        let out = compute(&timeline, 0.085);
        assert!(out.jbar.iter().all(|v| v.is_finite()));
    }
}
