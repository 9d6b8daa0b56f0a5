//! Release stage: hold-note release timing difficulty, driven by how far
//! each release and its follow-up press deviate from the 80ms reference
//! interval.

use rayon::prelude::*;

use crate::model::ChartTimeline;
use crate::rating::constants::LAMBDA_4;
use crate::rating::smooth::smooth;

/// Head time stand-in when a column has nothing after the release.
const FAR_FUTURE_MS: f64 = 1e9;

/// Reference release interval in milliseconds.
const REFERENCE_MS: f64 = 80.0;

/// Blended interval score for one hold: a logistic-like mix of the
/// head-phase deviation (hold length vs. reference) and the tail-phase
/// deviation (release to next press in the column).
fn interval_score(timeline: &ChartTimeline, hold_index: usize, x: f64) -> f64 {
    let hold = timeline.tails[hold_index];
    let next_head = timeline
        .next_in_column(hold.column, hold.tail)
        .map_or(FAR_FUTURE_MS, |n| n.head as f64);

    let i_head = ((hold.tail - hold.head) as f64 - REFERENCE_MS).abs() / (1000.0 * x);
    let i_tail = (next_head - hold.tail as f64 - REFERENCE_MS).abs() / (1000.0 * x);

    2.0 / (2.0 + (-5.0 * (i_head - 0.75)).exp() + (-5.0 * (i_tail - 0.75)).exp())
}

/// Compute the smoothed release curve.
pub(crate) fn compute(timeline: &ChartTimeline, x: f64) -> Vec<f64> {
    let scores: Vec<f64> = (0..timeline.tails.len())
        .into_par_iter()
        .map(|i| interval_score(timeline, i, x))
        .collect();

    let mut curve = vec![0.0; timeline.duration];
    for (i, pair) in timeline.tails.windows(2).enumerate() {
        let tail = pair[0].tail as usize;
        let next_tail = pair[1].tail as usize;
        if next_tail <= tail {
            continue;
        }
        let dr = (next_tail - tail) as f64 / 1000.0;
        let val = 0.08 * dr.powf(-0.5) / x * (1.0 + LAMBDA_4 * (scores[i] + scores[i + 1]));
        curve[tail..next_tail].fill(val);
    }

    smooth(&curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Note;

    #[test]
    fn score_stays_in_unit_range() {
        let timeline = ChartTimeline::build(
            vec![Note::hold(0, 0, 80), Note::tap(0, 160), Note::hold(1, 0, 300)],
            2,
        );
        for i in 0..timeline.tails.len() {
            let s = interval_score(&timeline, i, 0.085);
            assert!(s > 0.0 && s < 1.0, "score {i} out of range: {s}");
        }
    }

    #[test]
    fn reference_timed_release_scores_low() {
        // Hold length and follow-up gap both exactly on the reference:
        // both deviations are 0, well below the 0.75 midpoint.
        let on_reference = ChartTimeline::build(
            vec![Note::hold(0, 0, 80), Note::tap(0, 160)],
            1,
        );
        // A long hold with a distant follow-up maxes both deviations.
        let off_reference = ChartTimeline::build(
            vec![Note::hold(0, 0, 1000), Note::tap(0, 3000)],
            1,
        );
        let low = interval_score(&on_reference, 0, 0.085);
        let high = interval_score(&off_reference, 0, 0.085);
        assert!(low < high);
        assert!(low < 0.1);
        assert!(high > 0.9);
    }

    #[test]
    fn missing_follow_up_uses_far_future() {
        let timeline = ChartTimeline::build(vec![Note::hold(0, 0, 200)], 1);
        let s = interval_score(&timeline, 0, 0.085);
        assert!(s.is_finite());
    }

    #[test]
    fn no_holds_means_a_zero_curve() {
        let timeline = ChartTimeline::build(vec![Note::tap(0, 0), Note::tap(0, 100)], 1);
        let rbar = compute(&timeline, 0.085);
        assert!(rbar.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn paired_releases_fill_the_gap() {
        let timeline = ChartTimeline::build(
            vec![Note::hold(0, 0, 400), Note::hold(1, 100, 700)],
            2,
        );
        let rbar = compute(&timeline, 0.085);
        assert!(rbar[550] > 0.0);
        assert!(rbar.iter().all(|v| v.is_finite()));
    }
}
