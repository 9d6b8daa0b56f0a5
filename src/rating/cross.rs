//! Cross-column stage: pairwise timing interaction across adjacent
//! column boundaries, weighted by the per-mode coefficient row.

use rayon::prelude::*;

use crate::model::{ChartTimeline, Note};
use crate::rating::smooth::smooth;

/// Merged time-ordered note sequence of the columns adjoining boundary
/// `k`: interior boundaries pair columns `k-1` and `k`, the two edge
/// boundaries see a single column.
fn boundary_sequence(timeline: &ChartTimeline, boundary: usize) -> Vec<Note> {
    let key_count = timeline.key_count;
    if boundary == 0 {
        return timeline.columns[0].clone();
    }
    if boundary == key_count {
        return timeline.columns[key_count - 1].clone();
    }

    let left = &timeline.columns[boundary - 1];
    let right = &timeline.columns[boundary];
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        if (left[i].head, left[i].column) <= (right[j].head, right[j].column) {
            merged.push(left[i]);
            i += 1;
        } else {
            merged.push(right[j]);
            j += 1;
        }
    }
    merged.extend_from_slice(&left[i..]);
    merged.extend_from_slice(&right[j..]);
    merged
}

fn boundary_curve(sequence: &[Note], duration: usize, x: f64) -> Vec<f64> {
    let mut curve = vec![0.0; duration];
    for pair in sequence.windows(2) {
        let head = pair[0].head as usize;
        let next_head = pair[1].head as usize;
        if next_head <= head {
            continue;
        }
        let d = (pair[1].head - pair[0].head) as f64 / 1000.0;
        let val = 0.16 * x.max(d).powi(-2);
        curve[head..next_head].fill(val);
    }
    curve
}

/// Compute the smoothed cross-column curve. `matrix_row` is the
/// coefficient row for the chart's key count (one weight per boundary).
pub(crate) fn compute(timeline: &ChartTimeline, x: f64, matrix_row: &[f64]) -> Vec<f64> {
    let boundary_curves: Vec<Vec<f64>> = (0..=timeline.key_count)
        .into_par_iter()
        .map(|k| boundary_curve(&boundary_sequence(timeline, k), timeline.duration, x))
        .collect();

    let mut combined = vec![0.0; timeline.duration];
    for (curve, &weight) in boundary_curves.iter().zip(matrix_row) {
        for (acc, v) in combined.iter_mut().zip(curve) {
            *acc += v * weight;
        }
    }

    smooth(&combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::constants::cross_matrix_row;

    #[test]
    fn boundary_merge_interleaves_by_time() {
        let timeline = ChartTimeline::build(
            vec![Note::tap(0, 0), Note::tap(1, 50), Note::tap(0, 100)],
            2,
        );
        let merged = boundary_sequence(&timeline, 1);
        assert_eq!(
            merged.iter().map(|n| n.head).collect::<Vec<_>>(),
            vec![0, 50, 100]
        );
    }

    #[test]
    fn edge_boundaries_use_single_columns() {
        let timeline = ChartTimeline::build(
            vec![Note::tap(0, 0), Note::tap(3, 20)],
            4,
        );
        assert_eq!(boundary_sequence(&timeline, 0).len(), 1);
        assert_eq!(boundary_sequence(&timeline, 4).len(), 1);
    }

    #[test]
    fn near_simultaneous_presses_cap_at_x() {
        let x = 0.085;
        // 10ms apart: max(x, 0.01) clamps to x.
        let curve = boundary_curve(&[Note::tap(0, 0), Note::tap(1, 10)], 11, x);
        assert!((curve[5] - 0.16 * x.powi(-2)).abs() < 1e-9);
    }

    #[test]
    fn combined_curve_is_finite() {
        let timeline = ChartTimeline::build(
            vec![
                Note::tap(0, 0),
                Note::tap(1, 0),
                Note::tap(2, 60),
                Note::tap(3, 120),
            ],
            4,
        );
        let row = cross_matrix_row(4).unwrap();
        let xbar = compute(&timeline, 0.085, row);
        assert_eq!(xbar.len(), timeline.duration);
        assert!(xbar.iter().all(|v| v.is_finite() && *v >= 0.0));
    }
}
