//! Per-call derived view of a chart: sorted sequences, per-column
//! groupings, and the hold-note orderings the rating stages walk.

use crate::model::Note;

/// Ephemeral indexing of one chart, built at the start of a rating call
/// and dropped when the call returns.
#[derive(Debug)]
pub struct ChartTimeline {
    /// All notes ordered by `(head, column)`.
    pub notes: Vec<Note>,
    /// Per-column subsequences of `notes`, time order preserved.
    pub columns: Vec<Vec<Note>>,
    /// Hold notes ordered by head time (head-phase logic).
    pub holds: Vec<Note>,
    /// Hold notes ordered by tail time (release-phase logic).
    pub tails: Vec<Note>,
    /// `max(head, tail) + 1` over all notes; length of every curve.
    pub duration: usize,
    pub key_count: usize,
}

impl ChartTimeline {
    /// Sort and group a raw note list. `notes` must be non-empty and
    /// `key_count` already validated as supported.
    pub fn build(mut notes: Vec<Note>, key_count: usize) -> Self {
        notes.sort_by_key(|n| (n.head, n.column));

        let mut columns = vec![Vec::new(); key_count];
        for &note in &notes {
            columns[note.column].push(note);
        }

        let holds: Vec<Note> = notes.iter().copied().filter(|n| n.is_hold()).collect();
        let mut tails = holds.clone();
        tails.sort_by_key(|n| (n.tail, n.column));

        let duration = notes
            .iter()
            .map(|n| n.head.max(n.tail))
            .max()
            .unwrap_or(0) as usize
            + 1;

        Self {
            notes,
            columns,
            holds,
            tails,
            duration,
            key_count,
        }
    }

    /// Number of tap notes.
    pub fn tap_count(&self) -> usize {
        self.notes.len() - self.holds.len()
    }

    /// Number of hold notes.
    pub fn hold_count(&self) -> usize {
        self.holds.len()
    }

    /// First note in `column` with head time strictly after `time`, or
    /// `None`. Columns are head-sorted, so this is a binary search; on
    /// equal heads the decoder's (stable) order is kept and the first
    /// strictly-later note wins.
    pub fn next_in_column(&self, column: usize, time: i32) -> Option<Note> {
        let seq = &self.columns[column];
        let idx = seq.partition_point(|n| n.head <= time);
        seq.get(idx).copied()
    }
}
