//! Normalized note model consumed by the rating engine.
//!
//! Upstream chart decoders hand us a flat note list; nothing here knows
//! about file formats, BPM changes, or lane presentation. The engine only
//! sees columns, head times, and optional tail times.

mod timeline;

pub use timeline::ChartTimeline;

use serde::{Deserialize, Serialize};

/// Tail value marking a note as a plain tap (no sustained body).
pub const TAP_TAIL: i32 = -1;

/// A single playable event in a chart.
///
/// `head` is the press time in milliseconds; `tail` is the release time
/// for hold notes, or [`TAP_TAIL`] for taps. The decoder guarantees
/// `head >= 0`, `0 <= column < key_count`, and `tail > head` for holds;
/// the engine does not re-validate this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub column: usize,
    pub head: i32,
    #[serde(default = "default_tail")]
    pub tail: i32,
}

fn default_tail() -> i32 {
    TAP_TAIL
}

impl Note {
    /// Create a tap note.
    pub fn tap(column: usize, head: i32) -> Self {
        Self {
            column,
            head,
            tail: TAP_TAIL,
        }
    }

    /// Create a hold note spanning `[head, tail]`.
    pub fn hold(column: usize, head: i32, tail: i32) -> Self {
        Self { column, head, tail }
    }

    /// Returns true if this note has a sustained body.
    pub fn is_hold(self) -> bool {
        self.tail >= 0
    }
}

/// Returns true if the engine defines a rating for this key count.
///
/// Supported modes are 1-10 keys plus the even double-play counts 12, 14,
/// 16, and 18. Everything else short-circuits to the `-1` sentinel before
/// any per-duration array is allocated.
pub fn is_supported_key_count(key_count: usize) -> bool {
    matches!(key_count, 1..=10) || matches!(key_count, 12 | 14 | 16 | 18)
}
