//! Star-rating computation: the public surface over the five stage
//! pipeline plus the aggregator.
//!
//! The sentinel contract mirrors the upstream callers' expectations:
//! `-1` for unsupported key counts or internal faults, `0` for an empty
//! chart, otherwise a non-negative finite rating. The checked variant
//! exposes the same computation with a typed error instead.

mod aggregate;
mod anchor;
pub(crate) mod constants;
mod cross;
mod jack;
mod press;
mod release;
mod smooth;

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::model::{ChartTimeline, Note, is_supported_key_count};
use crate::rating::constants::cross_matrix_row;

/// Rating returned for unsupported key counts and internal faults.
pub const ERROR_SENTINEL: f64 = -1.0;

#[derive(Debug, Error)]
pub enum RatingError {
    /// Key counts outside 1-10 / even 12-18 have no defined rating.
    #[error("unsupported key count: {0}")]
    UnsupportedKeyCount(usize),
    /// A stage panicked; the computation is side-effect-free, so a retry
    /// cannot change the outcome.
    #[error("rating stage fault: {0}")]
    StageFault(String),
}

/// Per-stage wall-clock timings, plus the fault description when the
/// sentinel surface swallowed an error.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    stages: BTreeMap<&'static str, Duration>,
    error: Option<String>,
}

impl Diagnostics {
    fn record(&mut self, stage: &'static str, elapsed: Duration) {
        self.stages.insert(stage, elapsed);
    }

    fn with_error(message: String) -> Self {
        Self {
            stages: BTreeMap::new(),
            error: Some(message),
        }
    }

    /// Elapsed time of one stage, if it ran.
    pub fn elapsed(&self, stage: &str) -> Option<Duration> {
        self.stages.get(stage).copied()
    }

    /// All recorded stages in name order.
    pub fn stages(&self) -> impl Iterator<Item = (&'static str, Duration)> + '_ {
        self.stages.iter().map(|(&name, &elapsed)| (name, elapsed))
    }

    /// Fault description, present exactly when the rating is the error
    /// sentinel for an internal reason.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Serialize for Diagnostics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let millis: BTreeMap<&'static str, f64> = self
            .stages
            .iter()
            .map(|(&name, elapsed)| (name, elapsed.as_secs_f64() * 1000.0))
            .collect();
        let mut state = serializer.serialize_struct("Diagnostics", 2)?;
        state.serialize_field("stage_millis", &millis)?;
        state.serialize_field("error", &self.error)?;
        state.end()
    }
}

/// Result of one rating call.
#[derive(Debug, Clone, Serialize)]
pub struct RatingOutcome {
    pub rating: f64,
    pub diagnostics: Diagnostics,
}

/// Scales nearly every stage formula; pinned bit-for-bit.
fn scaling_factor(od: f64) -> f64 {
    0.3 * ((64.5 - (od * 3.0).ceil()) / 500.0).sqrt()
}

fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    (f(), start.elapsed())
}

fn pipeline(notes: &[Note], key_count: usize, od: f64, matrix_row: &[f64]) -> RatingOutcome {
    let (timeline, model_elapsed) = timed(|| ChartTimeline::build(notes.to_vec(), key_count));
    let x = scaling_factor(od);

    // {jack, cross, press, release} are mutually independent; anchor
    // waits on the jack deltas; the aggregator joins everything.
    let ((jack, jack_elapsed), ((xbar, cross_elapsed), ((pbar, press_elapsed), (rbar, release_elapsed)))) =
        rayon::join(
            || timed(|| jack::compute(&timeline, x)),
            || {
                rayon::join(
                    || timed(|| cross::compute(&timeline, x, matrix_row)),
                    || {
                        rayon::join(
                            || timed(|| press::compute(&timeline, x)),
                            || timed(|| release::compute(&timeline, x)),
                        )
                    },
                )
            },
        );
    let (anchor, anchor_elapsed) = timed(|| anchor::compute(&timeline, &jack.deltas));
    let (rating, aggregate_elapsed) = timed(|| {
        aggregate::compute(&timeline, &jack.jbar, &xbar, &pbar, &anchor, &rbar)
    });

    let mut diagnostics = Diagnostics::default();
    diagnostics.record("model", model_elapsed);
    diagnostics.record("jack", jack_elapsed);
    diagnostics.record("cross", cross_elapsed);
    diagnostics.record("press", press_elapsed);
    diagnostics.record("release", release_elapsed);
    diagnostics.record("anchor", anchor_elapsed);
    diagnostics.record("aggregate", aggregate_elapsed);

    debug!(
        rating,
        duration_ms = timeline.duration,
        notes = timeline.notes.len(),
        "rating computed"
    );

    RatingOutcome { rating, diagnostics }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown stage panic".to_string()
    }
}

/// Compute the star rating, reporting failures as a typed error.
pub fn compute_rating_checked(
    notes: &[Note],
    key_count: usize,
    od: f64,
) -> Result<RatingOutcome, RatingError> {
    // Classified before any per-duration allocation happens.
    let matrix_row =
        cross_matrix_row(key_count).ok_or(RatingError::UnsupportedKeyCount(key_count))?;
    debug_assert!(is_supported_key_count(key_count));

    if notes.is_empty() {
        return Ok(RatingOutcome {
            rating: 0.0,
            diagnostics: Diagnostics::default(),
        });
    }

    panic::catch_unwind(AssertUnwindSafe(|| pipeline(notes, key_count, od, matrix_row)))
        .map_err(|payload| RatingError::StageFault(panic_message(payload)))
}

/// Compute the star rating with the sentinel contract: this always
/// returns a number, never panics outward.
///
/// - `-1`: unsupported key count, or an internal fault (the diagnostics
///   carry the description).
/// - `0`: empty note list.
/// - otherwise: non-negative finite rating, unbounded above.
pub fn compute_rating(notes: &[Note], key_count: usize, od: f64) -> RatingOutcome {
    match compute_rating_checked(notes, key_count, od) {
        Ok(outcome) => outcome,
        Err(err) => {
            match &err {
                RatingError::UnsupportedKeyCount(_) => debug!(%err, "rating rejected"),
                RatingError::StageFault(_) => error!(%err, key_count, od, "rating fault"),
            }
            RatingOutcome {
                rating: ERROR_SENTINEL,
                diagnostics: Diagnostics::with_error(err.to_string()),
            }
        }
    }
}

/// Non-blocking variant for event-driven callers (UI threads); the
/// computation runs on the blocking pool and yields the identical
/// deterministic outcome.
pub async fn compute_rating_async(notes: Vec<Note>, key_count: usize, od: f64) -> RatingOutcome {
    match tokio::task::spawn_blocking(move || compute_rating(&notes, key_count, od)).await {
        Ok(outcome) => outcome,
        Err(join_err) => {
            error!(%join_err, "rating task failed to join");
            RatingOutcome {
                rating: ERROR_SENTINEL,
                diagnostics: Diagnostics::with_error(join_err.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_factor_matches_reference_points() {
        // od = 8: ceil(24) = 24, x = 0.3 * sqrt(40.5 / 500).
        assert!((scaling_factor(8.0) - 0.3 * (40.5f64 / 500.0).sqrt()).abs() < 1e-15);
        // ceil is applied to od * 3, so od = 7.9 rounds up to 24 too.
        assert_eq!(scaling_factor(7.9), scaling_factor(8.0));
        assert!(scaling_factor(0.0) > scaling_factor(10.0));
    }

    #[test]
    fn unsupported_key_count_is_a_typed_error() {
        let err = compute_rating_checked(&[Note::tap(0, 0)], 11, 8.0).unwrap_err();
        assert!(matches!(err, RatingError::UnsupportedKeyCount(11)));
    }

    #[test]
    fn diagnostics_serialize_as_milliseconds() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.record("jack", Duration::from_micros(1500));
        let json = serde_json::to_value(&diagnostics).unwrap();
        assert_eq!(json["stage_millis"]["jack"], 1.5);
        assert!(json["error"].is_null());
    }

    #[test]
    fn diagnostics_collection_does_not_change_the_rating() {
        let notes = vec![Note::tap(0, 0), Note::tap(1, 120), Note::tap(2, 240)];
        let a = compute_rating(&notes, 4, 8.0);
        let b = compute_rating(&notes, 4, 8.0);
        assert_eq!(a.rating.to_bits(), b.rating.to_bits());
        assert!(a.diagnostics.elapsed("aggregate").is_some());
    }
}
