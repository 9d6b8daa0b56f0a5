//! starchart: a star-rating engine for multi-column rhythm-game charts.
//!
//! Feed it a normalized note list, a key count, and an overall-difficulty
//! value; it returns a scalar difficulty rating plus per-stage timing
//! diagnostics. Chart decoding, pattern remapping, and presentation live
//! upstream.
//!
//! ```
//! use starchart::model::Note;
//! use starchart::rating::compute_rating;
//!
//! let notes = vec![Note::tap(0, 0), Note::tap(1, 150), Note::hold(2, 300, 700)];
//! let outcome = compute_rating(&notes, 4, 8.0);
//! assert!(outcome.rating > 0.0);
//! ```

pub mod model;
pub mod rating;
pub mod util;

pub use model::Note;
pub use rating::{RatingError, RatingOutcome, compute_rating, compute_rating_async, compute_rating_checked};
