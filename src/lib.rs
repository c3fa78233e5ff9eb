//! Viterbi search over a trellis of candidate states.
//!
//! This crate solves trellis-structured optimization problems of the kind a
//! hidden-Markov-model matcher produces: a time-ordered sequence of columns,
//! each holding candidate states, where a path picks exactly one state per
//! column and is scored by per-state *emission* costs, per-edge *transition*
//! costs, and a caller-chosen accumulation rule.
//!
//! ## Engines
//! Two engines share one contract ([`ViterbiSearch`]):
//! - [`NaiveViterbi`]: dense column-by-column dynamic programming. Quadratic
//!   per column, accepts costs of any sign, and can maximize as well as
//!   minimize.
//! - [`SparseViterbi`]: incremental best-first uniform-cost search with
//!   column-exhaustion pruning. Requires non-negative costs, and resumes
//!   cheaply as new columns arrive.
//!
//! Costs come from the caller through the [`TrellisModel`] hooks; the
//! winning path is read back through [`ViterbiSearch::search_path`].
//!
//! ## Quick start
//! ```
//! use trellis_search::{NaiveViterbi, TrellisModel, ViterbiSearch};
//!
//! // Candidates are offsets from their measurement; a path is scored by
//! // the offsets it keeps plus how much it jumps between columns.
//! struct Offsets;
//!
//! impl TrellisModel for Offsets {
//!     type State = f64;
//!
//!     fn emission(&self, state: &f64) -> f64 {
//!         *state
//!     }
//!
//!     fn transition(&self, left: &f64, right: &f64) -> f64 {
//!         (left - right).abs()
//!     }
//! }
//!
//! let mut search = NaiveViterbi::minimizing(Offsets);
//! let a = search.push_state(0, 1.0);
//! search.push_state(0, 10.0);
//! let c = search.push_state(1, 1.0);
//! search.push_state(1, 10.0);
//!
//! assert_eq!(search.search_winner(1), c);
//! assert_eq!(search.predecessor(c), a);
//! assert_eq!(search.accumulated_cost(c), 2.0);
//! assert_eq!(search.search_path(1).collect::<Vec<_>>(), vec![c, a]);
//! ```

pub mod label;
pub mod naive;
pub mod path;
pub mod queue;
pub mod sparse;
pub mod traits;
pub mod trellis;

pub use crate::label::Label;
pub use crate::naive::{Direction, NaiveViterbi};
pub use crate::path::PathIter;
pub use crate::queue::LabelQueue;
pub use crate::sparse::SparseViterbi;
pub use crate::traits::{TrellisModel, ViterbiSearch};
pub use crate::trellis::{StateId, Time, Trellis, INVALID_TIME};
