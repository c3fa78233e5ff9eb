//! Core trait definitions for trellis search.
//!
//! Two seams are defined here:
//! - [`TrellisModel`]: the cost hooks a caller supplies to score candidate
//!   states, transitions between consecutive columns, and cost accumulation.
//! - [`ViterbiSearch`]: the contract both engines implement, so callers and
//!   the path cursor can treat the dense and the incremental engine
//!   uniformly.

use crate::path::PathIter;
use crate::trellis::{StateId, Time};

/// Cost hooks scoring a trellis.
///
/// Implementations must be pure: the engines memoize aggressively and assume
/// repeated calls with the same inputs return the same values.
///
/// # Cost validity
/// Each engine fixes its own invalid-cost sentinel, and hooks signal
/// "no such edge" / "no such candidate" by returning it:
/// - the incremental engine ([`SparseViterbi`](crate::sparse::SparseViterbi))
///   treats any negative value as invalid, and requires every *valid* cost to
///   be non-negative with [`combine`](TrellisModel::combine) monotone
///   non-decreasing in its first argument;
/// - the dense engine ([`NaiveViterbi`](crate::naive::NaiveViterbi)) treats
///   exactly `+∞` (minimizing) or `-∞` (maximizing) as invalid and accepts
///   any other finite value, of either sign.
pub trait TrellisModel {
    /// The caller's candidate record. The engines treat it as opaque
    /// storage; only the hooks below ever look inside.
    type State;

    /// Cost of observing `state` at its own time step.
    fn emission(&self, state: &Self::State) -> f64;

    /// Cost of following the edge `left → right`, where `left` sits one
    /// column before `right`.
    fn transition(&self, left: &Self::State, right: &Self::State) -> f64;

    /// Accumulation rule combining a predecessor's cost-so-far with the
    /// costs of the edge taken and the state reached.
    ///
    /// Defaults to the sum of the three terms.
    fn combine(&self, prev_cost_so_far: f64, transition: f64, emission: f64) -> f64 {
        prev_cost_so_far + transition + emission
    }
}

/// Shared surface of the two search engines.
///
/// # Contract
/// - [`search_winner`](Self::search_winner) extends the search up to the
///   requested time if needed and returns the winning state there, or
///   [`StateId::INVALID`] if the column is missing or unreachable. Repeated
///   calls with non-decreasing times reuse prior work and return the same
///   winners at previously resolved times.
/// - [`winner`](Self::winner) is the cached counterpart: it never extends
///   the search, so it can be called through a shared reference (the path
///   cursor relies on this).
/// - [`predecessor`](Self::predecessor) reports the state one column back on
///   the best path into `id`, or [`StateId::INVALID`] when the label was
///   seeded from emission cost alone or is unknown.
/// - [`push_state`](Self::push_state) panics if `time` is neither the last
///   opened column nor the next one; columns are append-only and opened in
///   order.
pub trait ViterbiSearch {
    /// The caller's candidate record, as in [`TrellisModel::State`].
    type State;

    /// Append a candidate to the column at `time` and return its id.
    ///
    /// # Panics
    /// Panics if columns would be created out of time order.
    fn push_state(&mut self, time: Time, state: Self::State) -> StateId;

    /// Release all states, labels, winners, and queued work.
    fn clear(&mut self);

    /// Number of columns opened so far.
    fn column_count(&self) -> usize;

    /// Search up to `time` and return the winning state there, or
    /// [`StateId::INVALID`] if no column exists at `time` or no state there
    /// is reachable.
    fn search_winner(&mut self, time: Time) -> StateId;

    /// The already-resolved winner at `time`, or [`StateId::INVALID`] if
    /// `time` has not been searched yet. Never extends the search.
    fn winner(&self, time: Time) -> StateId;

    /// The predecessor of `id` on its best path, or [`StateId::INVALID`].
    fn predecessor(&self, id: StateId) -> StateId;

    /// The state behind `id`.
    ///
    /// # Panics
    /// Panics if `id` is invalid or out of range.
    fn state(&self, id: StateId) -> &Self::State;

    /// The time of the column that `id` belongs to.
    fn state_time(&self, id: StateId) -> Time;

    /// Accumulated cost recorded for `id`, or the engine's invalid-cost
    /// sentinel when `id` is invalid or its label is unknown.
    fn accumulated_cost(&self, id: StateId) -> f64;

    /// Search up to `time` and return a cursor over the winning path,
    /// backwards from the winner at `time` down to time 0.
    fn search_path(&mut self, time: Time) -> PathIter<'_, Self>
    where
        Self: Sized,
    {
        let id = self.search_winner(time);
        PathIter::new(self, id, time)
    }

    /// Cursor over the already-resolved winning path at `time`, consulting
    /// cached winners only. Call [`search_winner`](Self::search_winner)
    /// first; on an unsearched time the cursor starts from an invalid id.
    fn path(&self, time: Time) -> PathIter<'_, Self>
    where
        Self: Sized,
    {
        PathIter::new(self, self.winner(time), time)
    }

    /// The canonical end cursor, for comparison with an exhausted
    /// [`PathIter`].
    fn path_end(&self) -> PathIter<'_, Self>
    where
        Self: Sized,
    {
        PathIter::end(self)
    }
}
