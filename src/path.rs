//! Backward traversal of a winning path.
//!
//! Given the winner at some time, [`PathIter`] walks the predecessor chain
//! back to time 0. When a label has no predecessor but earlier columns
//! remain (a breakage: an emission-only restart in either engine), the
//! cursor jumps sideways to the winner of the previous column, so a path
//! stays defined even where the trellis lost connectivity.

use crate::traits::ViterbiSearch;
use crate::trellis::{StateId, Time, INVALID_TIME};

/// Cursor yielding the states of a winning path in reverse time order.
///
/// Each step yields the [`StateId`] at the current time (possibly
/// [`StateId::INVALID`] for a column with no resolved winner), then moves to
/// the predecessor (or, across a breakage, to the previous column's winner)
/// and decrements the time. The cursor ends after yielding time 0.
pub struct PathIter<'a, V: ViterbiSearch> {
    search: &'a V,
    id: StateId,
    time: Time,
}

impl<'a, V: ViterbiSearch> PathIter<'a, V> {
    pub(crate) fn new(search: &'a V, id: StateId, time: Time) -> Self {
        PathIter { search, id, time }
    }

    pub(crate) fn end(search: &'a V) -> Self {
        PathIter {
            search,
            id: StateId::INVALID,
            time: INVALID_TIME,
        }
    }

    /// Whether the cursor has reached the canonical end position.
    pub fn is_end(&self) -> bool {
        self.id == StateId::INVALID && self.time == INVALID_TIME
    }

    /// The id at the cursor's current position, without advancing.
    pub fn current(&self) -> StateId {
        self.id
    }

    /// The time at the cursor's current position.
    pub fn time(&self) -> Time {
        self.time
    }
}

impl<V: ViterbiSearch> Iterator for PathIter<'_, V> {
    type Item = StateId;

    fn next(&mut self) -> Option<StateId> {
        if self.is_end() {
            return None;
        }
        let current = self.id;
        debug_assert!(
            !current.is_valid() || self.search.state_time(current) == self.time,
            "cursor id does not belong to the cursor time"
        );
        if self.time > 0 {
            self.id = if current.is_valid() {
                self.search.predecessor(current)
            } else {
                StateId::INVALID
            };
            self.time -= 1;
            if !self.id.is_valid() {
                // Breakage: the chain restarted here, pick up the winner of
                // the previous column instead.
                self.id = self.search.winner(self.time);
            }
        } else {
            self.id = StateId::INVALID;
            self.time = INVALID_TIME;
        }
        Some(current)
    }
}

impl<V: ViterbiSearch> PartialEq for PathIter<'_, V> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.search, other.search) && self.id == other.id && self.time == other.time
    }
}
