//! Incremental best-first search.
//!
//! [`SparseViterbi`] runs a uniform-cost search over the trellis instead of
//! relaxing every transition: states leave the queue in cost order, and the
//! first label popped for a state is final. That requires every valid cost
//! to be non-negative and the accumulation rule to be monotone, and in
//! exchange the engine scans each state at most once, prunes whole columns
//! once they are exhausted, and resumes cheaply when new columns arrive.

use crate::label::Label;
use crate::queue::LabelQueue;
use crate::traits::{TrellisModel, ViterbiSearch};
use crate::trellis::{StateId, Time, Trellis};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Cost reported for a state without a scanned label.
const UNSCANNED_COST: f64 = -1.0;

/// Incremental best-first engine.
///
/// All search state survives between [`search_winner`] calls: columns may be
/// appended and the next call continues from the last winner's successors.
/// [`clear`](ViterbiSearch::clear) is the only reset.
///
/// # Cost contract
/// Every cost returned by the model's hooks must be non-negative or
/// negative-as-invalid (any value `< 0` marks a pruned state or edge), and
/// [`combine`](TrellisModel::combine) must never decrease its first
/// argument. Violations surface as a panic when a state would be finalized
/// twice with a lower cost.
///
/// [`search_winner`]: ViterbiSearch::search_winner
pub struct SparseViterbi<M: TrellisModel> {
    model: M,
    trellis: Trellis<M::State>,
    /// Per column, the states not yet scanned.
    unreached: Vec<Vec<StateId>>,
    /// Final label per scanned state.
    scanned: HashMap<StateId, Label>,
    winners: Vec<StateId>,
    /// Labels at earlier times are obsolete: their columns are exhausted.
    earliest_time: Time,
    queue: LabelQueue,
}

impl<M: TrellisModel> SparseViterbi<M> {
    pub fn new(model: M) -> Self {
        SparseViterbi {
            model,
            trellis: Trellis::new(),
            unreached: Vec::new(),
            scanned: HashMap::new(),
            winners: Vec::new(),
            earliest_time: 0,
            queue: LabelQueue::new(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Lower bound on times that can still contribute to future winners.
    /// Non-decreasing over the engine's lifetime.
    pub fn earliest_time(&self) -> Time {
        self.earliest_time
    }

    fn is_invalid_cost(cost: f64) -> bool {
        cost < 0.0
    }

    /// Seed the queue from the emission costs of a column, discarding any
    /// leftover work from an interrupted search.
    fn init_queue(&mut self, time: Time) {
        self.queue.clear();
        let Self {
            model,
            trellis,
            unreached,
            queue,
            ..
        } = self;
        for &id in &unreached[time] {
            let emission_cost = model.emission(trellis.state(id));
            if Self::is_invalid_cost(emission_cost) {
                continue;
            }
            queue.push(Label::new(emission_cost, id, StateId::INVALID));
        }
    }

    /// Push a label for every unreached state in the next column reachable
    /// from the scanned state `id`.
    ///
    /// # Panics
    /// Panics if `id` has no successor column or was never scanned; both
    /// indicate an engine bug.
    fn add_successors(&mut self, id: StateId) {
        let time = self.trellis.state_time(id);
        let next_time = time + 1;
        if next_time >= self.unreached.len() {
            panic!("the state at time {time} cannot have successors");
        }
        let label = *self
            .scanned
            .get(&id)
            .unwrap_or_else(|| panic!("state {id} must be scanned before expansion"));
        if Self::is_invalid_cost(label.cost_so_far) {
            panic!("scanned label for state {id} carries an invalid cost");
        }

        let Self {
            model,
            trellis,
            unreached,
            queue,
            ..
        } = self;
        let state = trellis.state(id);
        for &next_id in &unreached[next_time] {
            let next_state = trellis.state(next_id);
            let emission_cost = model.emission(next_state);
            if Self::is_invalid_cost(emission_cost) {
                continue;
            }
            let transition_cost = model.transition(state, next_state);
            if Self::is_invalid_cost(transition_cost) {
                continue;
            }
            let cost_so_far = model.combine(label.cost_so_far, transition_cost, emission_cost);
            if Self::is_invalid_cost(cost_so_far) {
                continue;
            }
            queue.push(Label::new(cost_so_far, next_id, id));
        }
    }

    /// Record the final label for a popped state.
    ///
    /// Returns `false` for a dominated duplicate (the state was already
    /// scanned at an equal or better cost), which the caller discards.
    ///
    /// # Panics
    /// Panics if the new label is *cheaper* than the scanned one: the first
    /// pop of a state is optimal under the cost contract, so a cheaper
    /// second pop means negative or non-monotone costs were supplied.
    fn mark_scanned(&mut self, label: Label) -> bool {
        match self.scanned.entry(label.state) {
            Entry::Occupied(entry) => {
                if label.cost_so_far < entry.get().cost_so_far {
                    panic!(
                        "the principle of optimality is violated at state {}, \
                         probably negative costs occurred",
                        label.state
                    );
                }
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(label);
                true
            }
        }
    }

    /// Continue (or restart) the best-first search until the winner at
    /// `target` is found or the queue runs dry.
    ///
    /// Returns the highest time actually searched; a result below `target`
    /// means a breakage and the caller retries with `request_new_start`.
    fn iterative_search(&mut self, target: Time, request_new_start: bool) -> Time {
        if self.unreached.len() <= target {
            panic!(
                "the target time {target} is beyond the last column {}",
                self.unreached.len().saturating_sub(1)
            );
        }
        if target < self.winners.len() {
            return target;
        }

        #[cfg(feature = "tracing")]
        let span = tracing::trace_span!("iterative_search", target, request_new_start);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        // Either continue from the last winner or reseed the first
        // unresolved column from emission costs.
        let source = if !request_new_start && self.winners.last().is_some_and(|id| id.is_valid()) {
            let source = self.winners.len() - 1;
            self.add_successors(self.winners[source]);
            source
        } else {
            let source = self.winners.len();
            self.init_queue(source);
            source
        };

        let mut searched_time = source;

        while let Some(label) = self.queue.pop() {
            let id = label.state;
            let time = self.trellis.state_time(id);

            // The column at `time` emptied earlier; this label can no longer
            // sit on a path to any future winner.
            if time < self.earliest_time {
                continue;
            }

            if !self.mark_scanned(label) {
                continue;
            }

            let column = &mut self.unreached[time];
            let position = column
                .iter()
                .position(|&state| state == id)
                .unwrap_or_else(|| panic!("scanned state {id} is missing from its column"));
            column.remove(position);
            if column.is_empty() {
                self.earliest_time = time + 1;
            }

            // First arrival at a column wins it.
            if self.winners.len() <= time {
                if time != self.winners.len() {
                    panic!("found a label from the future time {time}");
                }
                self.winners.push(id);
            }

            searched_time = searched_time.max(time);

            // The winner at the target is known; successors are added on the
            // next call.
            if target <= searched_time {
                break;
            }

            self.add_successors(id);
        }

        // Columns up to the searched time without a first arrival stay
        // winnerless.
        while self.winners.len() <= searched_time {
            self.winners.push(StateId::INVALID);
        }

        searched_time
    }
}

impl<M: TrellisModel> ViterbiSearch for SparseViterbi<M> {
    type State = M::State;

    fn push_state(&mut self, time: Time, state: M::State) -> StateId {
        let id = self.trellis.push_state(time, state);
        if time == self.unreached.len() {
            self.unreached.push(Vec::new());
        }
        self.unreached[time].push(id);
        id
    }

    fn clear(&mut self) {
        self.earliest_time = 0;
        self.queue.clear();
        self.scanned.clear();
        self.unreached.clear();
        self.winners.clear();
        self.trellis.clear();
    }

    fn column_count(&self) -> usize {
        self.trellis.column_count()
    }

    fn search_winner(&mut self, time: Time) -> StateId {
        if time < self.winners.len() {
            return self.winners[time];
        }
        if self.unreached.is_empty() {
            return StateId::INVALID;
        }

        #[cfg(feature = "tracing")]
        let span = tracing::trace_span!("sparse_search_winner", time);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let max_allowed_time = self.unreached.len() - 1;
        let target = time.min(max_allowed_time);

        let mut searched_time = self.iterative_search(target, false);
        while searched_time < target {
            // A breakage: nothing connects the searched column to the next
            // one. Restart from the first unresolved column.
            #[cfg(feature = "tracing")]
            tracing::trace!(searched_time, target, "breakage, requesting a new start");
            searched_time = self.iterative_search(target, true);
        }

        self.winners.get(time).copied().unwrap_or(StateId::INVALID)
    }

    fn winner(&self, time: Time) -> StateId {
        self.winners.get(time).copied().unwrap_or(StateId::INVALID)
    }

    fn predecessor(&self, id: StateId) -> StateId {
        self.scanned
            .get(&id)
            .map_or(StateId::INVALID, |label| label.predecessor)
    }

    fn state(&self, id: StateId) -> &M::State {
        self.trellis.state(id)
    }

    fn state_time(&self, id: StateId) -> Time {
        self.trellis.state_time(id)
    }

    fn accumulated_cost(&self, id: StateId) -> f64 {
        self.scanned
            .get(&id)
            .map_or(UNSCANNED_COST, |label| label.cost_so_far)
    }
}
