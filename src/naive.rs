//! Dense column-by-column search.
//!
//! [`NaiveViterbi`] computes a full label vector for every column, relaxing
//! every transition from the previous column. Quadratic per column, but it
//! places no sign restriction on costs and supports both search directions,
//! which the best-first engine cannot.

use crate::label::Label;
use crate::traits::{TrellisModel, ViterbiSearch};
use crate::trellis::{StateId, Time, Trellis};

/// Whether the winner of a column carries the smallest or the largest
/// accumulated cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Minimize,
    Maximize,
}

impl Direction {
    /// The cost marking a label as unreachable: `+∞` when minimizing,
    /// `-∞` when maximizing.
    pub fn invalid_cost(self) -> f64 {
        match self {
            Direction::Minimize => f64::INFINITY,
            Direction::Maximize => f64::NEG_INFINITY,
        }
    }

    fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Direction::Minimize => candidate < incumbent,
            Direction::Maximize => candidate > incumbent,
        }
    }
}

/// Dense dynamic-programming engine.
///
/// Memoizes one label vector per searched column in `history` and the
/// per-column winner in `winners`; repeated [`search_winner`] calls resume
/// from the first unsearched column.
///
/// When a column is unreachable from its predecessor (every transition
/// invalid), its labels are reseeded from emission cost alone and the chain
/// restarts there: the column still gets a winner, whose label carries no
/// predecessor.
///
/// [`search_winner`]: ViterbiSearch::search_winner
pub struct NaiveViterbi<M: TrellisModel> {
    model: M,
    direction: Direction,
    trellis: Trellis<M::State>,
    history: Vec<Vec<Label>>,
    winners: Vec<StateId>,
}

impl<M: TrellisModel> NaiveViterbi<M> {
    /// Engine selecting lowest-cost paths.
    pub fn minimizing(model: M) -> Self {
        Self::with_direction(model, Direction::Minimize)
    }

    /// Engine selecting highest-cost paths.
    pub fn maximizing(model: M) -> Self {
        Self::with_direction(model, Direction::Maximize)
    }

    pub fn with_direction(model: M, direction: Direction) -> Self {
        NaiveViterbi {
            model,
            direction,
            trellis: Trellis::new(),
            history: Vec::new(),
            winners: Vec::new(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    fn invalid_cost(&self) -> f64 {
        self.direction.invalid_cost()
    }

    fn is_invalid(&self, cost: f64) -> bool {
        cost == self.invalid_cost()
    }

    /// One label per column state, in column order, seeded either from
    /// emission cost or as unreachable.
    fn init_labels(&self, time: Time, use_emission_cost: bool) -> Vec<Label> {
        self.trellis
            .column(time)
            .iter()
            .map(|&id| {
                let cost = if use_emission_cost {
                    self.model.emission(self.trellis.state(id))
                } else {
                    self.invalid_cost()
                };
                Label::new(cost, id, StateId::INVALID)
            })
            .collect()
    }

    /// Relax every transition from the previous column's labels into
    /// `labels`, keeping the better accumulated cost per state.
    fn update_labels(&self, labels: &mut [Label], prev_labels: &[Label]) {
        for prev in prev_labels {
            if self.is_invalid(prev.cost_so_far) {
                continue;
            }
            let prev_state = self.trellis.state(prev.state);
            for label in labels.iter_mut() {
                let state = self.trellis.state(label.state);
                let emission_cost = self.model.emission(state);
                if self.is_invalid(emission_cost) {
                    continue;
                }
                let transition_cost = self.model.transition(prev_state, state);
                if self.is_invalid(transition_cost) {
                    continue;
                }
                let cost_so_far = self
                    .model
                    .combine(prev.cost_so_far, transition_cost, emission_cost);
                if self.is_invalid(cost_so_far) {
                    continue;
                }
                if self.direction.is_better(cost_so_far, label.cost_so_far) {
                    *label = Label::new(cost_so_far, label.state, prev.state);
                }
            }
        }
    }

    /// The best reachable label's state, or the invalid id if the whole
    /// column is unreachable. Ties keep the earliest label in column order.
    fn find_winner(&self, labels: &[Label]) -> StateId {
        let mut best: Option<&Label> = None;
        for label in labels {
            if self.is_invalid(label.cost_so_far) {
                continue;
            }
            match best {
                Some(incumbent)
                    if !self
                        .direction
                        .is_better(label.cost_so_far, incumbent.cost_so_far) => {}
                _ => best = Some(label),
            }
        }
        best.map_or(StateId::INVALID, |label| label.state)
    }

    /// Linear scan for the label recorded for `id` in its column's history.
    fn label(&self, id: StateId) -> Option<&Label> {
        let time = self.trellis.state_time(id);
        self.history
            .get(time)?
            .iter()
            .find(|label| label.state == id)
    }
}

impl<M: TrellisModel> ViterbiSearch for NaiveViterbi<M> {
    type State = M::State;

    fn push_state(&mut self, time: Time, state: M::State) -> StateId {
        self.trellis.push_state(time, state)
    }

    fn clear(&mut self) {
        self.history.clear();
        self.winners.clear();
        self.trellis.clear();
    }

    fn column_count(&self) -> usize {
        self.trellis.column_count()
    }

    fn search_winner(&mut self, target: Time) -> StateId {
        if self.trellis.column_count() <= target {
            return StateId::INVALID;
        }
        if target < self.winners.len() {
            return self.winners[target];
        }

        #[cfg(feature = "tracing")]
        let span = tracing::trace_span!("naive_search_winner", target);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        for time in self.winners.len()..=target {
            let mut labels = if time == 0 {
                self.init_labels(time, true)
            } else {
                let mut labels = self.init_labels(time, false);
                let prev_labels = self
                    .history
                    .last()
                    .expect("a searched column must precede time > 0");
                self.update_labels(&mut labels, prev_labels);
                labels
            };
            debug_assert_eq!(labels.len(), self.trellis.column(time).len());

            let mut winner = self.find_winner(&labels);
            if !winner.is_valid() && time > 0 {
                // Unreachable from the previous column: restart the chain
                // here on emission cost alone.
                #[cfg(feature = "tracing")]
                tracing::trace!(time, "column disconnected, reseeding from emission costs");
                labels = self.init_labels(time, true);
                winner = self.find_winner(&labels);
            }
            self.winners.push(winner);
            self.history.push(labels);
        }

        self.winners[target]
    }

    fn winner(&self, time: Time) -> StateId {
        self.winners.get(time).copied().unwrap_or(StateId::INVALID)
    }

    fn predecessor(&self, id: StateId) -> StateId {
        if !id.is_valid() {
            return StateId::INVALID;
        }
        self.label(id)
            .map_or(StateId::INVALID, |label| label.predecessor)
    }

    fn state(&self, id: StateId) -> &M::State {
        self.trellis.state(id)
    }

    fn state_time(&self, id: StateId) -> Time {
        self.trellis.state_time(id)
    }

    fn accumulated_cost(&self, id: StateId) -> f64 {
        if !id.is_valid() {
            return self.invalid_cost();
        }
        self.label(id)
            .map_or(self.invalid_cost(), |label| label.cost_so_far)
    }
}
