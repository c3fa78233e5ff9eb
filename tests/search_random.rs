//! Randomized agreement between the two engines and a reference DP.

use proptest::prelude::*;
use std::collections::HashMap;
use trellis_search::{NaiveViterbi, SparseViterbi, TrellisModel, ViterbiSearch};

/// Fully-tabulated costs over sequentially tagged states.
#[derive(Clone)]
struct RandomModel {
    emission: Vec<f64>,
    transition: HashMap<(usize, usize), f64>,
}

impl TrellisModel for RandomModel {
    type State = usize;

    fn emission(&self, state: &usize) -> f64 {
        self.emission[*state]
    }

    fn transition(&self, left: &usize, right: &usize) -> f64 {
        self.transition[&(*left, *right)]
    }
}

/// Column layout plus cost tables drawn from a flat pool of values, the
/// pool wrapping around when exhausted.
fn build_tables(widths: &[usize], pool: &[u8]) -> (RandomModel, Vec<Vec<usize>>) {
    let mut next = 0usize;
    let mut draw = || {
        let cost = pool.get(next % pool.len().max(1)).copied().unwrap_or(1);
        next += 1;
        cost as f64
    };

    let mut columns = Vec::with_capacity(widths.len());
    let mut tag = 0usize;
    for &width in widths {
        columns.push((tag..tag + width).collect::<Vec<_>>());
        tag += width;
    }

    let emission = (0..tag).map(|_| draw()).collect::<Vec<_>>();
    let mut transition = HashMap::new();
    for pair in columns.windows(2) {
        for &left in &pair[0] {
            for &right in &pair[1] {
                transition.insert((left, right), draw());
            }
        }
    }

    (
        RandomModel {
            emission,
            transition,
        },
        columns,
    )
}

/// Straightforward dense relaxation, as a reference for the minimal
/// accumulated cost at the last column.
fn reference_min_cost(model: &RandomModel, columns: &[Vec<usize>]) -> f64 {
    let mut best: HashMap<usize, f64> = columns[0]
        .iter()
        .map(|&tag| (tag, model.emission[tag]))
        .collect();
    for pair in columns.windows(2) {
        let mut next = HashMap::new();
        for &right in &pair[1] {
            let mut cost = f64::INFINITY;
            for &left in &pair[0] {
                let candidate =
                    best[&left] + model.transition[&(left, right)] + model.emission[right];
                if candidate < cost {
                    cost = candidate;
                }
            }
            next.insert(right, cost);
        }
        best = next;
    }
    best.values().fold(f64::INFINITY, |acc, &cost| acc.min(cost))
}

fn push_all<V: ViterbiSearch<State = usize>>(search: &mut V, columns: &[Vec<usize>]) {
    for (time, column) in columns.iter().enumerate() {
        for &tag in column {
            search.push_state(time, tag);
        }
    }
}

proptest! {
    #[test]
    fn engines_agree_with_reference(
        widths in prop::collection::vec(1usize..=3, 1usize..=5),
        pool in prop::collection::vec(0u8..=9, 1usize..=60),
    ) {
        let (model, columns) = build_tables(&widths, &pool);
        let last = columns.len() - 1;
        let expected = reference_min_cost(&model, &columns);

        let mut naive = NaiveViterbi::minimizing(model.clone());
        push_all(&mut naive, &columns);
        let naive_winner = naive.search_winner(last);
        prop_assert!(naive_winner.is_valid());
        prop_assert_eq!(naive.accumulated_cost(naive_winner), expected);

        let mut sparse = SparseViterbi::new(model);
        push_all(&mut sparse, &columns);
        let sparse_winner = sparse.search_winner(last);
        prop_assert!(sparse_winner.is_valid());
        prop_assert_eq!(sparse.accumulated_cost(sparse_winner), expected);
    }

    #[test]
    fn query_order_is_immaterial(
        widths in prop::collection::vec(1usize..=3, 2usize..=5),
        pool in prop::collection::vec(0u8..=9, 1usize..=60),
    ) {
        let (model, columns) = build_tables(&widths, &pool);
        let last = columns.len() - 1;

        let mut ascending = SparseViterbi::new(model.clone());
        push_all(&mut ascending, &columns);
        let winners_asc: Vec<_> = (0..=last).map(|t| ascending.search_winner(t)).collect();

        let mut descending = SparseViterbi::new(model);
        push_all(&mut descending, &columns);
        let winners_desc: Vec<_> = (0..=last).rev().map(|t| descending.search_winner(t)).collect();

        for (time, &winner) in winners_asc.iter().enumerate() {
            prop_assert_eq!(winner, winners_desc[last - time]);
        }
    }

    #[test]
    fn incremental_and_batch_searches_match(
        widths in prop::collection::vec(1usize..=3, 2usize..=5),
        pool in prop::collection::vec(0u8..=9, 1usize..=60),
    ) {
        let (model, columns) = build_tables(&widths, &pool);
        let last = columns.len() - 1;

        let mut batch = SparseViterbi::new(model.clone());
        push_all(&mut batch, &columns);
        batch.search_winner(last);

        // Feed the columns one at a time, searching after each arrival.
        let mut incremental = SparseViterbi::new(model);
        for (time, column) in columns.iter().enumerate() {
            for &tag in column {
                incremental.push_state(time, tag);
            }
            incremental.search_winner(time);
        }

        for time in 0..=last {
            prop_assert_eq!(incremental.winner(time), batch.winner(time));
        }
    }
}
