//! Example: matching noisy measurements onto a line of waypoints.
//!
//! Run with:
//! `cargo run --example route_match`

use trellis_search::{SparseViterbi, StateId, TrellisModel, ViterbiSearch};

/// Candidates are positions along a one-dimensional route. A candidate is
/// scored by its distance to the measurement it explains (emission), and a
/// hop between consecutive candidates by how far it deviates from the
/// expected advance of 1.0 per step (transition).
struct RouteModel;

impl TrellisModel for RouteModel {
    type State = Candidate;

    fn emission(&self, state: &Candidate) -> f64 {
        (state.position - state.measurement).abs()
    }

    fn transition(&self, left: &Candidate, right: &Candidate) -> f64 {
        let advance = right.position - left.position;
        (advance - 1.0).abs()
    }
}

struct Candidate {
    position: f64,
    measurement: f64,
}

fn main() {
    // Noisy measurements drifting along the route.
    let measurements: [f64; 5] = [0.1, 1.3, 1.9, 3.2, 3.8];

    let mut search = SparseViterbi::new(RouteModel);
    for (time, &measurement) in measurements.iter().enumerate() {
        // Candidate positions near each measurement, snapped to half-units.
        let base = (measurement * 2.0).round() / 2.0;
        for offset in [-0.5, 0.0, 0.5] {
            search.push_state(
                time,
                Candidate {
                    position: base + offset,
                    measurement,
                },
            );
        }
    }

    let last = measurements.len() - 1;
    let winner = search.search_winner(last);
    if winner == StateId::INVALID {
        println!("no path explains the measurements");
        return;
    }

    let mut path: Vec<StateId> = search.search_path(last).collect();
    path.reverse();

    println!("matched positions:");
    for id in path {
        let candidate = search.state(id);
        println!(
            "  t={} measured {:.1} -> matched {:.1}",
            search.state_time(id),
            candidate.measurement,
            candidate.position
        );
    }
    println!(
        "total cost: {:.2}",
        search.accumulated_cost(search.winner(last))
    );
}
