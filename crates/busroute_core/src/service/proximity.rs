//! Greedy nearest-neighbour stop ordering.
//!
//! # Invariants
//! - Output is a permutation of the input and starts with the input's first
//!   stop (the anchor).
//! - Distance is squared Euclidean in the (latitude, longitude) plane, not
//!   geodesic.
//! - Equal distances resolve to the candidate earlier in the input.

use crate::model::stop::Stop;

/// Orders `stops` as an open path starting at `stops[0]`.
///
/// Each next stop is the unplaced one closest to the most recently placed
/// stop. Inputs with fewer than two stops are returned unchanged. O(n²) time.
pub fn order_by_proximity(stops: &[Stop]) -> Vec<Stop> {
    if stops.len() <= 1 {
        return stops.to_vec();
    }

    let mut placed = vec![false; stops.len()];
    let mut ordered = Vec::with_capacity(stops.len());
    let mut current = 0;
    placed[current] = true;
    ordered.push(stops[current].clone());

    while ordered.len() < stops.len() {
        let mut best: Option<(usize, f64)> = None;
        for (index, candidate) in stops.iter().enumerate() {
            if placed[index] {
                continue;
            }
            let distance = stops[current].squared_distance_to(candidate);
            // Strict comparison keeps the earliest candidate on ties.
            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((index, distance));
            }
        }

        let Some((next, _)) = best else {
            break;
        };
        placed[next] = true;
        ordered.push(stops[next].clone());
        current = next;
    }

    ordered
}
