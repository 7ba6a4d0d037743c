use super::{construct_path, Trace};
use crate::common::{manhattan_distance, LowLevelNode, Path, Position, ReservationTable};
use crate::map::Map;
use crate::stat::Stats;

use std::collections::{BTreeSet, HashMap};
use tracing::{debug, instrument, trace};

/// A* over `(position, time_step)` states, leaving `start` at `start_time`.
///
/// Every state has five successors, the four moves and a wait, each costing one
/// step. A successor is pruned when its cell is reserved at the arrival time or
/// when taking it would swap places with a reserved traversal. The heuristic is
/// the Manhattan distance and ignores time, so the returned path has the fewest
/// hops rather than being optimal once waits are weighed.
///
/// The search stops at the first popped state on `goal`. No state past `horizon`
/// is generated; if every branch hits it the search fails.
#[instrument(skip_all, name = "space_time_a_star", fields(start = format!("{:?}", start), goal = format!("{:?}", goal), start_time = start_time), level = "debug")]
pub fn space_time_a_star_search(
    map: &Map,
    start: Position,
    start_time: usize,
    goal: Position,
    reservations: &ReservationTable,
    horizon: usize,
    stats: &mut Stats,
) -> Option<Path> {
    if !map.is_passable(start) || !map.is_passable(goal) {
        debug!("start or goal is blocked");
        return None;
    }

    let mut open_list = BTreeSet::new();
    let mut g_costs: HashMap<(Position, usize), usize> = HashMap::new();
    let mut trace: Trace = HashMap::new();
    let mut order = 0;

    open_list.insert(LowLevelNode {
        position: start,
        time_step: start_time,
        f_cost: manhattan_distance(start, goal),
        g_cost: 0,
        order,
        parent: None,
    });
    g_costs.insert((start, start_time), 0);

    while let Some(current) = open_list.pop_first() {
        let state = (current.position, current.time_step);
        if trace.contains_key(&state) {
            continue;
        }
        trace.insert(state, current.parent);
        trace!("expand node: {current:?}");
        stats.low_level_expand_nodes += 1;

        if current.position == goal {
            return Some(construct_path(&trace, state));
        }

        let next_time_step = current.time_step + 1;
        if next_time_step > horizon {
            continue;
        }

        let tentative_g_cost = current.g_cost + 1;
        for neighbor in map.get_neighbors(current.position, true) {
            if reservations.is_reserved(neighbor, next_time_step) {
                continue;
            }

            // No swapping cells with a committed agent across one step.
            if reservations.is_edge_reserved(neighbor, current.position, next_time_step)
                || reservations.is_edge_reserved(current.position, neighbor, next_time_step)
            {
                continue;
            }

            let next_state = (neighbor, next_time_step);
            if tentative_g_cost < g_costs.get(&next_state).copied().unwrap_or(usize::MAX) {
                g_costs.insert(next_state, tentative_g_cost);
                order += 1;
                open_list.insert(LowLevelNode {
                    position: neighbor,
                    time_step: next_time_step,
                    f_cost: tentative_g_cost + manhattan_distance(neighbor, goal),
                    g_cost: tentative_g_cost,
                    order,
                    parent: Some(state),
                });
            }
        }
    }

    debug!("cannot find solution within horizon {horizon}");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Reservation;
    use tracing_subscriber;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    }

    fn assert_respects(path: &Path, start_time: usize, reservations: &ReservationTable) {
        for (offset, &position) in path.iter().enumerate().skip(1) {
            let time_step = start_time + offset;
            let prev = path[offset - 1];
            assert!(
                !reservations.is_reserved(position, time_step),
                "{position:?} reserved at {time_step}"
            );
            assert!(!reservations.is_edge_reserved(prev, position, time_step));
            assert!(!reservations.is_edge_reserved(position, prev, time_step));
        }
    }

    #[test]
    fn test_space_time_without_reservations() {
        init_tracing();
        let map = Map::from_file("map_file/test/test.map").unwrap();
        let reservations = ReservationTable::new();
        let stats = &mut Stats::default();
        let path =
            space_time_a_star_search(&map, (2, 2), 0, (0, 0), &reservations, 100, stats).unwrap();
        debug!("{path:?}");
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn test_space_time_vertex_reservation_alternative_path() {
        init_tracing();
        let map = Map::from_file("map_file/test/test.map").unwrap();
        let mut reservations = ReservationTable::new();
        reservations.reserve_path(9, &[(0, 1), (0, 1), (0, 2)], 0);
        let stats = &mut Stats::default();
        let path =
            space_time_a_star_search(&map, (2, 2), 0, (0, 0), &reservations, 100, stats).unwrap();
        debug!("{path:?}");
        assert_eq!(path.len(), 5);
        assert_eq!(path[1], (2, 1));
        assert_respects(&path, 0, &reservations);
    }

    #[test]
    fn test_space_time_waits_for_blocked_corridor() {
        init_tracing();
        // Single corridor with the committed agent parked in the middle well past
        // the horizon.
        let map = Map::from_rows(&["....."]).unwrap();
        let mut reservations = ReservationTable::new();
        reservations.reserve_path(9, &[(0, 3), (0, 2)], 200);
        let stats = &mut Stats::default();
        let path =
            space_time_a_star_search(&map, (0, 0), 0, (0, 4), &reservations, 100, stats);
        assert!(path.is_none());

        // The committed agent crosses (0, 2) at steps 1 and 2, then drops back
        // into the side pocket.
        let mut reservations = ReservationTable::new();
        reservations.reserve_path(9, &[(1, 2), (0, 2), (0, 2), (1, 2)], 0);
        let map = Map::from_rows(&[".....", "@@.@@"]).unwrap();
        let path =
            space_time_a_star_search(&map, (0, 0), 0, (0, 4), &reservations, 100, stats).unwrap();
        debug!("{path:?}");
        assert_respects(&path, 0, &reservations);
        assert_eq!(path.last(), Some(&(0, 4)));
        // Four hops plus at least one wait.
        assert!(path.len() > 5);
    }

    #[test]
    fn test_space_time_forbids_swaps() {
        init_tracing();
        let map = Map::from_rows(&["...", "..."]).unwrap();
        let mut reservations = ReservationTable::new();
        // Committed agent walks (0, 1) -> (0, 0) with no hold window.
        reservations.reserve_path(9, &[(0, 1), (0, 0)], 0);
        assert!(reservations.is_edge_reserved((0, 1), (0, 0), 1));

        let stats = &mut Stats::default();
        let path =
            space_time_a_star_search(&map, (0, 0), 0, (0, 2), &reservations, 100, stats).unwrap();
        assert_ne!(path[1], (0, 1));
        assert_respects(&path, 0, &reservations);
    }

    #[test]
    fn test_space_time_starts_at_given_time() {
        init_tracing();
        let map = Map::from_rows(&["...."]).unwrap();
        let mut reservations = ReservationTable::new();
        reservations
            .reserve_path(9, &[(0, 3), (0, 3), (0, 3), (0, 3), (0, 3), (0, 3), (0, 3)], 0);
        let stats = &mut Stats::default();

        // Arriving at step 6 would hit the reservation, so the agent waits.
        let path =
            space_time_a_star_search(&map, (0, 0), 3, (0, 3), &reservations, 100, stats).unwrap();
        assert_respects(&path, 3, &reservations);
        assert_eq!(path.len() - 1 + 3, 7);
    }

    #[test]
    fn test_space_time_horizon_fails_cleanly() {
        init_tracing();
        let map = Map::from_rows(&["....."]).unwrap();
        let reservations = ReservationTable::new();
        let stats = &mut Stats::default();
        assert!(
            space_time_a_star_search(&map, (0, 0), 0, (0, 4), &reservations, 3, stats).is_none()
        );
        assert!(
            space_time_a_star_search(&map, (0, 0), 0, (0, 4), &reservations, 4, stats).is_some()
        );
        // Already past the horizon.
        assert!(
            space_time_a_star_search(&map, (0, 0), 10, (0, 1), &reservations, 5, stats).is_none()
        );
        assert_eq!(
            space_time_a_star_search(&map, (0, 1), 10, (0, 1), &reservations, 5, stats),
            Some(vec![(0, 1)])
        );
    }

    #[test]
    fn test_space_time_ignores_unrelated_time_steps() {
        let map = Map::from_rows(&["..."]).unwrap();
        let mut reservations = ReservationTable::new();
        reservations.reserve_path(9, &[(0, 1)], 0);
        assert_eq!(
            reservations.owner(&Reservation::Vertex((0, 1)), 0),
            Some(9)
        );
        let stats = &mut Stats::default();
        let path =
            space_time_a_star_search(&map, (0, 0), 0, (0, 2), &reservations, 10, stats).unwrap();
        assert_eq!(path, vec![(0, 0), (0, 1), (0, 2)]);
    }
}
