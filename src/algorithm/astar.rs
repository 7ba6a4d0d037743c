use super::{construct_path, Trace};
use crate::common::{manhattan_distance, LowLevelNode, Path, Position};
use crate::map::Map;
use crate::stat::Stats;

use std::collections::{BTreeSet, HashMap};
use tracing::{debug, instrument, trace};

/// Shortest 4-connected path from `start` to `goal`, both inclusive, ignoring
/// every other agent. Equal-f entries are expanded in discovery order.
#[instrument(skip_all, name = "a_star", fields(start = format!("{:?}", start), goal = format!("{:?}", goal)), level = "debug")]
pub fn a_star_search(
    map: &Map,
    start: Position,
    goal: Position,
    stats: &mut Stats,
) -> Option<Path> {
    if !map.is_passable(start) || !map.is_passable(goal) {
        debug!("start or goal is blocked");
        return None;
    }

    let mut open_list = BTreeSet::new();
    let mut g_costs: HashMap<Position, usize> = HashMap::new();
    let mut trace: Trace = HashMap::new();
    let mut order = 0;

    open_list.insert(LowLevelNode {
        position: start,
        time_step: 0,
        f_cost: manhattan_distance(start, goal),
        g_cost: 0,
        order,
        parent: None,
    });
    g_costs.insert(start, 0);

    while let Some(current) = open_list.pop_first() {
        // Stale duplicate of an already expanded cell.
        if trace.contains_key(&(current.position, 0)) {
            continue;
        }
        trace.insert((current.position, 0), current.parent);
        trace!("expand node: {current:?}");
        stats.low_level_expand_nodes += 1;

        if current.position == goal {
            return Some(construct_path(&trace, (current.position, 0)));
        }

        let tentative_g_cost = current.g_cost + 1;
        for neighbor in map.get_neighbors(current.position, false) {
            if tentative_g_cost < g_costs.get(&neighbor).copied().unwrap_or(usize::MAX) {
                g_costs.insert(neighbor, tentative_g_cost);
                order += 1;
                open_list.insert(LowLevelNode {
                    position: neighbor,
                    time_step: 0,
                    f_cost: tentative_g_cost + manhattan_distance(neighbor, goal),
                    g_cost: tentative_g_cost,
                    order,
                    parent: Some((current.position, 0)),
                });
            }
        }
    }

    debug!("cannot find solution");
    None
}
