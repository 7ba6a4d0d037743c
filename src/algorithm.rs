mod astar;
mod spacetime;

pub use astar::a_star_search;
pub use spacetime::space_time_a_star_search;

use std::collections::HashMap;

use crate::common::{Path, Position};

// Expanded state to the state it was reached from. The static search keeps the
// time step at zero.
type Trace = HashMap<(Position, usize), Option<(Position, usize)>>;

fn construct_path(trace: &Trace, mut current: (Position, usize)) -> Path {
    let mut path = vec![current.0];
    while let Some(&Some(parent)) = trace.get(&current) {
        path.push(parent.0);
        current = parent;
    }
    path.reverse();
    path
}
