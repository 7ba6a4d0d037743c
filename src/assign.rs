use tracing::debug;

use crate::common::{manhattan_distance, Position};

/// Splits `tasks` into one ordered list per agent, greedily.
///
/// Each round scans every remaining task against every agent's current endpoint
/// and takes the closest pair by Manhattan distance, the first pair found winning
/// ties. The chosen task becomes that agent's new endpoint. No agents or no tasks
/// yields empty lists.
pub fn assign_tasks(endpoints: &[Position], tasks: &[Position]) -> Vec<Vec<Position>> {
    let mut assigned = vec![Vec::new(); endpoints.len()];
    if endpoints.is_empty() {
        return assigned;
    }

    let mut endpoints = endpoints.to_vec();
    let mut remaining = tasks.to_vec();

    while !remaining.is_empty() {
        let mut best: Option<(usize, usize, usize)> = None;
        for (task_index, &task) in remaining.iter().enumerate() {
            for (agent, &endpoint) in endpoints.iter().enumerate() {
                let distance = manhattan_distance(endpoint, task);
                if best.map_or(true, |(best_distance, _, _)| distance < best_distance) {
                    best = Some((distance, agent, task_index));
                }
            }
        }

        // Both lists are non-empty, so a pair was found.
        let Some((distance, agent, task_index)) = best else {
            break;
        };
        let task = remaining.remove(task_index);
        debug!("assign task {task:?} to agent {agent} at distance {distance}");
        assigned[agent].push(task);
        endpoints[agent] = task;
    }

    assigned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_every_task_once() {
        let endpoints = vec![(0, 0), (0, 6)];
        let tasks = vec![(2, 1), (2, 5), (4, 2), (4, 4), (0, 3)];
        let assigned = assign_tasks(&endpoints, &tasks);

        assert_eq!(assigned.len(), 2);
        let mut flat: Vec<Position> = assigned.iter().flatten().copied().collect();
        flat.sort();
        let mut expected = tasks.clone();
        expected.sort();
        assert_eq!(flat, expected);
    }

    #[test]
    fn test_assign_follows_updated_endpoint() {
        // Agent 0 walks the row; agent 1 is far away and never gets closer.
        let endpoints = vec![(0, 0), (9, 9)];
        let tasks = vec![(0, 3), (0, 2), (0, 1)];
        let assigned = assign_tasks(&endpoints, &tasks);
        assert_eq!(assigned[0], vec![(0, 1), (0, 2), (0, 3)]);
        assert!(assigned[1].is_empty());
    }

    #[test]
    fn test_assign_ties_go_to_first_found() {
        // The first task is one step from both agents; the first agent scanned
        // takes it and then also ends up closest to the second task.
        let endpoints = vec![(1, 1), (1, 3)];
        let tasks = vec![(1, 2), (0, 1)];
        let assigned = assign_tasks(&endpoints, &tasks);
        assert_eq!(assigned[0], vec![(1, 2), (0, 1)]);
        assert!(assigned[1].is_empty());
    }

    #[test]
    fn test_assign_empty_inputs() {
        assert!(assign_tasks(&[], &[(0, 0)]).is_empty());
        assert_eq!(assign_tasks(&[(0, 0), (1, 1)], &[]), vec![Vec::new(), Vec::new()]);
    }
}
