use serde::Serialize;
use tracing::debug;

use super::{Path, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ConflictType {
    Vertex {
        position: Position,
        time_step: usize,
    },
    /// The two agents swap `u` and `v` while stepping into `time_step`.
    Edge {
        u: Position,
        v: Position,
        time_step: usize,
    },
}

impl ConflictType {
    pub fn time_step(&self) -> usize {
        match self {
            ConflictType::Vertex { time_step, .. } | ConflictType::Edge { time_step, .. } => {
                *time_step
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Conflict {
    pub agent_1: usize,
    pub agent_2: usize,
    pub conflict_type: ConflictType,
}

// Paths shorter than the step park on their final position.
fn position_at(path: &[Position], step: usize) -> Position {
    path[step.min(path.len() - 1)]
}

fn conflict_at(path_1: &[Position], path_2: &[Position], step: usize) -> Option<ConflictType> {
    let pos_1 = position_at(path_1, step);
    let pos_2 = position_at(path_2, step);

    if pos_1 == pos_2 {
        return Some(ConflictType::Vertex {
            position: pos_1,
            time_step: step,
        });
    }

    if step == 0 {
        return None;
    }

    let prev_pos_1 = position_at(path_1, step - 1);
    let prev_pos_2 = position_at(path_2, step - 1);
    if prev_pos_1 == pos_2 && prev_pos_2 == pos_1 {
        return Some(ConflictType::Edge {
            u: prev_pos_1,
            v: pos_1,
            time_step: step,
        });
    }

    None
}

/// Earliest direct vertex or swap conflict between two paths, scanning from
/// step 1. Diagonal or multi-hop interference is not reported.
pub fn first_conflict(path_1: &[Position], path_2: &[Position]) -> Option<ConflictType> {
    if path_1.is_empty() || path_2.is_empty() {
        return None;
    }
    let max_length = path_1.len().max(path_2.len());
    (1..max_length).find_map(|step| conflict_at(path_1, path_2, step))
}

/// Every vertex and swap conflict between each pair of paths, including shared
/// start cells at step 0.
pub fn detect_conflicts(paths: &[Path]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for i in 0..paths.len() {
        for j in (i + 1)..paths.len() {
            let (path_1, path_2) = (&paths[i], &paths[j]);
            if path_1.is_empty() || path_2.is_empty() {
                continue;
            }
            let max_length = path_1.len().max(path_2.len());
            for step in 0..max_length {
                if let Some(conflict_type) = conflict_at(path_1, path_2, step) {
                    conflicts.push(Conflict {
                        agent_1: i,
                        agent_2: j,
                        conflict_type,
                    });
                }
            }
        }
    }

    if !conflicts.is_empty() {
        debug!("Detect conflicts: {:?}", conflicts);
    }
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_conflict() {
        let path_1 = vec![(0, 0), (0, 1)];
        let path_2 = vec![(1, 1), (0, 1)];
        assert_eq!(
            first_conflict(&path_1, &path_2),
            Some(ConflictType::Vertex {
                position: (0, 1),
                time_step: 1
            })
        );
    }

    #[test]
    fn test_swap_conflict() {
        let path_1 = vec![(0, 0), (0, 1)];
        let path_2 = vec![(0, 1), (0, 0)];
        assert_eq!(
            first_conflict(&path_1, &path_2),
            Some(ConflictType::Edge {
                u: (0, 0),
                v: (0, 1),
                time_step: 1
            })
        );
    }

    #[test]
    fn test_parked_agent_is_an_obstacle() {
        let path_1 = vec![(0, 2)];
        let path_2 = vec![(0, 0), (0, 1), (0, 2)];
        let conflicts = detect_conflicts(&[path_1, path_2]);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].conflict_type.time_step(), 2);
    }

    #[test]
    fn test_no_conflict_when_following() {
        let path_1 = vec![(0, 1), (0, 2), (0, 3)];
        let path_2 = vec![(0, 0), (0, 1), (0, 2)];
        assert_eq!(first_conflict(&path_1, &path_2), None);
        assert!(detect_conflicts(&[path_1, path_2]).is_empty());
    }
}
