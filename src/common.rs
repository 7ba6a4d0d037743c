mod conflict;
mod lowlevel;
mod reservation;

pub use conflict::{detect_conflicts, first_conflict, Conflict, ConflictType};
pub(crate) use lowlevel::LowLevelNode;
pub use reservation::{Reservation, ReservationTable};

use serde::{Deserialize, Serialize};

use crate::map::Map;

/// Grid cell as `(row, col)`.
pub type Position = (usize, usize);

/// Positions indexed by time step, starting at the owner's start time.
pub type Path = Vec<Position>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: usize,
    pub start: Position,
    /// Direct goal, used when the agent is not driven by tasks.
    #[serde(default)]
    pub goal: Option<Position>,
}

impl Agent {
    pub fn verify(&self, map: &Map) -> bool {
        map.is_passable(self.start) && self.goal.map_or(true, |goal| map.is_passable(goal))
    }
}

/// Committed plan of one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentPlan {
    pub agent_id: usize,
    pub path: Path,
    /// Tasks in the order they were reached.
    pub completed: Vec<Position>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    pub plans: Vec<AgentPlan>,
}

impl Solution {
    /// Time index at which the last plan ends.
    pub fn makespan(&self) -> usize {
        self.plans
            .iter()
            .map(|plan| plan.path.len().saturating_sub(1))
            .max()
            .unwrap_or(0)
    }

    /// Sum over agents of the steps each plan takes.
    pub fn cost(&self) -> usize {
        self.plans
            .iter()
            .map(|plan| plan.path.len().saturating_sub(1))
            .sum()
    }

    /// Paths extended with their final position up to the longest one. Only used
    /// for joint playback and metrics.
    pub fn padded_paths(&self) -> Vec<Path> {
        let paths: Vec<Path> = self.plans.iter().map(|plan| plan.path.clone()).collect();
        pad_paths(&paths)
    }

    pub fn conflicts(&self) -> Vec<Conflict> {
        let paths: Vec<Path> = self.plans.iter().map(|plan| plan.path.clone()).collect();
        detect_conflicts(&paths)
    }

    /// Checks that every plan starts at its agent's start, moves at most one cell
    /// per step through free cells, and that no two plans conflict.
    pub fn verify(&self, map: &Map, agents: &[Agent]) -> bool {
        if self.plans.len() != agents.len() {
            return false;
        }

        for (plan, agent) in self.plans.iter().zip(agents) {
            if plan.path.first() != Some(&agent.start) {
                return false;
            }
            if plan.path.iter().any(|&position| !map.is_passable(position)) {
                return false;
            }
            if plan
                .path
                .windows(2)
                .any(|step| manhattan_distance(step[0], step[1]) > 1)
            {
                return false;
            }
        }

        self.conflicts().is_empty()
    }
}

pub fn manhattan_distance(a: Position, b: Position) -> usize {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

/// Repeats each path's final position until all paths share the longest length.
pub fn pad_paths(paths: &[Path]) -> Vec<Path> {
    let length = paths.iter().map(Vec::len).max().unwrap_or(0);
    paths
        .iter()
        .map(|path| {
            let mut padded = path.clone();
            if let Some(&last) = path.last() {
                padded.resize(length, last);
            }
            padded
        })
        .collect()
}
