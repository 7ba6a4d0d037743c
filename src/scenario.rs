use anyhow::{anyhow, Context, Result};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use tracing::info;

use crate::common::{Agent, Position};
use crate::error::{PlanError, PlanResult};
use crate::map::Map;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEntry {
    pub start: Position,
    #[serde(default)]
    pub goal: Option<Position>,
}

/// A planning problem: the grid (inline rows or a MovingAI map file), agents in
/// priority order, tasks, and an optional shared drop cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    pub map: Option<String>,
    pub grid: Vec<String>,
    pub agents: Vec<AgentEntry>,
    pub tasks: Vec<Position>,
    pub drop: Option<Position>,
}

impl Scenario {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("cannot open scenario {path}"))?;
        let reader = BufReader::new(file);
        let scenario: Scenario = serde_yaml::from_reader(reader)
            .with_context(|| format!("cannot parse scenario {path}"))?;
        Ok(scenario)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads the grid: `map_override` first, then the scenario's map file, then
    /// its inline rows.
    pub fn build_map(&self, map_override: Option<&str>) -> Result<Map> {
        match map_override.or(self.map.as_deref()) {
            Some(path) => Map::from_file(path),
            None if self.grid.is_empty() => Err(anyhow!("scenario has neither a map nor a grid")),
            None => Map::from_rows(&self.grid),
        }
    }

    /// Agents with ids in priority order.
    pub fn agents(&self) -> Vec<Agent> {
        self.agents
            .iter()
            .enumerate()
            .map(|(id, entry)| Agent {
                id,
                start: entry.start,
                goal: entry.goal,
            })
            .collect()
    }

    /// Every agent start, goal, task and the drop must be a free cell.
    pub fn validate(&self, map: &Map) -> PlanResult<()> {
        for agent in self.agents() {
            if !map.is_passable(agent.start) {
                return Err(PlanError::InvalidPosition {
                    agent: agent.id,
                    position: agent.start,
                });
            }
            if let Some(goal) = agent.goal.filter(|&goal| !map.is_passable(goal)) {
                return Err(PlanError::InvalidPosition {
                    agent: agent.id,
                    position: goal,
                });
            }
        }

        if let Some(&position) = self
            .tasks
            .iter()
            .chain(self.drop.iter())
            .find(|&&position| !map.is_passable(position))
        {
            return Err(PlanError::InvalidTask { position });
        }

        Ok(())
    }

    /// Picks `num_tasks` distinct free cells that are neither an agent start nor
    /// the drop cell.
    pub fn generate_tasks_randomly<R: Rng + ?Sized>(
        &self,
        map: &Map,
        num_tasks: usize,
        rng: &mut R,
    ) -> Result<Vec<Position>> {
        let occupied: HashSet<Position> = self
            .agents
            .iter()
            .map(|entry| entry.start)
            .chain(self.drop)
            .collect();

        let mut available: Vec<Position> = map
            .free_cells()
            .filter(|position| !occupied.contains(position))
            .collect();

        if available.len() < num_tasks {
            return Err(anyhow!(
                "Not enough free cells for {num_tasks} tasks, only {} available",
                available.len()
            ));
        }

        available.shuffle(rng);
        available.truncate(num_tasks);

        info!("Generate tasks: {available:?}");
        Ok(available)
    }
}
