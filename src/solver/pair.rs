use super::{resolve_conflicts, Resolution, Solver};
use crate::algorithm::a_star_search;
use crate::common::{Agent, AgentPlan, Solution};
use crate::config::Config;
use crate::error::{PlanError, PlanResult};
use crate::map::Map;
use crate::stat::Stats;

use std::time::Instant;
use tracing::{info, instrument, warn};

/// Two agents with direct goals: each is planned alone on the static grid, then
/// the second path is delayed until the pair stops conflicting.
pub struct PairPlanner {
    agents: Vec<Agent>,
    map: Map,
    stats: Stats,
    resolution: Option<Resolution>,
}

impl PairPlanner {
    pub fn new(agents: Vec<Agent>, map: &Map) -> Self {
        PairPlanner {
            agents,
            map: map.clone(),
            stats: Stats::default(),
            resolution: None,
        }
    }

    /// Resolver outcome of the most recent successful `solve`.
    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }
}

impl Solver for PairPlanner {
    #[instrument(skip_all, name = "pair_solve", level = "debug")]
    fn solve(&mut self, config: &Config) -> PlanResult<Solution> {
        let total_solve_start_time = Instant::now();
        self.stats = Stats::default();
        self.resolution = None;

        if self.agents.len() != 2 {
            return Err(PlanError::AgentCount {
                expected: 2,
                found: self.agents.len(),
            });
        }

        let mut paths = Vec::with_capacity(2);
        for agent in &self.agents {
            if !agent.verify(&self.map) {
                return Err(PlanError::InvalidPosition {
                    agent: agent.id,
                    position: agent.start,
                });
            }
            let goal = agent
                .goal
                .ok_or(PlanError::MissingGoal { agent: agent.id })?;
            let path = a_star_search(&self.map, agent.start, goal, &mut self.stats).ok_or(
                PlanError::Unreachable {
                    agent: agent.id,
                    from: agent.start,
                    to: goal,
                },
            )?;
            info!("agent {} independent path: {:?}", agent.id, path);
            paths.push(path);
        }

        let resolution = resolve_conflicts(&paths[0], &paths[1], config.max_resolve_iterations);
        if !resolution.converged {
            warn!(
                "agents {} and {} may still collide",
                self.agents[0].id, self.agents[1].id
            );
        }

        let plans = self
            .agents
            .iter()
            .zip([resolution.first.clone(), resolution.second.clone()])
            .map(|(agent, path)| AgentPlan {
                agent_id: agent.id,
                path,
                completed: agent.goal.into_iter().collect(),
            })
            .collect();
        let solution = Solution { plans };

        self.stats.resolve_iterations = resolution.iterations;
        self.stats.inserted_waits = resolution.inserted_waits;
        self.stats.costs = solution.cost();
        self.stats.makespan = solution.makespan();
        self.stats.time_us = total_solve_start_time.elapsed().as_micros() as usize;
        self.stats.print();

        self.resolution = Some(resolution);
        Ok(solution)
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }
}
