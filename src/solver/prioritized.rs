use super::Solver;
use crate::algorithm::{a_star_search, space_time_a_star_search};
use crate::assign::assign_tasks;
use crate::common::{Agent, AgentPlan, Path, Position, ReservationTable, Solution};
use crate::config::Config;
use crate::error::{PlanError, PlanResult};
use crate::map::Map;
use crate::stat::Stats;

use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Leg {
    target: Position,
    // Task finished once this leg is walked.
    completes: Option<Position>,
}

/// Prioritized planning: agents are planned one after another in the order given,
/// each against the reservations of every agent committed before it.
///
/// Tasks are split greedily among agents first. Each task is one leg to the task
/// cell, followed by a leg to the drop cell when one is set. An agent's direct
/// goal, if any, is its last leg.
pub struct PrioritizedPlanner {
    agents: Vec<Agent>,
    tasks: Vec<Position>,
    drop: Option<Position>,
    map: Map,
    reservations: ReservationTable,
    stats: Stats,
}

impl PrioritizedPlanner {
    pub fn new(agents: Vec<Agent>, tasks: Vec<Position>, drop: Option<Position>, map: &Map) -> Self {
        PrioritizedPlanner {
            agents,
            tasks,
            drop,
            map: map.clone(),
            reservations: ReservationTable::new(),
            stats: Stats::default(),
        }
    }

    /// Reservations committed by the most recent `solve`.
    pub fn reservations(&self) -> &ReservationTable {
        &self.reservations
    }

    fn legs(&self, agent: &Agent, assigned: &[Position]) -> Vec<Leg> {
        let mut legs = Vec::new();
        for &task in assigned {
            match self.drop {
                Some(drop) => {
                    legs.push(Leg {
                        target: task,
                        completes: None,
                    });
                    legs.push(Leg {
                        target: drop,
                        completes: Some(task),
                    });
                }
                None => legs.push(Leg {
                    target: task,
                    completes: Some(task),
                }),
            }
        }
        if let Some(goal) = agent.goal {
            legs.push(Leg {
                target: goal,
                completes: None,
            });
        }
        legs
    }

    /// Positions the agent occupies after `time_step` while walking from `from` to
    /// `to`, the starting cell excluded.
    fn plan_leg(
        &mut self,
        agent: usize,
        from: Position,
        time_step: usize,
        to: Position,
        config: &Config,
    ) -> PlanResult<Path> {
        if let Some(path) = space_time_a_star_search(
            &self.map,
            from,
            time_step,
            to,
            &self.reservations,
            config.horizon,
            &mut self.stats,
        ) {
            return Ok(path.into_iter().skip(1).collect());
        }

        debug!("agent {agent}: space-time search from {from:?} at {time_step} to {to:?} failed, falling back");
        self.stats.fallback_legs += 1;
        let static_path = a_star_search(&self.map, from, to, &mut self.stats)
            .ok_or(PlanError::Unreachable { agent, from, to })?;

        // Walk the static path, waiting in place whenever the next cell is
        // reserved one tick ahead. Only vertex claims are checked here. The table
        // holds finitely many steps, so every wait eventually ends.
        let mut steps = Vec::with_capacity(static_path.len());
        let mut current = from;
        let mut clock = time_step;
        let mut remaining = static_path.into_iter().skip(1).peekable();
        while let Some(&next) = remaining.peek() {
            clock += 1;
            if self.reservations.is_reserved(next, clock) {
                steps.push(current);
                self.stats.inserted_waits += 1;
            } else {
                steps.push(next);
                current = next;
                remaining.next();
            }
        }

        Ok(steps)
    }
}

impl Solver for PrioritizedPlanner {
    fn solve(&mut self, config: &Config) -> PlanResult<Solution> {
        let total_solve_start_time = Instant::now();
        self.reservations = ReservationTable::new();
        self.stats = Stats::default();

        if let Some(agent) = self.agents.iter().find(|agent| !agent.verify(&self.map)) {
            return Err(PlanError::InvalidPosition {
                agent: agent.id,
                position: agent.start,
            });
        }

        let endpoints: Vec<Position> = self.agents.iter().map(|agent| agent.start).collect();
        let assignments = assign_tasks(&endpoints, &self.tasks);

        let agents = self.agents.clone();
        let mut plans = Vec::with_capacity(agents.len());
        for (agent, assigned) in agents.iter().zip(&assignments) {
            info!("agent {} assigned tasks {:?}", agent.id, assigned);

            let mut path = vec![agent.start];
            let mut completed = Vec::new();
            let mut position = agent.start;

            for leg in self.legs(agent, assigned) {
                // The plan holds one position per step from time 0.
                let clock = path.len() - 1;
                let steps = self.plan_leg(agent.id, position, clock, leg.target, config)?;
                if let Some(&last) = steps.last() {
                    position = last;
                }
                path.extend(steps);
                if let Some(task) = leg.completes {
                    completed.push(task);
                }
            }

            // Commit point: later agents see this plan from here on.
            let contended = self
                .reservations
                .reserve_path(agent.id, &path, config.hold_time);
            if contended > 0 {
                warn!("agent {} overlaps {contended} earlier reservations", agent.id);
            }
            self.stats.contended_reservations += contended;

            debug!("agent {} plan: {:?}", agent.id, path);
            plans.push(AgentPlan {
                agent_id: agent.id,
                path,
                completed,
            });
        }

        let solution = Solution { plans };
        self.stats.costs = solution.cost();
        self.stats.makespan = solution.makespan();
        self.stats.time_us = total_solve_start_time.elapsed().as_micros() as usize;
        self.stats.print();

        Ok(solution)
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }
}
