use anyhow::Context;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path as FsPath;
use tracing::info;

use crate::common::{pad_paths, Path, Position, Solution};
use crate::solver::Resolution;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub costs: usize,
    pub makespan: usize,
    pub time_us: usize,
    pub low_level_expand_nodes: usize,
    /// Legs planned by the static search because the space-time search failed.
    pub fallback_legs: usize,
    /// Waits added while walking fallback legs or resolving pair conflicts.
    pub inserted_waits: usize,
    pub contended_reservations: usize,
    pub resolve_iterations: usize,
}

impl Stats {
    pub fn print(&self) {
        info!(
            "Cost {:?} Makespan {:?} Time(microseconds) {:?} Low level expand nodes number {:?} Fallback legs {:?} Inserted waits {:?} Contended reservations {:?} Resolve iterations {:?}",
            self.costs,
            self.makespan,
            self.time_us,
            self.low_level_expand_nodes,
            self.fallback_legs,
            self.inserted_waits,
            self.contended_reservations,
            self.resolve_iterations
        );
    }
}

/// Delivery figures derived from final plans.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    /// Arrivals onto the drop cell, capped at the number of tasks issued.
    pub total_items: usize,
    pub makespan: usize,
    pub total_distance: usize,
    pub throughput: f64,
    pub efficiency: f64,
}

impl Metrics {
    /// Plans are padded to a common length before counting, which is a no-op
    /// for already padded plans.
    pub fn collect(paths: &[Path], drop: Option<Position>, total_tasks: usize) -> Self {
        let paths = pad_paths(paths);
        let makespan = paths.first().map_or(0, |path| path.len().saturating_sub(1));

        let mut total_distance = 0;
        let mut deliveries = 0;
        for path in &paths {
            for step in path.windows(2) {
                let (prev, current) = (step[0], step[1]);
                if current != prev {
                    total_distance += 1;
                }
                if Some(current) == drop && Some(prev) != drop {
                    deliveries += 1;
                }
            }
        }

        let total_items = deliveries.min(total_tasks);
        let throughput = if makespan > 0 {
            total_items as f64 / makespan as f64
        } else {
            0.0
        };
        let efficiency = if total_distance > 0 {
            total_items as f64 / total_distance as f64
        } else {
            0.0
        };

        Metrics {
            total_items,
            makespan,
            total_distance,
            throughput,
            efficiency,
        }
    }

    pub fn print(&self) {
        info!(
            "Total items {:?} Makespan {:?} Total distance {:?} Throughput {:.3} Efficiency {:.3}",
            self.total_items, self.makespan, self.total_distance, self.throughput, self.efficiency
        );
    }
}

/// Everything a run produced, as written to the JSON output file.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub solver: String,
    /// Plans padded to the common makespan, one per agent in priority order.
    pub paths: Vec<Path>,
    pub completed: Vec<Vec<Position>>,
    pub metrics: Metrics,
    pub stats: Stats,
    pub resolution: Option<Resolution>,
}

impl Report {
    pub fn new(
        solver: &str,
        solution: &Solution,
        metrics: Metrics,
        stats: Stats,
        resolution: Option<Resolution>,
    ) -> Self {
        Report {
            solver: solver.to_string(),
            paths: solution.padded_paths(),
            completed: solution
                .plans
                .iter()
                .map(|plan| plan.completed.clone())
                .collect(),
            metrics,
            stats,
            resolution,
        }
    }

    pub fn write_to_file(&self, path: &str) -> anyhow::Result<()> {
        if let Some(parent) = FsPath::new(path).parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let file = File::create(path).with_context(|| format!("cannot create {path}"))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        info!("Report written to {path}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_count_moves_and_deliveries() {
        let drop = (0, 0);
        let paths = vec![
            vec![(0, 0), (0, 1), (0, 2), (0, 1), (0, 0)],
            vec![(1, 0), (1, 0), (0, 0)],
        ];
        let metrics = Metrics::collect(&paths, Some(drop), 5);

        assert_eq!(metrics.makespan, 4);
        assert_eq!(metrics.total_distance, 5);
        assert_eq!(metrics.total_items, 2);
        assert_eq!(metrics.throughput, 2.0 / 4.0);
        assert_eq!(metrics.efficiency, 2.0 / 5.0);
    }

    #[test]
    fn test_metrics_cap_deliveries_at_tasks_issued() {
        let drop = (0, 0);
        let paths = vec![vec![(0, 1), (0, 0), (0, 1), (0, 0), (0, 1), (0, 0)]];
        let metrics = Metrics::collect(&paths, Some(drop), 2);
        assert_eq!(metrics.total_items, 2);
        assert!(metrics.total_items <= 2);
        assert_eq!(metrics.throughput, metrics.total_items as f64 / metrics.makespan as f64);
    }

    #[test]
    fn test_metrics_degenerate_plans() {
        let metrics = Metrics::collect(&[vec![(0, 0)], vec![(1, 1)]], Some((0, 0)), 3);
        assert_eq!(metrics.makespan, 0);
        assert_eq!(metrics.total_distance, 0);
        assert_eq!(metrics.throughput, 0.0);
        assert_eq!(metrics.efficiency, 0.0);

        let metrics = Metrics::collect(&[], None, 0);
        assert_eq!(metrics.makespan, 0);

        let metrics = Metrics::collect(&[vec![(0, 0), (0, 1)]], None, 4);
        assert_eq!(metrics.total_items, 0);
        assert_eq!(metrics.total_distance, 1);
    }

    #[test]
    fn test_report_serializes_padded_paths() {
        use crate::common::AgentPlan;

        let solution = Solution {
            plans: vec![
                AgentPlan {
                    agent_id: 0,
                    path: vec![(0, 0), (0, 1)],
                    completed: vec![(0, 1)],
                },
                AgentPlan {
                    agent_id: 1,
                    path: vec![(1, 1)],
                    completed: Vec::new(),
                },
            ],
        };
        let paths = solution.padded_paths();
        let metrics = Metrics::collect(&paths, None, 1);
        let report = Report::new("prioritized", &solution, metrics, Stats::default(), None);

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["solver"], "prioritized");
        assert_eq!(json["paths"][1], serde_json::json!([[1, 1], [1, 1]]));
        assert_eq!(json["completed"][0], serde_json::json!([[0, 1]]));
        assert_eq!(json["metrics"]["total_distance"], 1);
        assert!(json["resolution"].is_null());
    }
}
