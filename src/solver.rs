mod pair;
mod prioritized;
mod resolver;

pub use pair::PairPlanner;
pub use prioritized::PrioritizedPlanner;
pub use resolver::{resolve_conflicts, Resolution};

use crate::common::Solution;
use crate::config::Config;
use crate::error::PlanResult;
use crate::stat::Stats;

pub trait Solver {
    fn solve(&mut self, config: &Config) -> PlanResult<Solution>;

    /// Statistics of the most recent `solve`.
    fn stats(&self) -> &Stats;
}
