use anyhow::anyhow;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug, Default)]
#[command(
    name = "Cooperative MAPF",
    about = "Reservation-based prioritized planning for grid agent teams.",
    version = "0.1"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Path to the YAML scenario file")]
    pub scenario_path: Option<String>,

    #[arg(long, help = "Path to a MovingAI map file, overriding the scenario grid")]
    pub map_path: Option<String>,

    #[arg(long, help = "Path to the JSON report")]
    pub output_path: Option<String>,

    #[arg(long, help = "Solver to use: prioritized or pair")]
    pub solver: Option<String>,

    #[arg(long, help = "Latest time step the space-time search may reach")]
    pub horizon: Option<usize>,

    #[arg(long, help = "Steps a finished agent keeps its final cell reserved")]
    pub hold_time: Option<usize>,

    #[arg(long, help = "Iteration cap of the pair conflict resolver")]
    pub max_resolve_iterations: Option<usize>,

    #[arg(long, help = "Replace scenario tasks with this many random free cells")]
    pub random_tasks: Option<usize>,

    #[arg(long, help = "Seed for the random number generator")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scenario_path: String,
    pub map_path: Option<String>,
    pub output_path: String,
    pub solver: String,
    pub horizon: usize,
    pub hold_time: usize,
    pub max_resolve_iterations: usize,
    pub random_tasks: Option<usize>,
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scenario_path: "map_file/warehouse/warehouse.yaml".to_string(),
            map_path: None,
            output_path: "result/result.json".to_string(),
            solver: "prioritized".to_string(),
            horizon: 1000,
            hold_time: 30,
            max_resolve_iterations: 500,
            random_tasks: None,
            seed: 0,
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(scenario_path) = &cli.scenario_path {
            self.scenario_path = scenario_path.clone();
        }
        if let Some(map_path) = &cli.map_path {
            self.map_path = Some(map_path.clone());
        }
        if let Some(output_path) = &cli.output_path {
            self.output_path = output_path.clone();
        }
        if let Some(solver) = &cli.solver {
            self.solver = solver.clone();
        }
        if let Some(horizon) = cli.horizon {
            self.horizon = horizon;
        }
        if let Some(hold_time) = cli.hold_time {
            self.hold_time = hold_time;
        }
        if let Some(max_resolve_iterations) = cli.max_resolve_iterations {
            self.max_resolve_iterations = max_resolve_iterations;
        }
        if cli.random_tasks.is_some() {
            self.random_tasks = cli.random_tasks;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        match self.solver.as_str() {
            "prioritized" | "pair" => {}
            other => return Err(anyhow!("Unknown solver {other:?}, expected prioritized or pair")),
        }

        if self.horizon == 0 {
            return Err(anyhow!("Horizon must be greater than 0"));
        }

        if self.max_resolve_iterations == 0 {
            return Err(anyhow!("Max resolve iterations must be greater than 0"));
        }

        Ok(())
    }
}
