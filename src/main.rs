use coop_mapf::config::{Cli, Config};
use coop_mapf::scenario::Scenario;
use coop_mapf::solver::{PairPlanner, PrioritizedPlanner, Solver};
use coop_mapf::stat::{Metrics, Report};

use anyhow::{anyhow, Context};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        info!("No config file specified, using default config");
        Config::default()
    }
    .override_from_command_line(&cli)?;

    let mut scenario = Scenario::load_from_file(&config.scenario_path)?;
    let map = scenario.build_map(config.map_path.as_deref())?;
    if let Some(num_tasks) = config.random_tasks {
        let mut rng = StdRng::seed_from_u64(config.seed);
        scenario.tasks = scenario.generate_tasks_randomly(&map, num_tasks, &mut rng)?;
    }
    scenario.validate(&map)?;

    let agents = scenario.agents();
    info!(
        "{} agents, {} tasks on a {}x{} grid",
        agents.len(),
        scenario.tasks.len(),
        map.height,
        map.width
    );

    let (solution, stats, resolution) = match config.solver.as_str() {
        "pair" => {
            let mut solver = PairPlanner::new(agents.clone(), &map);
            let solution = solver.solve(&config)?;
            (solution, solver.stats().clone(), solver.resolution().cloned())
        }
        "prioritized" => {
            let mut solver =
                PrioritizedPlanner::new(agents.clone(), scenario.tasks.clone(), scenario.drop, &map);
            let solution = solver.solve(&config)?;
            (solution, solver.stats().clone(), None)
        }
        other => return Err(anyhow!("Unknown solver {other:?}")),
    };

    if !solution.verify(&map, &agents) {
        error!("solution has conflicts: {:?}", solution.conflicts());
    }

    let metrics = Metrics::collect(
        &solution.padded_paths(),
        scenario.drop,
        scenario.tasks.len(),
    );
    metrics.print();

    Report::new(&config.solver, &solution, metrics, stats, resolution)
        .write_to_file(&config.output_path)?;

    Ok(())
}
