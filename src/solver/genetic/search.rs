use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use colored::*;
use dotenv::dotenv;
use tokio::{signal, task};
use tracing::{error, info, span, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::api::{ApiError, ConsiditionClient, GameDataProvider};
use crate::config::constant::{SYNTHETIC_LOCATION_COUNT, SYNTHETIC_SEED};
use crate::config::{MapSource, RunConfig, SolverConfig};
use crate::domain::solution::ScoredSolution;
use crate::domain::types::ProblemInstance;
use crate::evaluation::ScoringError;
use crate::fixtures::data_generator::generate_map;
use crate::persistence::{read_solution, write_generation_log, write_solution};
use crate::setup::init::{build_problem_instance, locations_from_map};
use crate::solver::genetic::solver::Solver;

/// Initialize tracing and environment
fn init_tracing_and_env() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            fmt::layer()
                .with_span_events(fmt::format::FmtSpan::NEW | fmt::format::FmtSpan::CLOSE)
                .pretty(),
        )
        .init();

    dotenv().ok();
    Ok(())
}

fn api_client(run_config: &RunConfig) -> Result<ConsiditionClient, ApiError> {
    let key = run_config.api_key.as_deref().ok_or(ApiError::MissingApiKey)?;
    Ok(ConsiditionClient::new(&run_config.base_url, key))
}

async fn load_problem(run_config: &RunConfig) -> Result<ProblemInstance, Box<dyn Error>> {
    match run_config.map_source {
        MapSource::Api => {
            let client = api_client(run_config)?;
            let (map, constants) = futures::try_join!(
                client.fetch_map(&run_config.map_name),
                client.fetch_constants()
            )?;
            let map_name = map.name.clone();
            Ok(build_problem_instance(
                &map_name,
                locations_from_map(map),
                constants,
            ))
        }
        MapSource::Synthetic => {
            info!(
                "Using synthetic map with {} locations (seed {})",
                SYNTHETIC_LOCATION_COUNT, SYNTHETIC_SEED
            );
            let (locations, constants) = generate_map(SYNTHETIC_LOCATION_COUNT, SYNTHETIC_SEED);
            Ok(build_problem_instance(
                &run_config.map_name,
                locations,
                constants,
            ))
        }
    }
}

fn print_solution(solution: &ScoredSolution<'_>) {
    let score = &solution.game_score;
    println!(
        "{}",
        format_args!("Total score: {:.2}", score.total).to_string().green().bold()
    );
    println!(
        "CO2 savings: {:.2} kg, earnings: {:.2}, footfall: {:.4}",
        score.kg_co2_savings, score.earnings, score.total_footfall
    );
    println!(
        "{} locations, {} x Freestyle 3100, {} x Freestyle 9100",
        solution.locations.len(),
        solution.total_freestyle3100_count,
        solution.total_freestyle9100_count
    );
    for outcome in solution.locations.values() {
        println!(
            "  {:<12} {:<16} {}/{}  volume {:>7.2} -> sales {:>8.2}  revenue {:>9.2}  footfall {:.2} (scale {})",
            outcome.name(),
            outcome.location_type(),
            outcome.gene.freestyle3100,
            outcome.gene.freestyle9100,
            outcome.base_sales_volume(),
            outcome.sales,
            outcome.revenue,
            outcome.footfall,
            outcome.footfall_scale()
        );
    }
}

pub async fn run() -> Result<(), Box<dyn Error>> {
    init_tracing_and_env()?;

    let solver_config = SolverConfig::from_env();
    let run_config = RunConfig::from_env();
    info!(
        "Starting refill solver for '{}' (population {}, K = {})",
        run_config.map_name, solver_config.population_size, solver_config.max_device_count
    );

    let instance = load_problem(&run_config).await?;
    let map_name = instance.map_name.clone();

    let mut solver = Solver::new(solver_config, instance).map_err(|e| {
        error!("{}", e);
        e
    })?;

    if let Some(seed_path) = &run_config.seed_solution {
        let record = read_solution(Path::new(seed_path))?;
        info!("Seeding from {}", seed_path);
        solver.load_seed(&record);
    }

    let stop = solver.stop_handle();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Ctrl-C received, stopping after the current generation");
            stop.store(true, Ordering::Relaxed);
        }
    });

    let span = span!(Level::INFO, "optimize", map = %map_name);
    let (solver, outcome) = task::spawn_blocking(move || {
        let _guard = span.enter();
        let outcome = solver.optimize();
        (solver, outcome)
    })
    .await?;
    if let Err(e) = outcome {
        error!("Search aborted: {}", e);
        return Err(e.into());
    }

    let output_dir = PathBuf::from(&run_config.output_dir);
    fs::create_dir_all(&output_dir)?;
    write_generation_log(
        &output_dir.join(format!("generations-{}.csv", map_name)),
        solver.opt_log(),
    )?;

    let scored = match solver.best_scored_solution() {
        Some(Ok(scored)) => scored,
        Some(Err(ScoringError::EmptySolution)) => {
            warn!("Best solution places no stations, nothing to save");
            return Ok(());
        }
        Some(Err(e)) => return Err(e.into()),
        None => {
            warn!("No generation completed, nothing to report");
            return Ok(());
        }
    };
    print_solution(&scored);

    let mut game_id = String::new();
    if run_config.submit {
        let client = api_client(&run_config)?;
        let result = client.submit(&map_name, &scored).await?;
        info!("Remote score for game {}: {:.2}", result.id, result.score.total);
        if (result.score.total - scored.game_score.total).abs() > 0.01 {
            warn!(
                "Remote score {:.2} differs from local {:.2}",
                result.score.total, scored.game_score.total
            );
        }
        game_id = result.id;
    }

    if let Some(record) = solver.export_solution(&game_id) {
        write_solution(&output_dir, &record, scored.game_score.total)?;
    }

    Ok(())
}
