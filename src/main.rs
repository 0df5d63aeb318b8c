//! Galton Board headless runner
//!
//! Stands in for a rendering host: builds an engine, drives one tick per
//! simulated frame, and prints the final bin histogram.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use galton_board::sim::SimulationEngine;
use galton_board::{RunStats, Settings};

/// Drop balls through a Galton board and print where they land
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Settings JSON file (flags below override it)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of balls to drop
    #[arg(long)]
    balls: Option<u32>,

    /// Spawn pacing, 1 (slow) to 10 (fast)
    #[arg(long)]
    speed: Option<u32>,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Pin rows
    #[arg(long)]
    rows: Option<u32>,

    /// Give up after this many ticks
    #[arg(long, default_value_t = 1_000_000)]
    max_ticks: u64,

    /// Print statistics as JSON instead of a histogram
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => match Settings::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };
    if let Some(balls) = cli.balls {
        settings.ball_count = balls;
    }
    if let Some(speed) = cli.speed {
        settings.speed = speed;
    }
    if let Some(rows) = cli.rows {
        settings.board.rows = rows;
    }
    if cli.seed.is_some() {
        settings.seed = cli.seed;
    }

    let mut engine = match SimulationEngine::from_settings(&settings) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    engine.start();
    while !engine.is_complete() {
        if engine.state().time_ticks >= cli.max_ticks {
            log::error!(
                "Run did not finish within {} ticks ({} still falling)",
                cli.max_ticks,
                engine.active().len()
            );
            return ExitCode::FAILURE;
        }
        engine.tick();
    }

    let stats = RunStats::from_state(engine.state());
    if cli.json {
        match serde_json::to_string_pretty(&stats) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_histogram(&stats);
    }
    ExitCode::SUCCESS
}

fn print_histogram(stats: &RunStats) {
    const BAR_WIDTH: f64 = 50.0;
    let widest = stats.bin_counts.iter().copied().max().unwrap_or(0).max(1) as f64;

    for (i, (&count, &share)) in stats.bin_counts.iter().zip(&stats.expected_share).enumerate() {
        let bar = "#".repeat((count as f64 / widest * BAR_WIDTH).round() as usize);
        let expected = share * stats.binned as f64;
        println!("{i:>3} {count:>6} (exp {expected:>7.1}) {bar}");
    }

    println!();
    println!(
        "dropped {} / {}, binned {}, discarded {}",
        stats.dropped, stats.total, stats.binned, stats.discarded
    );
    if let (Some(mean), Some(variance)) = (stats.mean_bin, stats.variance) {
        println!("mean bin {mean:.3}, variance {variance:.3}");
    }
}
