//! Network Lifetime Experiment
//!
//! Sweeps the cluster-head probability and reports the mean number of rounds
//! until the death threshold, averaged over many seeded runs.
//!
//! Usage: lifetime_experiment [--config FILE] [--runs N] [--nodes N] [--max-rounds N] [--output FILE]

use wsn_sim::config::{self, ClusterConfig};
use wsn_sim::experiment::lifetime_sweep;
use wsn_sim::snapshot;
use wsn_sim::telemetry;
use wsn_sim::SimError;

const PROBABILITIES: [f64; 8] = [0.05, 0.1, 0.15, 0.2, 0.3, 0.4, 0.6, 0.8];

#[derive(Debug)]
struct Options {
    config: ClusterConfig,
    runs: usize,
    max_rounds: u64,
    output: Option<String>,
    json_logs: bool,
}

fn parse_args(args: &[String]) -> Result<Option<Options>, SimError> {
    let mut config = ClusterConfig::default();
    let mut runs: usize = 50;
    let mut max_rounds: u64 = 10_000;
    let mut output = None;
    let mut json_logs = false;

    if let Some(pos) = args.iter().position(|a| a == "--config") {
        let path = args
            .get(pos + 1)
            .ok_or_else(|| SimError::Configuration("--config needs a path".into()))?;
        config = config::load_json(path)?;
    }

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--config" => i += 1,
            "--runs" => {
                runs = parse_value("--runs", value)?;
                i += 1;
            }
            "--nodes" | "-n" => {
                config.node_count = parse_value("--nodes", value)?;
                i += 1;
            }
            "--threshold" | "-t" => {
                config.death_threshold = parse_value("--threshold", value)?;
                i += 1;
            }
            "--max-rounds" => {
                max_rounds = parse_value("--max-rounds", value)?;
                i += 1;
            }
            "--output" | "-o" => {
                output = Some(
                    value
                        .cloned()
                        .ok_or_else(|| SimError::Configuration("--output needs a path".into()))?,
                );
                i += 1;
            }
            "--json-logs" => json_logs = true,
            "--help" | "-h" => {
                println!("Usage: lifetime_experiment [OPTIONS]");
                println!();
                println!("Options:");
                println!("      --config FILE       JSON cluster configuration");
                println!("      --runs NUM          Seeded runs per probability (default: 50)");
                println!("  -n, --nodes NUM         Number of sensors (default: 20)");
                println!("  -t, --threshold NUM     Stop when this fraction is dead (default: 0.8)");
                println!("      --max-rounds NUM    Round cap per run (default: 10000)");
                println!("  -o, --output FILE       Write sweep results as JSON");
                println!("      --json-logs         Emit logs as JSON");
                println!("  -h, --help              Show this help");
                return Ok(None);
            }
            other => {
                return Err(SimError::Configuration(format!("unknown option {}", other)));
            }
        }
        i += 1;
    }

    Ok(Some(Options {
        config,
        runs,
        max_rounds,
        output,
        json_logs,
    }))
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T, SimError> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| SimError::Configuration(format!("{} needs a valid value", flag)))
}

fn run(options: Options) -> Result<(), SimError> {
    let Options {
        config,
        runs,
        max_rounds,
        output,
        ..
    } = options;

    println!("=== Network Lifetime Sweep ===");
    println!("  Nodes:      {}", config.node_count);
    println!("  Runs/point: {}", runs);
    println!("  Threshold:  {}", config.death_threshold);
    println!();

    let points = lifetime_sweep(&config, &PROBABILITIES, runs, max_rounds)?;

    println!("{:>6}  {:>10}  {:>12}  {:>8}", "Prob", "Lifetime", "First death", "Heads");
    for point in &points {
        let first_death = point
            .mean_first_death
            .map_or_else(|| "-".to_string(), |r| format!("{:.1}", r));
        println!(
            "{:>6.2}  {:>10.1}  {:>12}  {:>8.2}",
            point.cluster_head_prob, point.mean_lifetime, first_death, point.mean_heads_per_round
        );
    }

    if let Some(path) = output {
        snapshot::write_json(&points, &path)?;
        println!("\nResults saved to {}", path);
    }

    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => return,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };
    telemetry::init_logging(options.json_logs);

    if let Err(e) = run(options) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
