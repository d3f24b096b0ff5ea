//! WSN Cluster Demo
//!
//! Runs the LEACH-style cluster-head rotation round by round until the
//! death threshold is reached, printing population health after each round.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::thread;
use wsn_sim::cluster::{ClusterSimulation, EnergyBand};
use wsn_sim::config::{self, ClusterConfig};
use wsn_sim::snapshot::{self, ClusterSnapshot};
use wsn_sim::telemetry::{self, LifetimeStats, LifetimeTrace};
use wsn_sim::SimError;

#[derive(Debug)]
struct Options {
    config: ClusterConfig,
    seed: Option<u64>,
    max_rounds: Option<u64>,
    export: Option<String>,
    json_logs: bool,
}

fn parse_args() -> Result<Option<Options>, SimError> {
    let args: Vec<String> = std::env::args().collect();
    let mut config = ClusterConfig::default();
    let mut seed = None;
    let mut max_rounds = None;
    let mut export = None;
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
            "--nodes" | "-n" => {
                config.node_count = parse_value("--nodes", value)?;
                i += 1;
            }
            "--prob" | "-p" => {
                config.cluster_head_prob = parse_value("--prob", value)?;
                i += 1;
            }
            "--threshold" | "-t" => {
                config.death_threshold = parse_value("--threshold", value)?;
                i += 1;
            }
            "--interval-ms" => {
                config.round_interval_ms = parse_value("--interval-ms", value)?;
                i += 1;
            }
            "--max-rounds" => {
                max_rounds = Some(parse_value("--max-rounds", value)?);
                i += 1;
            }
            "--seed" => {
                seed = Some(parse_value("--seed", value)?);
                i += 1;
            }
            "--export" => {
                export = Some(
                    value
                        .cloned()
                        .ok_or_else(|| SimError::Configuration("--export needs a path".into()))?,
                );
                i += 1;
            }
            "--json-logs" => json_logs = true,
            "--help" | "-h" => {
                println!("Usage: cluster_demo [OPTIONS]");
                println!();
                println!("Options:");
                println!("      --config FILE       JSON cluster configuration");
                println!("  -n, --nodes NUM         Number of sensors (default: 20)");
                println!("  -p, --prob NUM          Cluster-head probability (default: 0.2)");
                println!("  -t, --threshold NUM     Stop when this fraction is dead (default: 0.8)");
                println!("      --interval-ms NUM   Delay between rounds (default: 1000)");
                println!("      --max-rounds NUM    Stop early after this many rounds");
                println!("      --seed NUM          Random seed (default: entropy)");
                println!("      --export FILE       Write final snapshot and round trace as JSON");
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
        seed,
        max_rounds,
        export,
        json_logs,
    }))
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T, SimError> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| SimError::Configuration(format!("{} needs a valid value", flag)))
}

fn band_counts(sim: &ClusterSimulation<StdRng>) -> [usize; 4] {
    let mut counts = [0; 4];
    for node in sim.nodes() {
        let slot = match node.band() {
            EnergyBand::High => 0,
            EnergyBand::Medium => 1,
            EnergyBand::Low => 2,
            EnergyBand::Depleted => 3,
        };
        counts[slot] += 1;
    }
    counts
}

fn run(options: Options) -> Result<(), SimError> {
    let rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let interval = options.config.round_interval();
    let total = options.config.node_count;
    let mut sim = ClusterSimulation::new(options.config, rng)?;
    let mut trace = LifetimeTrace::new();

    sim.start()?;
    println!("Round  Heads  Alive  High/Med/Low/Dead");
    while sim.is_running() {
        let report = sim.run_round();
        let [high, medium, low, dead] = band_counts(&sim);
        println!(
            "{:>5}  {:>5}  {:>5}  {}/{}/{}/{}",
            report.round,
            report.cluster_heads.len(),
            report.alive,
            high,
            medium,
            low,
            dead
        );
        trace.record(report);

        if sim.should_stop() {
            sim.stop();
            println!();
            println!(
                "Simulation ended at round {}. Network reached the death threshold.",
                sim.round_count()
            );
        } else if options.max_rounds.map_or(false, |max| sim.round_count() >= max) {
            sim.stop();
            println!();
            println!("Stopped after {} rounds.", sim.round_count());
        } else {
            thread::sleep(interval);
        }
    }

    let stats = LifetimeStats::from_trace(&trace, total);
    println!("First node death:  {:?}", stats.first_death_round);
    println!("Half dead:         {:?}", stats.half_dead_round);
    println!("Energy spent:      {:.3}", stats.total_energy_spent);
    println!("Heads per round:   {:.2}", stats.mean_heads_per_round);

    if let Some(path) = options.export {
        let export = serde_json::json!({
            "snapshot": ClusterSnapshot::of(&sim),
            "stats": stats,
            "trace": trace,
        });
        snapshot::write_json(&export, &path)?;
        println!("Exported to {}", path);
    }

    Ok(())
}

fn main() {
    let options = match parse_args() {
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
