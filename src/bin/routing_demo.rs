//! WSN Routing Demo
//!
//! Generates a random geometric sensor network and animates a breadth-first
//! route discovery between two random nodes, one expansion per tick.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::thread;
use wsn_sim::config::{self, TopologyConfig};
use wsn_sim::routing::{RoutingSearch, SearchStatus};
use wsn_sim::snapshot::{self, GraphSnapshot};
use wsn_sim::telemetry::{self, SearchTrace};
use wsn_sim::topology::{components, GraphGenerator};
use wsn_sim::SimError;

#[derive(Debug)]
struct Options {
    config: TopologyConfig,
    seed: Option<u64>,
    export: Option<String>,
    json_logs: bool,
}

fn parse_args() -> Result<Option<Options>, SimError> {
    let args: Vec<String> = std::env::args().collect();
    let mut config = TopologyConfig::default();
    let mut seed = None;
    let mut export = None;
    let mut json_logs = false;

    // A config file is applied first so flags override it
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
            "--width" => {
                config.width = parse_value("--width", value)?;
                i += 1;
            }
            "--height" => {
                config.height = parse_value("--height", value)?;
                i += 1;
            }
            "--max-dist" | "-d" => {
                config.max_distance = parse_value("--max-dist", value)?;
                i += 1;
            }
            "--connected" | "-c" => config.force_connected = true,
            "--max-attempts" => {
                config.max_attempts = Some(parse_value("--max-attempts", value)?);
                i += 1;
            }
            "--interval-ms" => {
                config.step_interval_ms = parse_value("--interval-ms", value)?;
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
                println!("Usage: routing_demo [OPTIONS]");
                println!();
                println!("Options:");
                println!("      --config FILE        JSON topology configuration");
                println!("  -n, --nodes NUM          Number of nodes (default: 15)");
                println!("      --width NUM          Area width (default: 700)");
                println!("      --height NUM         Area height (default: 500)");
                println!("  -d, --max-dist NUM       Link range (default: 120)");
                println!("  -c, --connected          Resample until the graph is connected");
                println!("      --max-attempts NUM   Cap connectivity resampling");
                println!("      --interval-ms NUM    Delay between BFS steps (default: 800)");
                println!("      --seed NUM           Random seed (default: entropy)");
                println!("      --export FILE        Write final snapshot and trace as JSON");
                println!("      --json-logs          Emit logs as JSON");
                println!("  -h, --help               Show this help");
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
        export,
        json_logs,
    }))
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T, SimError> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| SimError::Configuration(format!("{} needs a valid value", flag)))
}

fn run(options: Options) -> Result<(), SimError> {
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let interval = options.config.step_interval();
    let generator = GraphGenerator::new(options.config)?;
    let graph = generator.generate(&mut rng)?;

    println!("Network:");
    println!("  Nodes:       {}", graph.node_count());
    println!("  Edges:       {}", graph.edge_count());
    println!("  Components:  {}", components(&graph).len());
    println!("  Source:      {}", graph.source());
    println!("  Destination: {}", graph.destination());
    println!();

    let mut search = RoutingSearch::new(&graph)?;
    let mut trace = SearchTrace::new(search.source(), search.destination());
    search.start()?;
    println!("Running BFS from {} to {}...", search.source(), search.destination());

    while !search.status().is_terminal() {
        thread::sleep(interval);
        let outcome = search.step();
        if let Some(current) = outcome.current {
            println!(
                "  step {:>3}: expanded {:>3}, discovered {:?}",
                search.steps(),
                current,
                outcome.discovered.iter().map(|n| n.0).collect::<Vec<_>>()
            );
        }
        trace.record(&outcome);
    }
    trace.finish(search.status(), search.path());

    println!();
    match (search.status(), search.path()) {
        (SearchStatus::Found, Some(path)) => {
            let ids: Vec<usize> = path.iter().map(|n| n.0).collect();
            println!("Path found: {:?} ({} hops)", ids, ids.len() - 1);
        }
        _ => println!("No path found (disconnected subgraphs or BFS exhausted)."),
    }

    if let Some(path) = options.export {
        let export = serde_json::json!({
            "snapshot": GraphSnapshot::of_search(&search),
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
