use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use roadnet_core::{GraphConfig, MetricMode, RoadGraph, DEFAULT_ANALYSIS_NODE_CEILING};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Times every roadnet-core analysis over synthetic road networks.
#[derive(Parser)]
#[command(name = "roadnet-bench")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Network shape to generate
    #[arg(value_enum, default_value = "all")]
    mode: Mode,

    /// Number of intersections per network
    #[arg(default_value = "200")]
    node_count: usize,

    /// Edge weight used by every algorithm (distance or time)
    #[arg(short, long, default_value = "distance")]
    metric: MetricMode,

    /// Node count above which centrality and efficiency are skipped
    #[arg(long, default_value_t = DEFAULT_ANALYSIS_NODE_CEILING)]
    ceiling: usize,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Run all generators and benchmark each
    All,
    /// Manhattan-style street grid
    Grid,
    /// Ring road with random highway shortcuts
    Ring,
    /// Uniform random roads
    Random,
    /// Two dense districts joined by a single bridge road
    Districts,
    /// Branching suburb: a tree with cul-de-sacs
    Suburb,
}

type Generator = fn(&GraphConfig, usize) -> roadnet_core::Result<RoadGraph>;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = GraphConfig {
        metric_mode: cli.metric,
        analysis_node_ceiling: cli.ceiling,
        ..GraphConfig::default()
    };

    println!("roadnet-bench");
    println!("=============");
    println!();

    let generators: Vec<(&str, Generator)> = match cli.mode {
        Mode::Grid => vec![("Street grid", gen_grid)],
        Mode::Ring => vec![("Ring road + shortcuts", gen_ring)],
        Mode::Random => vec![("Uniform random", gen_random)],
        Mode::Districts => vec![("Districts (bridge road)", gen_districts)],
        Mode::Suburb => vec![("Suburb tree", gen_suburb)],
        Mode::All => vec![
            ("Street grid", gen_grid as Generator),
            ("Ring road + shortcuts", gen_ring),
            ("Uniform random", gen_random),
            ("Districts (bridge road)", gen_districts),
            ("Suburb tree", gen_suburb),
        ],
    };

    for (name, generator) in generators {
        if let Err(e) = run_benchmark(name, generator, cli.node_count, &config) {
            eprintln!("error: {name}: {e}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

/// Runs `f` and returns its output with the elapsed wall time in milliseconds.
fn timed<T>(f: impl FnOnce() -> T) -> (T, f64) {
    let t = Instant::now();
    let out = f();
    (out, t.elapsed().as_secs_f64() * 1000.0)
}

fn run_benchmark(
    name: &str,
    generator: Generator,
    node_count: usize,
    config: &GraphConfig,
) -> roadnet_core::Result<()> {
    println!("--- {} ---", name);
    println!("Target: {} intersections, metric: {}", node_count, config.metric_mode);

    let (graph, gen_ms) = timed(|| generator(config, node_count));
    let graph = graph?;
    println!(
        "Generated in {:.1}ms: {} nodes, {} edges, ~{:.1}KB",
        gen_ms,
        graph.node_count(),
        graph.edge_count(),
        graph.memory_usage() as f64 / 1024.0
    );
    info!(name, nodes = graph.node_count(), edges = graph.edge_count(), "network generated");

    println!();
    println!("{:<24} {:>24} {:>10}", "analysis", "result", "time");
    println!("{:-<24} {:->24} {:->10}", "", "", "");
    let row = |label: &str, result: String, ms: f64| {
        println!("{:<24} {:>24} {:>8.2}ms", label, result, ms);
    };

    let (first, last) = match (graph.nodes().next(), graph.nodes().last()) {
        (Some(first), Some(last)) => (first.clone(), last.clone()),
        _ => {
            println!("(empty network)");
            println!();
            return Ok(());
        }
    };

    let (path, ms) = timed(|| roadnet_core::find_shortest_path(&graph, &first, &last));
    let summary = match &path.path {
        Some(p) => format!("{} hops, cost {:.3}", p.len() - 1, path.cost),
        None => "no path".to_string(),
    };
    row("shortest path", summary, ms);

    let (all, ms) = timed(|| roadnet_core::find_all_shortest_paths(&graph, &first));
    let reached = all.values().filter(|r| r.is_reachable()).count();
    row("all shortest paths", format!("{} reached", reached), ms);

    let (forest, ms) = timed(|| roadnet_core::spanning_forest_details(&graph));
    row(
        "spanning forest",
        format!("{} edges, {:.1}%", forest.edge_count, forest.efficiency * 100.0),
        ms,
    );

    let (components, ms) = timed(|| roadnet_core::get_components(&graph));
    row("components", components.len().to_string(), ms);

    let (cycle, ms) = timed(|| roadnet_core::has_cycle(&graph));
    row("has cycle", cycle.to_string(), ms);

    let (dead_ends, ms) = timed(|| roadnet_core::find_dead_ends(&graph));
    row("dead ends", dead_ends.len().to_string(), ms);

    let (cut_points, ms) = timed(|| roadnet_core::find_articulation_points(&graph));
    row("articulation points", cut_points.len().to_string(), ms);

    let (bridges, ms) = timed(|| roadnet_core::find_bridges(&graph));
    row("bridges", bridges.len().to_string(), ms);

    let (stats, ms) = timed(|| roadnet_core::get_network_stats(&graph));
    row("network stats", format!("density {:.4}", stats.density), ms);

    if graph.node_count() > graph.config().analysis_node_ceiling {
        debug!(
            nodes = graph.node_count(),
            ceiling = graph.config().analysis_node_ceiling,
            "skipping all-pairs metrics"
        );
        println!("{:<24} {:>24}", "centrality/efficiency", "skipped (too large)");
    } else {
        let (centrality, ms) = timed(|| roadnet_core::get_centrality_metrics(&graph));
        let peak = centrality
            .betweenness
            .values()
            .copied()
            .fold(0.0f64, f64::max);
        row("centrality", format!("peak betweenness {:.3}", peak), ms);

        let (efficiency, ms) = timed(|| roadnet_core::get_network_efficiency(&graph));
        row(
            "efficiency",
            format!("global {:.3}", efficiency.global_efficiency),
            ms,
        );
    }
    println!();
    Ok(())
}

// ---------------------------------------------------------------------------
// Generators: deterministic, single-threaded
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((self.0 >> 33) % max as u64) as usize
    }
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
    /// Road length in km, uniform in [lo, hi).
    fn distance(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }
    fn speed(&mut self) -> f64 {
        SPEED_LIMITS[self.next(SPEED_LIMITS.len())]
    }
}

const SPEED_LIMITS: [f64; 5] = [20.0, 30.0, 40.0, 50.0, 60.0];

/// Zero-padded so lexicographic order matches generation order.
fn node_name(i: usize) -> String {
    format!("x{:06}", i)
}

fn with_nodes(config: &GraphConfig, node_count: usize) -> roadnet_core::Result<RoadGraph> {
    let mut graph = RoadGraph::with_config(config.clone())?;
    for i in 0..node_count {
        graph.add_node(node_name(i))?;
    }
    Ok(graph)
}

/// Street grid: each block joined to its east and south neighbour.
fn gen_grid(config: &GraphConfig, node_count: usize) -> roadnet_core::Result<RoadGraph> {
    let mut graph = with_nodes(config, node_count)?;
    let mut rng = FastRng::new(42);
    let side = (node_count as f64).sqrt().ceil().max(1.0) as usize;

    for i in 0..node_count {
        let east = i + 1;
        let south = i + side;
        if east % side != 0 && east < node_count {
            let (d, s) = (rng.distance(0.1, 0.3), rng.speed());
            graph.add_edge(&node_name(i), &node_name(east), d, s)?;
        }
        if south < node_count {
            let (d, s) = (rng.distance(0.1, 0.3), rng.speed());
            graph.add_edge(&node_name(i), &node_name(south), d, s)?;
        }
    }
    Ok(graph)
}

/// Ring road plus highway shortcuts on roughly one node in ten.
fn gen_ring(config: &GraphConfig, node_count: usize) -> roadnet_core::Result<RoadGraph> {
    let mut graph = with_nodes(config, node_count)?;
    let mut rng = FastRng::new(67890);
    if node_count < 2 {
        return Ok(graph);
    }

    for i in 0..node_count {
        let next = (i + 1) % node_count;
        if next != i {
            let (d, s) = (rng.distance(0.5, 2.0), rng.speed());
            graph.add_edge(&node_name(i), &node_name(next), d, s)?;
        }
    }
    for _ in 0..node_count / 10 {
        let from = rng.next(node_count);
        let to = rng.next(node_count);
        if from != to {
            let d = rng.distance(2.0, 10.0);
            graph.add_edge(&node_name(from), &node_name(to), d, 100.0)?;
        }
    }
    Ok(graph)
}

/// Uniform random roads, about two per intersection. Usually disconnected.
fn gen_random(config: &GraphConfig, node_count: usize) -> roadnet_core::Result<RoadGraph> {
    let mut graph = with_nodes(config, node_count)?;
    let mut rng = FastRng::new(54321);
    if node_count < 2 {
        return Ok(graph);
    }

    for _ in 0..node_count * 2 {
        let from = rng.next(node_count);
        let to = rng.next(node_count);
        if from != to {
            let (d, s) = (rng.distance(0.2, 5.0), rng.speed());
            graph.add_edge(&node_name(from), &node_name(to), d, s)?;
        }
    }
    Ok(graph)
}

/// Two dense districts joined by one bridge road. Worst case for routing
/// through a bottleneck; the bridge road is the single bridge edge.
fn gen_districts(config: &GraphConfig, node_count: usize) -> roadnet_core::Result<RoadGraph> {
    let mut graph = with_nodes(config, node_count)?;
    let mut rng = FastRng::new(99999);
    let half = node_count / 2;
    if half < 2 {
        return Ok(graph);
    }

    for (start, len) in [(0, half), (half, node_count - half)] {
        // Local chain keeps each district connected
        for i in 1..len {
            let (d, s) = (rng.distance(0.1, 1.0), rng.speed());
            graph.add_edge(&node_name(start + i - 1), &node_name(start + i), d, s)?;
        }
        for i in 0..len {
            for _ in 0..3 {
                let target = rng.next(len);
                if target != i {
                    let (d, s) = (rng.distance(0.1, 1.0), rng.speed());
                    graph.add_edge(&node_name(start + i), &node_name(start + target), d, s)?;
                }
            }
        }
    }

    graph.add_edge(&node_name(half - 1), &node_name(half), 3.0, 80.0)?;
    Ok(graph)
}

/// Suburb: each new house attaches to an earlier one, so every road is a
/// bridge and most intersections are cul-de-sacs.
fn gen_suburb(config: &GraphConfig, node_count: usize) -> roadnet_core::Result<RoadGraph> {
    let mut graph = with_nodes(config, node_count)?;
    let mut rng = FastRng::new(77777);

    for i in 1..node_count {
        let parent = rng.next(i);
        let (d, s) = (rng.distance(0.05, 0.5), rng.speed());
        graph.add_edge(&node_name(parent), &node_name(i), d, s)?;
    }
    Ok(graph)
}
