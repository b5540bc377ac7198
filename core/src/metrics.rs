//! Aggregate statistics, centrality and efficiency of a road network.
//!
//! Centrality and efficiency run one single-source Dijkstra per node, i.e.
//! O(V · E log V) time plus O(V² · L) path reconstruction, where L is the
//! mean path length. That is comfortable up to a few hundred nodes; past
//! the configured `analysis_node_ceiling` a warning is logged.
//!
//! Betweenness, closeness and global efficiency are deliberately the
//! simplified variants used by the dashboard, not the textbook definitions:
//! betweenness counts only the single path Dijkstra returns per pair,
//! closeness ignores unreachable nodes, and global efficiency counts
//! unreachable pairs in its denominator.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use serde::Serialize;
use tracing::{trace, warn};

use crate::connectivity::{find_dead_ends, get_components, has_cycle, is_connected};
use crate::dijkstra::find_all_shortest_paths;
use crate::graph::{NodeId, RoadGraph};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    /// `edges / (n·(n−1)/2)`.
    pub density: f64,
    pub avg_degree: f64,
    pub dead_ends: usize,
    pub components: usize,
    pub is_connected: bool,
    pub has_cycles: bool,
    /// Mean raw distance per road, whatever the metric mode.
    pub avg_distance: f64,
    /// Mean raw travel time per road, whatever the metric mode.
    pub avg_time: f64,
    pub component_details: Vec<BTreeSet<NodeId>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CentralityMetrics {
    pub degree: BTreeMap<NodeId, f64>,
    pub betweenness: BTreeMap<NodeId, f64>,
    pub closeness: BTreeMap<NodeId, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkEfficiency {
    pub global_efficiency: f64,
    /// Mean local clustering coefficient over nodes of degree ≥ 2.
    pub local_efficiency: f64,
    /// Fraction of node pairs joined by any path.
    pub connectivity_score: f64,
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

fn warn_if_large(graph: &RoadGraph, analysis: &str) {
    let ceiling = graph.config().analysis_node_ceiling;
    if graph.node_count() > ceiling {
        warn!(
            analysis,
            nodes = graph.node_count(),
            ceiling,
            "running a quadratic analysis above the configured node ceiling"
        );
    }
}

/// Counts, density, degree and per-road averages. An empty graph reports
/// zeros, connected and acyclic.
pub fn get_network_stats(graph: &RoadGraph) -> NetworkStats {
    let total_nodes = graph.node_count();
    let total_edges = graph.edge_count();
    let components = get_components(graph);

    let edges = graph.edges();
    let road_count = edges.len() as f64;
    let avg_distance = ratio(edges.iter().map(|(_, _, e)| e.distance).sum(), road_count);
    let avg_time = ratio(edges.iter().map(|(_, _, e)| e.time()).sum(), road_count);

    NetworkStats {
        total_nodes,
        total_edges,
        density: ratio(total_edges as f64, pair_count(total_nodes) as f64),
        avg_degree: ratio((2 * total_edges) as f64, total_nodes as f64),
        dead_ends: find_dead_ends(graph).len(),
        components: components.len(),
        is_connected: is_connected(graph),
        has_cycles: has_cycle(graph),
        avg_distance,
        avg_time,
        component_details: components,
    }
}

/// Histogram: degree → number of nodes with that degree.
pub fn get_degree_distribution(graph: &RoadGraph) -> BTreeMap<usize, usize> {
    let mut histogram = BTreeMap::new();
    for degree in graph.all_degrees().into_values() {
        *histogram.entry(degree).or_insert(0) += 1;
    }
    histogram
}

/// Degree, betweenness and closeness centrality for every node.
///
/// - degree: `degree / max_degree`.
/// - betweenness: for every unordered pair, each interior node of the one
///   path Dijkstra returns scores 1; totals are divided by the pair count.
/// - closeness: reachable nodes / summed distance to them.
pub fn get_centrality_metrics(graph: &RoadGraph) -> CentralityMetrics {
    if graph.is_empty() {
        return CentralityMetrics::default();
    }
    warn_if_large(graph, "centrality");

    let degrees = graph.all_degrees();
    let max_degree = degrees.values().copied().max().unwrap_or(0) as f64;
    let degree = degrees
        .iter()
        .map(|(id, &d)| (id.clone(), ratio(d as f64, max_degree)))
        .collect();

    let mut betweenness: BTreeMap<NodeId, f64> =
        graph.nodes().map(|id| (id.clone(), 0.0)).collect();
    let mut closeness = BTreeMap::new();

    for start in graph.nodes() {
        let paths = find_all_shortest_paths(graph, start);

        // Pairs are unordered: only count ends after `start`
        for (_, result) in paths.range::<NodeId, _>((Bound::Excluded(start), Bound::Unbounded)) {
            let Some(path) = &result.path else { continue };
            if path.len() > 2 {
                for interior in &path[1..path.len() - 1] {
                    if let Some(score) = betweenness.get_mut(interior) {
                        *score += 1.0;
                    }
                }
            }
        }

        let (reachable, total_distance) = paths
            .iter()
            .filter(|(id, r)| *id != start && r.is_reachable())
            .fold((0usize, 0.0f64), |(n, sum), (_, r)| (n + 1, sum + r.cost));
        closeness.insert(start.clone(), ratio(reachable as f64, total_distance));
    }

    let pairs = pair_count(graph.node_count()) as f64;
    for score in betweenness.values_mut() {
        *score = ratio(*score, pairs);
    }
    trace!(nodes = graph.node_count(), pairs, "centrality computed");

    CentralityMetrics {
        degree,
        betweenness,
        closeness,
    }
}

/// Global efficiency, local efficiency and connectivity score.
///
/// Global efficiency averages `1 / distance` over all node pairs, with
/// unreachable pairs adding 0 but still counted. Fewer than two nodes
/// yields all zeros.
pub fn get_network_efficiency(graph: &RoadGraph) -> NetworkEfficiency {
    if graph.node_count() < 2 {
        return NetworkEfficiency::default();
    }
    warn_if_large(graph, "efficiency");

    let mut inverse_sum = 0.0;
    let mut reachable_pairs = 0usize;

    for start in graph.nodes() {
        let paths = find_all_shortest_paths(graph, start);
        for (_, result) in paths.range::<NodeId, _>((Bound::Excluded(start), Bound::Unbounded)) {
            if result.is_reachable() {
                reachable_pairs += 1;
                inverse_sum += ratio(1.0, result.cost);
            }
        }
    }

    let pairs = pair_count(graph.node_count()) as f64;
    trace!(reachable_pairs, pairs, "efficiency computed");
    NetworkEfficiency {
        global_efficiency: ratio(inverse_sum, pairs),
        local_efficiency: local_clustering(graph),
        connectivity_score: ratio(reachable_pairs as f64, pairs),
    }
}

/// Mean fraction of connected neighbor pairs, over nodes with degree ≥ 2.
fn local_clustering(graph: &RoadGraph) -> f64 {
    let mut total = 0.0;
    let mut counted = 0usize;

    for id in graph.nodes() {
        let neighbors = graph.neighbors(id);
        if neighbors.len() < 2 {
            continue;
        }
        let mut linked = 0usize;
        for (i, a) in neighbors.iter().enumerate() {
            for b in &neighbors[i + 1..] {
                if graph.has_edge(a, b) {
                    linked += 1;
                }
            }
        }
        total += ratio(linked as f64, pair_count(neighbors.len()) as f64);
        counted += 1;
    }

    ratio(total, counted as f64)
}
