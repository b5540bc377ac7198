use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};

use serde::Serialize;
use tracing::trace;

use crate::graph::{NodeId, RoadGraph};

/// Outcome of a shortest-path query.
///
/// An unreachable target, or an endpoint that is not in the graph, is
/// reported as `path: None` with `cost: f64::INFINITY`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    pub path: Option<Vec<NodeId>>,
    /// Sum of the edge weights along `path` under the metric mode in effect
    /// at query time.
    pub cost: f64,
}

impl PathResult {
    fn unreachable() -> Self {
        Self {
            path: None,
            cost: f64::INFINITY,
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.path.is_some()
    }
}

/// Min-heap entry. Cost ties pop the smaller node identifier first.
#[derive(Debug)]
struct Frontier<'a> {
    cost: f64,
    node: &'a str,
}

impl Ord for Frontier<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(self.node))
    }
}

impl PartialOrd for Frontier<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Frontier<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier<'_> {}

/// Tentative distances and predecessor links after a Dijkstra run.
struct Search<'a> {
    dist: HashMap<&'a str, f64>,
    prev: HashMap<&'a str, &'a str>,
}

impl<'a> Search<'a> {
    /// Relax from `start` until the frontier drains, or until `target` is
    /// finalized. Nodes already finalized are skipped when popped again.
    fn run(graph: &'a RoadGraph, start: &'a str, target: Option<&str>) -> Self {
        let mut dist: HashMap<&'a str, f64> = HashMap::new();
        let mut prev: HashMap<&'a str, &'a str> = HashMap::new();
        let mut settled: HashSet<&'a str> = HashSet::new();
        let mut frontier = BinaryHeap::new();

        dist.insert(start, 0.0);
        frontier.push(Frontier {
            cost: 0.0,
            node: start,
        });

        while let Some(Frontier { cost, node }) = frontier.pop() {
            if !settled.insert(node) {
                continue;
            }
            if target == Some(node) {
                break;
            }

            for next in graph.neighbors(node) {
                let next = next.as_str();
                if settled.contains(next) {
                    continue;
                }
                let candidate = cost + graph.edge_weight(node, next);
                if dist.get(next).map_or(true, |&d| candidate < d) {
                    dist.insert(next, candidate);
                    prev.insert(next, node);
                    frontier.push(Frontier {
                        cost: candidate,
                        node: next,
                    });
                }
            }
        }

        trace!(start, settled = settled.len(), "dijkstra finished");
        Self { dist, prev }
    }

    fn path_to(&self, start: &str, node: &'a str) -> Vec<NodeId> {
        let mut path = vec![node.to_string()];
        let mut current = node;
        while current != start {
            current = self.prev[current];
            path.push(current.to_string());
        }
        path.reverse();
        path
    }

    fn result_for(&self, start: &str, node: &'a str) -> PathResult {
        match self.dist.get(node) {
            Some(&cost) => PathResult {
                path: Some(self.path_to(start, node)),
                cost,
            },
            None => PathResult::unreachable(),
        }
    }
}

/// Lowest-weight path from `start` to `end` under the graph's current metric mode.
///
/// Stops as soon as `end` is finalized. `start == end` yields `[start]` at cost 0.
pub fn find_shortest_path(graph: &RoadGraph, start: &str, end: &str) -> PathResult {
    let (Some(start), Some(end)) = (graph.node_key(start), graph.node_key(end)) else {
        return PathResult::unreachable();
    };

    if start == end {
        return PathResult {
            path: Some(vec![start.clone()]),
            cost: 0.0,
        };
    }

    Search::run(graph, start, Some(end.as_str())).result_for(start, end)
}

/// Shortest paths from `start` to every node in the graph.
///
/// Unreachable nodes map to the `None` / infinity sentinel. An unknown
/// `start` yields an empty map.
pub fn find_all_shortest_paths(graph: &RoadGraph, start: &str) -> BTreeMap<NodeId, PathResult> {
    let Some(start) = graph.node_key(start) else {
        return BTreeMap::new();
    };

    let search = Search::run(graph, start, None);
    graph
        .nodes()
        .map(|node| (node.clone(), search.result_for(start, node)))
        .collect()
}
