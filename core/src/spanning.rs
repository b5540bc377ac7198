use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::trace;

use crate::connectivity::get_components;
use crate::graph::{EdgeAttrs, NodeId, RoadGraph};

/// An edge accepted into a spanning forest, weighted under the metric mode
/// in effect when the forest was built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForestEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: f64,
}

/// Minimum spanning forest: one tree per connected component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanningForest {
    pub edges: Vec<ForestEdge>,
    pub total_weight: f64,
}

/// Raw attributes of one accepted edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeDetail {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: f64,
    pub distance: f64,
    pub speed_limit: f64,
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanningForestDetails {
    pub edges: Vec<ForestEdge>,
    pub total_weight: f64,
    pub edge_count: usize,
    /// Accepted edges / edges in the graph; 0.0 for a graph with no edges.
    pub efficiency: f64,
    pub edge_details: Vec<EdgeDetail>,
}

/// The spanning tree of a single component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentForest {
    pub nodes: BTreeSet<NodeId>,
    pub edges: Vec<ForestEdge>,
    pub total_weight: f64,
}

/// Disjoint sets over dense indices, with union by rank and iterative path
/// compression.
#[derive(Debug)]
pub(crate) struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    pub(crate) fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut current = x;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Merge the sets of `a` and `b`. Returns false if they were already one set.
    pub(crate) fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }

        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }
}

/// Kruskal over a candidate edge list already in canonical (sorted `a < b`) order.
///
/// The sort by weight is stable, so equal weights keep enumeration order:
/// lexicographic by `(a, b)`. That tie-break is deterministic but arbitrary.
fn kruskal<'a, I>(graph: &RoadGraph, candidates: I) -> SpanningForest
where
    I: IntoIterator<Item = (&'a NodeId, &'a NodeId, EdgeAttrs)>,
{
    let mode = graph.metric_mode();
    let index: HashMap<&str, usize> = graph
        .nodes()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    let mut weighted: Vec<(f64, &NodeId, &NodeId)> = candidates
        .into_iter()
        .map(|(a, b, attrs)| (attrs.weight(mode), a, b))
        .collect();
    weighted.sort_by(|x, y| x.0.total_cmp(&y.0));

    let mut sets = UnionFind::new(index.len());
    let mut edges = Vec::new();
    let mut total_weight = 0.0;
    let considered = weighted.len();

    for (weight, a, b) in weighted {
        if sets.union(index[a.as_str()], index[b.as_str()]) {
            total_weight += weight;
            edges.push(ForestEdge {
                from: a.clone(),
                to: b.clone(),
                weight,
            });
        }
    }

    trace!(considered, accepted = edges.len(), total_weight, "kruskal finished");
    SpanningForest {
        edges,
        total_weight,
    }
}

/// Minimum spanning forest under the current metric mode.
///
/// A disconnected graph yields one tree per component, so the result always
/// has `node_count - component_count` edges.
pub fn minimum_spanning_forest(graph: &RoadGraph) -> SpanningForest {
    kruskal(graph, graph.edges())
}

/// [`minimum_spanning_forest`] plus per-edge raw attributes and the share of
/// the graph's edges that the forest keeps.
pub fn spanning_forest_details(graph: &RoadGraph) -> SpanningForestDetails {
    let forest = minimum_spanning_forest(graph);
    let total_edges = graph.edge_count();
    let efficiency = if total_edges > 0 {
        forest.edges.len() as f64 / total_edges as f64
    } else {
        0.0
    };

    let edge_details = forest
        .edges
        .iter()
        .map(|e| EdgeDetail {
            from: e.from.clone(),
            to: e.to.clone(),
            weight: e.weight,
            distance: graph.edge_distance(&e.from, &e.to),
            speed_limit: graph.edge_speed_limit(&e.from, &e.to),
            time: graph.edge_time(&e.from, &e.to),
        })
        .collect();

    SpanningForestDetails {
        edge_count: forest.edges.len(),
        edges: forest.edges,
        total_weight: forest.total_weight,
        efficiency,
        edge_details,
    }
}

/// One spanning tree per component, in [`get_components`] order.
pub fn spanning_forest_by_component(graph: &RoadGraph) -> Vec<ComponentForest> {
    let all_edges = graph.edges();

    get_components(graph)
        .into_iter()
        .map(|nodes| {
            let inside = all_edges
                .iter()
                .filter(|(a, _, _)| nodes.contains(*a))
                .copied();
            let tree = kruskal(graph, inside);
            ComponentForest {
                nodes,
                edges: tree.edges,
                total_weight: tree.total_weight,
            }
        })
        .collect()
}
