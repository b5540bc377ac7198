use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::config::{GraphConfig, MetricMode};
use crate::error::{GraphError, Result};

/// Intersection identifier.
pub type NodeId = String;

/// Raw attributes of a road. Independent of the metric mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeAttrs {
    pub distance: f64,
    pub speed_limit: f64,
}

impl EdgeAttrs {
    /// Travel time: `distance / speed_limit`.
    pub fn time(&self) -> f64 {
        self.distance / self.speed_limit
    }

    /// The scalar the algorithms consume under `mode`.
    pub fn weight(&self, mode: MetricMode) -> f64 {
        match mode {
            MetricMode::Distance => self.distance,
            MetricMode::Time => self.time(),
        }
    }
}

/// Undirected weighted road network.
///
/// `adjacency` keeps neighbors in insertion order; its keys are the node set and
/// iterate in sorted order, which every algorithm relies on for determinism.
/// `attrs` is keyed by both orderings of each pair: an edge is present in both
/// endpoints' adjacency and both attribute directions, or in neither.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadGraph {
    adjacency: BTreeMap<NodeId, Vec<NodeId>>,
    attrs: HashMap<NodeId, HashMap<NodeId, EdgeAttrs>>,
    config: GraphConfig,
}

impl RoadGraph {
    pub fn new() -> Self {
        Self {
            adjacency: BTreeMap::new(),
            attrs: HashMap::new(),
            config: GraphConfig::default(),
        }
    }

    /// Build an empty graph with validated settings.
    pub fn with_config(config: GraphConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            adjacency: BTreeMap::new(),
            attrs: HashMap::new(),
            config,
        })
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------------

    /// Register an intersection. Fails with `NodeExists` on a duplicate.
    pub fn add_node(&mut self, id: impl Into<NodeId>) -> Result<()> {
        let id = id.into();
        if self.adjacency.contains_key(&id) {
            return Err(GraphError::NodeExists(id));
        }
        debug!(node = %id, "added node");
        self.attrs.insert(id.clone(), HashMap::new());
        self.adjacency.insert(id, Vec::new());
        Ok(())
    }

    /// Remove an intersection and every road touching it.
    pub fn remove_node(&mut self, id: &str) -> Result<()> {
        let neighbors = self
            .adjacency
            .remove(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;

        for neighbor in &neighbors {
            if let Some(list) = self.adjacency.get_mut(neighbor) {
                list.retain(|n| n != id);
            }
            if let Some(map) = self.attrs.get_mut(neighbor) {
                map.remove(id);
            }
        }
        self.attrs.remove(id);

        debug!(node = %id, removed_edges = neighbors.len(), "removed node");
        Ok(())
    }

    /// Insert a road, or overwrite the attributes of an existing one.
    ///
    /// Both endpoints must exist and differ; distance and speed limit must be
    /// positive and finite. Nothing is modified when validation fails.
    pub fn add_edge(&mut self, a: &str, b: &str, distance: f64, speed_limit: f64) -> Result<()> {
        for id in [a, b] {
            if !self.adjacency.contains_key(id) {
                return Err(GraphError::NodeNotFound(id.to_string()));
            }
        }
        if a == b {
            return Err(GraphError::SelfLoop(a.to_string()));
        }
        if !(distance.is_finite() && distance > 0.0) {
            return Err(GraphError::InvalidDistance(distance));
        }
        if !(speed_limit.is_finite() && speed_limit > 0.0) {
            return Err(GraphError::InvalidSpeedLimit(speed_limit));
        }

        for (from, to) in [(a, b), (b, a)] {
            if let Some(list) = self.adjacency.get_mut(from) {
                if !list.iter().any(|n| n == to) {
                    list.push(to.to_string());
                }
            }
            self.attrs
                .entry(from.to_string())
                .or_default()
                .insert(to.to_string(), EdgeAttrs { distance, speed_limit });
        }

        debug!(from = %a, to = %b, distance, speed_limit, "added edge");
        Ok(())
    }

    /// Remove the road between `a` and `b` (either order).
    pub fn remove_edge(&mut self, a: &str, b: &str) -> Result<()> {
        if !self.has_edge(a, b) {
            return Err(GraphError::EdgeNotFound(a.to_string(), b.to_string()));
        }

        for (from, to) in [(a, b), (b, a)] {
            if let Some(list) = self.adjacency.get_mut(from) {
                list.retain(|n| n != to);
            }
            if let Some(map) = self.attrs.get_mut(from) {
                map.remove(to);
            }
        }

        debug!(from = %a, to = %b, "removed edge");
        Ok(())
    }

    /// Drop all nodes and edges. The configuration is kept.
    pub fn clear(&mut self) {
        self.adjacency.clear();
        self.attrs.clear();
        debug!("cleared graph");
    }

    pub fn set_metric_mode(&mut self, mode: MetricMode) {
        self.config.metric_mode = mode;
        debug!(%mode, "metric mode changed");
    }

    pub fn metric_mode(&self) -> MetricMode {
        self.config.metric_mode
    }

    // ---------------------------------------------------------------------
    // Read surface
    // ---------------------------------------------------------------------

    pub fn contains_node(&self, id: &str) -> bool {
        self.adjacency.contains_key(id)
    }

    /// The graph-owned identifier equal to `id`, so traversals can borrow
    /// node keys for the lifetime of the graph.
    pub(crate) fn node_key(&self, id: &str) -> Option<&NodeId> {
        self.adjacency.get_key_value(id).map(|(k, _)| k)
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.edge(a, b).is_some()
    }

    /// Attributes of the road between `a` and `b`, if there is one.
    pub fn edge(&self, a: &str, b: &str) -> Option<EdgeAttrs> {
        self.attrs.get(a).and_then(|m| m.get(b)).copied()
    }

    /// Attributes of `a`–`b`, falling back to the configured defaults for a missing road.
    fn edge_or_default(&self, a: &str, b: &str) -> EdgeAttrs {
        self.edge(a, b).unwrap_or(EdgeAttrs {
            distance: self.config.default_distance,
            speed_limit: self.config.default_speed_limit,
        })
    }

    /// Weight under the current metric mode. Never fails: a missing road
    /// reports the configured default distance and speed limit.
    pub fn edge_weight(&self, a: &str, b: &str) -> f64 {
        self.edge_or_default(a, b).weight(self.config.metric_mode)
    }

    pub fn edge_distance(&self, a: &str, b: &str) -> f64 {
        self.edge_or_default(a, b).distance
    }

    pub fn edge_time(&self, a: &str, b: &str) -> f64 {
        self.edge_or_default(a, b).time()
    }

    pub fn edge_speed_limit(&self, a: &str, b: &str) -> f64 {
        self.edge_or_default(a, b).speed_limit
    }

    /// Number of roads at `id`; 0 for an unknown node.
    pub fn degree(&self, id: &str) -> usize {
        self.neighbors(id).len()
    }

    pub fn all_degrees(&self) -> BTreeMap<NodeId, usize> {
        self.adjacency
            .iter()
            .map(|(id, list)| (id.clone(), list.len()))
            .collect()
    }

    /// Node identifiers in sorted order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.adjacency.keys()
    }

    /// Neighbors of `id` in insertion order; empty for an unknown node.
    pub fn neighbors(&self, id: &str) -> &[NodeId] {
        self.adjacency.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Each undirected edge once as `(a, b, attrs)` with `a < b`, sorted by `a`
    /// then by `b`.
    pub fn edges(&self) -> Vec<(&NodeId, &NodeId, EdgeAttrs)> {
        let mut edges = Vec::with_capacity(self.edge_count());
        for (a, list) in &self.adjacency {
            let mut upper: Vec<&NodeId> = list.iter().filter(|b| a < *b).collect();
            upper.sort();
            for b in upper {
                edges.push((a, b, self.edge_or_default(a, b)));
            }
        }
        edges
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|v| v.len()).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Sorted adjacency listing, one `node: n1, n2` line per node.
    pub fn adjacency_listing(&self) -> String {
        if self.adjacency.is_empty() {
            return "Empty graph".to_string();
        }

        self.adjacency
            .iter()
            .map(|(id, list)| {
                if list.is_empty() {
                    format!("{id}: (no connections)")
                } else {
                    let mut sorted: Vec<&str> = list.iter().map(|s| s.as_str()).collect();
                    sorted.sort_unstable();
                    format!("{id}: {}", sorted.join(", "))
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let id_bytes: usize = self.adjacency.keys().map(|k| k.capacity()).sum();
        let nodes_mem = self.adjacency.len() * (2 * size_of::<NodeId>() + 64) + id_bytes;
        let adj_mem: usize = self
            .adjacency
            .values()
            .map(|v| v.capacity() * size_of::<NodeId>() + v.iter().map(|s| s.capacity()).sum::<usize>())
            .sum();
        let attr_mem: usize = self
            .attrs
            .values()
            .map(|m| m.len() * (size_of::<NodeId>() + size_of::<EdgeAttrs>() + 16))
            .sum();

        nodes_mem + adj_mem + attr_mem
    }
}

impl Default for RoadGraph {
    fn default() -> Self {
        Self::new()
    }
}
