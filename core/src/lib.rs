//! roadnet-core: In-memory road network analysis engine.
//!
//! Holds an undirected graph of intersections joined by roads, each road
//! carrying a distance and a speed limit, and answers routing and structural
//! questions over it: shortest paths, minimum spanning forests, connectivity
//! and critical-infrastructure detection, and network-wide metrics.
//!
//! Every algorithm weighs roads by the graph's current [`MetricMode`]
//! (distance, or travel time `distance / speed_limit`). Outputs are
//! deterministic: node listings are sorted and equal-cost ties resolve by
//! node identifier.

mod config;
mod connectivity;
mod dijkstra;
mod error;
mod graph;
mod metrics;
mod spanning;

#[cfg(test)]
mod testutil;

pub use config::{
    GraphConfig, MetricMode, DEFAULT_ANALYSIS_NODE_CEILING, DEFAULT_DISTANCE, DEFAULT_SPEED_LIMIT,
};
pub use connectivity::{
    find_articulation_points, find_bridges, find_dead_ends, find_path, get_components, has_cycle,
    is_connected,
};
pub use dijkstra::{find_all_shortest_paths, find_shortest_path, PathResult};
pub use error::{GraphError, Result};
pub use graph::{EdgeAttrs, NodeId, RoadGraph};
pub use metrics::{
    get_centrality_metrics, get_degree_distribution, get_network_efficiency, get_network_stats,
    CentralityMetrics, NetworkEfficiency, NetworkStats,
};
pub use spanning::{
    minimum_spanning_forest, spanning_forest_by_component, spanning_forest_details,
    ComponentForest, EdgeDetail, ForestEdge, SpanningForest, SpanningForestDetails,
};
