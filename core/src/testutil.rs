//! Graph builders, proptest strategies and slow reference oracles shared by
//! the unit tests.

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use proptest::prelude::*;

use crate::connectivity::get_components;
use crate::graph::{NodeId, RoadGraph};

pub(crate) fn graph_with_nodes(ids: &[&str]) -> RoadGraph {
    let mut g = RoadGraph::new();
    for id in ids {
        g.add_node(*id).unwrap();
    }
    g
}

pub(crate) fn road(g: &mut RoadGraph, a: &str, b: &str, distance: f64, speed_limit: f64) {
    g.add_edge(a, b, distance, speed_limit).unwrap();
}

/// n0 – n1 – ... – n(n-1), unit distance, 30 km/h.
pub(crate) fn make_chain(n: usize) -> RoadGraph {
    let mut g = RoadGraph::new();
    for i in 0..n {
        g.add_node(format!("n{i}")).unwrap();
    }
    for i in 1..n {
        road(&mut g, &format!("n{}", i - 1), &format!("n{i}"), 1.0, 30.0);
    }
    g
}

pub(crate) fn make_cycle(n: usize) -> RoadGraph {
    let mut g = make_chain(n);
    road(&mut g, &format!("n{}", n - 1), "n0", 1.0, 30.0);
    g
}

/// "hub" joined to leaf1..=leafN.
pub(crate) fn make_star(leaves: usize) -> RoadGraph {
    let mut g = graph_with_nodes(&["hub"]);
    for i in 1..=leaves {
        let leaf = format!("leaf{i}");
        g.add_node(leaf.as_str()).unwrap();
        road(&mut g, "hub", &leaf, 1.0, 30.0);
    }
    g
}

/// Triangles a1-a2-a3 and b1-b2-b3, not joined.
pub(crate) fn two_triangles() -> RoadGraph {
    let mut g = graph_with_nodes(&["a1", "a2", "a3", "b1", "b2", "b3"]);
    for side in ["a", "b"] {
        road(&mut g, &format!("{side}1"), &format!("{side}2"), 1.0, 30.0);
        road(&mut g, &format!("{side}2"), &format!("{side}3"), 1.0, 30.0);
        road(&mut g, &format!("{side}3"), &format!("{side}1"), 1.0, 30.0);
    }
    g
}

/// [`two_triangles`] joined by the single road a1–b1.
pub(crate) fn make_barbell() -> RoadGraph {
    let mut g = two_triangles();
    road(&mut g, "a1", "b1", 5.0, 50.0);
    g
}

/// Summed weight of consecutive hops under the current metric mode.
pub(crate) fn path_cost(g: &RoadGraph, path: &[NodeId]) -> f64 {
    path.windows(2)
        .fold(0.0, |acc, hop| acc + g.edge_weight(&hop[0], &hop[1]))
}

/// Random graphs on v0..v(n-1), 1 ≤ n ≤ `max_nodes`, with integer distances
/// and a handful of speed limits. Self-loop draws are rejected by
/// `add_edge`; repeated pairs upsert.
pub(crate) fn arb_graph(max_nodes: usize) -> impl Strategy<Value = RoadGraph> {
    (1..=max_nodes).prop_flat_map(|n| {
        let edge = (
            0..n,
            0..n,
            1u8..=9,
            prop::sample::select(vec![20.0, 30.0, 40.0, 60.0]),
        );
        prop::collection::vec(edge, 0..=n * 2).prop_map(move |edges| {
            let mut g = RoadGraph::new();
            for i in 0..n {
                g.add_node(format!("v{i}")).unwrap();
            }
            for (a, b, distance, speed) in edges {
                let _ = g.add_edge(&format!("v{a}"), &format!("v{b}"), f64::from(distance), speed);
            }
            g
        })
    })
}

fn to_petgraph(g: &RoadGraph) -> (UnGraph<NodeId, f64>, HashMap<NodeId, NodeIndex>) {
    let mut pg = UnGraph::new_undirected();
    let mut index = HashMap::new();
    for id in g.nodes() {
        index.insert(id.clone(), pg.add_node(id.clone()));
    }
    for (a, b, attrs) in g.edges() {
        pg.add_edge(index[a], index[b], attrs.weight(g.metric_mode()));
    }
    (pg, index)
}

/// Reachable costs from `start` according to petgraph's Dijkstra.
pub(crate) fn petgraph_distances(g: &RoadGraph, start: &str) -> HashMap<NodeId, f64> {
    let (pg, index) = to_petgraph(g);
    petgraph::algo::dijkstra(&pg, index[start], None, |e| *e.weight())
        .into_iter()
        .map(|(ix, cost)| (pg[ix].clone(), cost))
        .collect()
}

pub(crate) fn petgraph_component_count(g: &RoadGraph) -> usize {
    petgraph::algo::connected_components(&to_petgraph(g).0)
}

/// Rebuild the graph without each node in turn and flag the node if the
/// component count rises. O(V·(V+E)).
pub(crate) fn brute_force_articulation_points(g: &RoadGraph) -> Vec<NodeId> {
    let before = get_components(g).len();
    g.nodes()
        .filter(|id| {
            let mut cut = g.clone();
            cut.remove_node(id).unwrap();
            get_components(&cut).len() > before
        })
        .cloned()
        .collect()
}

/// Same as [`brute_force_articulation_points`], removing each edge instead.
pub(crate) fn brute_force_bridges(g: &RoadGraph) -> Vec<(NodeId, NodeId)> {
    let before = get_components(g).len();
    g.edges()
        .into_iter()
        .filter(|(a, b, _)| {
            let mut cut = g.clone();
            cut.remove_edge(a, b).unwrap();
            get_components(&cut).len() > before
        })
        .map(|(a, b, _)| (a.clone(), b.clone()))
        .collect()
}

/// Minimum total weight over every acyclic edge subset of size
/// `V - components`, by exhaustive enumeration. Keep to graphs of ≤ 6 nodes.
pub(crate) fn brute_force_min_forest_weight(g: &RoadGraph) -> f64 {
    let index: HashMap<&NodeId, usize> = g.nodes().enumerate().map(|(i, id)| (id, i)).collect();
    let edges: Vec<(usize, usize, f64)> = g
        .edges()
        .into_iter()
        .map(|(a, b, attrs)| (index[a], index[b], attrs.weight(g.metric_mode())))
        .collect();
    let target = g.node_count() - petgraph_component_count(g);

    let mut best = f64::INFINITY;
    for mask in 0u32..(1 << edges.len()) {
        if mask.count_ones() as usize != target {
            continue;
        }
        let mut label: Vec<usize> = (0..g.node_count()).collect();
        let mut weight = 0.0;
        let mut acyclic = true;
        for (i, &(a, b, w)) in edges.iter().enumerate() {
            if mask & (1 << i) == 0 {
                continue;
            }
            let (la, lb) = (label[a], label[b]);
            if la == lb {
                acyclic = false;
                break;
            }
            for l in label.iter_mut() {
                if *l == lb {
                    *l = la;
                }
            }
            weight += w;
        }
        if acyclic && weight < best {
            best = weight;
        }
    }

    if best.is_infinite() {
        0.0
    } else {
        best
    }
}
