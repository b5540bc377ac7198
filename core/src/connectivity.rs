//! Reachability and structure: connectivity, components, cycles, dead ends,
//! articulation points and bridges.
//!
//! All depth-first walks use an explicit stack, so chains of any length are
//! safe. Roots are taken in sorted node order and neighbors in insertion
//! order, which makes every result reproducible.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use tracing::trace;

use crate::graph::{NodeId, RoadGraph};

/// Every node reachable from `start`, by iterative depth-first search.
fn reachable_from<'a>(
    graph: &'a RoadGraph,
    start: &'a str,
    visited: &mut HashSet<&'a str>,
) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut stack = vec![start];
    visited.insert(start);

    while let Some(node) = stack.pop() {
        found.push(node);
        for next in graph.neighbors(node) {
            if visited.insert(next.as_str()) {
                stack.push(next.as_str());
            }
        }
    }

    found
}

/// True when every node is reachable from any other. An empty graph counts
/// as connected.
pub fn is_connected(graph: &RoadGraph) -> bool {
    let Some(first) = graph.nodes().next() else {
        return true;
    };
    let mut visited = HashSet::with_capacity(graph.node_count());
    reachable_from(graph, first, &mut visited).len() == graph.node_count()
}

/// Fewest-hop path from `start` to `end` by BFS, ignoring weights.
///
/// Returns None if no path exists or either node is not in the graph.
/// Stores parent pointers and rebuilds the path once `end` is discovered.
pub fn find_path(graph: &RoadGraph, start: &str, end: &str) -> Option<Vec<NodeId>> {
    let start = graph.node_key(start)?;
    let end = graph.node_key(end)?;

    if start == end {
        return Some(vec![start.clone()]);
    }

    let mut parent: HashMap<&str, &str> = HashMap::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    parent.insert(start, start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for next in graph.neighbors(current) {
            let next = next.as_str();
            if parent.contains_key(next) {
                continue;
            }
            parent.insert(next, current);

            if next == end.as_str() {
                let mut path = vec![end.clone()];
                let mut node = next;
                while node != start.as_str() {
                    node = parent[node];
                    path.push(node.to_string());
                }
                path.reverse();
                return Some(path);
            }

            queue.push_back(next);
        }
    }

    None
}

/// True if any component contains a cycle.
///
/// A DFS edge to an already-visited node other than the current node's DFS
/// parent closes a cycle. Sound because the graph has no self-loops or
/// parallel edges.
pub fn has_cycle(graph: &RoadGraph) -> bool {
    let mut visited: HashSet<&str> = HashSet::with_capacity(graph.node_count());
    // (node, dfs parent, index of the next neighbor to examine)
    let mut stack: Vec<(&str, Option<&str>, usize)> = Vec::new();

    for root in graph.nodes() {
        if !visited.insert(root.as_str()) {
            continue;
        }
        stack.push((root.as_str(), None, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, parent) = (frame.0, frame.1);
            let Some(next) = graph.neighbors(node).get(frame.2) else {
                stack.pop();
                continue;
            };
            frame.2 += 1;

            let next = next.as_str();
            if Some(next) == parent {
                continue;
            }
            if !visited.insert(next) {
                trace!(node, next, "cycle found");
                return true;
            }
            stack.push((next, Some(node), 0));
        }
    }

    false
}

/// Connected components, each as a node set.
///
/// Components are discovered from roots in sorted node order, so the first
/// component contains the smallest identifier, and so on.
pub fn get_components(graph: &RoadGraph) -> Vec<BTreeSet<NodeId>> {
    let mut visited: HashSet<&str> = HashSet::with_capacity(graph.node_count());
    let mut components: Vec<BTreeSet<NodeId>> = Vec::new();

    for root in graph.nodes() {
        if visited.contains(root.as_str()) {
            continue;
        }
        let members = reachable_from(graph, root, &mut visited);
        components.push(members.into_iter().map(str::to_string).collect());
    }

    trace!(components = components.len(), "components extracted");
    components
}

/// Nodes with exactly one road, sorted.
pub fn find_dead_ends(graph: &RoadGraph) -> Vec<NodeId> {
    graph
        .nodes()
        .filter(|id| graph.degree(id) == 1)
        .cloned()
        .collect()
}

/// Articulation points and bridges from one low-link pass.
#[derive(Debug, Default)]
struct LowLink {
    articulation_points: BTreeSet<NodeId>,
    bridges: BTreeSet<(NodeId, NodeId)>,
}

fn ordered(a: &str, b: &str) -> (NodeId, NodeId) {
    if a < b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Tarjan-style DFS computing discovery times and low links in O(V + E).
///
/// A non-root node `u` is an articulation point if some DFS child `v` has
/// `low[v] >= disc[u]`; a root is one if it has two or more DFS children.
/// The tree edge `u`–`v` is a bridge if `low[v] > disc[u]`.
fn low_link(graph: &RoadGraph) -> LowLink {
    let mut result = LowLink::default();
    let mut disc: HashMap<&str, usize> = HashMap::with_capacity(graph.node_count());
    let mut low: HashMap<&str, usize> = HashMap::with_capacity(graph.node_count());
    let mut time = 0usize;
    // (node, dfs parent, index of the next neighbor to examine)
    let mut stack: Vec<(&str, Option<&str>, usize)> = Vec::new();

    for root in graph.nodes() {
        let root = root.as_str();
        if disc.contains_key(root) {
            continue;
        }
        disc.insert(root, time);
        low.insert(root, time);
        time += 1;
        let mut root_children = 0usize;
        stack.push((root, None, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, parent) = (frame.0, frame.1);

            if let Some(next) = graph.neighbors(node).get(frame.2) {
                frame.2 += 1;
                let next = next.as_str();
                if Some(next) == parent {
                    continue;
                }
                if let Some(&seen) = disc.get(next) {
                    // Back edge
                    let l = low[node].min(seen);
                    low.insert(node, l);
                } else {
                    disc.insert(next, time);
                    low.insert(next, time);
                    time += 1;
                    stack.push((next, Some(node), 0));
                }
                continue;
            }

            // All neighbors of `node` done: fold its low link into the parent
            stack.pop();
            let Some(parent) = parent else {
                continue;
            };
            let node_low = low[node];
            let l = low[parent].min(node_low);
            low.insert(parent, l);

            if node_low > disc[parent] {
                result.bridges.insert(ordered(parent, node));
            }
            if parent == root {
                root_children += 1;
            } else if node_low >= disc[parent] {
                result.articulation_points.insert(parent.to_string());
            }
        }

        if root_children >= 2 {
            result.articulation_points.insert(root.to_string());
        }
    }

    trace!(
        articulation_points = result.articulation_points.len(),
        bridges = result.bridges.len(),
        "low-link pass finished"
    );
    result
}

/// Nodes whose removal increases the number of components, sorted.
pub fn find_articulation_points(graph: &RoadGraph) -> Vec<NodeId> {
    low_link(graph).articulation_points.into_iter().collect()
}

/// Edges whose removal increases the number of components, as `(a, b)` with
/// `a < b`, sorted.
pub fn find_bridges(graph: &RoadGraph) -> Vec<(NodeId, NodeId)> {
    low_link(graph).bridges.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{
        arb_graph, brute_force_articulation_points, brute_force_bridges, graph_with_nodes,
        make_barbell, make_chain, make_cycle, make_star, petgraph_component_count, road,
        two_triangles,
    };
    use proptest::prelude::*;

    fn pair(a: &str, b: &str) -> (NodeId, NodeId) {
        (a.to_string(), b.to_string())
    }

    // --- connectivity ---

    #[test]
    fn test_connected_empty_and_single() {
        assert!(is_connected(&RoadGraph::new()));
        assert!(is_connected(&graph_with_nodes(&["A"])));
    }

    #[test]
    fn test_connected_cycle() {
        assert!(is_connected(&make_cycle(4)));
    }

    #[test]
    fn test_disconnected_two_triangles() {
        let g = two_triangles();
        assert!(!is_connected(&g));
        assert_eq!(get_components(&g).len(), 2);
    }

    #[test]
    fn test_isolated_node_disconnects() {
        let mut g = make_chain(3);
        g.add_node("zz").unwrap();
        assert!(!is_connected(&g));
    }

    // --- find_path ---

    #[test]
    fn test_find_path_fewest_hops_not_lowest_weight() {
        let mut g = graph_with_nodes(&["A", "B", "C"]);
        road(&mut g, "A", "B", 1.0, 30.0);
        road(&mut g, "B", "C", 1.0, 30.0);
        road(&mut g, "A", "C", 100.0, 30.0);
        assert_eq!(find_path(&g, "A", "C").unwrap(), vec!["A", "C"]);
    }

    #[test]
    fn test_find_path_chain() {
        let g = make_chain(5);
        assert_eq!(
            find_path(&g, "n4", "n0").unwrap(),
            vec!["n4", "n3", "n2", "n1", "n0"]
        );
    }

    #[test]
    fn test_find_path_self_and_missing() {
        let g = two_triangles();
        assert_eq!(find_path(&g, "a1", "a1").unwrap(), vec!["a1"]);
        assert!(find_path(&g, "a1", "b1").is_none());
        assert!(find_path(&g, "a1", "nope").is_none());
        assert!(find_path(&g, "nope", "a1").is_none());
    }

    // --- cycles ---

    #[test]
    fn test_has_cycle() {
        assert!(!has_cycle(&RoadGraph::new()));
        assert!(!has_cycle(&make_chain(5)));
        assert!(!has_cycle(&make_star(6)));
        assert!(has_cycle(&make_cycle(3)));
        assert!(has_cycle(&two_triangles()));
    }

    #[test]
    fn test_has_cycle_in_second_component() {
        let mut g = make_chain(4);
        for id in ["x", "y", "z"] {
            g.add_node(id).unwrap();
        }
        road(&mut g, "x", "y", 1.0, 30.0);
        road(&mut g, "y", "z", 1.0, 30.0);
        assert!(!has_cycle(&g));
        road(&mut g, "z", "x", 1.0, 30.0);
        assert!(has_cycle(&g));
    }

    // --- components ---

    #[test]
    fn test_components_sorted_discovery() {
        let mut g = graph_with_nodes(&["d", "c", "b", "a"]);
        road(&mut g, "d", "a", 1.0, 30.0);
        road(&mut g, "c", "b", 1.0, 30.0);
        let components = get_components(&g);
        let expected: Vec<BTreeSet<NodeId>> = vec![
            ["a", "d"].iter().map(|s| s.to_string()).collect(),
            ["b", "c"].iter().map(|s| s.to_string()).collect(),
        ];
        assert_eq!(components, expected);
    }

    #[test]
    fn test_components_empty() {
        assert!(get_components(&RoadGraph::new()).is_empty());
    }

    // --- dead ends ---

    #[test]
    fn test_dead_ends() {
        assert_eq!(find_dead_ends(&make_chain(4)), vec!["n0", "n3"]);
        assert!(find_dead_ends(&make_cycle(4)).is_empty());
        assert_eq!(find_dead_ends(&make_star(3)).len(), 3);
    }

    // --- articulation points and bridges ---

    #[test]
    fn test_articulation_points_chain() {
        assert_eq!(find_articulation_points(&make_chain(4)), vec!["n1", "n2"]);
        assert!(find_articulation_points(&make_chain(2)).is_empty());
    }

    #[test]
    fn test_articulation_points_star_center() {
        assert_eq!(find_articulation_points(&make_star(4)), vec!["hub"]);
    }

    #[test]
    fn test_no_articulation_points_or_bridges_in_cycle() {
        let g = make_cycle(5);
        assert!(find_articulation_points(&g).is_empty());
        assert!(find_bridges(&g).is_empty());
    }

    #[test]
    fn test_barbell() {
        let g = make_barbell();
        assert_eq!(find_bridges(&g), vec![pair("a1", "b1")]);
        assert_eq!(find_articulation_points(&g), vec!["a1", "b1"]);
    }

    #[test]
    fn test_bridges_chain_canonical_order() {
        let g = make_chain(4);
        assert_eq!(
            find_bridges(&g),
            vec![pair("n0", "n1"), pair("n1", "n2"), pair("n2", "n3")]
        );
    }

    #[test]
    fn test_low_link_matches_brute_force_on_fixtures() {
        for g in [
            make_chain(6),
            make_cycle(6),
            make_star(5),
            make_barbell(),
            two_triangles(),
        ] {
            assert_eq!(find_articulation_points(&g), brute_force_articulation_points(&g));
            assert_eq!(find_bridges(&g), brute_force_bridges(&g));
        }
    }

    #[test]
    fn test_long_chain_no_stack_overflow() {
        let g = make_chain(50_000);
        assert!(is_connected(&g));
        assert!(!has_cycle(&g));
        assert_eq!(get_components(&g).len(), 1);
        assert_eq!(find_articulation_points(&g).len(), 49_998);
        assert_eq!(find_bridges(&g).len(), 49_999);
    }

    proptest! {
        #[test]
        fn prop_connected_iff_single_component(g in arb_graph(10)) {
            let components = get_components(&g);
            prop_assert_eq!(is_connected(&g), components.len() <= 1);
            if !g.is_empty() {
                prop_assert_eq!(is_connected(&g), components.len() == 1);
            }
        }

        #[test]
        fn prop_components_partition_nodes(g in arb_graph(10)) {
            let components = get_components(&g);
            let total: usize = components.iter().map(|c| c.len()).sum();
            prop_assert_eq!(total, g.node_count());
            prop_assert_eq!(components.len(), petgraph_component_count(&g));
        }

        #[test]
        fn prop_cycle_iff_excess_edges(g in arb_graph(10)) {
            let components = get_components(&g).len();
            prop_assert_eq!(has_cycle(&g), g.edge_count() > g.node_count() - components);
        }

        #[test]
        fn prop_low_link_matches_brute_force(g in arb_graph(9)) {
            prop_assert_eq!(find_articulation_points(&g), brute_force_articulation_points(&g));
            prop_assert_eq!(find_bridges(&g), brute_force_bridges(&g));
        }

        #[test]
        fn prop_bridge_removal_splits_exactly_once(g in arb_graph(9)) {
            let before = get_components(&g).len();
            let bridges: BTreeSet<(NodeId, NodeId)> = find_bridges(&g).into_iter().collect();
            for (a, b, _) in g.edges() {
                let mut cut = g.clone();
                cut.remove_edge(a, b).unwrap();
                let after = get_components(&cut).len();
                if bridges.contains(&(a.clone(), b.clone())) {
                    prop_assert_eq!(after, before + 1);
                } else {
                    prop_assert_eq!(after, before);
                }
            }
        }

        #[test]
        fn prop_find_path_is_valid_walk(g in arb_graph(8)) {
            let nodes: Vec<NodeId> = g.nodes().cloned().collect();
            for a in &nodes {
                for b in &nodes {
                    match find_path(&g, a, b) {
                        Some(path) => {
                            prop_assert_eq!(path.first(), Some(a));
                            prop_assert_eq!(path.last(), Some(b));
                            for hop in path.windows(2) {
                                prop_assert!(g.has_edge(&hop[0], &hop[1]));
                            }
                        }
                        None => {
                            let same = get_components(&g)
                                .iter()
                                .any(|c| c.contains(a) && c.contains(b));
                            prop_assert!(!same);
                        }
                    }
                }
            }
        }
    }
}
