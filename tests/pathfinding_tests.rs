//! Tests for the shortest path search
//!
//! Tests cover:
//! - The reference six-node graph, checked against brute-force enumeration
//! - Precondition failures (unknown source/target, non-positive weights)
//! - Unreachable targets, directed traversal, distance bounds
//! - Reuse of one graph across searches
//! - Random graphs compared with Floyd-Warshall (proptest)

use proptest::prelude::*;
use rust_priority_forest::graph::{Direction, Edge, Node, WeightedGraph};
use rust_priority_forest::pathfinding::{ShortestPathAlgorithm, Traversal};
use rust_priority_forest::Error;

const REFERENCE_EDGES: [(u32, u32, f64); 9] = [
    (1, 2, 7.0),
    (1, 3, 9.0),
    (1, 6, 14.0),
    (2, 3, 10.0),
    (2, 4, 15.0),
    (3, 4, 11.0),
    (3, 6, 2.0),
    (4, 5, 6.0),
    (5, 6, 9.0),
];

/// Builds a graph with nodes `1..=count`; `nodes[i]` holds `i + 1`.
fn build(count: u32, edges: &[(u32, u32, f64)]) -> (WeightedGraph<u32, f64>, Vec<Node<u32>>) {
    let mut graph = WeightedGraph::new();
    let nodes: Vec<_> = (1..=count).map(|id| graph.insert_node(id)).collect();
    for &(a, b, w) in edges {
        graph
            .insert_edge(&nodes[a as usize - 1], &nodes[b as usize - 1], w)
            .unwrap();
    }
    (graph, nodes)
}

fn ids(nodes: &[Node<u32>]) -> Vec<u32> {
    nodes.iter().map(|n| *n.data()).collect()
}

/// Minimum weight over all simple paths, by exhaustive search
fn brute_force(edges: &[(u32, u32, f64)], from: u32, to: u32) -> Option<f64> {
    fn walk(edges: &[(u32, u32, f64)], at: u32, to: u32, seen: &mut Vec<u32>, cost: f64, best: &mut Option<f64>) {
        if at == to {
            if best.map_or(true, |b| cost < b) {
                *best = Some(cost);
            }
            return;
        }
        for &(a, b, w) in edges {
            let next = if a == at {
                b
            } else if b == at {
                a
            } else {
                continue;
            };
            if seen.contains(&next) {
                continue;
            }
            seen.push(next);
            walk(edges, next, to, seen, cost + w, best);
            seen.pop();
        }
    }

    let mut best = None;
    walk(edges, from, to, &mut vec![from], 0.0, &mut best);
    best
}

#[test]
fn test_reference_graph() {
    let (graph, nodes) = build(6, &REFERENCE_EDGES);
    let path = ShortestPathAlgorithm::new()
        .execute(&graph, &nodes[0], &nodes[4])
        .unwrap();

    assert_eq!(ids(&path.nodes), vec![1, 3, 6, 5]);
    assert_eq!(path.distance, 20.0);
    assert_eq!(brute_force(&REFERENCE_EDGES, 1, 5), Some(20.0));
}

#[test]
fn test_reference_graph_every_target_matches_brute_force() {
    let (graph, nodes) = build(6, &REFERENCE_EDGES);
    let algorithm = ShortestPathAlgorithm::new();

    for target in 1..=6u32 {
        let path = algorithm
            .execute(&graph, &nodes[0], &nodes[target as usize - 1])
            .unwrap();
        assert_eq!(Some(path.distance), brute_force(&REFERENCE_EDGES, 1, target));

        // The reported distance is the sum along the reported nodes.
        let along: f64 = path
            .nodes
            .windows(2)
            .map(|pair| {
                graph
                    .incident_edges(&pair[0])
                    .unwrap()
                    .iter()
                    .filter(|e| e.opposite(&pair[0]) == Some(&pair[1]))
                    .map(|e| e.weight())
                    .fold(f64::INFINITY, f64::min)
            })
            .sum();
        assert_eq!(along, path.distance);
    }
}

#[test]
fn test_graph_is_reusable_across_searches() {
    let (graph, nodes) = build(6, &REFERENCE_EDGES);
    let algorithm = ShortestPathAlgorithm::new();

    let first = algorithm.execute(&graph, &nodes[0], &nodes[4]).unwrap();
    let reverse = algorithm.execute(&graph, &nodes[4], &nodes[0]).unwrap();
    let again = algorithm.execute(&graph, &nodes[0], &nodes[4]).unwrap();

    assert_eq!(ids(&first.nodes), ids(&again.nodes));
    assert_eq!(ids(&reverse.nodes), vec![5, 6, 3, 1]);
    assert_eq!(reverse.distance, 20.0);
}

#[test]
fn test_non_positive_weight_is_rejected() {
    for bad in [0.0, -3.0] {
        let mut edges = REFERENCE_EDGES.to_vec();
        edges.push((2, 5, bad));
        let (graph, nodes) = build(6, &edges);

        assert_eq!(
            ShortestPathAlgorithm::new()
                .execute(&graph, &nodes[0], &nodes[4])
                .unwrap_err(),
            Error::InvalidEdgeWeight { weight: bad }
        );
        assert!(ShortestPathAlgorithm::new()
            .distances_from(&graph, &nodes[0])
            .is_err());
    }
}

#[test]
fn test_bad_weight_anywhere_is_rejected() {
    // The bad edge is in a component the search would never visit.
    let (mut graph, nodes) = build(2, &[(1, 2, 1.0)]);
    let x = graph.insert_node(10);
    let y = graph.insert_node(11);
    graph.insert_edge(&x, &y, 0.0).unwrap();

    assert!(matches!(
        ShortestPathAlgorithm::new().execute(&graph, &nodes[0], &nodes[1]),
        Err(Error::InvalidEdgeWeight { .. })
    ));
}

#[test]
fn test_source_and_target_must_be_members() {
    let (graph, nodes) = build(3, &[(1, 2, 1.0), (2, 3, 1.0)]);
    let outsider = Node::new(1);
    let algorithm = ShortestPathAlgorithm::new();

    assert_eq!(
        algorithm.execute(&graph, &outsider, &nodes[2]).unwrap_err(),
        Error::MissingArgument("source")
    );
    assert_eq!(
        algorithm.execute(&graph, &nodes[0], &outsider).unwrap_err(),
        Error::MissingArgument("target")
    );
}

#[test]
fn test_unreachable_target() {
    let (graph, nodes) = build(4, &[(1, 2, 1.0), (3, 4, 1.0)]);
    let algorithm = ShortestPathAlgorithm::new();

    assert_eq!(
        algorithm.execute(&graph, &nodes[0], &nodes[3]).unwrap_err(),
        Error::Unreachable
    );

    let tree = algorithm.distances_from(&graph, &nodes[0]).unwrap();
    assert_eq!(tree.distance_to(&nodes[1]), Some(1.0));
    assert_eq!(tree.distance_to(&nodes[2]), None);
    assert_eq!(tree.path_to(&nodes[3]).unwrap_err(), Error::Unreachable);
}

#[test]
fn test_isolated_single_node() {
    let mut graph: WeightedGraph<u32, f64> = WeightedGraph::new();
    let only = graph.insert_node(1);
    let path = ShortestPathAlgorithm::new()
        .execute(&graph, &only, &only)
        .unwrap();
    assert_eq!(path.nodes, vec![only]);
    assert_eq!(path.distance, 0.0);
}

#[test]
fn test_directed_traversal() {
    // 1 -> 2 -> 3 is one-way; 1 - 3 costs more but goes both ways.
    let mut graph = WeightedGraph::new();
    let n: Vec<_> = (1..=3u32).map(|id| graph.insert_node(id)).collect();
    graph.add_edge(Edge::directed(&n[0], &n[1], 1.0)).unwrap();
    graph
        .add_edge(Edge::with_direction(&n[2], &n[1], Direction::SecondToFirst, 1.0))
        .unwrap();
    graph.insert_edge(&n[0], &n[2], 10.0).unwrap();

    let directed = ShortestPathAlgorithm::new().traversal(Traversal::Directed);
    let forward = directed.execute(&graph, &n[0], &n[2]).unwrap();
    assert_eq!(ids(&forward.nodes), vec![1, 2, 3]);
    assert_eq!(forward.distance, 2.0);

    let backward = directed.execute(&graph, &n[2], &n[0]).unwrap();
    assert_eq!(ids(&backward.nodes), vec![3, 1]);
    assert_eq!(backward.distance, 10.0);

    // 2 cannot step back to 1 directly, only around through 3.
    let around = directed.execute(&graph, &n[1], &n[0]).unwrap();
    assert_eq!(ids(&around.nodes), vec![2, 3, 1]);
    assert_eq!(around.distance, 11.0);

    // The default ignores direction tags.
    let undirected = ShortestPathAlgorithm::new()
        .execute(&graph, &n[2], &n[0])
        .unwrap();
    assert_eq!(ids(&undirected.nodes), vec![3, 2, 1]);
}

#[test]
fn test_parallel_edges_use_cheapest() {
    let (graph, nodes) = build(2, &[(1, 2, 5.0), (1, 2, 2.0), (2, 1, 3.0)]);
    let path = ShortestPathAlgorithm::new()
        .execute(&graph, &nodes[0], &nodes[1])
        .unwrap();
    assert_eq!(path.distance, 2.0);
}

#[test]
fn test_distances_from_settles_everything_reachable() {
    let (graph, nodes) = build(6, &REFERENCE_EDGES);
    let tree = ShortestPathAlgorithm::new()
        .distances_from(&graph, &nodes[0])
        .unwrap();

    assert_eq!(tree.source(), &nodes[0]);
    let distances: Vec<(u32, f64)> = tree.settled().map(|(n, d)| (*n.data(), d)).collect();
    assert_eq!(
        distances,
        vec![(1, 0.0), (2, 7.0), (3, 9.0), (4, 20.0), (5, 20.0), (6, 11.0)]
    );
    assert_eq!(ids(&tree.path_to(&nodes[3]).unwrap().nodes), vec![1, 3, 4]);
}

#[test]
fn test_long_chain_with_shortcuts() {
    // A chain 1..=200 with unit edges and a costly shortcut every ten nodes.
    let mut edges: Vec<(u32, u32, f64)> = (1..200).map(|i| (i, i + 1, 1.0)).collect();
    edges.extend((1..=190).step_by(10).map(|i| (i, i + 10, 9.5)));
    let (graph, nodes) = build(200, &edges);

    let path = ShortestPathAlgorithm::new()
        .execute(&graph, &nodes[0], &nodes[199])
        .unwrap();
    // 19 shortcuts (1 -> 191) then 9 unit steps
    assert_eq!(path.distance, 19.0 * 9.5 + 9.0);
    assert_eq!(path.hops(), 28);
}

fn floyd_warshall(count: usize, edges: &[(u32, u32, f64)]) -> Vec<Vec<f64>> {
    let mut dist = vec![vec![f64::INFINITY; count]; count];
    for (i, row) in dist.iter_mut().enumerate() {
        row[i] = 0.0;
    }
    for &(a, b, w) in edges {
        let (a, b) = (a as usize - 1, b as usize - 1);
        dist[a][b] = dist[a][b].min(w);
        dist[b][a] = dist[b][a].min(w);
    }
    for k in 0..count {
        for i in 0..count {
            for j in 0..count {
                let through = dist[i][k] + dist[k][j];
                if through < dist[i][j] {
                    dist[i][j] = through;
                }
            }
        }
    }
    dist
}

fn graph_strategy() -> impl Strategy<Value = (u32, Vec<(u32, u32, f64)>)> {
    (1u32..12).prop_flat_map(|count| {
        let edge = (1..=count, 1..=count, 1u32..50).prop_map(|(a, b, w)| (a, b, f64::from(w)));
        (Just(count), prop::collection::vec(edge, 0..40))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_matches_floyd_warshall((count, edges) in graph_strategy()) {
        let (graph, nodes) = build(count, &edges);
        let expected = floyd_warshall(count as usize, &edges);
        let algorithm = ShortestPathAlgorithm::new();

        for (s, source) in nodes.iter().enumerate() {
            let tree = algorithm.distances_from(&graph, source).unwrap();
            for (t, target) in nodes.iter().enumerate() {
                let want = expected[s][t];
                match tree.distance_to(target) {
                    Some(got) => prop_assert_eq!(got, want),
                    None => prop_assert!(want.is_infinite()),
                }
            }

            let target = &nodes[nodes.len() - 1];
            match algorithm.execute(&graph, source, target) {
                Ok(path) => {
                    prop_assert_eq!(path.distance, expected[s][nodes.len() - 1]);
                    prop_assert_eq!(path.nodes.first(), Some(source));
                    prop_assert_eq!(path.nodes.last(), Some(target));
                }
                Err(err) => {
                    prop_assert_eq!(err, Error::Unreachable);
                    prop_assert!(expected[s][nodes.len() - 1].is_infinite());
                }
            }
        }
    }
}
