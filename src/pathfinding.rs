//! Dijkstra's shortest path over a [`WeightedGraph`], driven by a [`PriorityForest`]
//!
//! # Design
//!
//! Every graph node gets one forest entry up front, keyed by its tentative
//! distance (`+∞` except for the source). Only lightweight node indices are
//! stored in the forest; per-run bookkeeping (distances, predecessors,
//! handles) lives in vectors owned by the run, and an `FxHashMap` maps node
//! identity to index. Nothing is written into the graph, so one graph can
//! serve any number of searches.
//!
//! Relaxation uses a strict `<`: among equal-cost routes the first one found
//! keeps its predecessor.
//!
//! # Example
//!
//! ```rust
//! use rust_priority_forest::graph::WeightedGraph;
//! use rust_priority_forest::pathfinding::ShortestPathAlgorithm;
//!
//! let mut graph = WeightedGraph::new();
//! let a = graph.insert_node('a');
//! let b = graph.insert_node('b');
//! let c = graph.insert_node('c');
//! graph.insert_edge(&a, &b, 1.0).unwrap();
//! graph.insert_edge(&b, &c, 1.0).unwrap();
//! graph.insert_edge(&a, &c, 5.0).unwrap();
//!
//! let path = ShortestPathAlgorithm::new().execute(&graph, &a, &c).unwrap();
//! assert_eq!(path.distance, 2.0);
//! let ids: Vec<char> = path.nodes.iter().map(|n| *n.data()).collect();
//! assert_eq!(ids, vec!['a', 'b', 'c']);
//! ```

use crate::error::{Error, MemberKind, Result};
use crate::fibonacci::{EntryHandle, PriorityForest};
use crate::graph::{Edge, Node, Weighted, WeightedGraph};
use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;

/// Forest key used for tentative distances
pub type Distance = OrderedFloat<f64>;

/// Internal index of a node within one run.
type NodeIndex = usize;

/// How edge direction tags are treated during a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Traversal {
    /// Every incident edge is followed both ways; direction tags are ignored
    #[default]
    Undirected,
    /// Edges are only followed the way their direction tag allows
    Directed,
}

/// A minimum-weight path, source and target inclusive
#[derive(Debug, Clone)]
pub struct ShortestPath<N> {
    /// Nodes from source to target
    pub nodes: Vec<Node<N>>,
    /// Sum of the edge weights along the path
    pub distance: f64,
}

impl<N> ShortestPath<N> {
    /// Number of edges on the path
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

/// Distances and predecessors produced by one search from a single source
///
/// Only settled nodes (those whose distance is final) answer queries.
pub struct ShortestPathTree<N> {
    nodes: Vec<Node<N>>,
    index: FxHashMap<Node<N>, NodeIndex>,
    source: NodeIndex,
    distance: Vec<f64>,
    predecessor: Vec<Option<NodeIndex>>,
    settled: Vec<bool>,
}

impl<N> ShortestPathTree<N> {
    pub fn source(&self) -> &Node<N> {
        &self.nodes[self.source]
    }

    /// Final distance from the source, or `None` if `node` was not reached
    pub fn distance_to(&self, node: &Node<N>) -> Option<f64> {
        let &i = self.index.get(node)?;
        self.settled[i].then_some(self.distance[i])
    }

    /// Settled nodes with their distances, in graph order
    pub fn settled(&self) -> impl Iterator<Item = (&Node<N>, f64)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|&(i, _)| self.settled[i])
            .map(|(i, node)| (node, self.distance[i]))
    }

    /// Rebuilds the path from the source to `node`
    ///
    /// # Errors
    /// - [`Error::UnknownMember`] if `node` was not part of the searched graph
    /// - [`Error::Unreachable`] if `node` was not reached
    pub fn path_to(&self, node: &Node<N>) -> Result<ShortestPath<N>> {
        let &target = self
            .index
            .get(node)
            .ok_or(Error::UnknownMember(MemberKind::Node))?;
        if !self.settled[target] {
            return Err(Error::Unreachable);
        }

        let mut path = vec![self.nodes[target].clone()];
        let mut current = target;
        while current != self.source {
            let previous = self.predecessor[current].ok_or(Error::Unreachable)?;
            path.push(self.nodes[previous].clone());
            current = previous;
        }
        path.reverse();

        Ok(ShortestPath {
            nodes: path,
            distance: self.distance[target],
        })
    }
}

/// Single-source shortest path search
///
/// The value only holds configuration; each call runs independently.
///
/// # Example
///
/// ```rust
/// use rust_priority_forest::graph::{Edge, WeightedGraph};
/// use rust_priority_forest::pathfinding::{ShortestPathAlgorithm, Traversal};
/// use rust_priority_forest::Error;
///
/// let mut graph = WeightedGraph::new();
/// let a = graph.insert_node("a");
/// let b = graph.insert_node("b");
/// graph.add_edge(Edge::directed(&b, &a, 1.0)).unwrap();
///
/// // Direction tags are ignored by default
/// assert!(ShortestPathAlgorithm::new().execute(&graph, &a, &b).is_ok());
///
/// let directed = ShortestPathAlgorithm::new().traversal(Traversal::Directed);
/// assert_eq!(directed.execute(&graph, &a, &b).unwrap_err(), Error::Unreachable);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortestPathAlgorithm {
    traversal: Traversal,
    max_distance: Option<f64>,
}

impl ShortestPathAlgorithm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how direction tags are treated
    pub fn traversal(mut self, traversal: Traversal) -> Self {
        self.traversal = traversal;
        self
    }

    /// Treats nodes farther than `max_distance` from the source as unreachable
    pub fn max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = Some(max_distance);
        self
    }

    /// Finds a minimum-weight path from `source` to `target`
    ///
    /// The search stops as soon as `target` is settled.
    ///
    /// # Errors
    /// - [`Error::MissingArgument`] if `source` or `target` is not in the graph
    /// - [`Error::InvalidEdgeWeight`] if any edge weight is not strictly positive;
    ///   checked before the search starts
    /// - [`Error::Unreachable`] if no path exists (or none within `max_distance`)
    pub fn execute<N, E: Weighted>(
        &self,
        graph: &WeightedGraph<N, E>,
        source: &Node<N>,
        target: &Node<N>,
    ) -> Result<ShortestPath<N>> {
        if !graph.contains_node(source) {
            return Err(Error::MissingArgument("source"));
        }
        if !graph.contains_node(target) {
            return Err(Error::MissingArgument("target"));
        }
        graph.validate_weights()?;

        self.run(graph, source, Some(target))?.path_to(target)
    }

    /// Computes shortest distances from `source` to every reachable node
    ///
    /// # Errors
    /// - [`Error::MissingArgument`] if `source` is not in the graph
    /// - [`Error::InvalidEdgeWeight`] if any edge weight is not strictly positive
    pub fn distances_from<N, E: Weighted>(
        &self,
        graph: &WeightedGraph<N, E>,
        source: &Node<N>,
    ) -> Result<ShortestPathTree<N>> {
        if !graph.contains_node(source) {
            return Err(Error::MissingArgument("source"));
        }
        graph.validate_weights()?;

        self.run(graph, source, None)
    }

    fn run<N, E: Weighted>(
        &self,
        graph: &WeightedGraph<N, E>,
        source: &Node<N>,
        target: Option<&Node<N>>,
    ) -> Result<ShortestPathTree<N>> {
        let nodes: Vec<Node<N>> = graph.nodes().to_vec();
        let index: FxHashMap<Node<N>, NodeIndex> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.clone(), i))
            .collect();
        let source_index = index[source];
        let target_index = target.map(|t| index[t]);

        tracing::debug!(
            nodes = nodes.len(),
            edges = graph.edge_count(),
            early_exit = target_index.is_some(),
            "shortest path search started"
        );

        let mut forest: PriorityForest<NodeIndex, Distance> =
            PriorityForest::with_capacity(nodes.len());
        let mut distance = vec![f64::INFINITY; nodes.len()];
        distance[source_index] = 0.0;
        let mut predecessor: Vec<Option<NodeIndex>> = vec![None; nodes.len()];
        let mut settled = vec![false; nodes.len()];
        let mut handles: Vec<Option<EntryHandle>> = (0..nodes.len())
            .map(|i| Some(forest.insert(i, OrderedFloat(distance[i]))))
            .collect();

        while let Some((OrderedFloat(current_distance), current)) = forest.extract_min() {
            handles[current] = None;

            // Everything left is unreachable, or out of range.
            if current_distance.is_infinite()
                || self.max_distance.is_some_and(|max| current_distance > max)
            {
                break;
            }
            settled[current] = true;

            if Some(current) == target_index {
                break;
            }

            let current_node = &nodes[current];
            let mut relax = |edge: &Edge<N, E>| -> Result<()> {
                let Some(neighbor) = edge.opposite(current_node) else {
                    return Ok(());
                };
                let neighbor_index = index[neighbor];
                let Some(handle) = handles[neighbor_index] else {
                    return Ok(());
                };

                let candidate = current_distance + edge.weight();
                if candidate < distance[neighbor_index] {
                    distance[neighbor_index] = candidate;
                    predecessor[neighbor_index] = Some(current);
                    forest.decrease_key(handle, OrderedFloat(candidate))?;
                }
                Ok(())
            };

            match self.traversal {
                Traversal::Undirected => graph
                    .incident_edges(current_node)?
                    .iter()
                    .try_for_each(&mut relax)?,
                Traversal::Directed => graph
                    .outgoing_edges(current_node)?
                    .try_for_each(&mut relax)?,
            }
        }

        tracing::debug!(
            settled = settled.iter().filter(|&&s| s).count(),
            remaining = forest.len(),
            "shortest path search finished"
        );

        Ok(ShortestPathTree {
            nodes,
            index,
            source: source_index,
            distance,
            predecessor,
            settled,
        })
    }
}
