//! Weighted graph with reference-identity nodes and edges
//!
//! Nodes and edges are created on their own and then added to a
//! [`WeightedGraph`]. Both are cheap, reference-counted handles: cloning one
//! yields the same member, and two members holding equal data are still
//! distinct. This lets callers keep handles to the nodes they care about (a
//! search source and target, say) without the graph handing out indices.
//!
//! # Example
//!
//! ```rust
//! use rust_priority_forest::graph::{Direction, Edge, Node, WeightedGraph};
//!
//! let mut graph = WeightedGraph::new();
//! let a = graph.insert_node("a");
//! let b = graph.insert_node("b");
//! let ab = graph.insert_edge(&a, &b, 2.5).unwrap();
//!
//! assert_eq!(ab.direction(), Direction::Omnidirectional);
//! assert_eq!(graph.incident_edges(&b).unwrap().len(), 1);
//!
//! // Equal data, different node
//! let other_a = Node::new("a");
//! assert!(graph.add_edge(Edge::new(&other_a, &b, 1.0)).is_err());
//! ```

use crate::error::{Error, MemberKind, Result};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Edge payloads that carry a traversal weight
pub trait Weighted {
    /// Cost of traversing the edge; path search requires it to be `> 0`
    fn weight(&self) -> f64;
}

impl Weighted for f64 {
    fn weight(&self) -> f64 {
        *self
    }
}

impl Weighted for f32 {
    fn weight(&self) -> f64 {
        f64::from(*self)
    }
}

impl Weighted for u32 {
    fn weight(&self) -> f64 {
        f64::from(*self)
    }
}

/// Which way an edge may be traversed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Both ways
    #[default]
    Omnidirectional,
    FirstToSecond,
    SecondToFirst,
}

/// A graph node; identity is the allocation, not the data
pub struct Node<N>(Rc<N>);

impl<N> Node<N> {
    pub fn new(data: N) -> Self {
        Node(Rc::new(data))
    }

    pub fn data(&self) -> &N {
        &self.0
    }

    /// Returns true if both handles refer to the same node
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<N> Clone for Node<N> {
    fn clone(&self) -> Self {
        Node(Rc::clone(&self.0))
    }
}

impl<N> PartialEq for Node<N> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<N> Eq for Node<N> {}

impl<N> Hash for Node<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl<N: fmt::Debug> fmt::Debug for Node<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Node").field(&*self.0).finish()
    }
}

struct EdgeInner<N, E> {
    data: E,
    first: Node<N>,
    second: Node<N>,
    direction: Direction,
}

/// A graph edge between two nodes; identity is the allocation, not the data
pub struct Edge<N, E>(Rc<EdgeInner<N, E>>);

impl<N, E> Edge<N, E> {
    /// Creates an edge that can be traversed both ways
    pub fn new(first: &Node<N>, second: &Node<N>, data: E) -> Self {
        Self::with_direction(first, second, Direction::Omnidirectional, data)
    }

    /// Creates an edge that can only be traversed from `first` to `second`
    pub fn directed(first: &Node<N>, second: &Node<N>, data: E) -> Self {
        Self::with_direction(first, second, Direction::FirstToSecond, data)
    }

    pub fn with_direction(
        first: &Node<N>,
        second: &Node<N>,
        direction: Direction,
        data: E,
    ) -> Self {
        Edge(Rc::new(EdgeInner {
            data,
            first: first.clone(),
            second: second.clone(),
            direction,
        }))
    }

    pub fn data(&self) -> &E {
        &self.0.data
    }

    pub fn first(&self) -> &Node<N> {
        &self.0.first
    }

    pub fn second(&self) -> &Node<N> {
        &self.0.second
    }

    pub fn direction(&self) -> Direction {
        self.0.direction
    }

    /// Returns true if `node` is one of the endpoints
    pub fn touches(&self, node: &Node<N>) -> bool {
        self.0.first == *node || self.0.second == *node
    }

    /// Returns the endpoint across from `node`, or `None` if `node` is not an endpoint
    ///
    /// For a self-loop the opposite endpoint is the node itself.
    pub fn opposite(&self, node: &Node<N>) -> Option<&Node<N>> {
        if self.0.first == *node {
            Some(&self.0.second)
        } else if self.0.second == *node {
            Some(&self.0.first)
        } else {
            None
        }
    }

    /// Returns true if the direction tag allows leaving `node` along this edge
    pub fn leaves(&self, node: &Node<N>) -> bool {
        match self.0.direction {
            Direction::Omnidirectional => self.touches(node),
            Direction::FirstToSecond => self.0.first == *node,
            Direction::SecondToFirst => self.0.second == *node,
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<N, E: Weighted> Edge<N, E> {
    pub fn weight(&self) -> f64 {
        self.0.data.weight()
    }
}

impl<N, E> Clone for Edge<N, E> {
    fn clone(&self) -> Self {
        Edge(Rc::clone(&self.0))
    }
}

impl<N, E> PartialEq for Edge<N, E> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<N, E> Eq for Edge<N, E> {}

impl<N, E> Hash for Edge<N, E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl<N: fmt::Debug, E: fmt::Debug> fmt::Debug for Edge<N, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("first", &self.0.first)
            .field("second", &self.0.second)
            .field("direction", &self.0.direction)
            .field("data", &self.0.data)
            .finish()
    }
}

/// A set of nodes and the weighted edges between them
///
/// Nodes and edges are kept in insertion order. Incidence lists are kept per
/// node so that [`incident_edges`](Self::incident_edges) is a slice lookup.
pub struct WeightedGraph<N, E> {
    nodes: Vec<Node<N>>,
    edges: Vec<Edge<N, E>>,
    incidence: FxHashMap<Node<N>, SmallVec<[Edge<N, E>; 4]>>,
}

impl<N, E> Default for WeightedGraph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: fmt::Debug, E: fmt::Debug> fmt::Debug for WeightedGraph<N, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedGraph")
            .field("nodes", &self.nodes)
            .field("edges", &self.edges)
            .finish()
    }
}

impl<N, E> WeightedGraph<N, E> {
    pub fn new() -> Self {
        WeightedGraph {
            nodes: Vec::new(),
            edges: Vec::new(),
            incidence: FxHashMap::default(),
        }
    }

    pub fn nodes(&self) -> &[Node<N>] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge<N, E>] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_node(&self, node: &Node<N>) -> bool {
        self.incidence.contains_key(node)
    }

    pub fn contains_edge(&self, edge: &Edge<N, E>) -> bool {
        self.incidence
            .get(edge.first())
            .is_some_and(|edges| edges.contains(edge))
    }

    /// Adds a node
    ///
    /// # Errors
    /// [`Error::DuplicateMember`] if this node object is already in the graph
    pub fn add_node(&mut self, node: Node<N>) -> Result<()> {
        if self.contains_node(&node) {
            return Err(Error::DuplicateMember(MemberKind::Node));
        }
        self.push_node(node);
        Ok(())
    }

    /// Creates a node holding `data` and adds it
    pub fn insert_node(&mut self, data: N) -> Node<N> {
        let node = Node::new(data);
        self.push_node(node.clone());
        node
    }

    fn push_node(&mut self, node: Node<N>) {
        self.incidence.insert(node.clone(), SmallVec::new());
        self.nodes.push(node);
        tracing::trace!(nodes = self.nodes.len(), "node added");
    }

    /// Adds an edge between two member nodes
    ///
    /// # Errors
    /// - [`Error::MissingEndpoint`] if either endpoint has not been added
    /// - [`Error::DuplicateMember`] if this edge object is already in the graph
    pub fn add_edge(&mut self, edge: Edge<N, E>) -> Result<()> {
        if !self.contains_node(edge.first()) || !self.contains_node(edge.second()) {
            return Err(Error::MissingEndpoint);
        }
        if self.contains_edge(&edge) {
            return Err(Error::DuplicateMember(MemberKind::Edge));
        }

        if let Some(edges) = self.incidence.get_mut(edge.first()) {
            edges.push(edge.clone());
        }
        if edge.first() != edge.second() {
            if let Some(edges) = self.incidence.get_mut(edge.second()) {
                edges.push(edge.clone());
            }
        }
        self.edges.push(edge);
        tracing::trace!(edges = self.edges.len(), "edge added");
        Ok(())
    }

    /// Creates an omnidirectional edge carrying `data` and adds it
    ///
    /// # Errors
    /// [`Error::MissingEndpoint`] if either endpoint has not been added
    pub fn insert_edge(&mut self, first: &Node<N>, second: &Node<N>, data: E) -> Result<Edge<N, E>> {
        let edge = Edge::new(first, second, data);
        self.add_edge(edge.clone())?;
        Ok(edge)
    }

    /// Removes a node together with every edge touching it
    ///
    /// # Errors
    /// [`Error::UnknownMember`] if the node is not in the graph
    pub fn remove_node(&mut self, node: &Node<N>) -> Result<()> {
        let incident = self
            .incidence
            .remove(node)
            .ok_or(Error::UnknownMember(MemberKind::Node))?;

        for edge in &incident {
            if let Some(other) = edge.opposite(node) {
                if let Some(edges) = self.incidence.get_mut(other) {
                    edges.retain(|e| e != edge);
                }
            }
        }
        self.edges.retain(|e| !e.touches(node));
        self.nodes.retain(|n| n != node);

        tracing::trace!(removed_edges = incident.len(), "node removed");
        Ok(())
    }

    /// Removes a single edge
    ///
    /// # Errors
    /// [`Error::UnknownMember`] if the edge is not in the graph
    pub fn remove_edge(&mut self, edge: &Edge<N, E>) -> Result<()> {
        if !self.contains_edge(edge) {
            return Err(Error::UnknownMember(MemberKind::Edge));
        }

        for endpoint in [edge.first(), edge.second()] {
            if let Some(edges) = self.incidence.get_mut(endpoint) {
                edges.retain(|e| e != edge);
            }
        }
        self.edges.retain(|e| e != edge);

        tracing::trace!(edges = self.edges.len(), "edge removed");
        Ok(())
    }

    /// Returns every edge with `node` as an endpoint, whatever its direction tag
    ///
    /// # Errors
    /// [`Error::UnknownMember`] if the node is not in the graph
    pub fn incident_edges(&self, node: &Node<N>) -> Result<&[Edge<N, E>]> {
        self.incidence
            .get(node)
            .map(|edges| edges.as_slice())
            .ok_or(Error::UnknownMember(MemberKind::Node))
    }

    /// Returns the incident edges whose direction tag allows leaving `node`
    ///
    /// # Errors
    /// [`Error::UnknownMember`] if the node is not in the graph
    pub fn outgoing_edges<'a>(
        &'a self,
        node: &'a Node<N>,
    ) -> Result<impl Iterator<Item = &'a Edge<N, E>> + 'a> {
        Ok(self
            .incident_edges(node)?
            .iter()
            .filter(move |edge| edge.leaves(node)))
    }
}

impl<N, E: Weighted> WeightedGraph<N, E> {
    /// Checks that every edge weight is strictly positive
    ///
    /// # Errors
    /// [`Error::InvalidEdgeWeight`] for the first edge whose weight is zero,
    /// negative or NaN
    pub fn validate_weights(&self) -> Result<()> {
        match self.edges.iter().map(Edge::weight).find(|w| w.is_nan() || *w <= 0.0) {
            Some(weight) => Err(Error::InvalidEdgeWeight { weight }),
            None => Ok(()),
        }
    }
}
