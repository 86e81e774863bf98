//! Priority forest and shortest paths for Rust
//!
//! This crate provides a Fibonacci heap (the [`PriorityForest`]) with
//! handle-based `decrease_key` and `delete`, a small weighted graph with
//! reference-identity members, and Dijkstra's single-source shortest path
//! algorithm built on top of both.
//!
//! # Features
//!
//! - **Priority forest**: O(1) amortized insert and decrease_key; O(log n) amortized
//!   extract_min and delete; merge with handle translation. Entries live in an arena and are
//!   addressed by handles tied to the forest that issued them.
//! - **Weighted graph**: nodes and edges with identity semantics, optional direction tags,
//!   incidence lookup, cascading node removal.
//! - **Shortest paths**: early exit at the target, strict first-found tie-breaking, an explicit
//!   [`Error::Unreachable`] outcome, optional directed traversal and distance bound.
//!
//! # Example
//!
//! ```rust
//! use rust_priority_forest::{PriorityForest, ShortestPathAlgorithm, WeightedGraph};
//!
//! let mut forest = PriorityForest::new();
//! let handle = forest.insert("item1", 5);
//! forest.insert("item2", 3);
//! forest.decrease_key(handle, 1).unwrap();
//! assert_eq!(forest.peek(), Some((&1, &"item1")));
//!
//! let mut graph = WeightedGraph::new();
//! let a = graph.insert_node("a");
//! let b = graph.insert_node("b");
//! graph.insert_edge(&a, &b, 4.0).unwrap();
//! let path = ShortestPathAlgorithm::new().execute(&graph, &a, &b).unwrap();
//! assert_eq!(path.distance, 4.0);
//! ```

pub mod error;
pub mod fibonacci;
pub mod graph;
pub mod pathfinding;

pub use error::{Error, MemberKind, Result};
pub use fibonacci::{EntryHandle, PriorityForest};
pub use graph::{Direction, Edge, Node, Weighted, WeightedGraph};
pub use pathfinding::{ShortestPath, ShortestPathAlgorithm, ShortestPathTree, Traversal};
