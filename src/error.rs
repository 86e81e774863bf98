//! Error type shared by the forest, the graph and the path search

use std::fmt;

/// Which kind of graph member an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Node,
    Edge,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Node => write!(f, "node"),
            MemberKind::Edge => write!(f, "edge"),
        }
    }
}

/// Error type for forest, graph and shortest-path operations
///
/// Every error is raised before the operation mutates anything, so a failed
/// call leaves the receiver exactly as it was.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// A required argument (the search source or target) is not part of the graph
    ///
    /// Rust references are never null; an argument that names nothing in the
    /// graph is the absent case.
    #[doc(alias = "NullArgument")]
    #[error("{0} is not a node of the graph")]
    MissingArgument(&'static str),

    /// The handle does not refer to a live entry of this forest (it was
    /// extracted or deleted, or another forest issued it)
    #[doc(alias = "NullArgument")]
    #[error("handle does not refer to a live entry of this forest")]
    InvalidHandle,

    /// An edge weight is zero, negative or NaN
    #[error("edge weight {weight} is not strictly positive")]
    InvalidEdgeWeight { weight: f64 },

    /// The node or edge object has already been added
    #[error("{0} is already a member of the graph")]
    DuplicateMember(MemberKind),

    /// An edge endpoint has not been added to the graph
    #[error("edge endpoint is not a member of the graph")]
    MissingEndpoint,

    /// `decrease_key` was called with a key larger than the current one
    #[error("new key is greater than the current key")]
    KeyIncreaseRejected,

    /// The node or edge is not a member of the graph
    #[error("{0} is not a member of the graph")]
    UnknownMember(MemberKind),

    /// The target cannot be reached from the source
    #[error("target is not reachable from source")]
    Unreachable,
}

/// Result type for this crate
pub type Result<T> = std::result::Result<T, Error>;
