//! The contract between the metrics and whatever stores the graph.
//!
//! Metrics only read structure through [`GraphRead`] and only write attribute values through
//! [`GraphWrite`]; they never add or remove elements. A host store implements both traits over
//! a consistent snapshot for the duration of a pass. [`Graph`](crate::graph::Graph) is the
//! in-memory implementation shipped with the crate.

use std::{fmt, sync::Arc};

use crate::error::Result;

pub type VertexId = usize;
pub type LinkId = usize;
pub type TransactionId = usize;
pub type AttributeId = usize;

/// The kinds of element an attribute can be attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    Graph,
    Vertex,
    Link,
    Transaction,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Graph => "graph",
            ElementType::Vertex => "vertex",
            ElementType::Link => "link",
            ElementType::Transaction => "transaction",
        };
        f.write_str(name)
    }
}

/// The value type stored by an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Float,
    Double,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKind::Float => f.write_str("float"),
            AttributeKind::Double => f.write_str("double"),
        }
    }
}

/// The direction of a transaction relative to its link's low/high ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// low -> high
    Uphill,
    /// high -> low
    Downhill,
    /// undirected
    Flat,
}

/// A transaction classification, optionally nested under a parent type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransactionType {
    name: String,
    parent: Option<Arc<TransactionType>>,
}

impl TransactionType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
        }
    }

    /// Creates a subtype of `parent`.
    pub fn with_parent(name: impl Into<String>, parent: Arc<TransactionType>) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&TransactionType> {
        self.parent.as_deref()
    }

    /// Walks up the hierarchy to the root type.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use plexus::access::TransactionType;
    ///
    /// let communication = Arc::new(TransactionType::new("Communication"));
    /// let email = TransactionType::with_parent("Email", communication.clone());
    ///
    /// assert_eq!(email.top_level().name(), "Communication");
    /// assert_eq!(communication.top_level().name(), "Communication");
    /// ```
    pub fn top_level(&self) -> &TransactionType {
        let mut current = self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }
}

/// Read access to a graph snapshot.
///
/// Vertex positions run densely over `0..vertex_count()` and are the index of every
/// per-vertex result array. Vertex ids are stable but may be sparse.
pub trait GraphRead {
    fn vertex_count(&self) -> usize;

    fn vertex(&self, position: usize) -> VertexId;

    fn vertex_position(&self, vertex: VertexId) -> usize;

    /// Number of distinct neighbours. A vertex with a self-loop counts itself.
    fn neighbour_count(&self, vertex: VertexId) -> usize;

    fn neighbour(&self, vertex: VertexId, k: usize) -> VertexId;

    fn link_between(&self, a: VertexId, b: VertexId) -> Option<LinkId>;

    fn link_count(&self) -> usize;

    fn link(&self, position: usize) -> LinkId;

    fn link_low_vertex(&self, link: LinkId) -> VertexId;

    fn link_high_vertex(&self, link: LinkId) -> VertexId;

    fn link_transaction_count(&self, link: LinkId) -> usize;

    fn link_transaction(&self, link: LinkId, k: usize) -> TransactionId;

    fn transaction_direction(&self, transaction: TransactionId) -> Direction;

    fn transaction_source_vertex(&self, transaction: TransactionId) -> VertexId;

    fn transaction_destination_vertex(&self, transaction: TransactionId) -> VertexId;

    fn transaction_type(&self, transaction: TransactionId) -> Option<&TransactionType>;

    fn attribute(&self, element: ElementType, name: &str) -> Option<AttributeId>;

    fn float_value(&self, attribute: AttributeId, element: usize) -> Option<f32>;

    fn double_value(&self, attribute: AttributeId, element: usize) -> Option<f64>;

    //
    // Provided
    //

    /// Iterates the distinct neighbours of a vertex.
    fn neighbours(&self, vertex: VertexId) -> impl Iterator<Item = VertexId> + '_
    where
        Self: Sized,
    {
        (0..self.neighbour_count(vertex)).map(move |k| self.neighbour(vertex, k))
    }

    /// Iterates the transactions of a link.
    fn link_transactions(&self, link: LinkId) -> impl Iterator<Item = TransactionId> + '_
    where
        Self: Sized,
    {
        (0..self.link_transaction_count(link)).map(move |k| self.link_transaction(link, k))
    }

    /// Iterates every link id.
    fn links(&self) -> impl Iterator<Item = LinkId> + '_
    where
        Self: Sized,
    {
        (0..self.link_count()).map(move |position| self.link(position))
    }
}

/// Attribute write access. Structure stays untouched.
pub trait GraphWrite: GraphRead {
    /// Returns the attribute with the given name, creating it if needed.
    ///
    /// Fails with [`Error::AttributeKindMismatch`](crate::error::Error::AttributeKindMismatch) if
    /// an attribute of that name already exists with another kind.
    fn ensure_attribute(
        &mut self,
        element: ElementType,
        kind: AttributeKind,
        name: &str,
    ) -> Result<AttributeId>;

    fn set_float(&mut self, attribute: AttributeId, element: usize, value: f32) -> Result<()>;

    fn set_double(&mut self, attribute: AttributeId, element: usize, value: f64) -> Result<()>;
}
