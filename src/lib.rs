//! Plexus computes social network analysis metrics over attributed multigraphs, where any
//! number of directed or undirected transactions can join a pair of vertices.
//!
//! # Basic usage
//!
//! Metrics read the graph through the [`GraphRead`](access::GraphRead) trait and store their
//! results as attributes through [`GraphWrite`](access::GraphWrite). Any graph store can
//! implement both; the crate ships with an in-memory [`Graph`](graph::Graph).
//!
//! ```rust
//! use plexus::access::{ElementType, GraphRead};
//! use plexus::context::Context;
//! use plexus::graph::Graph;
//! use plexus::metrics::{ClusteringCoefficient, Eccentricity, Metric, Weight};
//!
//! // A triangle with a tail: 0 - 1 - 2 - 0, 2 - 3.
//! let mut graph = Graph::with_vertices(4);
//! graph.add_transaction(0, 1, false, None);
//! graph.add_transaction(1, 2, true, None);
//! graph.add_transaction(2, 0, false, None);
//! graph.add_transaction(2, 3, false, None);
//! graph.add_transaction(3, 2, true, None);
//!
//! let context = Context::new();
//!
//! // Compute and store some metrics.
//! let eccentricity = Eccentricity::run(&mut graph, &Default::default(), &context).unwrap();
//! let clustering = ClusteringCoefficient::run(&mut graph, &Default::default(), &context).unwrap();
//! Weight::run(&mut graph, &Default::default(), &context).unwrap();
//!
//! assert_eq!(eccentricity.0, vec![2.0, 2.0, 1.0, 2.0]);
//! assert_eq!(clustering.get(0), 1.0);
//!
//! // Scores are also available as attributes on the graph.
//! let weight = graph.attribute(ElementType::Transaction, "Weight").unwrap();
//! let tail = graph.link_between(2, 3).unwrap();
//! let transaction = graph.link_transaction(tail, 0);
//! assert_eq!(graph.float_value(weight, transaction), Some(2.0));
//! ```
//!
//! Passes are single threaded unless the [`Context`](context::Context) asks for more workers,
//! and can be interrupted through its [`CancellationToken`](cancel::CancellationToken).

pub mod access;
pub mod cancel;
pub mod context;
pub mod error;
pub mod graph;
mod linalg;
pub mod link;
pub mod metrics;
pub mod path_scoring;
pub mod vertex_set;

#[cfg(test)]
mod test_utils;

pub use error::{Error, Result};
