//! Effective resistance between the endpoints of every link.
//!
//! The graph is read as an electrical network with one unit of conductance per link. The
//! resistance across a link follows from the pseudoinverse `L+` of the Laplacian:
//!
//! ```text
//! R(i, j) = L+[i, i] + L+[j, j] - L+[i, j] - L+[j, i]
//! ```
//!
//! Bridges score 1, links inside dense clusters score close to 0. Building `L+` is `O(V^3)` in
//! time and `O(V^2)` in memory.

use std::time::Instant;

use nalgebra::DMatrix;
use serde::Deserialize;
use tracing::debug;

use super::{LinkScores, Metric};
use crate::{
    access::{AttributeKind, ElementType, GraphRead},
    context::Context,
    error::Result,
    linalg::{compaction_index, laplacian_matrix, pseudo_inverse},
};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EffectiveResistanceOptions {
    /// Multiply each resistance by the number of transactions on the link.
    pub weighted: bool,
    /// Divide by the largest resistance.
    pub normalise: bool,
}

/// Effective resistance per link, written as a double to every transaction of the link.
/// Self-loops carry no current and are skipped.
pub struct EffectiveResistance;

impl Metric for EffectiveResistance {
    const NAME: &'static str = "EffectiveResistance";
    const ELEMENT: ElementType = ElementType::Transaction;
    const KIND: AttributeKind = AttributeKind::Double;

    type Options = EffectiveResistanceOptions;
    type Output = LinkScores<f64>;

    fn compute<G: GraphRead>(
        graph: &G,
        options: &Self::Options,
        context: &Context,
    ) -> Result<Self::Output> {
        let start = Instant::now();

        let index = compaction_index(graph);
        let inverse = pseudo_inverse(laplacian_matrix(graph, &index));

        debug!(
            vertices = index.len(),
            elapsed = ?start.elapsed(),
            "laplacian pseudoinverse done"
        );

        let mut scores = LinkScores::default();
        for link in graph.links() {
            context.cancellation.check()?;

            let (low, high) = (graph.link_low_vertex(link), graph.link_high_vertex(link));
            if low == high {
                continue;
            }

            // Safety: both endpoints are present in the graph, so both are indexed.
            let mut resistance = resistance(&inverse, index[&low], index[&high]);
            if options.weighted {
                resistance *= graph.link_transaction_count(link) as f64;
            }

            scores.insert(link, resistance);
        }

        if options.normalise {
            scores.normalise(Self::NAME);
        }

        Ok(scores)
    }
}

/// Effective resistance between compacted indices `i` and `j`.
fn resistance(inverse: &DMatrix<f64>, i: usize, j: usize) -> f64 {
    assert_ne!(i, j, "effective resistance of a self-loop");

    inverse[(i, i)] + inverse[(j, j)] - inverse[(i, j)] - inverse[(j, i)]
}
