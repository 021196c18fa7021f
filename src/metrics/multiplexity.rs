use itertools::Itertools;
use serde::Deserialize;

use super::{LinkScores, Metric};
use crate::{
    access::{AttributeKind, ElementType, GraphRead, TransactionType},
    context::Context,
    error::Result,
};

/// The granularity at which transaction types are told apart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeGrouping {
    /// Subtypes sharing a root type count once.
    TopLevel,
    /// Every subtype counts separately.
    #[default]
    Subtype,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MultiplexityOptions {
    pub group_by: TypeGrouping,
    /// Divide by the largest multiplexity.
    pub normalise: bool,
}

/// The number of distinct transaction types on each link. Untyped transactions count as one
/// more type.
///
/// # Examples
///
/// ```
/// use plexus::access::{GraphRead, TransactionType};
/// use plexus::context::Context;
/// use plexus::graph::Graph;
/// use plexus::metrics::{Metric, Multiplexity};
///
/// let mut graph = Graph::with_vertices(2);
/// let call = TransactionType::new("Call");
/// graph.add_transaction(0, 1, true, Some(call.clone()));
/// graph.add_transaction(1, 0, true, Some(call));
/// graph.add_transaction(0, 1, false, Some(TransactionType::new("Email")));
///
/// let scores = Multiplexity::run(&mut graph, &Default::default(), &Context::new()).unwrap();
///
/// assert_eq!(scores.get(graph.link(0)), Some(2.0));
/// ```
pub struct Multiplexity;

impl Metric for Multiplexity {
    const NAME: &'static str = "Multiplexity";
    const ELEMENT: ElementType = ElementType::Transaction;
    const KIND: AttributeKind = AttributeKind::Float;

    type Options = MultiplexityOptions;
    type Output = LinkScores<f32>;

    fn compute<G: GraphRead>(
        graph: &G,
        options: &Self::Options,
        context: &Context,
    ) -> Result<Self::Output> {
        let mut scores = LinkScores::default();

        for link in graph.links() {
            context.cancellation.check()?;

            if graph.link_low_vertex(link) == graph.link_high_vertex(link) {
                continue;
            }

            let distinct = graph
                .link_transactions(link)
                .map(|transaction| {
                    let kind = graph.transaction_type(transaction);
                    match options.group_by {
                        TypeGrouping::TopLevel => kind.map(TransactionType::top_level),
                        TypeGrouping::Subtype => kind,
                    }
                })
                .unique()
                .count();

            scores.insert(link, distinct as f32);
        }

        if options.normalise {
            scores.normalise(Self::NAME);
        }

        Ok(scores)
    }
}
