use serde::Deserialize;

use super::{LinkScores, Metric};
use crate::{
    access::{AttributeKind, Direction, ElementType, GraphRead},
    context::Context,
    error::Result,
};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RatioOfReciprocityOptions {
    /// Count undirected transactions in both directions.
    pub treat_undirected_bidirectional: bool,
    /// Divide by the largest ratio.
    pub normalise: bool,
}

impl Default for RatioOfReciprocityOptions {
    fn default() -> Self {
        Self {
            treat_undirected_bidirectional: true,
            normalise: false,
        }
    }
}

/// How balanced the traffic on each link is: `min(in, out) / max(in, out)`, with in and out
/// taken relative to the link's low vertex. One-way links score 0, balanced links 1.
pub struct RatioOfReciprocity;

impl Metric for RatioOfReciprocity {
    const NAME: &'static str = "RatioOfReciprocity";
    const ELEMENT: ElementType = ElementType::Transaction;
    const KIND: AttributeKind = AttributeKind::Float;

    type Options = RatioOfReciprocityOptions;
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

            let (mut outgoing, mut incoming) = (0u32, 0u32);
            for transaction in graph.link_transactions(link) {
                match graph.transaction_direction(transaction) {
                    Direction::Uphill => outgoing += 1,
                    Direction::Downhill => incoming += 1,
                    Direction::Flat if options.treat_undirected_bidirectional => {
                        outgoing += 1;
                        incoming += 1;
                    }
                    Direction::Flat => {}
                }
            }

            let max = outgoing.max(incoming);
            let ratio = if max == 0 {
                0.0
            } else {
                outgoing.min(incoming) as f32 / max as f32
            };

            scores.insert(link, ratio);
        }

        if options.normalise {
            scores.normalise(Self::NAME);
        }

        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::graph::Graph;

    fn ratio(graph: &Graph, options: &RatioOfReciprocityOptions) -> Option<f32> {
        let scores = RatioOfReciprocity::compute(graph, options, &Context::new()).unwrap();
        scores.get(graph.link(0))
    }

    #[test]
    fn two_up_one_down() {
        let mut graph = Graph::with_vertices(2);
        graph.add_transaction(0, 1, true, None);
        graph.add_transaction(0, 1, true, None);
        graph.add_transaction(1, 0, true, None);

        assert_eq!(ratio(&graph, &Default::default()), Some(0.5));
    }

    #[test]
    fn one_way_link_scores_zero() {
        let mut graph = Graph::with_vertices(2);
        graph.add_transaction(1, 0, true, None);

        assert_eq!(ratio(&graph, &Default::default()), Some(0.0));
    }

    #[test]
    fn undirected_transactions() {
        let mut graph = Graph::with_vertices(2);
        graph.add_transaction(0, 1, false, None);
        graph.add_transaction(0, 1, true, None);

        // 2 out, 1 in
        assert_eq!(ratio(&graph, &Default::default()), Some(0.5));

        let strict = RatioOfReciprocityOptions {
            treat_undirected_bidirectional: false,
            normalise: false,
        };
        // 1 out, 0 in
        assert_eq!(ratio(&graph, &strict), Some(0.0));

        let mut flat = Graph::with_vertices(2);
        flat.add_transaction(0, 1, false, None);
        assert_eq!(ratio(&flat, &strict), Some(0.0));
    }

    #[test]
    fn normalised_and_written() {
        let mut graph = Graph::with_vertices(3);
        graph.add_transaction(0, 1, true, None);
        graph.add_transaction(0, 1, true, None);
        graph.add_transaction(0, 1, true, None);
        graph.add_transaction(1, 0, true, None);
        graph.add_transaction(1, 2, true, None);
        graph.add_transaction(2, 1, true, None);
        graph.add_transaction(2, 2, true, None);

        let options = RatioOfReciprocityOptions {
            normalise: true,
            ..Default::default()
        };
        let scores = RatioOfReciprocity::run(&mut graph, &options, &Context::new()).unwrap();

        assert_eq!(scores.get(graph.link_between(0, 1).unwrap()), Some(1.0 / 3.0));
        assert_eq!(scores.get(graph.link_between(1, 2).unwrap()), Some(1.0));
        assert_eq!(scores.get(graph.link_between(2, 2).unwrap()), None);

        let attribute = graph
            .attribute(ElementType::Transaction, "RatioOfReciprocity")
            .unwrap();
        let link = graph.link_between(1, 2).unwrap();
        for transaction in graph.link_transactions(link) {
            assert_eq!(graph.float_value(attribute, transaction), Some(1.0));
        }
    }

    #[test]
    fn options_default_to_bidirectional() {
        let options: RatioOfReciprocityOptions = serde_json::from_str("{}").unwrap();

        assert!(options.treat_undirected_bidirectional);
        assert!(!options.normalise);
    }
}
