use serde::Deserialize;

use super::{LinkScores, Metric};
use crate::{
    access::{AttributeKind, ElementType, GraphRead},
    context::Context,
    error::Result,
};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct WeightOptions {
    /// Divide by the heaviest link.
    pub normalise: bool,
}

/// The number of transactions on each link.
pub struct Weight;

impl Metric for Weight {
    const NAME: &'static str = "Weight";
    const ELEMENT: ElementType = ElementType::Transaction;
    const KIND: AttributeKind = AttributeKind::Float;

    type Options = WeightOptions;
    type Output = LinkScores<f32>;

    fn compute<G: GraphRead>(
        graph: &G,
        options: &Self::Options,
        context: &Context,
    ) -> Result<Self::Output> {
        let mut scores = LinkScores::default();

        for link in graph.links() {
            context.cancellation.check()?;

            if graph.link_low_vertex(link) != graph.link_high_vertex(link) {
                scores.insert(link, graph.link_transaction_count(link) as f32);
            }
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
    use crate::test_utils::graph;

    #[test]
    fn counts_transactions() {
        let mut graph = graph!(3; [0, 1, 2]);
        graph.add_transaction(1, 0, true, None);
        graph.add_transaction(0, 1, true, None);
        graph.add_transaction(0, 0, false, None);

        let scores = Weight::run(&mut graph, &Default::default(), &Context::new()).unwrap();

        assert_eq!(scores.get(graph.link_between(0, 1).unwrap()), Some(3.0));
        assert_eq!(scores.get(graph.link_between(1, 2).unwrap()), Some(1.0));
        assert_eq!(scores.get(graph.link_between(0, 0).unwrap()), None);

        let attribute = graph.attribute(ElementType::Transaction, "Weight").unwrap();
        let link = graph.link_between(0, 1).unwrap();
        for transaction in graph.link_transactions(link) {
            assert_eq!(graph.float_value(attribute, transaction), Some(3.0));
        }
    }

    #[test]
    fn normalised() {
        let mut graph = graph!(3; [0, 1, 2]);
        graph.add_transaction(1, 2, false, None);
        graph.add_transaction(1, 2, false, None);
        graph.add_transaction(1, 2, false, None);

        let options = WeightOptions { normalise: true };
        let scores = Weight::compute(&graph, &options, &Context::new()).unwrap();

        assert_eq!(scores.get(graph.link_between(0, 1).unwrap()), Some(0.25));
        assert_eq!(scores.get(graph.link_between(1, 2).unwrap()), Some(1.0));
    }
}
