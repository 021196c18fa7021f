use serde::Deserialize;

use super::{GraphScore, Metric};
use crate::{
    access::{AttributeKind, ElementType, GraphRead},
    context::Context,
    error::Result,
};

/// The ratio of non-loop links to the `V (V - 1) / 2` possible, `0.0` below two vertices.
pub fn density<G: GraphRead>(graph: &G) -> f32 {
    let num_nodes = graph.vertex_count() as f64;
    if num_nodes < 2.0 {
        return 0.0;
    }

    let num_links = graph
        .links()
        .filter(|link| graph.link_low_vertex(*link) != graph.link_high_vertex(*link))
        .count() as f64;

    (2.0 * num_links / (num_nodes * (num_nodes - 1.0))) as f32
}

/// Density takes no options.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DensityOptions {}

/// Graph density as a graph attribute.
pub struct Density;

impl Metric for Density {
    const NAME: &'static str = "Density";
    const ELEMENT: ElementType = ElementType::Graph;
    const KIND: AttributeKind = AttributeKind::Float;

    type Options = DensityOptions;
    type Output = GraphScore;

    fn compute<G: GraphRead>(
        graph: &G,
        _options: &Self::Options,
        context: &Context,
    ) -> Result<Self::Output> {
        context.cancellation.check()?;
        Ok(GraphScore(density(graph)))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{graph::Graph, metrics::GRAPH_ELEMENT, test_utils::graph};

    #[test]
    fn density_ignores_loops_and_multiplicity() {
        let mut graph = graph!(4; [0, 1, 2]);
        graph.add_transaction(1, 0, true, None);
        graph.add_transaction(3, 3, false, None);

        assert_eq!(density(&graph), 2.0 / 6.0);
    }

    #[test]
    fn degenerate_graphs() {
        assert_eq!(density(&Graph::new()), 0.0);
        assert_eq!(density(&graph!(1;)), 0.0);
        assert_eq!(density(&graph!(2; [0, 1])), 1.0);
    }

    #[test]
    fn writes_graph_attribute() {
        let mut graph = graph!(3; [0, 1, 2, 0]);

        let score = Density::run(&mut graph, &Default::default(), &Context::new()).unwrap();
        assert_eq!(score, GraphScore(1.0));

        let attribute = graph.attribute(ElementType::Graph, "Density").unwrap();
        assert_eq!(graph.float_value(attribute, GRAPH_ELEMENT), Some(1.0));
    }
}
