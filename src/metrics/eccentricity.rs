//! Eccentricity: how far a vertex is from the furthest vertex it can reach.

use serde::Deserialize;
use tracing::warn;

use super::{components::component_maxima, max_score, Metric, VertexScores};
use crate::{
    access::{AttributeKind, ElementType, GraphRead},
    context::Context,
    error::Result,
    path_scoring::{calculate_scores, PathScores, ScoreType, Traversal},
};

/// How raw eccentricities are turned into scores.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalisation {
    /// Write the raw eccentricity.
    #[default]
    None,
    /// `1 - e / max` over the whole graph.
    Global,
    /// `1 - e / max` over the vertex's own component.
    Component,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EccentricityOptions {
    #[serde(flatten)]
    pub traversal: Traversal,
    pub normalisation: Normalisation,
}

/// The largest shortest-path distance from a vertex to any vertex of its subgraph.
///
/// Normalised scores are inverted, so the most central vertices score highest. Where the
/// relevant maximum is zero the raw value (zero) is kept.
///
/// # Examples
///
/// ```
/// use plexus::context::Context;
/// use plexus::graph::Graph;
/// use plexus::metrics::{Eccentricity, EccentricityOptions, Metric, Normalisation};
///
/// // 0 - 1 - 2
/// let mut graph = Graph::with_vertices(3);
/// graph.add_transaction(0, 1, false, None);
/// graph.add_transaction(1, 2, false, None);
///
/// let options = EccentricityOptions {
///     normalisation: Normalisation::Global,
///     ..Default::default()
/// };
/// let scores = Eccentricity::run(&mut graph, &options, &Context::new()).unwrap();
///
/// assert_eq!(scores.0, vec![0.0, 0.5, 0.0]);
/// ```
pub struct Eccentricity;

impl Eccentricity {
    /// Turns the raw eccentricities of a scoring pass into scores.
    pub fn from_path_scores(paths: &PathScores, normalisation: Normalisation) -> VertexScores {
        let raw = &paths.scores;

        let scores = match normalisation {
            Normalisation::None => raw.clone(),
            Normalisation::Global => {
                let max = max_score(raw);
                if max == 0.0 {
                    warn!(metric = Self::NAME, "maximum eccentricity is zero, skipping normalisation");
                    raw.clone()
                } else {
                    raw.iter().map(|e| 1.0 - e / max).collect()
                }
            }
            Normalisation::Component => {
                let maxima = component_maxima(&paths.subgraphs, raw);
                paths
                    .subgraphs
                    .iter()
                    .zip(raw)
                    .map(|(subgraph, e)| match maxima[subgraph] {
                        max if max == 0.0 => *e,
                        max => 1.0 - e / max,
                    })
                    .collect()
            }
        };

        VertexScores(scores)
    }
}

impl Metric for Eccentricity {
    const NAME: &'static str = "Eccentricity";
    const ELEMENT: ElementType = ElementType::Vertex;
    const KIND: AttributeKind = AttributeKind::Float;

    type Options = EccentricityOptions;
    type Output = VertexScores;

    fn compute<G: GraphRead>(
        graph: &G,
        options: &Self::Options,
        context: &Context,
    ) -> Result<Self::Output> {
        let paths = calculate_scores(graph, ScoreType::Eccentricity, options.traversal, context)?;
        Ok(Self::from_path_scores(&paths, options.normalisation))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_utils::graph;

    fn options(normalisation: Normalisation) -> EccentricityOptions {
        EccentricityOptions {
            normalisation,
            ..Default::default()
        }
    }

    #[test]
    fn raw() {
        // A path of four and a separate pair.
        let mut graph = graph!(6; [0, 1, 2, 3], [4, 5]);

        let scores =
            Eccentricity::run(&mut graph, &options(Normalisation::None), &Context::new()).unwrap();
        assert_eq!(scores.0, vec![3.0, 2.0, 2.0, 3.0, 1.0, 1.0]);

        let attribute = graph.attribute(ElementType::Vertex, "Eccentricity").unwrap();
        assert_eq!(graph.float_value(attribute, 1), Some(2.0));
    }

    #[test]
    fn global() {
        let graph = graph!(6; [0, 1, 2, 3], [4, 5]);

        let scores =
            Eccentricity::compute(&graph, &options(Normalisation::Global), &Context::new())
                .unwrap();

        assert_eq!(
            scores.0,
            vec![0.0, 1.0 / 3.0, 1.0 / 3.0, 0.0, 2.0 / 3.0, 2.0 / 3.0]
        );
    }

    #[test]
    fn component() {
        let graph = graph!(6; [0, 1, 2, 3], [4, 5]);

        let scores =
            Eccentricity::compute(&graph, &options(Normalisation::Component), &Context::new())
                .unwrap();

        assert_eq!(scores.0, vec![0.0, 1.0 / 3.0, 1.0 / 3.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn zero_maximum_keeps_raw_values() {
        let graph = graph!(3;);

        for normalisation in [Normalisation::Global, Normalisation::Component] {
            let scores =
                Eccentricity::compute(&graph, &options(normalisation), &Context::new()).unwrap();
            assert_eq!(scores.0, vec![0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn options_deserialize() {
        let options: EccentricityOptions = serde_json::from_str(
            r#"{ "include_in": true, "include_out": false, "normalisation": "component" }"#,
        )
        .unwrap();

        assert_eq!(options.normalisation, Normalisation::Component);
        assert!(!options.traversal.include_out);
        assert!(options.traversal.treat_undirected_bidirectional);
    }
}
