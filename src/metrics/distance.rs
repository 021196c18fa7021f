//! Graph-level distance statistics derived from a path-scoring pass.

use serde::Deserialize;

use super::{GraphScore, Metric};
use crate::{
    access::{AttributeKind, ElementType, GraphRead},
    context::Context,
    error::Result,
    path_scoring::{calculate_scores, PathScores, ScoreType, Traversal},
};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DistanceOptions {
    #[serde(flatten)]
    pub traversal: Traversal,
}

/// The largest eccentricity in the graph.
pub struct Diameter;

impl Diameter {
    pub fn from_path_scores(paths: &PathScores) -> GraphScore {
        GraphScore(paths.scores.iter().copied().fold(0.0, f32::max))
    }
}

impl Metric for Diameter {
    const NAME: &'static str = "Diameter";
    const ELEMENT: ElementType = ElementType::Graph;
    const KIND: AttributeKind = AttributeKind::Float;

    type Options = DistanceOptions;
    type Output = GraphScore;

    fn compute<G: GraphRead>(
        graph: &G,
        options: &Self::Options,
        context: &Context,
    ) -> Result<Self::Output> {
        let paths = calculate_scores(graph, ScoreType::Eccentricity, options.traversal, context)?;
        Ok(Self::from_path_scores(&paths))
    }
}

/// The smallest eccentricity among vertices that reach at least one other vertex, `0.0` when
/// there are none.
pub struct Radius;

impl Radius {
    pub fn from_path_scores(paths: &PathScores) -> GraphScore {
        let radius = paths
            .subgraphs
            .iter()
            .zip(&paths.scores)
            .filter(|(subgraph, _)| subgraph.len() > 1)
            .map(|(_, score)| *score)
            .reduce(f32::min)
            .unwrap_or(0.0);

        GraphScore(radius)
    }
}

impl Metric for Radius {
    const NAME: &'static str = "Radius";
    const ELEMENT: ElementType = ElementType::Graph;
    const KIND: AttributeKind = AttributeKind::Float;

    type Options = DistanceOptions;
    type Output = GraphScore;

    fn compute<G: GraphRead>(
        graph: &G,
        options: &Self::Options,
        context: &Context,
    ) -> Result<Self::Output> {
        let paths = calculate_scores(graph, ScoreType::Eccentricity, options.traversal, context)?;
        Ok(Self::from_path_scores(&paths))
    }
}

/// The mean shortest-path length over every ordered pair of distinct vertices joined by a
/// path, `0.0` when no such pair exists.
pub struct AverageDistance;

impl Metric for AverageDistance {
    const NAME: &'static str = "Average Path Distance";
    const ELEMENT: ElementType = ElementType::Graph;
    const KIND: AttributeKind = AttributeKind::Float;

    type Options = DistanceOptions;
    type Output = GraphScore;

    fn compute<G: GraphRead>(
        graph: &G,
        options: &Self::Options,
        context: &Context,
    ) -> Result<Self::Output> {
        let paths =
            calculate_scores(graph, ScoreType::AverageDistance, options.traversal, context)?;

        // per-vertex means weighted back into totals
        let (total, pairs) = paths.subgraphs.iter().zip(&paths.scores).fold(
            (0.0f64, 0u64),
            |(total, pairs), (subgraph, mean)| {
                let reached = subgraph.len().saturating_sub(1) as u64;
                (total + *mean as f64 * reached as f64, pairs + reached)
            },
        );

        if pairs == 0 {
            return Ok(GraphScore(0.0));
        }

        Ok(GraphScore((total / pairs as f64) as f32))
    }
}
