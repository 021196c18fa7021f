//! Component bookkeeping shared by the metrics, and the component metrics themselves.
//!
//! Components are never labelled: two vertices belong to the same component when their
//! subgraphs are equal, so the subgraph itself keys every per-component aggregate.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use super::{GraphScore, Metric, VertexScores};
use crate::{
    access::{AttributeKind, ElementType, GraphRead},
    context::Context,
    error::Result,
    path_scoring::{calculate_scores, ScoreType, Traversal},
    vertex_set::VertexSet,
};

/// Counts the distinct subgraphs. Singletons count once each unless ignored.
pub(crate) fn count_components(subgraphs: &[VertexSet], ignore_singletons: bool) -> usize {
    let mut distinct: HashSet<&VertexSet> = HashSet::new();
    let mut singletons = 0;

    for subgraph in subgraphs {
        if subgraph.len() <= 1 {
            singletons += 1;
        } else {
            distinct.insert(subgraph);
        }
    }

    if ignore_singletons {
        distinct.len()
    } else {
        distinct.len() + singletons
    }
}

/// The largest score within each subgraph.
pub(crate) fn component_maxima<'a>(
    subgraphs: &'a [VertexSet],
    scores: &[f32],
) -> HashMap<&'a VertexSet, f32> {
    let mut maxima: HashMap<&VertexSet, f32> = HashMap::new();

    for (subgraph, score) in subgraphs.iter().zip(scores) {
        maxima
            .entry(subgraph)
            .and_modify(|max| *max = max.max(*score))
            .or_insert(*score);
    }

    maxima
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ComponentSizeOptions {
    #[serde(flatten)]
    pub traversal: Traversal,
    /// Divide by the size of the largest component.
    pub normalise: bool,
}

/// The number of vertices in each vertex's component, itself included.
pub struct ComponentSize;

impl Metric for ComponentSize {
    const NAME: &'static str = "ComponentSize";
    const ELEMENT: ElementType = ElementType::Vertex;
    const KIND: AttributeKind = AttributeKind::Float;

    type Options = ComponentSizeOptions;
    type Output = VertexScores;

    fn compute<G: GraphRead>(
        graph: &G,
        options: &Self::Options,
        context: &Context,
    ) -> Result<Self::Output> {
        let paths = calculate_scores(graph, ScoreType::Eccentricity, options.traversal, context)?;

        let mut scores = VertexScores(
            paths
                .subgraphs
                .iter()
                .map(|subgraph| subgraph.len() as f32)
                .collect(),
        );
        if options.normalise {
            scores.normalise(Self::NAME);
        }

        Ok(scores)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ComponentCountOptions {
    #[serde(flatten)]
    pub traversal: Traversal,
    /// Leave isolated vertices out of the count.
    pub ignore_singletons: bool,
}

/// The number of components in the graph.
pub struct ComponentCount;

impl Metric for ComponentCount {
    const NAME: &'static str = "Count.Components";
    const ELEMENT: ElementType = ElementType::Graph;
    const KIND: AttributeKind = AttributeKind::Float;

    type Options = ComponentCountOptions;
    type Output = GraphScore;

    fn compute<G: GraphRead>(
        graph: &G,
        options: &Self::Options,
        context: &Context,
    ) -> Result<Self::Output> {
        let paths = calculate_scores(graph, ScoreType::Eccentricity, options.traversal, context)?;
        let count = count_components(&paths.subgraphs, options.ignore_singletons);

        Ok(GraphScore(count as f32))
    }
}
