use serde::Deserialize;

use super::{Metric, VertexScores};
use crate::{
    access::{AttributeKind, ElementType, GraphRead},
    context::Context,
    error::Result,
    vertex_set::VertexSet,
};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClusteringCoefficientOptions {
    /// Divide by the largest coefficient.
    pub normalise: bool,
}

/// The local clustering coefficient: the share of a vertex's neighbour pairs that are
/// themselves neighbours. Direction and multiplicity are ignored, as are self-loops.
pub struct ClusteringCoefficient;

impl Metric for ClusteringCoefficient {
    const NAME: &'static str = "ClusteringCoefficient";
    const ELEMENT: ElementType = ElementType::Vertex;
    const KIND: AttributeKind = AttributeKind::Float;

    type Options = ClusteringCoefficientOptions;
    type Output = VertexScores;

    fn compute<G: GraphRead>(
        graph: &G,
        options: &Self::Options,
        context: &Context,
    ) -> Result<Self::Output> {
        let neighbourhoods: Vec<VertexSet> = (0..graph.vertex_count())
            .map(|position| {
                let vertex = graph.vertex(position);
                graph
                    .neighbours(vertex)
                    .filter(|neighbour| *neighbour != vertex)
                    .map(|neighbour| graph.vertex_position(neighbour))
                    .collect()
            })
            .collect();

        let mut scores = Vec::with_capacity(neighbourhoods.len());
        for neighbourhood in &neighbourhoods {
            context.cancellation.check()?;

            let n = neighbourhood.len() as u64;
            // n choose 2, in closed form.
            let all_pairs = n * n.saturating_sub(1) / 2;
            if all_pairs == 0 {
                scores.push(0.0);
                continue;
            }

            // Each connected pair is seen once from either end.
            let shared: u64 = neighbourhood
                .iter()
                .map(|neighbour| neighbourhoods[neighbour].intersection_len(neighbourhood) as u64)
                .sum();
            let connected_pairs = shared / 2;

            scores.push((connected_pairs as f64 / all_pairs as f64) as f32);
        }

        let mut scores = VertexScores(scores);
        if options.normalise {
            scores.normalise(Self::NAME);
        }

        Ok(scores)
    }
}
