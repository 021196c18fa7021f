//! Social network analysis metrics.
//!
//! Every metric is a [`Metric`]: a read-only [`compute`](Metric::compute) over a graph
//! snapshot, followed by a [`write`](Metric::write) of the finished scores as attribute
//! values. Nothing is written until every score is known, so a cancelled pass leaves the
//! graph untouched and normalisation always sees the final maximum.
//!
//! | Metric | Writes to | Attribute |
//! |---|---|---|
//! | [`Eccentricity`] | vertex | `Eccentricity` |
//! | [`ConnectivityDegree`] | vertex | `ConnectivityDegree` |
//! | [`ClusteringCoefficient`] | vertex | `ClusteringCoefficient` |
//! | [`ComponentSize`] | vertex | `ComponentSize` |
//! | [`EffectiveResistance`] | transaction | `EffectiveResistance` (double) |
//! | [`Multiplexity`] | transaction | `Multiplexity` |
//! | [`RatioOfReciprocity`] | transaction | `RatioOfReciprocity` |
//! | [`Weight`] | transaction | `Weight` |
//! | [`ComponentCount`] | graph | `Count.Components` |
//! | [`Diameter`], [`Radius`] | graph | `Diameter`, `Radius` |
//! | [`AverageDistance`] | graph | `Average Path Distance` |
//! | [`Density`] | graph | `Density` |

use std::{collections::BTreeMap, ops::Div};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    access::{AttributeId, AttributeKind, ElementType, GraphRead, GraphWrite, LinkId},
    context::Context,
    error::Result,
};

mod clustering;
mod components;
mod connectivity;
mod density;
mod distance;
mod eccentricity;
mod multiplexity;
mod reciprocity;
mod resistance;
mod weight;

pub use clustering::{ClusteringCoefficient, ClusteringCoefficientOptions};
pub use components::{ComponentCount, ComponentCountOptions, ComponentSize, ComponentSizeOptions};
pub use connectivity::{ConnectivityDegree, ConnectivityDegreeOptions};
pub use density::{density, Density, DensityOptions};
pub use distance::{AverageDistance, Diameter, DistanceOptions, Radius};
pub use eccentricity::{Eccentricity, EccentricityOptions, Normalisation};
pub use multiplexity::{Multiplexity, MultiplexityOptions, TypeGrouping};
pub use reciprocity::{RatioOfReciprocity, RatioOfReciprocityOptions};
pub use resistance::{EffectiveResistance, EffectiveResistanceOptions};
pub use weight::{Weight, WeightOptions};

/// A metric computed over a graph snapshot and stored as one attribute.
pub trait Metric {
    /// The attribute the scores are written to.
    const NAME: &'static str;
    const ELEMENT: ElementType;
    const KIND: AttributeKind;

    /// The metric's named options, deserialisable from a flat option map.
    type Options: Clone + Default + DeserializeOwned;
    type Output: Scores;

    /// Computes the scores without modifying the graph.
    fn compute<G: GraphRead>(
        graph: &G,
        options: &Self::Options,
        context: &Context,
    ) -> Result<Self::Output>;

    /// Writes computed scores to the metric's attribute, creating it if needed.
    fn write<G: GraphWrite>(graph: &mut G, output: &Self::Output) -> Result<()> {
        let attribute = graph.ensure_attribute(Self::ELEMENT, Self::KIND, Self::NAME)?;
        output.write_to(graph, attribute)
    }

    /// Computes, then writes.
    fn run<G: GraphWrite>(
        graph: &mut G,
        options: &Self::Options,
        context: &Context,
    ) -> Result<Self::Output> {
        debug!(
            metric = Self::NAME,
            vertices = graph.vertex_count(),
            links = graph.link_count(),
            "computing"
        );

        let output = Self::compute(&*graph, options, context)?;
        Self::write(graph, &output)?;

        debug!(metric = Self::NAME, "written");
        Ok(output)
    }
}

/// Computed scores that know how to store themselves on a graph.
pub trait Scores {
    fn write_to<G: GraphWrite>(&self, graph: &mut G, attribute: AttributeId) -> Result<()>;
}

/// A numeric score type, zero by default.
pub trait Score: Copy + Default + PartialOrd + Div<Output = Self> {}

impl Score for f32 {}

impl Score for f64 {}

/// One score per vertex, indexed by vertex position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexScores(pub Vec<f32>);

impl VertexScores {
    /// Returns the score of the vertex at `position`.
    pub fn get(&self, position: usize) -> f32 {
        self.0[position]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn normalise(&mut self, metric: &str) {
        normalise_by_max(self.0.iter_mut(), metric);
    }
}

impl Scores for VertexScores {
    fn write_to<G: GraphWrite>(&self, graph: &mut G, attribute: AttributeId) -> Result<()> {
        for (position, score) in self.0.iter().enumerate() {
            let vertex = graph.vertex(position);
            graph.set_float(attribute, vertex, *score)?;
        }
        Ok(())
    }
}

/// One score per link, shared by every transaction of the link when written.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinkScores<T> {
    pub scores: BTreeMap<LinkId, T>,
}

impl<T: Score> LinkScores<T> {
    pub fn get(&self, link: LinkId) -> Option<T> {
        self.scores.get(&link).copied()
    }

    pub(crate) fn insert(&mut self, link: LinkId, score: T) {
        self.scores.insert(link, score);
    }

    pub(crate) fn normalise(&mut self, metric: &str) {
        normalise_by_max(self.scores.values_mut(), metric);
    }

    fn write_with<G: GraphWrite>(
        &self,
        graph: &mut G,
        mut set: impl FnMut(&mut G, usize, T) -> Result<()>,
    ) -> Result<()> {
        for (link, score) in &self.scores {
            let transactions: Vec<_> = graph.link_transactions(*link).collect();
            for transaction in transactions {
                set(graph, transaction, *score)?;
            }
        }
        Ok(())
    }
}

impl Scores for LinkScores<f32> {
    fn write_to<G: GraphWrite>(&self, graph: &mut G, attribute: AttributeId) -> Result<()> {
        self.write_with(graph, |graph, transaction, score| {
            graph.set_float(attribute, transaction, score)
        })
    }
}

impl Scores for LinkScores<f64> {
    fn write_to<G: GraphWrite>(&self, graph: &mut G, attribute: AttributeId) -> Result<()> {
        self.write_with(graph, |graph, transaction, score| {
            graph.set_double(attribute, transaction, score)
        })
    }
}

/// A single graph-level value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GraphScore(pub f32);

/// Graph attributes have a single element.
pub const GRAPH_ELEMENT: usize = 0;

impl Scores for GraphScore {
    fn write_to<G: GraphWrite>(&self, graph: &mut G, attribute: AttributeId) -> Result<()> {
        graph.set_float(attribute, GRAPH_ELEMENT, self.0)
    }
}

/// Largest of the given values, or `T::default()` (zero) when empty.
pub(crate) fn max_score<'a, T: Score + 'a>(values: impl IntoIterator<Item = &'a T>) -> T {
    values
        .into_iter()
        .fold(T::default(), |max, v| if *v > max { *v } else { max })
}

/// Divides every value by the largest. Skipped when the largest is zero, leaving the raw
/// values in place.
pub(crate) fn normalise_by_max<'a, T: Score + 'a>(
    values: impl IntoIterator<Item = &'a mut T>,
    metric: &str,
) {
    let mut values: Vec<&mut T> = values.into_iter().collect();
    let max = max_score(values.iter().map(|v| &**v));

    if max <= T::default() {
        if !values.is_empty() {
            warn!(metric, "maximum score is zero, skipping normalisation");
        }
        return;
    }

    for value in values.iter_mut() {
        **value = **value / max;
    }
}
