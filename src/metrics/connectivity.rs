//! Connectivity degree: the number of components left after removing a vertex.
//!
//! Removal is simulated only where it can change anything. Singletons, pairs and vertices on
//! the outskirts of their component are answered from the current component count, and
//! pendant neighbours (which removal would strand) are counted rather than searched.

use std::{collections::HashSet, sync::Arc};

use serde::Deserialize;

use super::{
    components::{component_maxima, count_components},
    Metric, VertexScores,
};
use crate::{
    access::{AttributeKind, ElementType, GraphRead, VertexId},
    cancel::CancellationToken,
    context::Context,
    error::Result,
    path_scoring::{
        compute_scores, compute_subgraph_paths, traversal_indices, Indices, PathScores,
        ScoreType, Traversal,
    },
    vertex_set::VertexSet,
};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConnectivityDegreeOptions {
    #[serde(flatten)]
    pub traversal: Traversal,
    /// Score the number of components after removal rather than the rise in that number.
    pub normalise: bool,
    /// Leave isolated vertices out of every component count.
    pub ignore_singletons: bool,
}

/// How much removing each vertex would fragment the graph.
///
/// With `normalise` the score is the absolute component count once the vertex is gone;
/// without it, the number of components the removal adds (never negative).
///
/// # Examples
///
/// ```
/// use plexus::context::Context;
/// use plexus::graph::Graph;
/// use plexus::metrics::{ConnectivityDegree, Metric};
///
/// // 0 - 1 - 2 - 3 - 4
/// let mut graph = Graph::with_vertices(5);
/// for i in 0..4 {
///     graph.add_transaction(i, i + 1, false, None);
/// }
///
/// let scores = ConnectivityDegree::run(&mut graph, &Default::default(), &Context::new()).unwrap();
///
/// // Cutting the middle of the path splits it in two.
/// assert_eq!(scores.get(2), 1.0);
/// assert_eq!(scores.get(0), 0.0);
/// ```
pub struct ConnectivityDegree;

impl ConnectivityDegree {
    /// Scores every vertex from the output of an earlier eccentricity pass run with the same
    /// traversal, saving the full path-scoring pass.
    pub fn from_path_scores<G: GraphRead>(
        graph: &G,
        paths: &PathScores,
        options: &ConnectivityDegreeOptions,
        context: &Context,
    ) -> Result<VertexScores> {
        let indices = traversal_indices(graph, options.traversal);
        score_vertices(graph, &indices, paths, options, &context.cancellation)
    }
}

impl Metric for ConnectivityDegree {
    const NAME: &'static str = "ConnectivityDegree";
    const ELEMENT: ElementType = ElementType::Vertex;
    const KIND: AttributeKind = AttributeKind::Float;

    type Options = ConnectivityDegreeOptions;
    type Output = VertexScores;

    fn compute<G: GraphRead>(
        graph: &G,
        options: &Self::Options,
        context: &Context,
    ) -> Result<Self::Output> {
        let indices = Arc::new(traversal_indices(graph, options.traversal));
        let paths = compute_scores(Arc::clone(&indices), ScoreType::Eccentricity, context)?;

        score_vertices(graph, &indices, &paths, options, &context.cancellation)
    }
}

/// What removing a vertex leaves behind, in terms of the formulas below.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Removal {
    /// The vertex is a singleton.
    Singleton,
    /// The vertex is one of an isolated pair.
    Pair,
    /// The vertex is at the edge of its component, removal splits nothing.
    Outskirts,
    /// Every remaining neighbour is a pendant.
    PendantsOnly { pendants: usize },
    /// `components` non-trivial pieces and `singletons` isolated vertices remain, besides the
    /// stranded pendants.
    Split {
        components: usize,
        singletons: usize,
        pendants: usize,
    },
}

impl Removal {
    /// Applies the case table to the current component count.
    fn score(self, num_components: usize, normalise: bool, ignore_singletons: bool) -> f32 {
        let n = num_components as i64;

        let score = match (self, normalise, ignore_singletons) {
            (Removal::Singleton, true, false) => n - 1,
            (Removal::Singleton, true, true) => n,
            (Removal::Pair, true, false) => n,
            (Removal::Pair, true, true) => n - 1,
            (Removal::Outskirts, true, _) => n,
            (Removal::PendantsOnly { pendants }, true, false) => n - 1 + pendants as i64,
            (Removal::PendantsOnly { .. }, true, true) => n - 1,
            (Removal::PendantsOnly { pendants }, false, false) => pendants as i64 - 1,
            (
                Removal::Split {
                    components,
                    singletons,
                    pendants,
                },
                true,
                false,
            ) => n - 1 + (components + singletons + pendants) as i64,
            (Removal::Split { components, .. }, true, true) => n - 1 + components as i64,
            (
                Removal::Split {
                    components,
                    singletons,
                    pendants,
                },
                false,
                false,
            ) => (components + singletons + pendants) as i64 - 1,
            (Removal::Split { components, .. }, false, true) => components as i64 - 1,
            (_, false, _) => 0,
        };

        score.max(0) as f32
    }
}

fn score_vertices<G: GraphRead>(
    graph: &G,
    indices: &Indices,
    paths: &PathScores,
    options: &ConnectivityDegreeOptions,
    cancellation: &CancellationToken,
) -> Result<VertexScores> {
    let num_components = count_components(&paths.subgraphs, options.ignore_singletons);
    let maxima = component_maxima(&paths.subgraphs, &paths.scores);

    let mut scores = Vec::with_capacity(paths.subgraphs.len());
    for (position, subgraph) in paths.subgraphs.iter().enumerate() {
        cancellation.check()?;

        let removal = classify(
            graph,
            indices,
            position,
            subgraph,
            paths.scores[position] == maxima[subgraph],
            options.traversal.is_symmetric(),
            cancellation,
        )?;
        scores.push(removal.score(num_components, options.normalise, options.ignore_singletons));
    }

    Ok(VertexScores(scores))
}

fn classify<G: GraphRead>(
    graph: &G,
    indices: &Indices,
    position: usize,
    subgraph: &VertexSet,
    furthest_in_component: bool,
    symmetric: bool,
    cancellation: &CancellationToken,
) -> Result<Removal> {
    match subgraph.len() {
        0 | 1 => return Ok(Removal::Singleton),
        2 => return Ok(Removal::Pair),
        _ => {}
    }

    let vertex = graph.vertex(position);
    let neighbours: Vec<VertexId> = structural_neighbours(graph, vertex).collect();

    if furthest_in_component || neighbours.len() == 1 {
        return Ok(Removal::Outskirts);
    }

    let mut candidates = subgraph.clone();
    candidates.remove(position);

    let mut pendants = 0;
    for neighbour in neighbours {
        if structural_neighbours(graph, neighbour).count() == 1 {
            pendants += 1;
            candidates.remove(graph.vertex_position(neighbour));
        }
    }

    if candidates.is_empty() {
        return Ok(Removal::PendantsOnly { pendants });
    }

    let remaining = compute_subgraph_paths(indices, &candidates, symmetric, cancellation)?;

    let mut components: HashSet<&VertexSet> = HashSet::new();
    let mut singletons = 0;
    for index in candidates.iter() {
        let reached = &remaining[index];
        if reached.len() == 1 {
            singletons += 1;
        } else {
            components.insert(reached);
        }
    }

    Ok(Removal::Split {
        components: components.len(),
        singletons,
        pendants,
    })
}

/// Neighbours other than the vertex itself.
fn structural_neighbours<G: GraphRead>(
    graph: &G,
    vertex: VertexId,
) -> impl Iterator<Item = VertexId> + '_ {
    graph.neighbours(vertex).filter(move |n| *n != vertex)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_utils::graph;

    fn options(normalise: bool, ignore_singletons: bool) -> ConnectivityDegreeOptions {
        ConnectivityDegreeOptions {
            normalise,
            ignore_singletons,
            ..Default::default()
        }
    }

    fn scores<G: GraphRead>(graph: &G, options: &ConnectivityDegreeOptions) -> Vec<f32> {
        ConnectivityDegree::compute(graph, options, &Context::new())
            .unwrap()
            .0
    }

    #[test]
    fn star_centre_strands_every_leaf() {
        let graph = graph!(6; [1, 0, 2], [3, 0, 4], [0, 5]);

        let normalised = scores(&graph, &options(true, false));
        assert_eq!(normalised, vec![5.0, 1.0, 1.0, 1.0, 1.0, 1.0]);

        let rise = scores(&graph, &options(false, false));
        assert_eq!(rise, vec![4.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

        // Stranded leaves are singletons, so they don't count.
        let ignored = scores(&graph, &options(true, true));
        assert_eq!(ignored[0], 0.0);
        assert_eq!(scores(&graph, &options(false, true))[0], 0.0);
    }

    #[test]
    fn cut_vertex_on_a_path() {
        // 0 - 1 - 2 - 3 - 4 - 5 - 6
        let graph = graph!(7; [0, 1, 2, 3, 4, 5, 6]);

        let normalised = scores(&graph, &options(true, false));
        // 1 strands 0, 3 splits {0, 1, 2} from {4, 5, 6}.
        assert_eq!(normalised[1], 2.0);
        assert_eq!(normalised[3], 2.0);
        assert_eq!(normalised[0], 1.0);

        let rise = scores(&graph, &options(false, true));
        assert_eq!(rise, vec![0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn cycle_vertices_are_all_on_the_outskirts() {
        let graph = graph!(4; [0, 1, 2, 3, 0]);

        assert_eq!(scores(&graph, &options(true, false)), vec![1.0; 4]);
        assert_eq!(scores(&graph, &options(false, false)), vec![0.0; 4]);
    }

    #[test]
    fn singletons_and_pairs() {
        // {0, 1} a pair, 2 isolated, {3, 4, 5} a path.
        let graph = graph!(6; [0, 1], [3, 4, 5]);

        let keep = scores(&graph, &options(true, false));
        assert_eq!(keep[0], 3.0);
        assert_eq!(keep[2], 2.0);

        let ignore = scores(&graph, &options(true, true));
        assert_eq!(ignore[0], 1.0);
        assert_eq!(ignore[2], 2.0);

        assert_eq!(&scores(&graph, &options(false, false))[..3], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn reuses_an_eccentricity_pass() {
        let graph = graph!(7; [0, 1, 2, 3, 4, 5, 6]);
        let context = Context::new();
        let options = options(true, false);

        let paths = crate::path_scoring::calculate_scores(
            &graph,
            ScoreType::Eccentricity,
            options.traversal,
            &context,
        )
        .unwrap();

        assert_eq!(
            ConnectivityDegree::from_path_scores(&graph, &paths, &options, &context).unwrap(),
            ConnectivityDegree::compute(&graph, &options, &context).unwrap()
        );
    }

    #[test]
    fn writes_attribute() {
        let mut graph = graph!(3; [0, 1, 2]);

        ConnectivityDegree::run(&mut graph, &options(true, false), &Context::new()).unwrap();

        let attribute = graph
            .attribute(ElementType::Vertex, "ConnectivityDegree")
            .unwrap();
        assert_eq!(graph.float_value(attribute, 1), Some(2.0));
    }

    #[test]
    fn cancelled() {
        let graph = graph!(3; [0, 1, 2]);
        let context = Context::new();
        context.cancellation.cancel();

        assert!(ConnectivityDegree::compute(&graph, &Default::default(), &context).is_err());
    }
}
