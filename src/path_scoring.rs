//! Path scoring: per-vertex reachable subgraphs and path-length statistics.
//!
//! Every vertex is the root of one breadth-first search over the links its [`Traversal`]
//! allows. The search yields the set of vertex positions reachable from the root (its
//! subgraph) and a path-length statistic over that set. Under an undirected traversal, two
//! vertices of the same component end up with equal subgraphs, which is how the metrics tell
//! components apart without labelling them.
//!
//! One search per vertex makes this `O(V * (V + E))`, the dominant cost of most passes, so the
//! searches can be shared out between worker threads (see [`Context`]).

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::Instant,
};

use serde::Deserialize;
use tracing::{debug, trace};

use crate::{
    access::{Direction, GraphRead, LinkId, VertexId},
    cancel::CancellationToken,
    context::Context,
    error::Result,
    vertex_set::VertexSet,
};

/// Position-indexed adjacency: the positions reachable in one step from each position.
pub(crate) type Indices = Vec<Vec<usize>>;

/// Rules deciding which links a search may walk, and in which direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Traversal {
    /// Follow transactions from their destination to their source.
    pub include_in: bool,
    /// Follow transactions from their source to their destination.
    pub include_out: bool,
    /// Follow undirected transactions both ways.
    pub treat_undirected_bidirectional: bool,
    /// Keep self-loops in the adjacency.
    pub include_loops: bool,
}

impl Default for Traversal {
    fn default() -> Self {
        Self::undirected()
    }
}

impl Traversal {
    /// Every transaction is walkable both ways.
    pub fn undirected() -> Self {
        Self {
            include_in: true,
            include_out: true,
            treat_undirected_bidirectional: true,
            include_loops: false,
        }
    }

    /// Directed transactions are walked along their direction only.
    pub fn outgoing() -> Self {
        Self {
            include_in: false,
            ..Self::undirected()
        }
    }

    /// Directed transactions are walked against their direction only.
    pub fn incoming() -> Self {
        Self {
            include_out: false,
            ..Self::undirected()
        }
    }

    fn is_undirected(&self) -> bool {
        self.include_in && self.include_out
    }

    /// Whether every walkable step can also be taken backwards, which makes reachability
    /// symmetric. With neither side included only undirected transactions remain.
    pub(crate) fn is_symmetric(&self) -> bool {
        self.include_in == self.include_out
    }

    /// Whether `link` may be walked from `from` to `to`.
    ///
    /// With both directions included every transaction qualifies. Otherwise a transaction
    /// qualifies when its stored source and destination agree with an included side, whether
    /// or not it is directed. `treat_undirected_bidirectional` additionally opens undirected
    /// transactions in both directions.
    pub fn can_traverse<G: GraphRead>(
        &self,
        graph: &G,
        link: LinkId,
        from: VertexId,
        to: VertexId,
    ) -> bool {
        if from == to && !self.include_loops {
            return false;
        }

        if self.is_undirected() {
            return graph.link_transaction_count(link) > 0;
        }

        graph.link_transactions(link).any(|transaction| {
            (self.treat_undirected_bidirectional
                && graph.transaction_direction(transaction) == Direction::Flat)
                || (self.include_in && graph.transaction_source_vertex(transaction) == to)
                || (self.include_out && graph.transaction_destination_vertex(transaction) == to)
        })
    }
}

/// The statistic recorded per vertex alongside its subgraph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreType {
    /// The largest shortest-path distance to any vertex of the subgraph.
    #[default]
    Eccentricity,
    /// The mean shortest-path distance to the other vertices of the subgraph.
    AverageDistance,
}

/// Per-position results of a scoring pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathScores {
    /// The positions reachable from each position, itself included.
    pub subgraphs: Vec<VertexSet>,
    /// The requested statistic for each position, `0.0` for singletons.
    pub scores: Vec<f32>,
}

/// Scores every vertex of the graph.
///
/// # Examples
///
/// ```
/// use plexus::context::Context;
/// use plexus::graph::Graph;
/// use plexus::path_scoring::{calculate_scores, ScoreType, Traversal};
///
/// let mut graph = Graph::with_vertices(4);
/// graph.add_transaction(0, 1, false, None);
/// graph.add_transaction(1, 2, false, None);
///
/// let result =
///     calculate_scores(&graph, ScoreType::Eccentricity, Traversal::undirected(), &Context::new())
///         .unwrap();
///
/// assert_eq!(result.scores, vec![2.0, 1.0, 2.0, 0.0]);
/// assert_eq!(result.subgraphs[0], result.subgraphs[2]);
/// assert_eq!(result.subgraphs[3].len(), 1);
/// ```
pub fn calculate_scores<G: GraphRead>(
    graph: &G,
    score_type: ScoreType,
    traversal: Traversal,
    context: &Context,
) -> Result<PathScores> {
    let indices = Arc::new(traversal_indices(graph, traversal));
    compute_scores(indices, score_type, context)
}

/// Computes the subgraphs reachable from each position of `subgraph`, walking only through
/// positions of `subgraph`.
///
/// Positions outside `subgraph` get an empty set. Used to simulate the removal of vertices
/// without touching the graph.
pub fn calculate_subgraph_paths<G: GraphRead>(
    graph: &G,
    subgraph: &VertexSet,
    traversal: Traversal,
    context: &Context,
) -> Result<Vec<VertexSet>> {
    let indices = traversal_indices(graph, traversal);
    compute_subgraph_paths(
        &indices,
        subgraph,
        traversal.is_symmetric(),
        &context.cancellation,
    )
}

/// Builds the position-indexed adjacency allowed by `traversal`.
pub(crate) fn traversal_indices<G: GraphRead>(graph: &G, traversal: Traversal) -> Indices {
    (0..graph.vertex_count())
        .map(|position| {
            let vertex = graph.vertex(position);
            graph
                .neighbours(vertex)
                .filter(|neighbour| {
                    // Safety: neighbours are joined by a link by definition.
                    let link = graph.link_between(vertex, *neighbour).unwrap();
                    traversal.can_traverse(graph, link, vertex, *neighbour)
                })
                .map(|neighbour| graph.vertex_position(neighbour))
                .collect()
        })
        .collect()
}

/// Runs one search per position, spread over `context.threads()` workers.
pub(crate) fn compute_scores(
    indices: Arc<Indices>,
    score_type: ScoreType,
    context: &Context,
) -> Result<PathScores> {
    let start = Instant::now();
    let num_threads = context.threads();
    let num_nodes = indices.len();

    let mut subgraphs = vec![VertexSet::new(); num_nodes];
    let mut scores = vec![0.0; num_nodes];

    let counter = AtomicUsize::new(0);
    let cancellation = context.cancellation.clone();
    let partials = run_workers(num_threads, move || {
        scoring_task(&counter, &indices, &cancellation, score_type)
    });

    let mut outcome = Ok(());
    for partial in partials {
        match partial {
            Ok(results) => {
                for (index, subgraph, score) in results {
                    subgraphs[index] = subgraph;
                    scores[index] = score;
                }
            }
            Err(e) => outcome = Err(e),
        }
    }
    outcome?;

    debug!(
        vertices = num_nodes,
        threads = num_threads,
        elapsed = ?start.elapsed(),
        "path scoring done"
    );

    Ok(PathScores { subgraphs, scores })
}

/// Searches from every position of `subgraph` without leaving it.
///
/// With `symmetric` adjacency every member of a reached set reaches that same set, so each
/// set is searched once and shared among its members.
pub(crate) fn compute_subgraph_paths(
    indices: &Indices,
    subgraph: &VertexSet,
    symmetric: bool,
    cancellation: &CancellationToken,
) -> Result<Vec<VertexSet>> {
    let mut traversal = vec![VertexSet::new(); indices.len()];

    for index in subgraph.iter() {
        // a reached set always holds its own root
        if !traversal[index].is_empty() {
            continue;
        }
        cancellation.check()?;

        let (reached, _) = search(index, indices, Some(subgraph), ScoreType::Eccentricity);
        if symmetric {
            for member in reached.iter() {
                traversal[member] = reached.clone();
            }
        } else {
            traversal[index] = reached;
        }
    }

    Ok(traversal)
}

/// Runs `task` on `num_threads` workers and collects what each returns. A single worker runs
/// on the caller's thread. A panicking worker is resumed on the caller's thread once joined.
fn run_workers<T, F>(num_threads: usize, task: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    if num_threads <= 1 {
        return vec![task()];
    }

    let task = Arc::new(task);
    let mut handles = Vec::with_capacity(num_threads);

    for _ in 0..num_threads {
        let atask = Arc::clone(&task);
        handles.push(thread::spawn(move || atask()));
    }

    // Join every worker before reporting, so none outlives a cancelled pass.
    let mut results = Vec::with_capacity(num_threads);
    for h in handles {
        match h.join() {
            Ok(result) => results.push(result),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    results
}

/// The worker loop: claims the next unscored position until none are left.
fn scoring_task(
    counter: &AtomicUsize,
    indices: &Indices,
    cancellation: &CancellationToken,
    score_type: ScoreType,
) -> Result<Vec<(usize, VertexSet, f32)>> {
    let start = Instant::now();
    let num_nodes = indices.len();

    // each worker keeps its own results, the caller scatters them by position
    let mut results = Vec::new();

    loop {
        let index = counter.fetch_add(1, Ordering::Relaxed);
        if index >= num_nodes {
            break;
        }
        cancellation.check()?;

        if index % 100 == 0 {
            trace!(node = index, elapsed = ?start.elapsed(), "path scoring");
        }

        let (subgraph, score) = search(index, indices, None, score_type);
        results.push((index, subgraph, score));
    }

    Ok(results)
}

/// Breadth-first search from `index`, optionally confined to `allowed`.
fn search(
    index: usize,
    indices: &Indices,
    allowed: Option<&VertexSet>,
    score_type: ScoreType,
) -> (VertexSet, f32) {
    let num_nodes = indices.len();
    assert!(index < num_nodes, "position {index} out of range");

    let mut distance: Vec<Option<u32>> = vec![None; num_nodes];
    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut reached = VertexSet::new();

    distance[index] = Some(0);
    reached.insert(index);
    queue.push_back(index);

    let mut furthest = 0u32;
    let mut total = 0u64;

    while let Some(current) = queue.pop_front() {
        // Safety: only positions with a distance are queued.
        let next_distance = distance[current].unwrap() + 1;

        for &next in &indices[current] {
            if distance[next].is_some() || allowed.is_some_and(|set| !set.contains(next)) {
                continue;
            }

            distance[next] = Some(next_distance);
            furthest = furthest.max(next_distance);
            total += next_distance as u64;
            reached.insert(next);
            queue.push_back(next);
        }
    }

    let score = match score_type {
        ScoreType::Eccentricity => furthest as f32,
        ScoreType::AverageDistance if reached.len() > 1 => {
            total as f32 / (reached.len() - 1) as f32
        }
        ScoreType::AverageDistance => 0.0,
    };

    (reached, score)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{graph::Graph, test_utils::graph};

    fn set(positions: &[usize]) -> VertexSet {
        positions.iter().copied().collect()
    }

    #[test]
    fn eccentricity_on_a_path() {
        let graph = graph!(5; [0, 1, 2, 3, 4]);

        let result = calculate_scores(
            &graph,
            ScoreType::Eccentricity,
            Traversal::undirected(),
            &Context::new(),
        )
        .unwrap();

        assert_eq!(result.scores, vec![4.0, 3.0, 2.0, 3.0, 4.0]);
        assert!(result
            .subgraphs
            .iter()
            .all(|s| *s == (0..5).collect::<VertexSet>()));
    }

    #[test]
    fn average_distance_on_a_path() {
        let graph = graph!(3; [0, 1, 2]);

        let result = calculate_scores(
            &graph,
            ScoreType::AverageDistance,
            Traversal::undirected(),
            &Context::new(),
        )
        .unwrap();

        assert_eq!(result.scores, vec![1.5, 1.0, 1.5]);
    }

    #[test]
    fn singletons() {
        let graph = graph!(3; [0, 1]);

        let result = calculate_scores(
            &graph,
            ScoreType::Eccentricity,
            Traversal::undirected(),
            &Context::new(),
        )
        .unwrap();

        assert_eq!(result.subgraphs[2], set(&[2]));
        assert_eq!(result.scores[2], 0.0);
    }

    #[test]
    fn loops_are_ignored() {
        let mut graph = Graph::with_vertices(2);
        graph.add_transaction(0, 0, false, None);

        let indices = traversal_indices(&graph, Traversal::undirected());
        assert!(indices[0].is_empty());

        let with_loops = Traversal {
            include_loops: true,
            ..Traversal::undirected()
        };
        assert_eq!(traversal_indices(&graph, with_loops)[0], vec![0]);
    }

    #[test]
    fn directed_traversal() {
        // 0 -> 1 -> 2, 2 - 3 undirected
        let mut graph = Graph::with_vertices(4);
        graph.add_transaction(0, 1, true, None);
        graph.add_transaction(1, 2, true, None);
        graph.add_transaction(2, 3, false, None);

        let context = Context::new();

        let out = calculate_scores(&graph, ScoreType::Eccentricity, Traversal::outgoing(), &context)
            .unwrap();
        assert_eq!(out.subgraphs[0], set(&[0, 1, 2, 3]));
        assert_eq!(out.subgraphs[2], set(&[2, 3]));
        assert_eq!(out.scores[0], 3.0);

        let incoming =
            calculate_scores(&graph, ScoreType::Eccentricity, Traversal::incoming(), &context)
                .unwrap();
        assert_eq!(incoming.subgraphs[0], set(&[0]));
        assert_eq!(incoming.subgraphs[2], set(&[0, 1, 2, 3]));

        let strict = Traversal {
            treat_undirected_bidirectional: false,
            ..Traversal::outgoing()
        };
        let strict = calculate_scores(&graph, ScoreType::Eccentricity, strict, &context).unwrap();
        // 2 - 3 is stored from 2 to 3, so it is walkable that way only
        assert_eq!(strict.subgraphs[0], set(&[0, 1, 2, 3]));
        assert_eq!(strict.subgraphs[3], set(&[3]));
    }

    #[test]
    fn strict_traversal_follows_stored_orientation() {
        // a single undirected transaction stored from 0 to 1
        let mut graph = Graph::with_vertices(2);
        graph.add_transaction(0, 1, false, None);
        let context = Context::new();

        let outgoing = Traversal {
            treat_undirected_bidirectional: false,
            ..Traversal::outgoing()
        };
        let paths = calculate_scores(&graph, ScoreType::Eccentricity, outgoing, &context).unwrap();
        assert_eq!(paths.subgraphs[0], set(&[0, 1]));
        assert_eq!(paths.subgraphs[1], set(&[1]));

        let incoming = Traversal {
            treat_undirected_bidirectional: false,
            ..Traversal::incoming()
        };
        let paths = calculate_scores(&graph, ScoreType::Eccentricity, incoming, &context).unwrap();
        assert_eq!(paths.subgraphs[0], set(&[0]));
        assert_eq!(paths.subgraphs[1], set(&[0, 1]));

        let neither = Traversal {
            include_in: false,
            include_out: false,
            treat_undirected_bidirectional: false,
            include_loops: false,
        };
        assert_eq!(traversal_indices(&graph, neither), Vec::<Vec<usize>>::from([vec![], vec![]]));
    }

    #[test]
    fn symmetric_traversals() {
        assert!(Traversal::undirected().is_symmetric());
        assert!(!Traversal::outgoing().is_symmetric());
        assert!(!Traversal::incoming().is_symmetric());
    }

    #[test]
    fn threads_agree_with_a_single_worker() {
        let graph = graph!(8; [0, 1, 2, 3, 0], [4, 5, 6], [6, 7]);

        let single = calculate_scores(
            &graph,
            ScoreType::Eccentricity,
            Traversal::undirected(),
            &Context::new(),
        )
        .unwrap();
        let multi = calculate_scores(
            &graph,
            ScoreType::Eccentricity,
            Traversal::undirected(),
            &Context::new().with_threads(3),
        )
        .unwrap();

        assert_eq!(single, multi);
    }

    #[test]
    fn subgraph_paths_stay_inside_the_seed_set() {
        // 0 - 1 - 2 - 3, removing 1 splits {0} from {2, 3}.
        let graph = graph!(4; [0, 1, 2, 3]);
        let seeds = set(&[0, 2, 3]);

        let paths =
            calculate_subgraph_paths(&graph, &seeds, Traversal::undirected(), &Context::new())
                .unwrap();

        assert_eq!(paths[0], set(&[0]));
        assert!(paths[1].is_empty());
        assert_eq!(paths[2], set(&[2, 3]));
        assert_eq!(paths[3], set(&[2, 3]));
    }

    #[test]
    fn shared_subgraph_paths_match_searching_every_root() {
        // two triangles and a tail, with 3 left out of the seeds
        let graph = graph!(8; [0, 1, 2, 0], [2, 3, 4], [4, 5, 6, 4], [6, 7]);
        let indices = traversal_indices(&graph, Traversal::undirected());
        let seeds: VertexSet = [0, 1, 2, 4, 5, 6, 7].into_iter().collect();
        let cancellation = CancellationToken::new();

        let shared = compute_subgraph_paths(&indices, &seeds, true, &cancellation).unwrap();
        let searched = compute_subgraph_paths(&indices, &seeds, false, &cancellation).unwrap();

        assert_eq!(shared, searched);
        assert_eq!(shared[0], set(&[0, 1, 2]));
        assert_eq!(shared[7], set(&[4, 5, 6, 7]));
        assert!(shared[3].is_empty());
    }

    #[test]
    fn a_single_worker_runs_on_the_calling_thread() {
        let caller = thread::current().id();

        assert_eq!(run_workers(1, || thread::current().id()), vec![caller]);

        let spawned = run_workers(3, || thread::current().id());
        assert_eq!(spawned.len(), 3);
        assert!(spawned.iter().all(|id| *id != caller));
    }

    #[test]
    fn cancelled() {
        let graph = graph!(3; [0, 1, 2]);
        let cancellation = CancellationToken::new();
        cancellation.cancel();

        for threads in [1, 2] {
            let context = Context::new()
                .with_threads(threads)
                .with_cancellation(cancellation.clone());
            let result = calculate_scores(
                &graph,
                ScoreType::Eccentricity,
                Traversal::undirected(),
                &context,
            );

            assert!(matches!(result, Err(crate::error::Error::Cancelled)));
        }
    }

    #[test]
    fn traversal_deserializes_with_defaults() {
        let traversal: Traversal = serde_json::from_str(r#"{ "include_in": false }"#).unwrap();
        assert_eq!(traversal, Traversal::outgoing());
    }
}
