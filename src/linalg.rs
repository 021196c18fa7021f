//! Dense matrices over the graph: compaction, Laplacian and its pseudoinverse.

use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector, SymmetricEigen};

use crate::access::{GraphRead, VertexId};

/// Eigenvalues at or below this magnitude are treated as zero when inverting.
const EIGENVALUE_TOLERANCE: f64 = 1e-9;

/// Maps the ids of the vertices present in the graph onto the dense range `0..n`.
///
/// Ids may be sparse once vertices have been removed. The index is sorted by id, so matrix
/// rows keep the same relative order between passes.
pub(crate) fn compaction_index<G: GraphRead>(graph: &G) -> BTreeMap<VertexId, usize> {
    let mut vertices: Vec<VertexId> = (0..graph.vertex_count())
        .map(|position| graph.vertex(position))
        .collect();
    vertices.sort_unstable();

    vertices
        .iter()
        .enumerate()
        .map(|(i, &vertex)| (vertex, i))
        .collect()
}

/// Constructs the adjacency matrix of the compacted vertices. Every non-loop link is one unit
/// of conductance regardless of its transactions, so the matrix is symmetric.
pub(crate) fn adjacency_matrix<G: GraphRead>(
    graph: &G,
    index: &BTreeMap<VertexId, usize>,
) -> DMatrix<f64> {
    let n = index.len();
    let mut matrix = DMatrix::<f64>::zeros(n, n);

    for link in graph.links() {
        let (low, high) = (graph.link_low_vertex(link), graph.link_high_vertex(link));
        if low == high {
            continue;
        }

        // Safety: links only join vertices present in the graph, all of which are indexed.
        let i = index[&low];
        let j = index[&high];

        matrix[(i, j)] = 1.0;
        matrix[(j, i)] = 1.0;
    }

    matrix
}

/// Constructs the Laplacian `D - A` of the compacted vertices.
///
/// # Examples
///
/// For the path `0 - 1 - 2`:
///
/// ```text
///  ┌          ┐
///  │  1 -1  0 │
///  │ -1  2 -1 │
///  │  0 -1  1 │
///  └          ┘
/// ```
pub(crate) fn laplacian_matrix<G: GraphRead>(
    graph: &G,
    index: &BTreeMap<VertexId, usize>,
) -> DMatrix<f64> {
    let adjacency_matrix = adjacency_matrix(graph, index);
    let degrees: DVector<f64> = adjacency_matrix.column_sum();

    DMatrix::from_diagonal(&degrees) - adjacency_matrix
}

/// Computes the Moore-Penrose pseudoinverse of a symmetric matrix from its eigendecomposition.
///
/// A Laplacian is singular (once per component), so a plain inverse doesn't exist. Inverting
/// only the non-zero eigenvalues keeps the result well defined on disconnected graphs, where
/// it is the block-diagonal of each component's pseudoinverse.
pub(crate) fn pseudo_inverse(matrix: DMatrix<f64>) -> DMatrix<f64> {
    let n = matrix.nrows();
    let mut inverse = DMatrix::<f64>::zeros(n, n);

    // Early return if the matrix is empty, the decomposition requires at least a 1x1 matrix.
    if matrix.is_empty() {
        return inverse;
    }

    let eigen = SymmetricEigen::new(matrix);
    let largest = eigen.eigenvalues.amax();
    let tolerance = EIGENVALUE_TOLERANCE.max(largest * n as f64 * f64::EPSILON);

    for (value, vector) in eigen
        .eigenvalues
        .iter()
        .zip(eigen.eigenvectors.column_iter())
    {
        if value.abs() <= tolerance {
            continue;
        }

        let vector = vector.clone_owned();
        inverse += &vector * vector.transpose() / *value;
    }

    inverse
}
