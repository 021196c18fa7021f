/// Builds an undirected [`Graph`](crate::graph::Graph) with `n` vertices (ids `0..n`) and one
/// flat transaction between each consecutive pair of every path.
macro_rules! graph {
    ($n:expr; $($path:expr),*) => {{
        #[allow(unused_mut)]
        let mut graph = $crate::graph::Graph::with_vertices($n);

        $(
            let mut iter = $path.into_iter().peekable();
            while let (Some(a), Some(b)) = (iter.next(), iter.peek()) {
                graph.add_transaction(a, *b, false, None);
            }
        )*

        graph
    }};
}

pub(crate) use graph;
