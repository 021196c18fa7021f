//! Runtime configuration shared by every metric in a pass.

use serde::Deserialize;

use crate::cancel::CancellationToken;

pub const MIN_NUM_THREADS: usize = 1;
pub const MAX_NUM_THREADS: usize = 128;

/// Settings that apply to a whole pass rather than to a single metric.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Context {
    /// Number of worker threads used for the per-vertex path scoring. Clamped to
    /// `MIN_NUM_THREADS..=MAX_NUM_THREADS`; the default of one keeps the pass on a single
    /// worker.
    pub num_threads: usize,
    /// Checked once per outer-loop iteration.
    #[serde(skip)]
    pub cancellation: CancellationToken,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub(crate) fn threads(&self) -> usize {
        self.num_threads.clamp(MIN_NUM_THREADS, MAX_NUM_THREADS)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self {
            num_threads: MIN_NUM_THREADS,
            cancellation: CancellationToken::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threads_are_clamped() {
        assert_eq!(Context::new().with_threads(0).threads(), MIN_NUM_THREADS);
        assert_eq!(Context::new().with_threads(4).threads(), 4);
        assert_eq!(Context::new().with_threads(10_000).threads(), MAX_NUM_THREADS);
    }

    #[test]
    fn deserialize_with_defaults() {
        let context: Context = serde_json::from_str("{}").unwrap();
        assert_eq!(context.num_threads, 1);

        let context: Context = serde_json::from_str(r#"{ "num_threads": 8 }"#).unwrap();
        assert_eq!(context.threads(), 8);
        assert!(!context.cancellation.is_cancelled());
    }
}
