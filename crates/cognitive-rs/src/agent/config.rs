//! Configuration for the [`Runner`](super::runner::Runner).
//!
//! ```ignore
//! let config = RunnerConfig::default()
//!     .with_max_rounds(10)
//!     .with_parallel_tool_calls(true);
//! ```

/// Default round limit for a run.
pub const DEFAULT_MAX_ROUNDS: u32 = 20;

/// Runner settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Maximum model calls in one run. Default: 20.
    pub max_rounds: u32,
    /// Execute the tool calls of one response concurrently. Results are
    /// still appended in call order. Default: false.
    pub parallel_tool_calls: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            parallel_tool_calls: false,
        }
    }
}

impl RunnerConfig {
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_parallel_tool_calls(mut self, parallel: bool) -> Self {
        self.parallel_tool_calls = parallel;
        self
    }
}
