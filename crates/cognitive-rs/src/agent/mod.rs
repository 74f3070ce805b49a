//! Agent runtime: the [`Runner`] loop and its supporting pieces.
//!
//! - [`runner::Runner`] — the tool-use loop over a [`Model`]. Start here.
//! - [`session::Session`] — one conversation's typed per-session state.
//! - [`hooks`] — [`HistoryProcessor`] hooks run before every model call,
//!   plus the [`HistoryDump`] viewer.
//! - [`events`] — [`EventHandler`] trait and [`RunEvent`] enum for
//!   observing the loop.
//! - [`config::RunnerConfig`] — round limit and tool-call concurrency.

pub mod config;
pub mod events;
pub mod hooks;
pub mod runner;
pub mod session;

pub use config::RunnerConfig;
pub use events::{EventHandler, FnEventHandler, LoggingHandler, NoopHandler, RunEvent};
pub use hooks::{FnHistoryProcessor, HistoryDump, HistoryProcessor, render_history};
pub use runner::{FnModel, Model, ModelFuture, RunError, RunResult, Runner};
pub use session::{Session, SessionError};
