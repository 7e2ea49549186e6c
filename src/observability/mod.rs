//! Observability: structured logging and spans via `tracing`.
//!
//! The crate emits:
//! - a `playbin` span around each state change request
//! - a `branch` span around each branch assembled on the preroll worker
//! - `info` events for completed state changes, `debug` events for
//!   resolution decisions and recovered secondary failures
//!
//! ## Example
//!
//! ```rust,ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("parallax_playbin=debug")
//!     .init();
//! ```

mod tracing_support;

pub use tracing_support::{
    TracingConfig, span_branch, span_playbin, trace_state_change,
};
