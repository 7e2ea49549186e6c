//! Pipeline assembly and lifecycle.
//!
//! - [`PlayBin`]: the coordinator and its state machine
//! - [`SourceResolver`]: main (fatal) and secondary (recoverable) locators
//! - [`SinkBinder`]: sink activation for resolved branches
//! - [`Branch`]: one decoded stream of a run
//!
//! # Example
//!
//! ```rust,ignore
//! use parallax_playbin::prelude::*;
//!
//! let playbin = PlayBin::with_defaults(config);
//! if playbin.request_state(PipelineState::Paused) == StateChangeReturn::Async {
//!     playbin.await_completion(None);
//! }
//! for stream in playbin.stream_info() {
//!     println!("{}: {}", stream.kind, stream.caps);
//! }
//! ```

mod branch;
mod playbin;
mod preroll;
mod sink_binder;
mod source;
mod state;

pub use branch::{Branch, BranchOrigin};
pub use playbin::PlayBin;
pub use sink_binder::SinkBinder;
pub use source::{SourceResolver, SubFailure, SubResolution};
pub use state::{PipelineState, StateChangeReturn, StateQuery, StateSnapshot, Transition};
