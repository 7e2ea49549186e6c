//! Sink activation for resolved branches.

use super::PipelineState;
use super::branch::Branch;
use crate::element::MediaSink;
use crate::error::Result;
use std::sync::Arc;

/// Binds application sinks to branches and drives their state.
///
/// Only branches with a resolved stream move their sink out of Null. A
/// sink attached to an unresolved branch is left untouched for the whole
/// run.
#[derive(Debug, Clone)]
pub struct SinkBinder {
    element: String,
}

impl SinkBinder {
    /// Create a binder logging as `element`.
    pub fn new(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
        }
    }

    /// Attach `sink` to `branch` and preroll it if the branch is resolved.
    ///
    /// On failure the branch is still marked active so that a later release
    /// returns the sink from whatever state it reached.
    pub fn bind(&self, branch: &mut Branch, sink: Arc<dyn MediaSink>) -> Result<()> {
        branch.bound_sink = Some(sink.clone());
        if !branch.resolved {
            tracing::debug!(element = %self.element, sink = sink.name(), kind = %branch.kind, "no stream for sink, leaving it idle");
            return Ok(());
        }

        branch.active = true;
        sink.set_state(PipelineState::Paused)?;
        tracing::debug!(element = %self.element, sink = sink.name(), kind = %branch.kind, "sink prerolled");
        Ok(())
    }

    /// Move every active sink to Playing or back to Paused.
    pub fn set_playing(&self, branches: &[Branch], playing: bool) -> Result<()> {
        let target = if playing {
            PipelineState::Playing
        } else {
            PipelineState::Paused
        };
        for sink in active_sinks(branches) {
            sink.set_state(target)?;
        }
        Ok(())
    }

    /// Return every active sink to `target` and deactivate the branches.
    ///
    /// Returns the sinks that are still above Null, so a caller releasing
    /// to Ready can finish them later. Failures are logged; releasing never
    /// fails.
    pub fn release(&self, branches: &mut [Branch], target: PipelineState) -> Vec<Arc<dyn MediaSink>> {
        let mut parked = Vec::new();
        for branch in branches.iter_mut().filter(|b| b.active) {
            branch.active = false;
            let Some(sink) = branch.bound_sink.clone() else {
                continue;
            };
            if let Err(e) = sink.set_state(target) {
                tracing::warn!(element = %self.element, sink = sink.name(), error = %e, "sink release failed");
            }
            if target != PipelineState::Null {
                parked.push(sink);
            }
        }
        parked
    }

    /// Return parked sinks to Null.
    pub fn release_parked(&self, sinks: Vec<Arc<dyn MediaSink>>) {
        for sink in sinks {
            if let Err(e) = sink.set_state(PipelineState::Null) {
                tracing::warn!(element = %self.element, sink = sink.name(), error = %e, "sink release failed");
            }
        }
    }
}

fn active_sinks(branches: &[Branch]) -> impl Iterator<Item = &Arc<dyn MediaSink>> {
    branches
        .iter()
        .filter(|b| b.active)
        .filter_map(|b| b.bound_sink.as_ref())
}
