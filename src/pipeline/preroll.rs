//! Background half of the Ready→Paused transition.
//!
//! The worker probes the opened sources, resolves a decoder per stream and
//! prerolls the sinks of resolved branches. It owns everything it builds
//! until the coordinator commits the result; a cancelled or failed run is
//! released by whoever holds it at that point.

use super::PipelineState;
use super::branch::{Branch, BranchOrigin};
use super::sink_binder::SinkBinder;
use super::source::SubFailure;
use crate::caps::{StreamDescriptor, StreamKind};
use crate::element::{MediaSink, UriSource};
use crate::error::{Error, Result};
use crate::observability::TracingConfig;
use crate::plugin::CapabilityResolver;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

// ============================================================================
// Prerolled run
// ============================================================================

/// Resources of one run: opened sources and assembled branches.
#[derive(Debug)]
pub(crate) struct RunResources {
    pub(crate) main: Box<dyn UriSource>,
    pub(crate) sub: Option<Box<dyn UriSource>>,
    pub(crate) branches: Vec<Branch>,
}

impl RunResources {
    /// Release sinks to `target` and close the sources.
    ///
    /// Returns sinks left above Null.
    pub(crate) fn release(
        mut self,
        binder: &SinkBinder,
        target: PipelineState,
    ) -> Vec<Arc<dyn MediaSink>> {
        let parked = binder.release(&mut self.branches, target);
        if let Some(sub) = self.sub.as_mut() {
            sub.close();
        }
        self.main.close();
        parked
    }

    /// Descriptors of resolved branches, main first.
    pub(crate) fn stream_info(&self) -> Vec<StreamDescriptor> {
        let mut resolved: Vec<&Branch> = self.branches.iter().filter(|b| b.resolved).collect();
        resolved.sort_by_key(|b| b.origin == BranchOrigin::Sub);
        resolved
            .into_iter()
            .filter_map(|b| b.stream.clone())
            .collect()
    }
}

/// Result of a preroll run.
#[derive(Debug)]
pub(crate) enum PrerollOutcome {
    /// All main streams resolved and every bound sink prerolled.
    Prerolled(RunResources),
    /// The run failed. Resources are already released.
    Failed {
        errors: Vec<Error>,
        deferred: Vec<SubFailure>,
    },
    /// The cancel flag was raised. Resources are already released.
    Cancelled,
}

// ============================================================================
// Job
// ============================================================================

/// Inputs of a preroll run.
pub(crate) struct PrerollJob {
    pub(crate) element: String,
    pub(crate) main: Box<dyn UriSource>,
    pub(crate) sub: Option<Box<dyn UriSource>>,
    pub(crate) deferred: Vec<SubFailure>,
    pub(crate) decoders: Arc<CapabilityResolver>,
    pub(crate) video_sink: Option<Arc<dyn MediaSink>>,
    pub(crate) audio_sink: Option<Arc<dyn MediaSink>>,
    pub(crate) binder: SinkBinder,
    pub(crate) tracing: TracingConfig,
}

impl PrerollJob {
    /// Run to completion, checking `cancel` between steps.
    pub(crate) fn run(mut self, cancel: &AtomicBool) -> PrerollOutcome {
        let cancelled = || cancel.load(Ordering::Acquire);

        let main_streams = match self.main.probe() {
            Ok(streams) if streams.is_empty() => {
                let err = Error::TypeNotFound(self.main.name().to_string());
                return self.fail(Vec::new(), vec![err]);
            }
            Ok(streams) => streams,
            Err(e) => return self.fail(Vec::new(), vec![e]),
        };

        let sub_streams = self.probe_sub();
        if cancelled() {
            return self.cancel(Vec::new());
        }

        let mut branches = Vec::new();
        let mut errors = Vec::new();
        for stream in main_streams {
            match self.decode(BranchOrigin::Main, stream) {
                Ok(branch) => branches.push(branch),
                Err(e) => errors.push(e),
            }
        }
        for stream in sub_streams {
            match self.decode(BranchOrigin::Sub, stream) {
                Ok(branch) => branches.push(branch),
                Err(e) => {
                    tracing::debug!(element = %self.element, error = %e, "dropping sub stream");
                }
            }
        }

        if !errors.is_empty() {
            return self.fail(branches, errors);
        }
        if cancelled() {
            return self.cancel(branches);
        }

        if let Err(e) = self.bind_sinks(&mut branches) {
            return self.fail(branches, vec![e]);
        }
        if cancelled() {
            return self.cancel(branches);
        }

        PrerollOutcome::Prerolled(RunResources {
            main: self.main,
            sub: self.sub,
            branches,
        })
    }

    fn probe_sub(&mut self) -> Vec<StreamDescriptor> {
        let Some(sub) = self.sub.as_mut() else {
            return Vec::new();
        };
        match sub.probe() {
            Ok(streams) => streams,
            Err(e) => {
                tracing::debug!(element = %self.element, source = sub.name(), error = %e, "sub probe failed");
                sub.close();
                self.sub = None;
                Vec::new()
            }
        }
    }

    /// Resolve and configure a decoder for one stream.
    fn decode(&self, origin: BranchOrigin, stream: StreamDescriptor) -> Result<Branch> {
        let span = self
            .tracing
            .branch_span(&self.element, stream.kind.as_str(), origin.as_str());
        let _guard = span.enter();

        let mut decoder = self
            .decoders
            .resolve(&stream.caps)
            .map_err(|_| Error::UnresolvedDecoder(stream.caps.clone()))?;
        let output = decoder.negotiate(&stream.caps)?;
        tracing::debug!(decoder = decoder.name(), output = %output, "branch resolved");
        Ok(Branch::resolved(origin, stream, decoder, output))
    }

    /// Bind the first resolved branch of each kind to its configured sink.
    fn bind_sinks(&self, branches: &mut Vec<Branch>) -> Result<()> {
        let sinks = [
            (StreamKind::Video, self.video_sink.clone()),
            (StreamKind::Audio, self.audio_sink.clone()),
        ];

        for (kind, sink) in sinks {
            let Some(sink) = sink else { continue };
            match branches
                .iter_mut()
                .find(|b| b.kind == kind && b.resolved && b.bound_sink.is_none())
            {
                Some(branch) => self.binder.bind(branch, sink)?,
                None => {
                    let mut placeholder = Branch::unresolved(kind, sink.clone());
                    self.binder.bind(&mut placeholder, sink)?;
                    branches.push(placeholder);
                }
            }
        }
        Ok(())
    }

    fn release(&mut self, mut branches: Vec<Branch>) {
        self.binder.release(&mut branches, PipelineState::Null);
        if let Some(sub) = self.sub.as_mut() {
            sub.close();
        }
        self.main.close();
    }

    fn fail(mut self, branches: Vec<Branch>, errors: Vec<Error>) -> PrerollOutcome {
        self.release(branches);
        PrerollOutcome::Failed {
            errors,
            deferred: std::mem::take(&mut self.deferred),
        }
    }

    fn cancel(mut self, branches: Vec<Branch>) -> PrerollOutcome {
        tracing::debug!(element = %self.element, "preroll cancelled");
        self.release(branches);
        PrerollOutcome::Cancelled
    }
}

// ============================================================================
// Worker handle
// ============================================================================

/// Handle to a running preroll worker thread.
#[derive(Debug)]
pub(crate) struct PrerollHandle {
    handle: Option<JoinHandle<()>>,
    cancel: Arc<AtomicBool>,
}

impl PrerollHandle {
    /// Spawn `body` on a named worker thread.
    ///
    /// `body` receives the cancel flag shared with this handle.
    pub(crate) fn spawn<F>(name: &str, body: F) -> Result<Self>
    where
        F: FnOnce(Arc<AtomicBool>) + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = cancel.clone();
        let handle = std::thread::Builder::new()
            .name(format!("{}-preroll", name))
            .spawn(move || body(worker_cancel))?;

        Ok(Self {
            handle: Some(handle),
            cancel,
        })
    }

    /// Raise the cancel flag.
    pub(crate) fn signal_cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    /// Whether the thread is still running.
    pub(crate) fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel and wait for the thread to exit.
    pub(crate) fn cancel_and_join(mut self) {
        self.signal_cancel();
        if let Some(handle) = self.handle.take() {
            if handle.thread().id() == std::thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                tracing::warn!("preroll worker panicked");
            }
        }
    }
}

impl Drop for PrerollHandle {
    fn drop(&mut self) {
        self.signal_cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caps::Caps;
    use crate::elements::{CodecSrc, FakeSink, RedVideoSrc};
    use crate::locator::Locator;

    fn job(main: Box<dyn UriSource>, video: Option<Arc<FakeSink>>, audio: Option<Arc<FakeSink>>) -> PrerollJob {
        PrerollJob {
            element: "pb".into(),
            main,
            sub: None,
            deferred: Vec::new(),
            decoders: Arc::new(CapabilityResolver::new()),
            video_sink: video.map(|s| s as Arc<dyn MediaSink>),
            audio_sink: audio.map(|s| s as Arc<dyn MediaSink>),
            binder: SinkBinder::new("pb"),
            tracing: TracingConfig::all(),
        }
    }

    fn redvideo() -> Box<dyn UriSource> {
        let mut src = RedVideoSrc::new();
        src.set_locator(&Locator::parse("redvideo://").unwrap()).unwrap();
        Box::new(src)
    }

    #[test]
    fn test_video_only_run() {
        let video = Arc::new(FakeSink::new("video"));
        let audio = Arc::new(FakeSink::new("audio"));
        let outcome = job(redvideo(), Some(video.clone()), Some(audio.clone()))
            .run(&AtomicBool::new(false));

        let PrerollOutcome::Prerolled(run) = outcome else {
            panic!("expected preroll");
        };
        assert_eq!(run.stream_info().len(), 1);
        assert_eq!(run.branches.len(), 2);
        assert_eq!(video.state().current, PipelineState::Paused);
        assert_eq!(audio.transition_count(), 0);
    }

    #[test]
    fn test_decoder_gap() {
        let video = Arc::new(FakeSink::new("video"));
        let outcome = job(Box::new(CodecSrc::new()), Some(video.clone()), None)
            .run(&AtomicBool::new(false));

        let PrerollOutcome::Failed { errors, .. } = outcome else {
            panic!("expected failure");
        };
        assert_eq!(errors.len(), 1);
        assert!(
            matches!(&errors[0], Error::UnresolvedDecoder(caps) if *caps == Caps::new("application/x-codec"))
        );
        assert_eq!(video.transition_count(), 0);
    }

    #[test]
    fn test_cancelled_before_binding() {
        let video = Arc::new(FakeSink::new("video"));
        let outcome = job(redvideo(), Some(video.clone()), None).run(&AtomicBool::new(true));
        assert!(matches!(outcome, PrerollOutcome::Cancelled));
        assert_eq!(video.transition_count(), 0);
    }

    #[test]
    fn test_handle_join() {
        let handle = PrerollHandle::spawn("pb", |cancel| {
            while !cancel.load(Ordering::Acquire) {
                std::thread::yield_now();
            }
        })
        .unwrap();
        assert!(handle.is_running());
        handle.cancel_and_join();
    }
}
