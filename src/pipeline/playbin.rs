//! The playback coordinator.
//!
//! [`PlayBin`] walks `Null → Ready → Paused → Playing` one step at a time.
//! Every step is synchronous except the second half of Ready→Paused, which
//! runs on a preroll worker thread and completes through
//! [`PlayBin::await_completion`].
//!
//! # Example
//!
//! ```rust
//! use parallax_playbin::config::PlaybinConfig;
//! use parallax_playbin::pipeline::{PipelineState, PlayBin, StateChangeReturn};
//!
//! let config = PlaybinConfig::builder()
//!     .main_locator("redvideo://")
//!     .build()
//!     .unwrap();
//! let playbin = PlayBin::with_defaults(config);
//!
//! assert_eq!(playbin.request_state(PipelineState::Ready), StateChangeReturn::Success);
//! assert_eq!(playbin.request_state(PipelineState::Paused), StateChangeReturn::Async);
//! assert_eq!(playbin.await_completion(None), StateChangeReturn::Success);
//! assert_eq!(playbin.request_state(PipelineState::Null), StateChangeReturn::Success);
//! ```

use super::preroll::{PrerollHandle, PrerollJob, PrerollOutcome, RunResources};
use super::sink_binder::SinkBinder;
use super::source::{SourceResolver, SubFailure, SubResolution};
use super::state::{PipelineState, StateChangeReturn, StateQuery, StateSnapshot, Transition};
use crate::bus::{BusMessage, DiagnosticBus, ElementDiagnostic, ErrorReport, MessageMask};
use crate::caps::StreamDescriptor;
use crate::config::PlaybinConfig;
use crate::element::MediaSink;
use crate::error::Error;
use crate::observability::trace_state_change;
use crate::plugin::{CapabilityResolver, UriHandlerRegistry};
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

// ============================================================================
// Shared state
// ============================================================================

struct Inner {
    current: PipelineState,
    pending: Option<PipelineState>,
    target: PipelineState,
    last_return: StateChangeReturn,
    /// Bumped whenever an in-flight preroll is abandoned.
    generation: u64,
    preroll: Option<PrerollHandle>,
    run: Option<RunResources>,
    /// Sinks left in Ready by Paused→Ready.
    parked: Vec<Arc<dyn MediaSink>>,
}

impl Inner {
    /// Settle a failed Ready→Paused back in Ready.
    fn fail_to_ready(&mut self) -> StateChangeReturn {
        self.current = PipelineState::Ready;
        self.pending = None;
        self.target = PipelineState::Ready;
        self.last_return = StateChangeReturn::Failure;
        StateChangeReturn::Failure
    }
}

/// State shared between the caller and the preroll worker.
struct Shared {
    inner: Mutex<Inner>,
    settled: Condvar,
    element: String,
    bus: DiagnosticBus,
    sources: SourceResolver,
    binder: SinkBinder,
    config: Arc<PlaybinConfig>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    fn post_state_changed(&self, old: PipelineState, new: PipelineState, pending: Option<PipelineState>) {
        trace_state_change(&self.element, old, new);
        self.bus.post(BusMessage::StateChanged {
            source: self.element.clone(),
            old,
            new,
            pending,
        });
    }

    /// Post the reports of a failed run.
    ///
    /// Deferred secondary scheme gaps go first; each decoder gap posts its
    /// diagnostic right before its own report.
    fn report_failure(&self, deferred: &[SubFailure], errors: &[Error]) {
        let engine = self.config.decoder_engine();
        for failure in deferred {
            self.sources.flush_sub_gap(failure, engine);
        }
        for error in errors {
            if let Error::UnresolvedDecoder(caps) = error {
                self.bus
                    .post_diagnostic(ElementDiagnostic::missing_decoder(&self.element, caps.clone()));
            }
            tracing::warn!(element = %self.element, error = %error, "run failed");
            self.bus
                .post_error(ErrorReport::from_error(&self.element, error, engine));
        }
    }

    /// Apply the outcome of the preroll started as `generation`.
    fn commit(&self, generation: u64, outcome: PrerollOutcome) {
        let mut inner = self.lock();
        if inner.generation != generation {
            drop(inner);
            if let PrerollOutcome::Prerolled(run) = outcome {
                tracing::debug!(element = %self.element, "discarding stale preroll");
                run.release(&self.binder, PipelineState::Null);
            }
            return;
        }
        // The worker is finishing; its handle has nothing left to cancel.
        inner.preroll = None;

        match outcome {
            PrerollOutcome::Prerolled(run) => {
                let target = inner.target;
                inner.current = PipelineState::Paused;
                inner.pending = None;
                inner.last_return = StateChangeReturn::Success;
                self.post_state_changed(PipelineState::Ready, PipelineState::Paused, None);

                if target == PipelineState::Playing {
                    match self.binder.set_playing(&run.branches, true) {
                        Ok(()) => {
                            inner.current = PipelineState::Playing;
                            self.post_state_changed(PipelineState::Paused, PipelineState::Playing, None);
                        }
                        Err(e) => {
                            self.report_failure(&[], &[e]);
                            inner.target = PipelineState::Paused;
                            inner.last_return = StateChangeReturn::Failure;
                        }
                    }
                }
                inner.run = Some(run);
                self.bus.post(BusMessage::AsyncDone {
                    source: self.element.clone(),
                });
            }
            PrerollOutcome::Failed { errors, deferred } => {
                self.report_failure(&deferred, &errors);
                inner.fail_to_ready();
            }
            PrerollOutcome::Cancelled => {
                inner.pending = None;
                inner.target = PipelineState::Ready;
                inner.last_return = StateChangeReturn::Failure;
            }
        }
        self.settled.notify_all();
    }
}

// ============================================================================
// PlayBin
// ============================================================================

/// Assembles and drives a playback pipeline for one [`PlaybinConfig`].
pub struct PlayBin {
    shared: Arc<Shared>,
    decoders: Arc<CapabilityResolver>,
}

impl PlayBin {
    /// Create a coordinator resolving through the given registries.
    pub fn new(
        config: PlaybinConfig,
        registry: Arc<UriHandlerRegistry>,
        decoders: Arc<CapabilityResolver>,
    ) -> Self {
        let element = config.name().to_string();
        let bus = DiagnosticBus::new();
        let shared = Shared {
            inner: Mutex::new(Inner {
                current: PipelineState::Null,
                pending: None,
                target: PipelineState::Null,
                last_return: StateChangeReturn::Success,
                generation: 0,
                preroll: None,
                run: None,
                parked: Vec::new(),
            }),
            settled: Condvar::new(),
            sources: SourceResolver::new(registry, bus.clone(), element.clone()),
            binder: SinkBinder::new(element.clone()),
            element,
            bus,
            config: Arc::new(config),
        };
        Self {
            shared: Arc::new(shared),
            decoders,
        }
    }

    /// Create a coordinator with the built-in sources and decoders.
    pub fn with_defaults(config: PlaybinConfig) -> Self {
        Self::new(
            config,
            Arc::new(UriHandlerRegistry::with_builtin()),
            Arc::new(CapabilityResolver::new()),
        )
    }

    /// Element name.
    pub fn name(&self) -> &str {
        &self.shared.element
    }

    /// The configuration.
    pub fn config(&self) -> &PlaybinConfig {
        &self.shared.config
    }

    /// A handle to the bus.
    pub fn bus(&self) -> DiagnosticBus {
        self.shared.bus.clone()
    }

    /// Current and pending state without waiting.
    pub fn current_state(&self) -> StateSnapshot {
        let inner = self.shared.lock();
        StateSnapshot {
            current: inner.current,
            pending: inner.pending,
        }
    }

    /// Streams of the resolved branches, main first.
    ///
    /// Empty unless the pipeline is Paused or Playing.
    pub fn stream_info(&self) -> Vec<StreamDescriptor> {
        self.shared
            .lock()
            .run
            .as_ref()
            .map(RunResources::stream_info)
            .unwrap_or_default()
    }

    /// Request a state change.
    ///
    /// Intermediate states are walked in order. Returns `Async` if
    /// Ready→Paused was started or is still running, in which case the
    /// outcome is available from [`await_completion`](Self::await_completion).
    pub fn request_state(&self, target: PipelineState) -> StateChangeReturn {
        let span = self.shared.config.tracing().playbin_span(&self.shared.element);
        let _guard = span.enter();
        tracing::debug!(requested = %target, "state change requested");

        if target == PipelineState::Null {
            self.shutdown();
            return StateChangeReturn::Success;
        }

        let mut inner = self.shared.lock();
        if inner.pending.is_some() {
            if target >= PipelineState::Paused {
                inner.target = target;
                return StateChangeReturn::Async;
            }
            inner = self.abort_preroll(inner);
        }
        inner.target = target;

        while let Some(next) = inner.current.step_toward(target) {
            let from = inner.current;
            let Some(transition) = Transition::between(from, next) else {
                break;
            };

            let result = match transition {
                Transition::NullToReady => self.enter_ready(),
                Transition::ReadyToPaused => return self.start_preroll(inner),
                Transition::PausedToPlaying => self.set_playing(&mut inner, true),
                Transition::PlayingToPaused => self.set_playing(&mut inner, false),
                Transition::PausedToReady => {
                    self.leave_paused(&mut inner);
                    StateChangeReturn::Success
                }
                Transition::ReadyToNull => unreachable!("handled by shutdown"),
            };

            inner.last_return = result;
            if result == StateChangeReturn::Failure {
                return result;
            }
            inner.current = next;
            self.shared.post_state_changed(from, next, None);
        }

        inner.last_return = StateChangeReturn::Success;
        StateChangeReturn::Success
    }

    /// Wait for an asynchronous transition to finish.
    ///
    /// - `Some(Duration::ZERO)` checks without blocking
    /// - `None` waits indefinitely
    /// - any other value waits at most that long
    ///
    /// Returns the result of the last transition, or `Async` if it is still
    /// in flight when the wait ends.
    pub fn await_completion(&self, timeout: Option<Duration>) -> StateChangeReturn {
        self.get_state(timeout).result
    }

    /// Wait like [`await_completion`](Self::await_completion) and report the
    /// state reached.
    pub fn get_state(&self, timeout: Option<Duration>) -> StateQuery {
        let inner = self.wait(timeout);
        let result = if inner.pending.is_some() {
            StateChangeReturn::Async
        } else {
            inner.last_return
        };
        StateQuery {
            result,
            current: inner.current,
            pending: inner.pending,
        }
    }

    fn wait(&self, timeout: Option<Duration>) -> MutexGuard<'_, Inner> {
        let inner = self.shared.lock();
        let settled = &self.shared.settled;
        match timeout {
            None => settled.wait_while(inner, |i| i.pending.is_some()).unwrap(),
            Some(timeout) if timeout.is_zero() => inner,
            Some(timeout) => {
                settled
                    .wait_timeout_while(inner, timeout, |i| i.pending.is_some())
                    .unwrap()
                    .0
            }
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn enter_ready(&self) -> StateChangeReturn {
        let main = self.shared.config.request().main_locator();
        match self.shared.sources.verify_main(main) {
            Ok(()) => StateChangeReturn::Success,
            Err(e) => {
                self.shared.report_failure(&[], &[e]);
                StateChangeReturn::Failure
            }
        }
    }

    /// Run the synchronous prefix of Ready→Paused and spawn the worker.
    fn start_preroll(&self, mut inner: MutexGuard<'_, Inner>) -> StateChangeReturn {
        let shared = &self.shared;
        let request = shared.config.request();

        let mut deferred = Vec::new();
        let sub = request
            .sub_locator()
            .and_then(|uri| match shared.sources.resolve_sub(uri) {
                SubResolution::Resolved(source) => Some(source),
                SubResolution::Recovered(failure) => {
                    if failure.missing_scheme().is_some() {
                        deferred.push(failure);
                    }
                    None
                }
            });

        let main = match shared.sources.resolve_main(request.main_locator()) {
            Ok(source) => source,
            Err(e) => {
                if let Some(mut sub) = sub {
                    sub.close();
                }
                shared.report_failure(&deferred, &[e]);
                return inner.fail_to_ready();
            }
        };

        let job = PrerollJob {
            element: shared.element.clone(),
            main,
            sub,
            deferred,
            decoders: self.decoders.clone(),
            video_sink: shared.config.video_sink().cloned(),
            audio_sink: shared.config.audio_sink().cloned(),
            binder: shared.binder.clone(),
            tracing: shared.config.tracing().clone(),
        };

        let generation = inner.generation;
        let worker_shared = shared.clone();
        let spawned = PrerollHandle::spawn(&shared.element, move |cancel| {
            let outcome = job.run(&cancel);
            worker_shared.commit(generation, outcome);
        });

        match spawned {
            Ok(handle) => {
                inner.pending = Some(inner.target);
                inner.preroll = Some(handle);
                inner.last_return = StateChangeReturn::Async;
                tracing::debug!(element = %shared.element, "preroll started");
                StateChangeReturn::Async
            }
            Err(e) => {
                shared.report_failure(&[], &[e]);
                inner.fail_to_ready()
            }
        }
    }

    fn set_playing(&self, inner: &mut Inner, playing: bool) -> StateChangeReturn {
        let Some(run) = inner.run.as_ref() else {
            return StateChangeReturn::Success;
        };
        match self.shared.binder.set_playing(&run.branches, playing) {
            Ok(()) => StateChangeReturn::Success,
            Err(e) => {
                self.shared.report_failure(&[], &[e]);
                StateChangeReturn::Failure
            }
        }
    }

    fn leave_paused(&self, inner: &mut Inner) {
        if let Some(run) = inner.run.take() {
            let parked = run.release(&self.shared.binder, PipelineState::Ready);
            inner.parked.extend(parked);
        }
    }

    /// Abandon the in-flight preroll, leaving the pipeline in Ready.
    fn abort_preroll<'a>(&'a self, mut inner: MutexGuard<'a, Inner>) -> MutexGuard<'a, Inner> {
        inner.generation += 1;
        inner.pending = None;
        let handle = inner.preroll.take();
        drop(inner);

        if let Some(handle) = handle {
            tracing::debug!(element = %self.shared.element, running = handle.is_running(), "cancelling preroll");
            handle.cancel_and_join();
        }

        let mut inner = self.shared.lock();
        inner.last_return = StateChangeReturn::Success;
        self.shared.settled.notify_all();
        inner
    }

    /// Move to Null from any state. Never fails; safe to repeat.
    fn shutdown(&self) {
        let inner = self.shared.lock();
        let mut inner = if inner.pending.is_some() {
            self.abort_preroll(inner)
        } else {
            inner
        };

        let old = inner.current;
        let run = inner.run.take();
        let parked = std::mem::take(&mut inner.parked);
        inner.current = PipelineState::Null;
        inner.target = PipelineState::Null;
        inner.pending = None;
        inner.last_return = StateChangeReturn::Success;
        self.shared.settled.notify_all();
        drop(inner);

        let binder = &self.shared.binder;
        if let Some(run) = run {
            let left = run.release(binder, PipelineState::Null);
            binder.release_parked(left);
        }
        binder.release_parked(parked);

        // Queued state notifications are stale once the pipeline is down;
        // diagnostics and reports stay until consumed.
        let stale = self
            .shared
            .bus
            .discard(MessageMask::STATE_CHANGED | MessageMask::ASYNC_DONE);
        tracing::trace!(element = %self.shared.element, stale, "discarded state notifications");

        if old != PipelineState::Null {
            self.shared.post_state_changed(old, PipelineState::Null, None);
            tracing::info!(element = %self.shared.element, "released");
        }
    }
}

impl Drop for PlayBin {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for PlayBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.current_state();
        f.debug_struct("PlayBin")
            .field("name", &self.shared.element)
            .field("current", &state.current)
            .field("pending", &state.pending)
            .field("streams", &self.stream_info().len())
            .finish()
    }
}
