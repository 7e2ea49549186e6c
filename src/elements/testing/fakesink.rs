//! A sink that records its state history.

use crate::element::MediaSink;
use crate::error::{Error, Result};
use crate::pipeline::{PipelineState, StateSnapshot, Transition};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A sink that discards everything and records every state step.
///
/// This is useful for:
/// - Checking that a sink with no matching stream is never touched
/// - Checking that teardown releases a sink exactly once
/// - Injecting a state change failure at a given step
///
/// # Example
///
/// ```rust
/// use parallax_playbin::elements::FakeSink;
/// use parallax_playbin::element::MediaSink;
/// use parallax_playbin::pipeline::PipelineState;
///
/// let sink = FakeSink::new("video-out");
/// sink.set_state(PipelineState::Paused).unwrap();
/// assert_eq!(sink.state().current, PipelineState::Paused);
/// assert_eq!(sink.transition_count(), 2);
/// ```
pub struct FakeSink {
    name: String,
    state: Mutex<StateSnapshot>,
    fail_on: Option<Transition>,
    history: Mutex<Vec<Transition>>,
    transitions: AtomicUsize,
}

impl FakeSink {
    /// Create a sink in the Null state.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(StateSnapshot::default()),
            fail_on: None,
            history: Mutex::new(Vec::new()),
            transitions: AtomicUsize::new(0),
        }
    }

    /// Refuse `transition` whenever it is attempted.
    pub fn failing_on(mut self, transition: Transition) -> Self {
        self.fail_on = Some(transition);
        self
    }

    /// Number of completed single-step transitions.
    pub fn transition_count(&self) -> usize {
        self.transitions.load(Ordering::SeqCst)
    }

    /// Number of completed Ready→Null transitions.
    pub fn release_count(&self) -> usize {
        self.count_of(Transition::ReadyToNull)
    }

    /// Number of completed Null→Ready transitions.
    pub fn activation_count(&self) -> usize {
        self.count_of(Transition::NullToReady)
    }

    /// Every completed transition in order.
    pub fn history(&self) -> Vec<Transition> {
        self.history.lock().unwrap().clone()
    }

    fn count_of(&self, transition: Transition) -> usize {
        self.history
            .lock()
            .unwrap()
            .iter()
            .filter(|t| **t == transition)
            .count()
    }
}

impl MediaSink for FakeSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_state(&self, target: PipelineState) -> Result<()> {
        let mut state = self.state.lock().unwrap();

        while let Some(next) = state.current.step_toward(target) {
            let Some(transition) = Transition::between(state.current, next) else {
                break;
            };
            if self.fail_on == Some(transition) {
                return Err(Error::state_change(
                    &self.name,
                    format!("refused {} -> {}", state.current, next),
                ));
            }

            tracing::trace!(sink = %self.name, from = %state.current, to = %next, "sink step");
            state.current = next;

            self.history.lock().unwrap().push(transition);
            self.transitions.fetch_add(1, Ordering::SeqCst);
        }

        Ok(())
    }

    fn state(&self) -> StateSnapshot {
        *self.state.lock().unwrap()
    }
}

impl std::fmt::Debug for FakeSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeSink")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("transitions", &self.transition_count())
            .finish()
    }
}
