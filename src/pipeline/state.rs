//! Lifecycle states and transition results.

use std::fmt;

/// State of the pipeline or of a single element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum PipelineState {
    /// Initial state, no resources held.
    #[default]
    Null,
    /// Configuration checked, nothing opened.
    Ready,
    /// Streams resolved and prerolled, clock stopped.
    Paused,
    /// Running.
    Playing,
}

impl PipelineState {
    /// The next state one step toward `target`, or `None` if already there.
    pub fn step_toward(self, target: PipelineState) -> Option<PipelineState> {
        use PipelineState::*;
        if self == target {
            return None;
        }
        let next = if target > self {
            match self {
                Null => Ready,
                Ready => Paused,
                Paused | Playing => Playing,
            }
        } else {
            match self {
                Playing => Paused,
                Paused => Ready,
                Ready | Null => Null,
            }
        };
        Some(next)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Null => "NULL",
            PipelineState::Ready => "READY",
            PipelineState::Paused => "PAUSED",
            PipelineState::Playing => "PLAYING",
        };
        f.write_str(name)
    }
}

/// Result of a state change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateChangeReturn {
    /// The change completed.
    Success,
    /// The change continues in the background.
    Async,
    /// The change failed.
    Failure,
}

/// A single-step transition between adjacent states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Null to Ready.
    NullToReady,
    /// Ready to Paused.
    ReadyToPaused,
    /// Paused to Playing.
    PausedToPlaying,
    /// Playing to Paused.
    PlayingToPaused,
    /// Paused to Ready.
    PausedToReady,
    /// Ready to Null.
    ReadyToNull,
}

impl Transition {
    /// The transition between two adjacent states.
    pub fn between(from: PipelineState, to: PipelineState) -> Option<Self> {
        use PipelineState::*;
        match (from, to) {
            (Null, Ready) => Some(Transition::NullToReady),
            (Ready, Paused) => Some(Transition::ReadyToPaused),
            (Paused, Playing) => Some(Transition::PausedToPlaying),
            (Playing, Paused) => Some(Transition::PlayingToPaused),
            (Paused, Ready) => Some(Transition::PausedToReady),
            (Ready, Null) => Some(Transition::ReadyToNull),
            _ => None,
        }
    }
}

/// Current and pending state of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateSnapshot {
    /// State reached so far.
    pub current: PipelineState,
    /// State being transitioned to, if any.
    pub pending: Option<PipelineState>,
}

/// Answer to a state query with a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateQuery {
    /// Outcome of the last transition, or `Async` if still pending.
    pub result: StateChangeReturn,
    /// Current state.
    pub current: PipelineState,
    /// Pending state, if a transition is still in flight.
    pub pending: Option<PipelineState>,
}
