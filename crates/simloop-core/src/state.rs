//! Loop lifecycle states and stop codes.

use std::fmt;

/// Lifecycle state of a scheduler.
///
/// Transitions: `Stopped → Initialized` (initialize), `Initialized → Running`
/// (execute), `Running → Stopped` (abort or terminate).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LoopState {
    /// Not initialized; configuration may be changed.
    #[default]
    Stopped = 0,
    /// Components initialized, clock reset, not yet executing.
    Initialized = 1,
    /// Executing passes.
    Running = 2,
}

impl LoopState {
    /// Decode from the `repr(u8)` discriminant. Unknown values map to `Stopped`.
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Initialized,
            2 => Self::Running,
            _ => Self::Stopped,
        }
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Initialized => write!(f, "initialized"),
            Self::Running => write!(f, "running"),
        }
    }
}

/// Terminal code of a stop condition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StopCode {
    /// Not stopped.
    #[default]
    None,
    /// The run failed its objectives.
    ObjectivesMissed,
    /// The run reached its objectives.
    ObjectivesReached,
    /// The run ended regularly.
    Ended,
}

impl fmt::Display for StopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::ObjectivesMissed => write!(f, "objectives missed"),
            Self::ObjectivesReached => write!(f, "objectives reached"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

/// Embeddable stop-condition state.
///
/// Starts at [`StopCode::None`]. Once a code is set it is terminal until
/// [`reset`](StopState::reset): later writes are ignored, so repeated
/// writes of the same code are idempotent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StopState {
    code: StopCode,
}

impl StopState {
    /// A fresh, unstopped state.
    pub const fn new() -> Self {
        Self {
            code: StopCode::None,
        }
    }

    /// Current code.
    pub fn code(&self) -> StopCode {
        self.code
    }

    /// Whether a terminal code has been set.
    pub fn has_stopped(&self) -> bool {
        self.code != StopCode::None
    }

    /// Set `code` unless a terminal code is already present.
    pub fn stop(&mut self, code: StopCode) {
        if self.code == StopCode::None {
            self.code = code;
        }
    }

    /// Stop with [`StopCode::ObjectivesMissed`].
    pub fn failed(&mut self) {
        self.stop(StopCode::ObjectivesMissed);
    }

    /// Stop with [`StopCode::ObjectivesReached`].
    pub fn success(&mut self) {
        self.stop(StopCode::ObjectivesReached);
    }

    /// Stop with [`StopCode::Ended`].
    pub fn end(&mut self) {
        self.stop(StopCode::Ended);
    }

    /// Back to [`StopCode::None`].
    pub fn reset(&mut self) {
        self.code = StopCode::None;
    }
}
