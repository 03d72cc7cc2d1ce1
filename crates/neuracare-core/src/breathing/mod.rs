//! Guided-breathing phase machine.
//!
//! The machine cycles while active:
//!
//! ```text
//! Idle --Start--> Inhale (4s) --Elapsed--> Hold (4s) --Elapsed--> Exhale (6s) --Elapsed--> Inhale ...
//!   ^                                                                                        |
//!   +----------------------------------- Stop (from any phase) -----------------------------+
//! ```
//!
//! [`transition`] is the pure transition function; [`PhaseTimer`] drives it
//! on the tokio clock.

pub mod timer;

use std::time::Duration;

pub use timer::PhaseTimer;

/// One phase of the breathing cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BreathingPhase {
    #[default]
    Idle,
    Inhale,
    Hold,
    Exhale,
}

/// Inputs to the phase machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    /// The user pressed start.
    Start,
    /// The user pressed stop, or the widget went away.
    Stop,
    /// The current phase's dwell time ran out.
    Elapsed,
}

/// Size of the breathing circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visual {
    Expanded,
    Contracted,
}

impl Visual {
    /// Scale factor relative to the full circle.
    pub fn scale(self) -> f32 {
        match self {
            Self::Expanded => 1.0,
            Self::Contracted => 0.5,
        }
    }
}

const INHALE: Duration = Duration::from_millis(4000);
const HOLD: Duration = Duration::from_millis(4000);
const EXHALE: Duration = Duration::from_millis(6000);
const SETTLE: Duration = Duration::from_millis(500);

impl BreathingPhase {
    /// How long the phase lasts before advancing. `None` for `Idle`, which
    /// waits for an explicit start.
    pub fn dwell(self) -> Option<Duration> {
        match self {
            Self::Idle => None,
            Self::Inhale => Some(INHALE),
            Self::Hold => Some(HOLD),
            Self::Exhale => Some(EXHALE),
        }
    }

    /// The phase that follows once this one elapses. `Idle` stays put.
    pub fn next(self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Inhale => Self::Hold,
            Self::Hold => Self::Exhale,
            Self::Exhale => Self::Inhale,
        }
    }

    pub fn is_active(self) -> bool {
        self != Self::Idle
    }

    /// Caption shown inside the circle.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Ready?",
            Self::Inhale => "Breathe In...",
            Self::Hold => "Hold",
            Self::Exhale => "Breathe Out...",
        }
    }

    pub fn visual(self) -> Visual {
        match self {
            Self::Inhale | Self::Hold => Visual::Expanded,
            Self::Exhale | Self::Idle => Visual::Contracted,
        }
    }

    /// How long the circle takes to animate into this phase's size.
    pub fn animation(self) -> Duration {
        match self {
            Self::Inhale => INHALE,
            Self::Exhale => EXHALE,
            Self::Hold | Self::Idle => SETTLE,
        }
    }
}

impl std::fmt::Display for BreathingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Inhale => "inhale",
            Self::Hold => "hold",
            Self::Exhale => "exhale",
        };
        f.write_str(s)
    }
}

/// Apply one event to a phase.
///
/// `Start` always re-enters at `Inhale`, discarding whatever phase was
/// current. `Elapsed` while idle is ignored.
pub fn transition(phase: BreathingPhase, event: PhaseEvent) -> BreathingPhase {
    match event {
        PhaseEvent::Start => BreathingPhase::Inhale,
        PhaseEvent::Stop => BreathingPhase::Idle,
        PhaseEvent::Elapsed => phase.next(),
    }
}
