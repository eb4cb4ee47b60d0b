use std::fmt;

/// Parts of the orchestrator with a tracked lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// The capture session as a whole
    Session,
    /// evdev camera buttons
    Buttons,
    /// Terminal key input
    Keyboard,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Session => write!(f, "session"),
            Component::Buttons => write!(f, "buttons"),
            Component::Keyboard => write!(f, "keyboard"),
        }
    }
}

/// Component lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentState {
    Stopped,
    Starting,
    Running,
    Stopping,
    Failed,
}

/// How the post-teardown drain ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// No recording pending and no upload in flight
    Settled,
    /// The grace period ran out first
    TimedOut { pending: usize, in_flight: usize },
    /// Every sender went away
    QueueClosed,
}
