use crate::clock::VirtualTime;
use std::fmt;

/// One line of the call center's event trace.
#[derive(Clone, Debug, PartialEq)]
pub enum TraceEvent {
    /// A caller got on the line.
    Arrived {
        /// Name of the caller.
        caller: String,
        /// Arrival time.
        time: VirtualTime,
    },
    /// An agent picked up.
    CallStarted {
        /// Name of the caller.
        caller: String,
        /// When the call started.
        time: VirtualTime,
        /// Time spent on the wait list.
        waited: VirtualTime,
    },
    /// The caller hung up and freed the agent.
    CallEnded {
        /// Name of the caller.
        caller: String,
        /// When the call ended.
        time: VirtualTime,
    },
}

impl TraceEvent {
    /// Name of the caller the event is about.
    pub fn caller(&self) -> &str {
        match self {
            Self::Arrived { caller, .. }
            | Self::CallStarted { caller, .. }
            | Self::CallEnded { caller, .. } => caller,
        }
    }

    /// When the event happened.
    pub const fn time(&self) -> VirtualTime {
        match self {
            Self::Arrived { time, .. }
            | Self::CallStarted { time, .. }
            | Self::CallEnded { time, .. } => *time,
        }
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arrived { caller, time } => write!(f, "{caller} arrives at time {time:.2}"),
            Self::CallStarted {
                caller,
                time,
                waited,
            } => write!(f, "{caller} starts call at {time:.2} (Waited {waited:.2} min)"),
            Self::CallEnded { caller, time } => write!(f, "{caller} ends call at {time:.2}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_use_two_decimals() {
        let arrived = TraceEvent::Arrived {
            caller: "Caller 1".into(),
            time: 4.2361,
        };
        let started = TraceEvent::CallStarted {
            caller: "Caller 1".into(),
            time: 12.0,
            waited: 8.857,
        };
        let ended = TraceEvent::CallEnded {
            caller: "Caller 1".into(),
            time: 20.5,
        };

        assert_eq!(arrived.to_string(), "Caller 1 arrives at time 4.24");
        assert_eq!(
            started.to_string(),
            "Caller 1 starts call at 12.00 (Waited 8.86 min)"
        );
        assert_eq!(ended.to_string(), "Caller 1 ends call at 20.50");
        assert_eq!(ended.caller(), "Caller 1");
    }
}
