/// A point on the simulation's virtual time line. Unrelated to wall-clock time.
pub type VirtualTime = f64;

/// The Simulation's notion of "now".
///
/// The clock has no behavior of its own: the scheduler moves it forward to
/// the time of each event it pops, and it never moves backward.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VirtualClock {
    /// The current virtual time.
    now: VirtualTime,
}

impl VirtualClock {
    /// A clock reading `start`.
    pub const fn new(start: VirtualTime) -> Self {
        Self { now: start }
    }

    /// The current virtual time.
    pub const fn now(&self) -> VirtualTime {
        self.now
    }

    /// Moves the clock to `time`. Earlier times are ignored.
    pub(crate) fn advance_to(&mut self, time: VirtualTime) {
        debug_assert!(time >= self.now, "clock asked to move back to {time}");
        if time > self.now {
            self.now = time;
        }
    }
}
