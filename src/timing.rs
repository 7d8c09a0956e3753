//! Per-effect update gate.
//!
//! The render thread may call an effect every few milliseconds, while the
//! effect wants to advance its simulation at its own, usually slower, pace.
//! A [`Gate`] remembers when its effect last advanced and says whether
//! enough time has passed to advance again. Effects repaint either way.

/// How the elapsed time is compared against the interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateMode {
    /// Advance when `elapsed >= interval`.
    AtLeast,
    /// Advance when `elapsed > interval`.
    Exceeding,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gate {
    interval_ms: u64,
    last_ms: u64,
    mode: GateMode,
}

impl Gate {
    pub const fn at_least(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_ms: 0,
            mode: GateMode::AtLeast,
        }
    }

    pub const fn exceeding(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_ms: 0,
            mode: GateMode::Exceeding,
        }
    }

    /// Whether the gate would admit an update at `now_ms`, without
    /// recording anything.
    pub fn is_due(&self, now_ms: u64) -> bool {
        let elapsed = now_ms.saturating_sub(self.last_ms);
        match self.mode {
            GateMode::AtLeast => elapsed >= self.interval_ms,
            GateMode::Exceeding => elapsed > self.interval_ms,
        }
    }

    /// Mark `now_ms` as the time of the last update.
    pub fn mark(&mut self, now_ms: u64) {
        self.last_ms = now_ms;
    }

    /// Admit an update at `now_ms` if due, recording it.
    pub fn ready(&mut self, now_ms: u64) -> bool {
        if self.is_due(now_ms) {
            self.mark(now_ms);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Gate::at_least(60), 59, false)]
    #[case(Gate::at_least(60), 60, true)]
    #[case(Gate::exceeding(80), 80, false)]
    #[case(Gate::exceeding(80), 81, true)]
    #[case(Gate::at_least(0), 0, true)]
    fn first_admission(#[case] gate: Gate, #[case] now: u64, #[case] expected: bool) {
        let mut gate = gate;
        assert_eq!(gate.ready(now), expected);
    }

    #[test]
    fn admission_restarts_the_interval() {
        let mut gate = Gate::at_least(60);
        assert!(gate.ready(100));
        assert!(!gate.ready(120));
        assert!(!gate.ready(159));
        assert!(gate.ready(160));
    }

    #[test]
    fn rejected_calls_do_not_restart_the_interval() {
        let mut gate = Gate::exceeding(100);
        assert!(gate.ready(200));
        for now in 201..=300 {
            assert!(!gate.ready(now));
        }
        assert!(gate.ready(301));
    }

    #[test]
    fn time_going_backwards_never_admits() {
        let mut gate = Gate::at_least(10);
        assert!(gate.ready(1_000));
        assert!(!gate.ready(5));
    }

    #[test]
    fn is_due_does_not_record() {
        let mut gate = Gate::at_least(10);
        assert!(gate.is_due(10));
        assert!(gate.is_due(10));
        gate.mark(10);
        assert!(!gate.is_due(15));
    }
}
