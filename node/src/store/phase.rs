// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Flush state machine.
//!
//! A store tracks two markers: a flush is *scheduled* (one debounce timer is
//! armed) and a flush is *in flight* (one write is running). The four
//! combinations are spelled out as variants so every transition is visible
//! in one place.
//!
//! Invariant: exactly one timer is outstanding while [`FlushPhase::is_scheduled`]
//! holds, and none otherwise.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushPhase {
    #[default]
    Idle,
    Scheduled,
    Flushing,
    /// Writing, and another flush is scheduled for the changes made meanwhile.
    FlushingPending,
}

/// Follow-up the store must perform after a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    None,
    ArmTimer,
    StartFlush,
}

impl FlushPhase {
    pub fn is_scheduled(self) -> bool {
        matches!(self, FlushPhase::Scheduled | FlushPhase::FlushingPending)
    }

    pub fn is_flushing(self) -> bool {
        matches!(self, FlushPhase::Flushing | FlushPhase::FlushingPending)
    }

    /// A record was added or removed.
    pub fn on_mutation(&mut self) -> Action {
        match *self {
            FlushPhase::Idle => {
                *self = FlushPhase::Scheduled;
                Action::ArmTimer
            }
            FlushPhase::Flushing => {
                *self = FlushPhase::FlushingPending;
                Action::ArmTimer
            }
            FlushPhase::Scheduled | FlushPhase::FlushingPending => Action::None,
        }
    }

    /// The debounce timer elapsed.
    ///
    /// If a write is still running the timer is re-armed instead of starting
    /// a second one.
    pub fn on_timer(&mut self) -> Action {
        match *self {
            FlushPhase::Scheduled => {
                *self = FlushPhase::Flushing;
                Action::StartFlush
            }
            FlushPhase::FlushingPending => Action::ArmTimer,
            FlushPhase::Idle | FlushPhase::Flushing => Action::None,
        }
    }

    /// The running write finished, successfully or not.
    pub fn on_flush_done(&mut self) {
        *self = match *self {
            FlushPhase::FlushingPending => FlushPhase::Scheduled,
            _ => FlushPhase::Idle,
        };
    }

    /// A timer could not be armed (no runtime). Drops the scheduled marker.
    pub fn disarm(&mut self) {
        *self = match *self {
            FlushPhase::Scheduled => FlushPhase::Idle,
            FlushPhase::FlushingPending => FlushPhase::Flushing,
            other => other,
        };
    }

    /// Explicit flush request. Returns `false` while another write is running.
    pub fn begin_manual(&mut self) -> bool {
        match *self {
            FlushPhase::Idle => {
                *self = FlushPhase::Flushing;
                true
            }
            // The armed timer stays armed and will find this write in flight.
            FlushPhase::Scheduled => {
                *self = FlushPhase::FlushingPending;
                true
            }
            FlushPhase::Flushing | FlushPhase::FlushingPending => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_arms_one_timer() {
        let mut phase = FlushPhase::Idle;
        assert_eq!(phase.on_mutation(), Action::ArmTimer);
        for _ in 0..10 {
            assert_eq!(phase.on_mutation(), Action::None);
        }
        assert_eq!(phase, FlushPhase::Scheduled);
        assert_eq!(phase.on_timer(), Action::StartFlush);
        assert_eq!(phase, FlushPhase::Flushing);
        phase.on_flush_done();
        assert_eq!(phase, FlushPhase::Idle);
    }

    #[test]
    fn test_timer_during_flush_reschedules() {
        let mut phase = FlushPhase::Flushing;
        assert_eq!(phase.on_mutation(), Action::ArmTimer);
        assert_eq!(phase, FlushPhase::FlushingPending);

        // Write still running: re-arm, do not start a second write
        assert_eq!(phase.on_timer(), Action::ArmTimer);
        assert_eq!(phase, FlushPhase::FlushingPending);
        assert!(phase.is_flushing() && phase.is_scheduled());

        phase.on_flush_done();
        assert_eq!(phase, FlushPhase::Scheduled);
        assert_eq!(phase.on_timer(), Action::StartFlush);
    }

    #[test]
    fn test_manual_flush_waits_for_running_write() {
        let mut phase = FlushPhase::Flushing;
        assert!(!phase.begin_manual());

        let mut phase = FlushPhase::Scheduled;
        assert!(phase.begin_manual());
        assert_eq!(phase, FlushPhase::FlushingPending);

        let mut phase = FlushPhase::Idle;
        assert!(phase.begin_manual());
        assert_eq!(phase, FlushPhase::Flushing);
    }

    #[test]
    fn test_disarm() {
        let mut phase = FlushPhase::Scheduled;
        phase.disarm();
        assert_eq!(phase, FlushPhase::Idle);

        let mut phase = FlushPhase::FlushingPending;
        phase.disarm();
        assert_eq!(phase, FlushPhase::Flushing);
    }
}
