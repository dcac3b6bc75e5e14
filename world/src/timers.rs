//! Deferred world actions keyed by simulated fire time.

use std::{cmp::Reverse, collections::BinaryHeap, time::Duration};

use lava_run_core::{CombatWindowId, EnemyId};

/// Typed action executed when its timer fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum TimerAction {
    CloseCombatWindow(CombatWindowId),
    ResumeIdleAnimation,
    RemoveDefeatedEnemy(EnemyId),
    EndRunAsLoss,
}

/// Min-queue of pending timers. Timers sharing a fire time run in scheduling order.
#[derive(Debug, Default)]
pub(crate) struct TimerQueue {
    pending: BinaryHeap<Reverse<(Duration, u64, TimerAction)>>,
    next_sequence: u64,
}

impl TimerQueue {
    pub(crate) fn schedule(&mut self, fire_at: Duration, action: TimerAction) {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        self.pending.push(Reverse((fire_at, sequence, action)));
    }

    /// Removes and returns the earliest timer due at or before `now`.
    pub(crate) fn pop_due(&mut self, now: Duration) -> Option<TimerAction> {
        let Reverse((fire_at, _, _)) = self.pending.peek()?;
        if *fire_at > now {
            return None;
        }
        self.pending.pop().map(|Reverse((_, _, action))| action)
    }

    pub(crate) fn clear(&mut self) {
        self.pending.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}
