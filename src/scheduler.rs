//! Cooperative reclamation scheduler
//!
//! Reclamation is a recurring timed poll, not a push notification: when a
//! slot is bound, a check is armed for `interval` ticks later. When it
//! fires against a still-held room it re-arms itself; once the room is
//! reclaimed (or the slot was already free) it simply is not re-armed.
//! Everything runs inside the single game-loop thread.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::trace;

use crate::rooms::{OccupancySource, RoomPool, SlotId};

pub struct ReclaimScheduler {
    /// Ticks between polls on one slot
    interval: u64,
    /// Min-heap of (due tick, slot)
    queue: BinaryHeap<Reverse<(u64, SlotId)>>,
}

impl ReclaimScheduler {
    pub fn new(interval: u64) -> Self {
        Self { interval, queue: BinaryHeap::new() }
    }

    /// Arm the first reclaim check for a freshly bound slot.
    pub fn schedule(&mut self, slot: SlotId, now: u64) {
        self.queue.push(Reverse((now + self.interval, slot)));
    }

    /// Number of armed checks.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Run every check due at or before `now`. Unreclaimed slots are
    /// re-armed `interval` ticks out; reclaimed or already-free slots drop
    /// out of the queue. Returns how many slots were freed.
    pub fn advance(
        &mut self,
        now: u64,
        pool: &mut RoomPool,
        occupancy: &dyn OccupancySource,
    ) -> usize {
        let mut reclaimed = 0;
        while let Some(&Reverse((due, slot))) = self.queue.peek() {
            if due > now {
                break;
            }
            self.queue.pop();

            if pool.reclaim_check(slot, occupancy) {
                reclaimed += 1;
            } else {
                trace!(slot, due = now + self.interval, "room still held, re-arming reclaim check");
                self.queue.push(Reverse((now + self.interval, slot)));
            }
        }
        reclaimed
    }
}
