//! Flash animator: bounded foreground/background highlight cycles.
//!
//! Not a subclassed flashing label, and not a thread: a deadline queue over
//! any [`DisplaySurface`], drained from the main-loop tick, so flashing
//! works on whatever the surface is and never blocks the loop.
//!
//! A cycle swaps its element's colors once per period until the cycle count
//! reaches the limit, then stops for good. The element is deliberately left
//! in whatever swap state it last had - an odd number of swaps leaves it
//! inverted until something else redraws it.

use heapless::Vec;

use crate::traits::surface::{DisplaySurface, ElementId};

/// Swap period in milliseconds.
pub const FLASH_PERIOD_MS: u64 = 1000;

/// Cycle count at which a flash stops rescheduling.
pub const FLASH_CYCLE_LIMIT: u8 = 30;

/// Maximum concurrently flashing elements.
const MAX_ACTIVE: usize = 4;

#[derive(Debug, Clone)]
struct FlashCycle {
    element: ElementId,
    count: u8,
    next_due_ms: u64,
}

/// Drives the active flash cycles. Owned by the controller; polled once per
/// tick.
#[derive(Debug, Default)]
pub struct FlashAnimator {
    active: Vec<FlashCycle, MAX_ACTIVE>,
}

impl FlashAnimator {
    pub const fn new() -> Self {
        Self { active: Vec::new() }
    }

    /// Begin flashing `element`; the first swap lands on the next poll.
    ///
    /// `start_count` offsets the cycle budget so two elements can alternate
    /// out of phase: a 0-start gets the full 30 swaps, a 16-start only 14.
    /// Restarting an element that is already flashing replaces its cycle.
    pub fn start(&mut self, element: ElementId, start_count: u8, now_ms: u64) {
        if let Some(pos) = self.active.iter().position(|c| c.element == element) {
            self.active.swap_remove(pos);
        }
        if start_count >= FLASH_CYCLE_LIMIT {
            return;
        }
        let _ = self.active.push(FlashCycle {
            element,
            count: start_count,
            next_due_ms: now_ms,
        });
    }

    /// Swap colors on every due cycle - at most once each - then re-arm or
    /// retire it.
    pub fn poll<D: DisplaySurface>(&mut self, now_ms: u64, surface: &mut D) {
        for cycle in self.active.iter_mut() {
            if now_ms >= cycle.next_due_ms {
                surface.swap_colors(cycle.element);
                cycle.count += 1;
                cycle.next_due_ms = now_ms + FLASH_PERIOD_MS;
            }
        }
        let mut i = 0;
        while i < self.active.len() {
            if self.active[i].count >= FLASH_CYCLE_LIMIT {
                self.active.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }

    /// True when no cycle is scheduled.
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }
}
