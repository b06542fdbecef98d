//! State shared between the interrupt handlers and the main loop.
//!
//! Every field has one writer at a time:
//! - tick flag: set by the timer handler, cleared by the scheduler
//! - turn intent and key shadow: set by the key handler, cleared by the scheduler
//! - frame period: written by the scheduler, read by the timer handler

use core::{
    cell::Cell,
    sync::atomic::{
        AtomicBool,
        Ordering,
    },
};

use embassy_sync::blocking_mutex::{
    Mutex,
    raw::CriticalSectionRawMutex,
};

use crate::{
    input::TurnIntent,
    pacer::{
        Period,
        SPEED_TIERS,
        period_for,
    },
};

#[derive(Clone, Copy, Default)]
struct Latch {
    intent: TurnIntent,
    levels: u32,
}

pub struct SharedState {
    tick_pending: AtomicBool,
    latch: Mutex<CriticalSectionRawMutex, Cell<Latch>>,
    period: Mutex<CriticalSectionRawMutex, Cell<Period>>,
}

impl SharedState {
    pub const fn new() -> Self {
        Self {
            tick_pending: AtomicBool::new(false),
            latch: Mutex::new(Cell::new(Latch {
                intent: TurnIntent::None,
                levels: 0,
            })),
            period: Mutex::new(Cell::new(period_for(SPEED_TIERS[SPEED_TIERS.len() - 1]))),
        }
    }

    // ── Tick flag ───────────────────────────────────────────────────────────

    pub fn signal_tick(&self) {
        self.tick_pending.store(true, Ordering::Release);
    }

    /// Consume the pending tick, if any. Ticks are not counted: several
    /// signals before one take collapse into a single tick.
    pub fn take_tick(&self) -> bool {
        if self.tick_pending.load(Ordering::Acquire) {
            self.tick_pending.store(false, Ordering::Release);
            true
        } else {
            false
        }
    }

    pub fn tick_pending(&self) -> bool {
        self.tick_pending.load(Ordering::Acquire)
    }

    // ── Turn intent ─────────────────────────────────────────────────────────

    /// Overwrite the pending intent and remember the raw key levels.
    pub fn latch(&self, intent: TurnIntent, levels: u32) {
        self.latch.lock(|latch| latch.set(Latch { intent, levels }));
    }

    /// Read and clear the pending intent.
    pub fn take_intent(&self) -> TurnIntent {
        self.latch.lock(|latch| {
            let mut state = latch.get();
            let intent = core::mem::take(&mut state.intent);
            latch.set(state);
            intent
        })
    }

    pub fn intent(&self) -> TurnIntent {
        self.latch.lock(|latch| latch.get().intent)
    }

    /// Key levels seen at the last key interrupt.
    pub fn key_levels(&self) -> u32 {
        self.latch.lock(|latch| latch.get().levels)
    }

    // ── Frame period ────────────────────────────────────────────────────────

    pub fn period(&self) -> Period {
        self.period.lock(Cell::get)
    }

    pub fn set_period(&self, period: Period) {
        self.period.lock(|p| p.set(period));
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
