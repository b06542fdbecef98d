//! Frame pacing from the machine timer compare register.
//!
//! The slide switches pick a frame rate; the period is the number of timer
//! ticks between frames. Every deadline re-arms relative to the previous
//! deadline, never to the time the interrupt was serviced, so interrupt
//! latency does not accumulate as phase drift.

use fugit::HertzU32;

use crate::shared::SharedState;

/// Machine timer input clock.
pub const CLOCK_HZ: u32 = 50_000_000;

/// Frame period in machine timer ticks.
pub type Period = fugit::TimerDurationU64<CLOCK_HZ>;

/// Frame rates selectable with the low switches, slowest first.
pub const SPEED_TIERS: [HertzU32; 4] = [
    HertzU32::from_raw(1),
    HertzU32::from_raw(5),
    HertzU32::from_raw(10),
    HertzU32::from_raw(15),
];

/// Switches that select the speed tier.
pub const SPEED_MASK: u32 = 0xf;
/// Switch that freezes the game.
pub const PAUSE_BIT: u32 = 1 << 9;

/// Slide-switch bank.
pub trait SpeedSelector {
    fn read(&self) -> u32;
}

/// Decoded switch settings.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Speed {
    pub rate: HertzU32,
    pub paused: bool,
}

impl Speed {
    /// Unknown tiers run at the fastest rate.
    pub fn from_switches(switches: u32) -> Self {
        let tier = (switches & SPEED_MASK) as usize;
        let fastest = SPEED_TIERS[SPEED_TIERS.len() - 1];
        Self {
            rate: SPEED_TIERS.get(tier).copied().unwrap_or(fastest),
            paused: switches & PAUSE_BIT != 0,
        }
    }

    pub fn period(self) -> Period {
        period_for(self.rate)
    }
}

pub const fn period_for(rate: HertzU32) -> Period {
    Period::from_ticks((CLOCK_HZ / rate.raw()) as u64)
}

/// 64-bit free-running counter with a compare register.
pub trait CompareTimer {
    fn now(&self) -> u64;
    fn deadline(&self) -> u64;
    fn set_deadline(&mut self, at: u64);
}

/// Schedule the first deadline one period from now.
pub fn arm(timer: &mut impl CompareTimer, period: Period) {
    let next = timer.now().wrapping_add(period.ticks());
    timer.set_deadline(next);
}

/// Timer interrupt body: re-arm, then raise the tick flag.
///
/// Re-arming is unconditional. A missed re-arm would stop the game for good.
pub fn on_deadline(timer: &mut impl CompareTimer, shared: &SharedState) {
    let next = timer.deadline().wrapping_add(shared.period().ticks());
    timer.set_deadline(next);
    shared.signal_tick();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeTimer {
        now: u64,
        deadline: u64,
    }

    impl CompareTimer for FakeTimer {
        fn now(&self) -> u64 {
            self.now
        }

        fn deadline(&self) -> u64 {
            self.deadline
        }

        fn set_deadline(&mut self, at: u64) {
            self.deadline = at;
        }
    }

    #[test]
    fn switch_tiers() {
        let rates: [u32; 5] = [0, 1, 2, 3, 7].map(|sw| Speed::from_switches(sw).rate.raw());
        assert_eq!(rates, [1, 5, 10, 15, 15]);
    }

    #[test]
    fn only_low_switches_pick_the_tier() {
        let speed = Speed::from_switches(PAUSE_BIT | 0x1);
        assert_eq!(speed.rate.raw(), 5);
        assert!(speed.paused);
        assert!(!Speed::from_switches(0x1f0 & !PAUSE_BIT).paused);
    }

    #[test]
    fn periods_in_timer_ticks() {
        assert_eq!(Speed::from_switches(0).period().ticks(), 50_000_000);
        assert_eq!(Speed::from_switches(3).period().ticks(), 3_333_333);
        assert_eq!(Speed::from_switches(2).period().to_millis(), 100);
    }

    #[test]
    fn arm_is_relative_to_now() {
        let mut timer = FakeTimer { now: 1_000, deadline: 0 };
        arm(&mut timer, Period::from_ticks(500));
        assert_eq!(timer.deadline, 1_500);
    }

    #[test]
    fn rearm_is_relative_to_previous_deadline() {
        let shared = SharedState::new();
        shared.set_period(Period::from_ticks(500));
        // Serviced late: `now` is well past the deadline.
        let mut timer = FakeTimer { now: 1_730, deadline: 1_500 };

        on_deadline(&mut timer, &shared);
        assert_eq!(timer.deadline, 2_000);
        assert!(shared.take_tick());

        on_deadline(&mut timer, &shared);
        assert_eq!(timer.deadline, 2_500);
    }

    #[test]
    fn rearm_picks_up_new_period() {
        let shared = SharedState::new();
        let mut timer = FakeTimer::default();
        shared.set_period(Period::from_ticks(10));
        on_deadline(&mut timer, &shared);
        shared.set_period(Period::from_ticks(100));
        on_deadline(&mut timer, &shared);
        assert_eq!(timer.deadline, 110);
    }
}
