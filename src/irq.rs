//! Machine-mode interrupt causes and handler bodies.
//!
//! The trap entry itself is target code; everything it does after reading
//! `mcause` lives here so it can run on the host.

use crate::{
    input::{
        EdgeCapture,
        TurnIndicator,
        TurnIntent,
    },
    pacer::{
        self,
        CompareTimer,
    },
    shared::SharedState,
};

/// `mcause` interrupt flag.
pub const MCAUSE_INTERRUPT: u32 = 1 << 31;
/// Machine timer interrupt number.
pub const TIMER_IRQ: u32 = 7;
/// Platform interrupt line of the push-button block.
pub const KEYS_IRQ: u32 = 18;

/// `mie` bits for the two sources the game uses.
pub const MIE_MASK: u32 = 1 << TIMER_IRQ | 1 << KEYS_IRQ;
/// `mstatus.MIE`
pub const MSTATUS_MIE: u32 = 1 << 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interrupt {
    MachineTimer,
    Keys,
}

impl Interrupt {
    /// Decode `mcause`. Exceptions and unknown lines yield `None`.
    pub const fn from_mcause(mcause: u32) -> Option<Self> {
        if mcause & MCAUSE_INTERRUPT == 0 {
            return None;
        }
        match mcause & !MCAUSE_INTERRUPT {
            TIMER_IRQ => Some(Self::MachineTimer),
            KEYS_IRQ => Some(Self::Keys),
            _ => None,
        }
    }
}

/// Key interrupt body: latch the intent, mirror it on the LEDs and
/// acknowledge the captured edges.
pub fn on_key_edge(
    keys: &mut impl EdgeCapture,
    indicator: &mut impl TurnIndicator,
    shared: &SharedState,
) -> TurnIntent {
    let edges = keys.edges();
    let intent = TurnIntent::from_edges(edges);
    shared.latch(intent, keys.levels());
    indicator.show(intent);
    keys.acknowledge(edges);
    intent
}

/// Devices the trap handler touches.
pub struct Handlers<T, K, L> {
    pub timer: T,
    pub keys: K,
    pub indicator: L,
}

impl<T, K, L> Handlers<T, K, L>
where
    T: CompareTimer,
    K: EdgeCapture,
    L: TurnIndicator,
{
    /// Route one trap. Returns the interrupt serviced, if any.
    pub fn dispatch(&mut self, mcause: u32, shared: &SharedState) -> Option<Interrupt> {
        let irq = Interrupt::from_mcause(mcause)?;
        match irq {
            Interrupt::MachineTimer => pacer::on_deadline(&mut self.timer, shared),
            Interrupt::Keys => {
                on_key_edge(&mut self.keys, &mut self.indicator, shared);
            }
        }
        Some(irq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        input::{
            KEY_LEFT,
            KEY_MASK,
            KEY_RIGHT,
        },
        pacer::Period,
    };

    #[derive(Default)]
    struct FakeKeys {
        levels: u32,
        edges: u32,
        acked: Vec<u32>,
    }

    impl EdgeCapture for FakeKeys {
        fn levels(&self) -> u32 {
            self.levels
        }

        fn edges(&self) -> u32 {
            self.edges
        }

        fn acknowledge(&mut self, edges: u32) {
            self.acked.push(edges);
            self.edges &= !edges;
        }
    }

    #[derive(Default)]
    struct FakeTimer {
        deadline: u64,
    }

    impl CompareTimer for FakeTimer {
        fn now(&self) -> u64 {
            0
        }

        fn deadline(&self) -> u64 {
            self.deadline
        }

        fn set_deadline(&mut self, at: u64) {
            self.deadline = at;
        }
    }

    struct Leds(u32);

    impl TurnIndicator for Leds {
        fn show(&mut self, intent: TurnIntent) {
            self.0 = intent.led_mask();
        }
    }

    fn handlers() -> Handlers<FakeTimer, FakeKeys, Leds> {
        Handlers {
            timer: FakeTimer::default(),
            keys: FakeKeys::default(),
            indicator: Leds(0),
        }
    }

    #[test]
    fn decodes_causes() {
        assert_eq!(Interrupt::from_mcause(0x8000_0007), Some(Interrupt::MachineTimer));
        assert_eq!(Interrupt::from_mcause(0x8000_0012), Some(Interrupt::Keys));
        assert_eq!(Interrupt::from_mcause(0x8000_0003), None);
        // Exception 7 (store access fault), not an interrupt.
        assert_eq!(Interrupt::from_mcause(7), None);
    }

    #[test]
    fn enable_mask() {
        assert_eq!(MIE_MASK, 0x0004_0080);
    }

    #[test]
    fn key_edge_latches_and_acknowledges() {
        let mut h = handlers();
        let shared = SharedState::new();
        h.keys.edges = KEY_RIGHT;
        h.keys.levels = KEY_RIGHT;

        assert_eq!(h.dispatch(0x8000_0012, &shared), Some(Interrupt::Keys));
        assert_eq!(shared.intent(), TurnIntent::Right);
        assert_eq!(shared.key_levels(), KEY_RIGHT);
        assert_eq!(h.indicator.0, KEY_RIGHT);
        assert_eq!(h.keys.acked, [KEY_RIGHT]);
        assert_eq!(h.keys.edges, 0);
        assert!(!shared.tick_pending());
    }

    #[test]
    fn both_keys_cancel() {
        let mut h = handlers();
        let shared = SharedState::new();
        shared.latch(TurnIntent::Left, 0);
        h.keys.edges = KEY_MASK;

        h.dispatch(0x8000_0012, &shared);
        assert_eq!(shared.intent(), TurnIntent::None);
        assert_eq!(h.indicator.0, 0);
        assert_eq!(h.keys.acked, [KEY_MASK]);
    }

    #[test]
    fn second_edge_overwrites() {
        let mut h = handlers();
        let shared = SharedState::new();
        h.keys.edges = KEY_LEFT;
        h.dispatch(0x8000_0012, &shared);
        h.keys.edges = KEY_RIGHT;
        h.dispatch(0x8000_0012, &shared);
        assert_eq!(shared.take_intent(), TurnIntent::Right);
    }

    #[test]
    fn timer_rearms_and_ticks() {
        let mut h = handlers();
        let shared = SharedState::new();
        shared.set_period(Period::from_ticks(1_000));
        h.timer.deadline = 5_000;

        assert_eq!(h.dispatch(0x8000_0007, &shared), Some(Interrupt::MachineTimer));
        assert_eq!(h.timer.deadline, 6_000);
        assert!(shared.take_tick());
        assert_eq!(shared.intent(), TurnIntent::None);
    }

    #[test]
    fn unknown_cause_touches_nothing() {
        let mut h = handlers();
        let shared = SharedState::new();
        h.keys.edges = KEY_LEFT;
        assert_eq!(h.dispatch(0x8000_000b, &shared), None);
        assert!(h.keys.acked.is_empty());
        assert_eq!(h.timer.deadline, 0);
    }
}
