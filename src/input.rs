//! Two-button steering input.
//!
//! KEY0 turns left, KEY1 turns right. The edge-capture register latches
//! presses between interrupts; each observation overwrites the pending
//! [`TurnIntent`] rather than queueing it.

/// Edge bit for the turn-left button.
pub const KEY_LEFT: u32 = 1 << 0;
/// Edge bit for the turn-right button.
pub const KEY_RIGHT: u32 = 1 << 1;
/// Buttons the game listens to.
pub const KEY_MASK: u32 = KEY_LEFT | KEY_RIGHT;

/// Pending steering request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TurnIntent {
    #[default]
    None,
    Left,
    Right,
}

impl TurnIntent {
    /// Resolve one edge-capture observation.
    ///
    /// Exactly one edge selects a turn. Both or neither resolve to `None`.
    pub const fn from_edges(edges: u32) -> Self {
        match edges & KEY_MASK {
            KEY_LEFT => Self::Left,
            KEY_RIGHT => Self::Right,
            _ => Self::None,
        }
    }

    /// Red-LED pattern mirroring this intent.
    pub const fn led_mask(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Left => KEY_LEFT,
            Self::Right => KEY_RIGHT,
        }
    }
}

/// Push-button block with an edge-capture register.
pub trait EdgeCapture {
    /// Current (debounced) button levels.
    fn levels(&self) -> u32;

    /// Edges captured since the last acknowledge.
    fn edges(&self) -> u32;

    /// Clear captured edges by writing back the value just read.
    fn acknowledge(&mut self, edges: u32);
}

/// Output that mirrors the latched intent (the red LED bank on the board).
pub trait TurnIndicator {
    fn show(&mut self, intent: TurnIntent);
}

/// Indicator for boards without one.
impl TurnIndicator for () {
    fn show(&mut self, _intent: TurnIntent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_edges_select_a_turn() {
        assert_eq!(TurnIntent::from_edges(KEY_LEFT), TurnIntent::Left);
        assert_eq!(TurnIntent::from_edges(KEY_RIGHT), TurnIntent::Right);
    }

    #[test]
    fn ambiguous_edges_are_ignored() {
        assert_eq!(TurnIntent::from_edges(0), TurnIntent::None);
        assert_eq!(TurnIntent::from_edges(KEY_MASK), TurnIntent::None);
    }

    #[test]
    fn other_buttons_do_not_matter() {
        assert_eq!(TurnIntent::from_edges(0b1101), TurnIntent::Left);
        assert_eq!(TurnIntent::from_edges(0b1000), TurnIntent::None);
    }

    #[test]
    fn leds_mirror_intent() {
        assert_eq!(TurnIntent::None.led_mask(), 0);
        assert_eq!(TurnIntent::Left.led_mask(), 0b01);
        assert_eq!(TurnIntent::Right.led_mask(), 0b10);
    }
}
