//! Seven-segment score display.
//!
//! HEX0 shows the bot's score, HEX2 the user's; both live in the
//! HEX3..HEX0 register, one byte per digit.

/// Segment patterns for 0..=9 (bit 0 = segment a, decimal point off).
pub const DIGITS: [u8; 10] = [0x3f, 0x06, 0x5b, 0x4f, 0x66, 0x6d, 0x7d, 0x07, 0x7f, 0x67];

/// Bit offset of the user's digit.
pub const USER_SHIFT: u32 = 16;

/// Seven-segment pattern for `value`, clamped to a single digit.
pub const fn segments(value: u8) -> u8 {
    let digit = if value > 9 { 9 } else { value };
    DIGITS[digit as usize]
}

/// Register word showing both scores.
pub const fn encode(user: u8, bot: u8) -> u32 {
    (segments(user) as u32) << USER_SHIFT | segments(bot) as u32
}

/// Digit display.
pub trait ScoreDisplay {
    fn write(&mut self, word: u32);

    fn show(&mut self, user: u8, bot: u8) {
        self.write(encode(user, bot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_zero() {
        assert_eq!(encode(0, 0), 0x003f_003f);
    }

    #[test]
    fn user_in_third_byte_bot_in_first() {
        assert_eq!(encode(1, 2), 0x0006_005b);
        assert_eq!(encode(9, 0), 0x0067_003f);
    }

    #[test]
    fn clamps_to_nine() {
        assert_eq!(segments(12), segments(9));
        assert_eq!(segments(255), 0x67);
    }

    #[test]
    fn show_writes_encoded_word() {
        struct Capture(u32);
        impl ScoreDisplay for Capture {
            fn write(&mut self, word: u32) {
                self.0 = word;
            }
        }

        let mut hex = Capture(0);
        hex.show(3, 4);
        assert_eq!(hex.0, 0x004f_0066);
    }
}
