//! Bot steering: greedy look-ahead along straight, left and right.
//!
//! The first candidate whose next [`LOOK_AHEAD`] cells are all free wins.
//! When every candidate is blocked the heading is kept and the bot crashes.

use embedded_graphics::prelude::*;

use crate::{
    framebuffer::Framebuffer,
    player::{
        Heading,
        Player,
        is_blocked,
    },
};

/// Cells probed along each candidate heading.
pub const LOOK_AHEAD: usize = 5;

/// `true` if any of the next `LOOK_AHEAD` cells from `from` along `heading`
/// is blocked.
pub fn path_blocked(fb: &impl Framebuffer, from: Point, heading: Heading) -> bool {
    let mut cell = from;
    for _ in 0..LOOK_AHEAD {
        cell = heading.step_from(cell);
        if is_blocked(fb, cell) {
            return true;
        }
    }
    false
}

/// Pick the bot's heading for this tick, in priority order.
pub fn choose_heading(fb: &impl Framebuffer, bot: &Player) -> Heading {
    let current = bot.heading;
    [current, current.rotated_left(), current.rotated_right()]
        .into_iter()
        .find(|&h| !path_blocked(fb, bot.position, h))
        .unwrap_or(current)
}

pub fn steer(fb: &impl Framebuffer, bot: &mut Player) {
    bot.heading = choose_heading(fb, bot);
}
