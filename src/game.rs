//! Match state: two riders, scores, and the round state machine.
//!
//! ```text
//! Playing ──crash──▶ RoundOver ──score < 9──▶ Playing (board reset)
//!                        └──────score = 9──▶ GameOver
//! ```

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
};

use crate::{
    arena::{
        self,
        BOT_COLOR,
        USER_COLOR,
    },
    bot,
    framebuffer::Framebuffer,
    input::TurnIntent,
    player::{
        Heading,
        Player,
    },
};

/// Score that ends the match.
pub const WIN_SCORE: u8 = 9;

pub const USER_START: Point = Point::new(arena::WIDTH / 3, arena::HEIGHT / 2);
pub const BOT_START: Point = Point::new(2 * arena::WIDTH / 3, arena::HEIGHT / 2);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Playing,
    /// A crash happened this tick and the round has not been resolved yet.
    RoundOver,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Side {
    User,
    Bot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RoundResult {
    Won(Side),
    /// Both crashed on the same tick. Nobody scores.
    Draw,
}

pub struct Match {
    pub user: Player,
    pub bot: Player,
    pub user_score: u8,
    pub bot_score: u8,
    phase: Phase,
    last_result: Option<RoundResult>,
}

impl Match {
    pub const fn new() -> Self {
        Self {
            user: Player::new(USER_START, Heading::RIGHT, USER_COLOR),
            bot: Player::new(BOT_START, Heading::LEFT, BOT_COLOR),
            user_score: 0,
            bot_score: 0,
            phase: Phase::Playing,
            last_result: None,
        }
    }

    /// Draw the walled board, the obstacles and both riders.
    pub fn start(&mut self, fb: &mut impl Framebuffer) {
        arena::draw_board(fb);
        self.place_riders(fb);
        info!("match started");
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round_over(&self) -> bool {
        self.phase == Phase::RoundOver
    }

    pub fn game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub const fn last_result(&self) -> Option<RoundResult> {
        self.last_result
    }

    /// One simulation step.
    ///
    /// The user turns first, then the bot steers against the current board.
    /// Moves commit in that order, so when both riders aim at the same cell
    /// the user takes it and the bot crashes into the fresh trail.
    pub fn tick(&mut self, fb: &mut impl Framebuffer, intent: TurnIntent) -> Phase {
        if self.phase != Phase::Playing {
            return self.phase;
        }

        self.user.turn(intent);
        bot::steer(fb, &mut self.bot);

        self.user.advance(fb);
        self.bot.advance(fb);

        let result = match (self.user.alive, self.bot.alive) {
            (true, true) => return self.phase,
            (false, true) => {
                self.bot_score = self.bot_score.saturating_add(1);
                RoundResult::Won(Side::Bot)
            }
            (true, false) => {
                self.user_score = self.user_score.saturating_add(1);
                RoundResult::Won(Side::User)
            }
            (false, false) => RoundResult::Draw,
        };

        info!(
            "round over: {} (user {} - bot {})",
            result, self.user_score, self.bot_score
        );
        self.last_result = Some(result);
        self.phase = Phase::RoundOver;
        self.phase
    }

    /// Leave `RoundOver`: either end the match or reset the board.
    pub fn resolve_round(&mut self, fb: &mut impl Framebuffer) -> Phase {
        if self.phase != Phase::RoundOver {
            return self.phase;
        }

        if self.user_score >= WIN_SCORE || self.bot_score >= WIN_SCORE {
            self.phase = Phase::GameOver;
            info!("game over, winner {}", self.winner());
        } else {
            self.reset_round(fb);
        }
        self.phase
    }

    /// Clear the interior, redraw obstacles and put both riders back.
    pub fn reset_round(&mut self, fb: &mut impl Framebuffer) {
        arena::clear_interior(fb);
        self.place_riders(fb);
        self.phase = Phase::Playing;
    }

    /// Side with the higher score, `None` on a tie.
    pub fn winner(&self) -> Option<Side> {
        match self.user_score.cmp(&self.bot_score) {
            core::cmp::Ordering::Greater => Some(Side::User),
            core::cmp::Ordering::Less => Some(Side::Bot),
            core::cmp::Ordering::Equal => None,
        }
    }

    pub fn winner_color(&self) -> Option<Rgb565> {
        self.winner().map(|side| match side {
            Side::User => USER_COLOR,
            Side::Bot => BOT_COLOR,
        })
    }

    /// Wash the whole screen in the winner's colour. A tie leaves the
    /// screen as it is.
    pub fn draw_win_screen(&self, fb: &mut impl Framebuffer) {
        if let Some(color) = self.winner_color() {
            fb.fill_rect(0..arena::HEIGHT, 0..arena::WIDTH, color);
        }
    }

    fn place_riders(&mut self, fb: &mut impl Framebuffer) {
        self.user = Player::new(USER_START, Heading::RIGHT, USER_COLOR);
        self.bot = Player::new(BOT_START, Heading::LEFT, BOT_COLOR);
        self.user.draw(fb);
        self.bot.draw(fb);
    }
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}
