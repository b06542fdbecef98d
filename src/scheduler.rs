//! Busy-polling main loop.
//!
//! The loop spins on the tick flag set by the timer interrupt. Each observed
//! tick runs one frame to completion: re-read the switches, honour pause,
//! consume the turn intent, advance the match and settle a finished round.
//! Ticks that arrive while a frame is running collapse into one.

use crate::{
    framebuffer::Framebuffer,
    game::{
        Match,
        Phase,
    },
    input::{
        TurnIndicator,
        TurnIntent,
    },
    pacer::{
        Speed,
        SpeedSelector,
    },
    scoreboard::ScoreDisplay,
    shared::SharedState,
};

pub struct Scheduler<'a, F, D, S, L> {
    shared: &'a SharedState,
    fb: F,
    scores: D,
    switches: S,
    indicator: L,
    game: Match,
    speed: Option<Speed>,
}

impl<'a, F, D, S, L> Scheduler<'a, F, D, S, L>
where
    F: Framebuffer,
    D: ScoreDisplay,
    S: SpeedSelector,
    L: TurnIndicator,
{
    pub fn new(shared: &'a SharedState, fb: F, scores: D, switches: S, indicator: L) -> Self {
        Self {
            shared,
            fb,
            scores,
            switches,
            indicator,
            game: Match::new(),
            speed: None,
        }
    }

    /// Pick up the initial speed, draw the board and zero the scores.
    ///
    /// Call before the timer is armed so the first deadline uses the
    /// selected period.
    pub fn start(&mut self) -> Speed {
        let speed = self.apply_speed();
        self.game.start(&mut self.fb);
        self.scores.show(self.game.user_score, self.game.bot_score);
        speed
    }

    /// Spin until the match ends, then draw the winner's screen.
    pub fn run(&mut self) {
        while !self.game.game_over() {
            if !self.poll() {
                core::hint::spin_loop();
            }
        }
        self.game.draw_win_screen(&mut self.fb);
    }

    /// Run one frame if a tick is pending. Returns whether it did.
    pub fn poll(&mut self) -> bool {
        if !self.shared.take_tick() {
            return false;
        }
        self.frame();
        true
    }

    /// Body of one tick.
    pub fn frame(&mut self) -> Phase {
        let speed = self.apply_speed();
        if speed.paused || self.game.game_over() {
            return self.game.phase();
        }

        let intent = self.shared.take_intent();
        self.indicator.show(TurnIntent::None);
        if intent != TurnIntent::None {
            trace!("turn {}", intent);
        }

        if self.game.tick(&mut self.fb, intent) == Phase::RoundOver {
            self.scores.show(self.game.user_score, self.game.bot_score);
            self.game.resolve_round(&mut self.fb);
        }
        self.game.phase()
    }

    pub fn game(&self) -> &Match {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Match {
        &mut self.game
    }

    pub fn framebuffer(&self) -> &F {
        &self.fb
    }

    pub fn framebuffer_mut(&mut self) -> &mut F {
        &mut self.fb
    }

    pub fn scores(&self) -> &D {
        &self.scores
    }

    pub fn switches_mut(&mut self) -> &mut S {
        &mut self.switches
    }

    /// Re-read the switches and publish the frame period for the timer
    /// handler's next re-arm.
    fn apply_speed(&mut self) -> Speed {
        let speed = Speed::from_switches(self.switches.read());
        if self.speed != Some(speed) {
            match self.speed {
                Some(old) if old.paused != speed.paused => {
                    info!("{}", if speed.paused { "paused" } else { "resumed" });
                }
                _ => {}
            }
            if self.speed.is_none_or(|old| old.rate != speed.rate) {
                debug!("frame rate {} Hz", speed.rate.raw());
            }
            self.shared.set_period(speed.period());
            self.speed = Some(speed);
        }
        speed
    }
}
