//! # lightcycle
//!
//! Two-rider light-cycle game for the Nios V computer on the DE10-Lite
//! (and DE1-SoC) boards.
//!
//! The game core is target independent:
//! - **Pacer**: machine-timer deadlines at a switch-selected frame rate
//! - **Input**: KEY edge capture latched into a one-shot turn intent
//! - **Riders**: movement and collision against the framebuffer itself
//! - **Bot**: greedy steering with a short look-ahead
//! - **Match**: rounds, scores up to nine, and the win screen
//! - **Scheduler**: busy-poll loop with pause
//!
//! [`de10`] binds those seams to the board's memory-mapped devices.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! static SHARED: lightcycle::SharedState = lightcycle::SharedState::new();
//!
//! let board = unsafe { lightcycle::de10::Peripherals::steal() };
//! let mut scheduler =
//!     lightcycle::Scheduler::new(&SHARED, board.pixels, board.hex, board.switches, board.leds);
//! scheduler.start();
//! // arm the timer, enable interrupts
//! scheduler.run();
//! ```

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod arena;
pub mod bot;
pub mod de10;
pub mod framebuffer;
pub mod game;
pub mod input;
pub mod irq;
pub mod pacer;
pub mod player;
pub mod scheduler;
pub mod scoreboard;
pub mod shared;

pub use framebuffer::{
    Framebuffer,
    MemoryFramebuffer,
};
pub use game::{
    Match,
    Phase,
};
pub use input::TurnIntent;
pub use irq::Handlers;
pub use pacer::Speed;
pub use player::{
    Heading,
    Player,
};
pub use scheduler::Scheduler;
pub use shared::SharedState;

/// StaticCell helper: allocates a value into a `static` exactly once.
#[macro_export]
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write($val);
        x
    }};
}
