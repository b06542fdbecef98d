//! Memory-mapped devices of the DE10-Lite / DE1-SoC Nios V computer.
//!
//! Each device is a small handle over its register block. Handles are only
//! created through [`Peripherals::steal`], which is `unsafe` because nothing
//! stops two handles to the same block from coexisting.

use core::{
    convert::Infallible,
    ptr::{
        read_volatile,
        write_volatile,
    },
};

use embedded_graphics::{
    pixelcolor::{
        Rgb565,
        raw::{
            RawData,
            RawU16,
        },
    },
    prelude::*,
};

use crate::{
    arena::{
        HEIGHT,
        ROW_SHIFT,
        WIDTH,
    },
    framebuffer::Framebuffer,
    input::{
        EdgeCapture,
        KEY_MASK,
        TurnIndicator,
        TurnIntent,
    },
    pacer::{
        CompareTimer,
        SpeedSelector,
    },
    scoreboard::ScoreDisplay,
};

// ── Address map ─────────────────────────────────────────────────────────────

pub const PIXEL_BUF_BASE: usize = 0x0800_0000;
pub const LEDR_BASE: usize = 0xFF20_0000;
pub const HEX3_HEX0_BASE: usize = 0xFF20_0020;
pub const SW_BASE: usize = 0xFF20_0040;
pub const KEY_BASE: usize = 0xFF20_0050;
pub const JTAG_UART_BASE: usize = 0xFF20_1000;
pub const MTIMER_BASE: usize = 0xFF20_2100;

// ── Registers ───────────────────────────────────────────────────────────────

/// One 32-bit device register.
#[derive(Clone, Copy, Debug)]
pub struct Reg(usize);

impl Reg {
    /// # Safety
    /// `addr` must be a valid, aligned device register.
    pub const unsafe fn at(addr: usize) -> Self {
        Self(addr)
    }

    /// Register `words` 32-bit words past this one.
    pub const fn offset(self, words: usize) -> Self {
        Self(self.0 + words * 4)
    }

    #[inline(always)]
    pub fn read(self) -> u32 {
        // SAFETY: constructed through `Reg::at`.
        unsafe { read_volatile(self.0 as *const u32) }
    }

    #[inline(always)]
    pub fn write(self, value: u32) {
        // SAFETY: constructed through `Reg::at`.
        unsafe { write_volatile(self.0 as *mut u32, value) }
    }
}

/// Read a 64-bit value split across two words.
///
/// The high word is re-read until it is stable across the low-word read,
/// so a low-word rollover in between cannot tear the result.
pub fn read_split(mut read_lo: impl FnMut() -> u32, mut read_hi: impl FnMut() -> u32) -> u64 {
    loop {
        let hi = read_hi();
        let lo = read_lo();
        if hi == read_hi() {
            return u64::from(hi) << 32 | u64::from(lo);
        }
    }
}

/// Write a 64-bit compare value split across two words.
///
/// The low word is parked at all-ones first so the half-written value can
/// never be below the counter and fire early.
pub fn write_split(value: u64, mut write_lo: impl FnMut(u32), mut write_hi: impl FnMut(u32)) {
    write_lo(u32::MAX);
    write_hi((value >> 32) as u32);
    write_lo(value as u32);
}

// ── Pixel buffer ────────────────────────────────────────────────────────────

/// VGA pixel buffer. Row `r`, column `c` is halfword `(r << ROW_SHIFT) + c`.
pub struct PixelBuffer {
    base: usize,
}

impl PixelBuffer {
    fn slot(&self, cell: Point) -> *mut u16 {
        let index = ((cell.y as usize) << ROW_SHIFT) + cell.x as usize;
        (self.base as *mut u16).wrapping_add(index)
    }
}

impl OriginDimensions for PixelBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for PixelBuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let bounds = self.bounding_box();
        for Pixel(cell, color) in pixels {
            if bounds.contains(cell) {
                self.set(cell, color);
            }
        }
        Ok(())
    }
}

impl Framebuffer for PixelBuffer {
    fn set(&mut self, cell: Point, color: Rgb565) {
        // SAFETY: callers keep `cell` on screen, which is inside the buffer.
        unsafe { write_volatile(self.slot(cell), RawU16::from(color).into_inner()) }
    }

    fn get(&self, cell: Point) -> Rgb565 {
        // SAFETY: as for `set`.
        let raw = unsafe { read_volatile(self.slot(cell)) };
        Rgb565::from(RawU16::new(raw))
    }
}

// ── Seven-segment display ───────────────────────────────────────────────────

pub struct HexDisplay {
    reg: Reg,
}

impl ScoreDisplay for HexDisplay {
    fn write(&mut self, word: u32) {
        self.reg.write(word);
    }
}

// ── Red LEDs ────────────────────────────────────────────────────────────────

pub struct RedLeds {
    reg: Reg,
}

impl RedLeds {
    pub fn set(&mut self, mask: u32) {
        self.reg.write(mask);
    }
}

impl TurnIndicator for RedLeds {
    fn show(&mut self, intent: TurnIntent) {
        self.set(intent.led_mask());
    }
}

// ── Slide switches ──────────────────────────────────────────────────────────

pub struct Switches {
    reg: Reg,
}

impl SpeedSelector for Switches {
    fn read(&self) -> u32 {
        self.reg.read()
    }
}

// ── Push buttons ────────────────────────────────────────────────────────────

/// KEY parallel port: data, direction, interrupt mask, edge capture.
pub struct Keys {
    base: Reg,
}

impl Keys {
    fn data(&self) -> Reg {
        self.base
    }

    fn direction(&self) -> Reg {
        self.base.offset(1)
    }

    fn interrupt_mask(&self) -> Reg {
        self.base.offset(2)
    }

    fn edge_capture(&self) -> Reg {
        self.base.offset(3)
    }

    /// Inputs, interrupts on the two steering keys, stale edges cleared.
    pub fn init(&mut self) {
        self.direction().write(0);
        self.interrupt_mask().write(KEY_MASK);
        self.edge_capture().write(0xff);
    }
}

impl EdgeCapture for Keys {
    fn levels(&self) -> u32 {
        self.data().read() & KEY_MASK
    }

    fn edges(&self) -> u32 {
        self.edge_capture().read()
    }

    fn acknowledge(&mut self, edges: u32) {
        self.edge_capture().write(edges);
    }
}

// ── Machine timer ───────────────────────────────────────────────────────────

/// `mtime` (words 0-1) and `mtimecmp` (words 2-3).
pub struct MachineTimer {
    base: Reg,
}

impl CompareTimer for MachineTimer {
    fn now(&self) -> u64 {
        read_split(|| self.base.read(), || self.base.offset(1).read())
    }

    fn deadline(&self) -> u64 {
        let cmp = self.base.offset(2);
        read_split(|| cmp.read(), || cmp.offset(1).read())
    }

    fn set_deadline(&mut self, at: u64) {
        let cmp = self.base.offset(2);
        write_split(at, |v| cmp.write(v), |v| cmp.offset(1).write(v));
    }
}

// ── JTAG UART ───────────────────────────────────────────────────────────────

/// Host console: data (word 0) and control (word 1, free FIFO space in the
/// upper half).
pub struct JtagUart {
    base: Reg,
}

impl JtagUart {
    pub fn write_space(&self) -> u32 {
        self.base.offset(1).read() >> 16
    }

    /// Queue as much of `bytes` as the FIFO takes and drop the rest.
    /// Returns the count queued.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> usize {
        let mut space = self.write_space();
        let mut sent = 0;
        for &byte in bytes {
            if space == 0 {
                space = self.write_space();
                if space == 0 {
                    break;
                }
            }
            self.base.write(u32::from(byte));
            space -= 1;
            sent += 1;
        }
        sent
    }
}

// ── Board ───────────────────────────────────────────────────────────────────

/// Every device the game uses.
pub struct Peripherals {
    pub pixels: PixelBuffer,
    pub hex: HexDisplay,
    pub leds: RedLeds,
    pub switches: Switches,
    pub keys: Keys,
    pub timer: MachineTimer,
    pub uart: JtagUart,
}

impl Peripherals {
    /// # Safety
    /// Must run on the DE10 computer. Each call hands out fresh handles to
    /// the same registers; the caller decides who drives what.
    pub const unsafe fn steal() -> Self {
        unsafe {
            Self {
                pixels: PixelBuffer { base: PIXEL_BUF_BASE },
                hex: HexDisplay { reg: Reg::at(HEX3_HEX0_BASE) },
                leds: RedLeds { reg: Reg::at(LEDR_BASE) },
                switches: Switches { reg: Reg::at(SW_BASE) },
                keys: Keys { base: Reg::at(KEY_BASE) },
                timer: MachineTimer { base: Reg::at(MTIMER_BASE) },
                uart: JtagUart { base: Reg::at(JTAG_UART_BASE) },
            }
        }
    }
}
