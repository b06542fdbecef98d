//! Pixel framebuffer, which is also the collision map.
//!
//! A cell is empty iff its colour equals [`BACKGROUND`]. There is no separate
//! occupancy grid: trails, walls and obstacles exist only as pixels.

use core::{
    convert::Infallible,
    ops::Range,
};

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
    primitives::Rectangle,
};

/// Colour of an empty cell.
pub const BACKGROUND: Rgb565 = Rgb565::BLACK;

/// Pack 8-bit channels into RGB565, keeping the top bits of each channel.
pub const fn rgb565(r8: u8, g8: u8, b8: u8) -> Rgb565 {
    Rgb565::new(r8 >> 3, g8 >> 2, b8 >> 3)
}

/// Addressable RGB565 grid. `Point::x` is the column, `Point::y` the row.
pub trait Framebuffer: DrawTarget<Color = Rgb565, Error = Infallible> + OriginDimensions {
    /// Write one pixel. The caller guarantees `cell` is on screen.
    fn set(&mut self, cell: Point, color: Rgb565);

    /// Read one pixel. The caller guarantees `cell` is on screen.
    fn get(&self, cell: Point) -> Rgb565;

    /// Fill every cell with `rows.start <= row < rows.end` and
    /// `cols.start <= col < cols.end`.
    fn fill_rect(&mut self, rows: Range<i32>, cols: Range<i32>, color: Rgb565) {
        if rows.is_empty() || cols.is_empty() {
            return;
        }
        let area = Rectangle::new(
            Point::new(cols.start, rows.start),
            Size::new(cols.len() as u32, rows.len() as u32),
        );
        let Ok(()) = self.fill_solid(&area, color);
    }

    fn is_background(&self, cell: Point) -> bool {
        self.get(cell) == BACKGROUND
    }
}

/// Framebuffer held in RAM.
///
/// Used as the host-side screen and as the test double for the pixel buffer.
pub struct MemoryFramebuffer<const W: usize, const H: usize> {
    pixels: [[Rgb565; W]; H],
}

impl<const W: usize, const H: usize> MemoryFramebuffer<W, H> {
    pub const fn new() -> Self {
        Self {
            pixels: [[BACKGROUND; W]; H],
        }
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Point, Rgb565)> + '_ {
        self.pixels.iter().enumerate().flat_map(|(row, line)| {
            line.iter()
                .enumerate()
                .map(move |(col, &color)| (Point::new(col as i32, row as i32), color))
        })
    }

    /// Number of cells painted `color`.
    pub fn count(&self, color: Rgb565) -> usize {
        self.cells().filter(|&(_, c)| c == color).count()
    }

    fn contains(cell: Point) -> bool {
        (0..W as i32).contains(&cell.x) && (0..H as i32).contains(&cell.y)
    }
}

impl<const W: usize, const H: usize> Default for MemoryFramebuffer<W, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const H: usize> OriginDimensions for MemoryFramebuffer<W, H> {
    fn size(&self) -> Size {
        Size::new(W as u32, H as u32)
    }
}

impl<const W: usize, const H: usize> DrawTarget for MemoryFramebuffer<W, H> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(cell, color) in pixels {
            if Self::contains(cell) {
                self.set(cell, color);
            }
        }
        Ok(())
    }
}

impl<const W: usize, const H: usize> Framebuffer for MemoryFramebuffer<W, H> {
    fn set(&mut self, cell: Point, color: Rgb565) {
        self.pixels[cell.y as usize][cell.x as usize] = color;
    }

    fn get(&self, cell: Point) -> Rgb565 {
        self.pixels[cell.y as usize][cell.x as usize]
    }
}
