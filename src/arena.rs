//! Board geometry, walls, obstacles and colours.

use core::ops::Range;

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
};

use crate::framebuffer::{
    BACKGROUND,
    Framebuffer,
};

#[cfg(all(feature = "de10-lite", feature = "de1-soc"))]
compile_error!("features `de10-lite` and `de1-soc` are mutually exclusive");

// ── Screen geometry ─────────────────────────────────────────────────────────

#[cfg(not(feature = "de1-soc"))]
pub const WIDTH: i32 = 160;
#[cfg(not(feature = "de1-soc"))]
pub const HEIGHT: i32 = 120;
/// log2 of the pixel buffer row stride, in pixels.
#[cfg(not(feature = "de1-soc"))]
pub const ROW_SHIFT: u32 = 8;

#[cfg(feature = "de1-soc")]
pub const WIDTH: i32 = 320;
#[cfg(feature = "de1-soc")]
pub const HEIGHT: i32 = 240;
#[cfg(feature = "de1-soc")]
pub const ROW_SHIFT: u32 = 9;

/// Screen-sized framebuffer in RAM.
pub type Screen = crate::MemoryFramebuffer<{ WIDTH as usize }, { HEIGHT as usize }>;

/// Width of the wall band on every edge.
pub const MARGIN: i32 = 5;

/// Rows a player may occupy.
pub const PLAY_ROWS: Range<i32> = MARGIN..HEIGHT - MARGIN;
/// Columns a player may occupy.
pub const PLAY_COLS: Range<i32> = MARGIN..WIDTH - MARGIN;

// ── Palette ─────────────────────────────────────────────────────────────────

pub const WALL: Rgb565 = Rgb565::WHITE;
pub const USER_COLOR: Rgb565 = Rgb565::BLUE;
pub const BOT_COLOR: Rgb565 = Rgb565::YELLOW;

/// `true` if `cell` lies inside the playable interior.
pub fn in_bounds(cell: Point) -> bool {
    PLAY_ROWS.contains(&cell.y) && PLAY_COLS.contains(&cell.x)
}

// ── Obstacles ───────────────────────────────────────────────────────────────

/// Fixed axis-aligned block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Obstacle {
    pub rows: Range<i32>,
    pub cols: Range<i32>,
    pub color: Rgb565,
}

impl Obstacle {
    pub fn contains(&self, cell: Point) -> bool {
        self.rows.contains(&cell.y) && self.cols.contains(&cell.x)
    }

    pub fn draw(&self, fb: &mut impl Framebuffer) {
        fb.fill_rect(self.rows.clone(), self.cols.clone(), self.color);
    }
}

pub const OBSTACLES: [Obstacle; 3] = [
    Obstacle { rows: 30..50, cols: 50..60, color: WALL },
    Obstacle { rows: 70..80, cols: 20..80, color: WALL },
    Obstacle { rows: 40..60, cols: 100..110, color: WALL },
];

pub fn draw_obstacles(fb: &mut impl Framebuffer) {
    for obstacle in &OBSTACLES {
        obstacle.draw(fb);
    }
}

/// Paint the interior back to background and redraw the obstacles.
pub fn clear_interior(fb: &mut impl Framebuffer) {
    fb.fill_rect(PLAY_ROWS, PLAY_COLS, BACKGROUND);
    draw_obstacles(fb);
}

/// Full-screen wall followed by a clean interior.
pub fn draw_board(fb: &mut impl Framebuffer) {
    fb.fill_rect(0..HEIGHT, 0..WIDTH, WALL);
    clear_interior(fb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_is_wall() {
        assert!(!in_bounds(Point::new(MARGIN - 1, HEIGHT / 2)));
        assert!(!in_bounds(Point::new(WIDTH / 2, MARGIN - 1)));
        assert!(!in_bounds(Point::new(WIDTH - MARGIN, HEIGHT / 2)));
        assert!(!in_bounds(Point::new(WIDTH / 2, HEIGHT - MARGIN)));
        assert!(in_bounds(Point::new(MARGIN, MARGIN)));
        assert!(in_bounds(Point::new(WIDTH - MARGIN - 1, HEIGHT - MARGIN - 1)));
    }

    #[test]
    fn obstacles_fit_inside_the_interior() {
        for obstacle in &OBSTACLES {
            assert!(obstacle.rows.start >= MARGIN && obstacle.rows.end <= HEIGHT - MARGIN);
            assert!(obstacle.cols.start >= MARGIN && obstacle.cols.end <= WIDTH - MARGIN);
        }
    }

    #[test]
    fn board_has_wall_border_and_obstacles() {
        let mut fb = Screen::new();
        draw_board(&mut fb);

        for (cell, color) in fb.cells() {
            let expected = if !in_bounds(cell) || OBSTACLES.iter().any(|o| o.contains(cell)) {
                WALL
            } else {
                BACKGROUND
            };
            assert_eq!(color, expected, "cell {:?}", cell);
        }
    }

    #[test]
    fn clear_interior_keeps_the_wall() {
        let mut fb = Screen::new();
        draw_board(&mut fb);
        fb.set(Point::new(MARGIN + 1, MARGIN + 1), USER_COLOR);
        clear_interior(&mut fb);
        assert!(fb.is_background(Point::new(MARGIN + 1, MARGIN + 1)));
        assert_eq!(fb.get(Point::new(0, 0)), WALL);
    }
}
