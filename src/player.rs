//! Light-cycle entities and the movement / collision model.

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
};

use crate::{
    arena,
    framebuffer::Framebuffer,
    input::TurnIntent,
};

/// Unit Manhattan step. Only the four cardinal values are constructible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Heading {
    dy: i8,
    dx: i8,
}

impl Heading {
    pub const UP: Self = Self { dy: -1, dx: 0 };
    pub const DOWN: Self = Self { dy: 1, dx: 0 };
    pub const LEFT: Self = Self { dy: 0, dx: -1 };
    pub const RIGHT: Self = Self { dy: 0, dx: 1 };

    pub const ALL: [Self; 4] = [Self::UP, Self::DOWN, Self::LEFT, Self::RIGHT];

    pub const fn dy(self) -> i32 {
        self.dy as i32
    }

    pub const fn dx(self) -> i32 {
        self.dx as i32
    }

    /// `(dy, dx) -> (dx, -dy)`
    #[must_use]
    pub const fn rotated_left(self) -> Self {
        Self { dy: self.dx, dx: -self.dy }
    }

    /// `(dy, dx) -> (-dx, dy)`
    #[must_use]
    pub const fn rotated_right(self) -> Self {
        Self { dy: -self.dx, dx: self.dy }
    }

    #[must_use]
    pub const fn turned(self, intent: TurnIntent) -> Self {
        match intent {
            TurnIntent::None => self,
            TurnIntent::Left => self.rotated_left(),
            TurnIntent::Right => self.rotated_right(),
        }
    }

    /// Cell one step from `cell` along this heading.
    pub fn step_from(self, cell: Point) -> Point {
        cell + Point::new(self.dx(), self.dy())
    }
}

/// `true` if `cell` is outside the interior or not background.
///
/// Bounds are checked first so the pixel read never leaves the screen.
pub fn is_blocked(fb: &impl Framebuffer, cell: Point) -> bool {
    !arena::in_bounds(cell) || !fb.is_background(cell)
}

/// Result of one movement attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    Moved,
    Crashed,
    /// Already dead; nothing happened.
    Idle,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub position: Point,
    pub heading: Heading,
    pub alive: bool,
    pub color: Rgb565,
}

impl Player {
    pub const fn new(position: Point, heading: Heading, color: Rgb565) -> Self {
        Self {
            position,
            heading,
            alive: true,
            color,
        }
    }

    pub fn next_cell(&self) -> Point {
        self.heading.step_from(self.position)
    }

    pub fn turn(&mut self, intent: TurnIntent) {
        self.heading = self.heading.turned(intent);
    }

    /// Paint the current cell in the player's colour.
    pub fn draw(&self, fb: &mut impl Framebuffer) {
        fb.set(self.position, self.color);
    }

    /// Test the next cell and either commit the move or die in place.
    ///
    /// Trails are permanent: the old cell keeps its colour.
    pub fn advance(&mut self, fb: &mut impl Framebuffer) -> Step {
        if !self.alive {
            return Step::Idle;
        }

        let next = self.next_cell();
        if is_blocked(fb, next) {
            self.alive = false;
            return Step::Crashed;
        }

        fb.set(next, self.color);
        self.position = next;
        Step::Moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        arena::{
            MARGIN,
            Screen,
            WALL,
        },
        framebuffer::BACKGROUND,
    };

    fn open_screen() -> Screen {
        let mut fb = Screen::new();
        fb.fill_rect(0..arena::HEIGHT, 0..arena::WIDTH, WALL);
        fb.fill_rect(arena::PLAY_ROWS, arena::PLAY_COLS, BACKGROUND);
        fb
    }

    #[test]
    fn rotations_are_inverse() {
        for h in Heading::ALL {
            assert_eq!(h.rotated_left().rotated_right(), h);
            assert_eq!(h.rotated_right().rotated_left(), h);
        }
    }

    #[test]
    fn four_turns_return_home() {
        for h in Heading::ALL {
            let mut turned = h;
            for _ in 0..4 {
                turned = turned.rotated_left();
            }
            assert_eq!(turned, h);
        }
    }

    #[test]
    fn no_single_turn_reverses() {
        for h in Heading::ALL {
            let back = Heading { dy: -h.dy, dx: -h.dx };
            assert_ne!(h.turned(TurnIntent::Left), back);
            assert_ne!(h.turned(TurnIntent::Right), back);
        }
    }

    #[test]
    fn rotation_formulas() {
        assert_eq!(Heading::RIGHT.rotated_left(), Heading::DOWN);
        assert_eq!(Heading::RIGHT.rotated_right(), Heading::UP);
        assert_eq!(Heading::LEFT.rotated_right(), Heading::DOWN);
        assert_eq!(Heading::UP.turned(TurnIntent::None), Heading::UP);
    }

    #[test]
    fn advancing_leaves_two_cells() {
        for heading in Heading::ALL {
            let mut fb = open_screen();
            let start = Point::new(40, 40);
            let mut p = Player::new(start, heading, Rgb565::BLUE);
            p.draw(&mut fb);

            assert_eq!(p.advance(&mut fb), Step::Moved);
            assert_eq!(p.position, start + Point::new(heading.dx(), heading.dy()));
            assert!(p.alive);
            assert_eq!(fb.count(Rgb565::BLUE), 2);
            assert_eq!(fb.get(start), Rgb565::BLUE);
            assert_eq!(fb.get(p.position), Rgb565::BLUE);
        }
    }

    #[test]
    fn dies_at_top_margin_without_moving() {
        let mut fb = open_screen();
        let start = Point::new(50, MARGIN);
        let mut p = Player::new(start, Heading::UP, Rgb565::BLUE);
        p.draw(&mut fb);

        assert_eq!(p.advance(&mut fb), Step::Crashed);
        assert!(!p.alive);
        assert_eq!(p.position, start);
        assert_eq!(fb.get(start), Rgb565::BLUE);
    }

    #[test]
    fn hits_a_trail() {
        let mut fb = open_screen();
        fb.set(Point::new(21, 20), Rgb565::YELLOW);
        let mut p = Player::new(Point::new(20, 20), Heading::RIGHT, Rgb565::BLUE);

        assert_eq!(p.advance(&mut fb), Step::Crashed);
        assert_eq!(p.position, Point::new(20, 20));
        assert_eq!(fb.get(Point::new(21, 20)), Rgb565::YELLOW);
    }

    #[test]
    fn dead_players_stay_put() {
        let mut fb = open_screen();
        let mut p = Player::new(Point::new(20, 20), Heading::RIGHT, Rgb565::BLUE);
        p.alive = false;
        assert_eq!(p.advance(&mut fb), Step::Idle);
        assert_eq!(p.position, Point::new(20, 20));
    }

    #[test]
    fn turning_only_affects_the_next_move() {
        let mut fb = open_screen();
        let mut p = Player::new(Point::new(20, 20), Heading::RIGHT, Rgb565::BLUE);
        p.advance(&mut fb);
        p.turn(TurnIntent::Right);
        assert_eq!(p.position, Point::new(21, 20));
        p.advance(&mut fb);
        assert_eq!(p.position, Point::new(21, 19));
    }
}
