//! A self-playing snake.
//!
//! The snake chases a randomly placed apple with a simple steering rule:
//! it only turns once it shares a row or column with the apple, and a
//! one-step lookahead steers it away from its own body when it can. It
//! wraps around the panel edges (changing its head colour each time) and
//! starts over after running into itself.

use super::{Effect, Tick, extent};
use crate::Color;
use crate::canvas::{Canvas, Point};
use crate::timing::Gate;
use rand::Rng;
use rand::rngs::StdRng;

pub const MAX_LENGTH: usize = 64;
pub const INITIAL_LENGTH: usize = 2;
const STEP_MS: u64 = 60;

const BODY_COLORS: [Color; 5] = [
    Color::new(255, 0, 0),
    Color::new(0, 128, 0),
    Color::new(0, 0, 255),
    Color::new(255, 255, 0),
    Color::new(128, 0, 128),
];
const APPLE_COLOR: Color = Color::RED;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    fn step(self, p: Point) -> Point {
        match self {
            Direction::Up => Point::new(p.x, p.y - 1),
            Direction::Right => Point::new(p.x + 1, p.y),
            Direction::Down => Point::new(p.x, p.y + 1),
            Direction::Left => Point::new(p.x - 1, p.y),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Segment {
    pos: Point,
    color_index: usize,
    /// Cleared on a freshly grown tail so it holds still for one step.
    advance: bool,
}

#[derive(Debug)]
pub struct SnakeGame {
    /// Head first.
    segments: Vec<Segment>,
    direction: Direction,
    apple: Point,
    game_over: bool,
    color_cursor: usize,
    gate: Gate,
}

impl Default for SnakeGame {
    /// Starts in the game-over state so the first tick lays out a fresh game.
    fn default() -> Self {
        Self {
            segments: Vec::with_capacity(MAX_LENGTH),
            direction: Direction::Right,
            apple: Point::ORIGIN,
            game_over: true,
            color_cursor: 0,
            gate: Gate::at_least(STEP_MS),
        }
    }
}

fn random_cell(rng: &mut StdRng, cols: i32, rows: i32) -> Point {
    Point::new(rng.gen_range(0..cols), rng.gen_range(0..rows))
}

impl SnakeGame {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn head(&self) -> Point {
        self.segments.first().map_or(Point::ORIGIN, |s| s.pos)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn apple(&self) -> Point {
        self.apple
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    fn reset(&mut self, rng: &mut StdRng, cols: i32, rows: i32) {
        self.segments.clear();
        self.segments.extend((0..INITIAL_LENGTH as i32).map(|i| Segment {
            pos: Point::new(0, i),
            color_index: self.color_cursor,
            advance: true,
        }));
        self.direction = Direction::Right;
        self.apple = random_cell(rng, cols, rows);
        self.game_over = false;
    }

    /// Whether `p` is occupied by any segment other than the head.
    fn hits_body(&self, p: Point) -> bool {
        self.segments.iter().skip(1).any(|s| s.pos == p)
    }

    fn steer(&mut self, cols: i32, rows: i32) {
        let head = self.head();
        let apple = self.apple;
        let heading = self.direction;

        // Turn only when already lined up with the apple on the other axis.
        if heading.is_vertical() {
            if apple.y == head.y {
                if apple.x > head.x {
                    self.direction = Direction::Right;
                } else if apple.x < head.x {
                    self.direction = Direction::Left;
                }
            }
        } else if apple.x == head.x {
            if apple.y > head.y {
                self.direction = Direction::Down;
            } else if apple.y < head.y {
                self.direction = Direction::Up;
            }
        }

        if !self.hits_body(self.direction.step(head)) {
            return;
        }

        let escapes = if self.direction.is_vertical() {
            [Direction::Right, Direction::Left]
        } else {
            [Direction::Down, Direction::Up]
        };
        let open = |d: Direction| {
            let p = d.step(head);
            p.x >= 0 && p.x < cols && p.y >= 0 && p.y < rows && !self.hits_body(p)
        };
        if let Some(turn) = escapes
            .into_iter()
            .find(|&d| d != heading.opposite() && open(d))
        {
            self.direction = turn;
        }
    }

    /// One gated simulation step.
    fn step(&mut self, rng: &mut StdRng, cols: i32, rows: i32) {
        self.steer(cols, rows);

        if self.head() == self.apple {
            if self.segments.len() < MAX_LENGTH {
                let color_index = self
                    .segments
                    .last()
                    .map_or(self.color_cursor, |s| s.color_index);
                self.segments.push(Segment {
                    pos: self.apple,
                    color_index,
                    advance: false,
                });
            }
            // The body is not checked; the apple may land on it.
            self.apple = random_cell(rng, cols, rows);
        }

        for i in (1..self.segments.len()).rev() {
            if self.segments[i].advance {
                let ahead = self.segments[i - 1];
                self.segments[i].pos = ahead.pos;
                self.segments[i].color_index = ahead.color_index;
            } else {
                self.segments[i].advance = true;
            }
        }

        let mut head = self.direction.step(self.head());
        let wrapped = if head.x < 0 {
            head.x = cols - 1;
            true
        } else if head.x >= cols {
            head.x = 0;
            true
        } else if head.y < 0 {
            head.y = rows - 1;
            true
        } else if head.y >= rows {
            head.y = 0;
            true
        } else {
            false
        };
        self.segments[0].pos = head;
        if wrapped {
            self.color_cursor = (self.color_cursor + 1) % BODY_COLORS.len();
            self.segments[0].color_index = self.color_cursor;
        }

        if self.hits_body(head) {
            tracing::debug!(length = self.segments.len(), "snake ran into itself");
            self.game_over = true;
        }
    }
}

impl Effect for SnakeGame {
    fn render(&mut self, tick: &mut Tick<'_>, canvas: &mut dyn Canvas, origin: Point) {
        let (cols, rows) = extent(canvas);
        if cols <= 0 || rows <= 0 {
            return;
        }

        if self.game_over {
            self.reset(tick.rng, cols, rows);
        }
        if self.gate.ready(tick.now_ms) {
            self.step(tick.rng, cols, rows);
        }

        for segment in &self.segments {
            let p = segment.pos.offset(origin);
            canvas.set_pixel(p.x, p.y, BODY_COLORS[segment.color_index]);
        }
        let apple = self.apple.offset(origin);
        canvas.set_pixel(apple.x, apple.y, APPLE_COLOR);
    }
}
