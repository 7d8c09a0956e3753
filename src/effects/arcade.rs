//! Self-playing arcade games: ping-pong and brick-breaker.
//!
//! Both run discrete integer physics behind a [`Gate`] and repaint every
//! tick. Ball velocity components are always exactly `+1` or `-1`: edge
//! reflections set the sign outright instead of negating, so a ball that
//! lands on an edge twice in a row can never be pushed off the panel.

use super::{Effect, Tick, extent};
use crate::Color;
use crate::canvas::{Canvas, Point};
use crate::timing::Gate;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ball {
    pub pos: Point,
    pub dx: i32,
    pub dy: i32,
}

impl Ball {
    fn centered(cols: i32, rows: i32) -> Self {
        Self {
            pos: Point::new(cols / 2, rows / 2),
            dx: 1,
            dy: 1,
        }
    }

    fn advance(&mut self) {
        self.pos = self.pos.offset(Point::new(self.dx, self.dy));
    }

    /// Point `dy` back into `0..rows` when the ball touches the top or bottom.
    fn reflect_vertical(&mut self, rows: i32) {
        if self.pos.y <= 0 {
            self.dy = 1;
        } else if self.pos.y + BALL_SIZE >= rows {
            self.dy = -1;
        }
    }
}

const BALL_SIZE: i32 = 1;
const PADDLE_COLOR: Color = Color::WHITE;
const BALL_COLOR: Color = Color::RED;

// ── Ping-pong ────────────────────────────────────────────────────────

pub const PADDLE_HEIGHT: i32 = 3;
const PING_PONG_STEP_MS: u64 = 80;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paddle {
    pub y: i32,
    pub dy: i32,
}

impl Paddle {
    fn advance(&mut self, rows: i32) {
        self.y += self.dy;
        if self.y <= 0 {
            self.dy = 1;
        } else if self.y + PADDLE_HEIGHT >= rows {
            self.dy = -1;
        }
    }

    fn covers(&self, y: i32) -> bool {
        (self.y..self.y + PADDLE_HEIGHT).contains(&y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Court {
    left: Paddle,
    right: Paddle,
    ball: Ball,
}

/// Two paddles bouncing up and down and a ball between them. Nobody keeps
/// score: a missed ball goes back to the centre.
#[derive(Debug)]
pub struct PingPong {
    court: Option<Court>,
    gate: Gate,
}

impl Default for PingPong {
    fn default() -> Self {
        Self {
            court: None,
            gate: Gate::exceeding(PING_PONG_STEP_MS),
        }
    }
}

impl PingPong {
    pub fn ball(&self) -> Option<Ball> {
        self.court.map(|c| c.ball)
    }

    pub fn paddles(&self) -> Option<(Paddle, Paddle)> {
        self.court.map(|c| (c.left, c.right))
    }
}

impl Court {
    fn new(cols: i32, rows: i32) -> Self {
        Self {
            left: Paddle { y: rows / 2, dy: 1 },
            right: Paddle { y: rows / 2, dy: -1 },
            ball: Ball::centered(cols, rows),
        }
    }

    fn step(&mut self, cols: i32, rows: i32) {
        self.left.advance(rows);
        self.right.advance(rows);

        let ball = &mut self.ball;
        ball.advance();
        ball.reflect_vertical(rows);

        if ball.pos.x < 0 || ball.pos.x + BALL_SIZE > cols {
            *ball = Ball::centered(cols, rows);
            return;
        }
        if ball.pos.x <= 0 && self.left.covers(ball.pos.y) {
            ball.dx = 1;
        }
        if ball.pos.x + BALL_SIZE >= cols && self.right.covers(ball.pos.y) {
            ball.dx = -1;
        }
    }
}

impl Effect for PingPong {
    fn render(&mut self, tick: &mut Tick<'_>, canvas: &mut dyn Canvas, origin: Point) {
        let (cols, rows) = extent(canvas);
        if cols <= 0 || rows <= 0 {
            return;
        }
        let court = self.court.get_or_insert_with(|| Court::new(cols, rows));

        if self.gate.ready(tick.now_ms) {
            court.step(cols, rows);
        }

        for i in 0..PADDLE_HEIGHT {
            canvas.set_pixel(origin.x, origin.y + court.left.y + i, PADDLE_COLOR);
            canvas.set_pixel(origin.x + cols - 1, origin.y + court.right.y + i, PADDLE_COLOR);
        }
        let ball = court.ball.pos.offset(origin);
        canvas.set_pixel(ball.x, ball.y, BALL_COLOR);
    }
}

// ── Brick-breaker ────────────────────────────────────────────────────

pub const BRICK_ROWS: usize = 3;
pub const BRICK_COLS: usize = 16;
const PADDLE_WIDTH: i32 = 3;
const BRICK_BREAKER_STEP_MS: u64 = 100;
const BRICK_COLOR: Color = Color::new(0, 0, 255);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bricks([[bool; BRICK_COLS]; BRICK_ROWS]);

impl Default for Bricks {
    fn default() -> Self {
        Self([[true; BRICK_COLS]; BRICK_ROWS])
    }
}

impl Bricks {
    pub fn remaining(&self) -> usize {
        self.0.iter().flatten().filter(|&&present| present).count()
    }

    pub fn is_present(&self, row: usize, col: usize) -> bool {
        self.0[row][col]
    }

    fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..BRICK_ROWS)
            .flat_map(|row| (0..BRICK_COLS).map(move |col| (row, col)))
            .filter(|&(row, col)| self.0[row][col])
    }
}

/// A ball clearing a wall of bricks, with a paddle that simply follows it.
#[derive(Debug)]
pub struct BrickBreaker {
    ball: Option<Ball>,
    paddle_x: i32,
    bricks: Bricks,
    gate: Gate,
}

impl Default for BrickBreaker {
    fn default() -> Self {
        Self {
            ball: None,
            paddle_x: 0,
            bricks: Bricks::default(),
            gate: Gate::exceeding(BRICK_BREAKER_STEP_MS),
        }
    }
}

impl BrickBreaker {
    pub fn ball(&self) -> Option<Ball> {
        self.ball
    }

    pub fn paddle_x(&self) -> i32 {
        self.paddle_x
    }

    pub fn bricks(&self) -> &Bricks {
        &self.bricks
    }

    fn step(&mut self, ball: &mut Ball, cols: i32, rows: i32) {
        ball.advance();
        self.paddle_x = ball.pos.x - 1;

        if ball.pos.x <= 0 {
            ball.dx = 1;
        } else if ball.pos.x + BALL_SIZE >= cols {
            ball.dx = -1;
        }

        let band = brick_width(cols);
        for row in 0..BRICK_ROWS {
            for col in 0..BRICK_COLS {
                let left = col as i32 * band;
                let hit = self.bricks.0[row][col]
                    && ball.pos.y == row as i32
                    && (left..left + band).contains(&ball.pos.x);
                if hit {
                    self.bricks.0[row][col] = false;
                    ball.dy = -ball.dy;
                }
            }
        }
        // After the brick bounce so a hit on the top row cannot send the
        // ball upwards off the panel.
        ball.reflect_vertical(rows);

        if self.bricks.remaining() == 0 {
            tracing::debug!("brick wall cleared, rebuilding");
            self.bricks = Bricks::default();
        }
    }
}

fn brick_width(cols: i32) -> i32 {
    (cols / BRICK_COLS as i32).max(1)
}

impl Effect for BrickBreaker {
    fn render(&mut self, tick: &mut Tick<'_>, canvas: &mut dyn Canvas, origin: Point) {
        let (cols, rows) = extent(canvas);
        if cols <= 0 || rows <= 0 {
            return;
        }
        let mut ball = self.ball.unwrap_or_else(|| {
            self.paddle_x = cols / 2;
            Ball::centered(cols, rows)
        });

        if self.gate.ready(tick.now_ms) {
            self.step(&mut ball, cols, rows);
        }
        self.ball = Some(ball);

        canvas.fill_region(
            origin.x + self.paddle_x,
            origin.y + rows - 1,
            PADDLE_WIDTH as u32,
            1,
            PADDLE_COLOR,
        );
        let pos = ball.pos.offset(origin);
        canvas.set_pixel(pos.x, pos.y, BALL_COLOR);

        let band = brick_width(cols);
        for (row, col) in self.bricks.cells() {
            canvas.set_pixel(origin.x + col as i32 * band, origin.y + row as i32, BRICK_COLOR);
        }
    }
}
