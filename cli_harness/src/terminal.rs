//! crossterm front end: keyboard paddles, emulated encoders and a scaled
//! character rendering of the court.

use std::io::{self, stdout, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use knobpong_core::{
    Config, Event, FeedbackSink, InputFrame, InputSource, MatchResult, MatchSetup, Renderer,
    Side, Snapshot,
};
use tracing::warn;

use crate::feedback::{LedColor, LedPanel, LED_LINE_LEN};

/// Court columns on screen
pub const GRID_COLS: i32 = 60;
/// Court rows on screen, below the header
pub const GRID_ROWS: i32 = 18;

/// Maps court pixels to character cells
#[derive(Debug, Copy, Clone)]
pub struct Grid {
    config: Config,
}

impl Grid {
    pub fn new(config: Config) -> Self {
        Grid { config }
    }

    pub fn column(&self, x: i32) -> i32 {
        (x * GRID_COLS / self.config.width).clamp(0, GRID_COLS - 1)
    }

    pub fn row(&self, y: i32) -> i32 {
        let court = self.config.height - self.config.top;
        ((y - self.config.top) * GRID_ROWS / court).clamp(0, GRID_ROWS - 1)
    }

    /// Rows covered by a paddle whose top edge is at `y`
    pub fn paddle_rows(&self, y: i32) -> std::ops::RangeInclusive<i32> {
        self.row(y)..=self.row(y + self.config.paddle_height - 1)
    }

    /// Cell holding the ball's center
    pub fn ball_cell(&self, x: i32, y: i32) -> (i32, i32) {
        let half = self.config.ball_size / 2;
        (self.column(x + half), self.row(y + half))
    }
}

/// Translate one key press into frame input. Returns false for quit keys.
pub fn apply_key(frame: &mut InputFrame, key: KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return true;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return false,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return false,
        KeyCode::Char('w') | KeyCode::Char('W') => frame.left.up = true,
        KeyCode::Char('s') | KeyCode::Char('S') => frame.left.down = true,
        KeyCode::Char('o') | KeyCode::Char('O') => frame.right.up = true,
        KeyCode::Char('l') | KeyCode::Char('L') => frame.right.down = true,
        KeyCode::Char('z') | KeyCode::Char('Z') => frame.left.encoder_delta -= 1,
        KeyCode::Char('x') | KeyCode::Char('X') => frame.left.encoder_delta += 1,
        KeyCode::Char(',') => frame.right.encoder_delta -= 1,
        KeyCode::Char('.') => frame.right.encoder_delta += 1,
        _ => {}
    }
    true
}

fn led_color(led: LedColor) -> Color {
    match led {
        LedColor::Off => Color::DarkGrey,
        LedColor::Green => Color::Green,
        LedColor::Blue => Color::Blue,
        LedColor::Red => Color::Red,
    }
}

/// Raw-mode terminal session; restores the terminal when dropped
pub struct Terminal {
    out: Stdout,
    grid: Grid,
    setup: MatchSetup,
    leds: LedPanel,
    cancel: Arc<AtomicBool>,
}

impl Terminal {
    pub fn new(config: Config, setup: MatchSetup, cancel: Arc<AtomicBool>) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut out = stdout();
        execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(Terminal {
            out,
            grid: Grid::new(config),
            setup,
            leds: LedPanel::default(),
            cancel,
        })
    }

    pub fn reset_feedback(&mut self) {
        self.leds.reset();
    }

    fn draw(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        let out = &mut self.out;
        queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;

        // Header: diodes at both ends, lives or score between
        let status = match (snapshot.lives, snapshot.score) {
            (Some([left, right]), _) => format!("lives {left} : {right}"),
            (None, Some(score)) => format!("score {score}"),
            (None, None) => String::new(),
        };
        queue!(
            out,
            SetForegroundColor(led_color(self.leds.diode(Side::Left))),
            Print("●"),
            ResetColor,
            Print(format!(
                "  {:^width$}  ",
                format!("{}  {}", status, self.setup.difficulty),
                width = GRID_COLS as usize - 4
            )),
            SetForegroundColor(led_color(self.leds.diode(Side::Right))),
            Print("●"),
            ResetColor,
        )?;

        let paddle_left = self.grid.paddle_rows(snapshot.paddles[0]);
        let paddle_right = self.grid.paddle_rows(snapshot.paddles[1]);
        let (ball_col, ball_row) = self.grid.ball_cell(snapshot.ball.x, snapshot.ball.y);

        for row in 0..GRID_ROWS {
            queue!(out, MoveTo(0, (row + 1) as u16))?;
            let mut line = String::with_capacity(GRID_COLS as usize);
            for col in 0..GRID_COLS {
                let cell = if col == ball_col && row == ball_row {
                    '■'
                } else if col == 0 && paddle_left.contains(&row) {
                    '█'
                } else if col == GRID_COLS - 1 && paddle_right.contains(&row) {
                    '█'
                } else if col == GRID_COLS / 2 {
                    '┊'
                } else {
                    ' '
                };
                line.push(cell);
            }
            queue!(out, Print(line))?;
        }

        let dot = self.leds.dot();
        let strip: String = (0..LED_LINE_LEN)
            .map(|i| if i == dot { '●' } else { '·' })
            .collect();
        queue!(
            out,
            MoveTo(0, (GRID_ROWS + 1) as u16),
            SetForegroundColor(Color::Yellow),
            Print(strip),
            ResetColor,
            MoveTo(0, (GRID_ROWS + 2) as u16),
            SetForegroundColor(Color::DarkGrey),
            Print("w/s z/x: left   o/l ,/.: right   q: quit"),
            ResetColor,
        )?;
        out.flush()
    }

    /// Post-game screen. Returns true when the player asks for a rematch.
    pub fn show_result(&mut self, result: MatchResult, best: Option<(u32, bool)>) -> io::Result<bool> {
        let headline = match result {
            MatchResult::Score(score) => format!("GAME OVER  score {score}"),
            MatchResult::Lives { left, right } => {
                let winner = if left > right { "LEFT" } else { "RIGHT" };
                format!("{winner} PLAYER WINS  ({left} : {right})")
            }
        };
        let detail = match best {
            Some((_, true)) => "new highscore!".to_string(),
            Some((best, false)) => format!("highscore {best}"),
            None => String::new(),
        };

        execute!(
            self.out,
            Clear(ClearType::All),
            MoveTo(2, 4),
            SetForegroundColor(Color::Cyan),
            Print(headline),
            ResetColor,
            MoveTo(2, 6),
            Print(detail),
            MoveTo(2, 8),
            SetForegroundColor(Color::DarkGrey),
            Print("enter: play again   q: quit"),
            ResetColor,
        )?;

        loop {
            if self.cancel.load(Ordering::Relaxed) {
                return Ok(false);
            }
            if !poll(Duration::from_millis(100))? {
                continue;
            }
            if let TermEvent::Key(key) = read()? {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                match key.code {
                    KeyCode::Enter => return Ok(true),
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(false),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(false)
                    }
                    _ => {}
                }
            }
        }
    }

    fn read_pending(&mut self) -> io::Result<InputFrame> {
        let mut frame = InputFrame::default();
        while poll(Duration::from_millis(0))? {
            if let TermEvent::Key(key) = read()? {
                if !apply_key(&mut frame, key) {
                    self.cancel.store(true, Ordering::Relaxed);
                }
            }
        }
        Ok(frame)
    }
}

impl InputSource for Terminal {
    fn poll(&mut self) -> InputFrame {
        self.read_pending().unwrap_or_else(|err| {
            warn!(%err, "keyboard read failed");
            InputFrame::default()
        })
    }
}

impl Renderer for Terminal {
    fn render(&mut self, snapshot: &Snapshot) {
        if let Err(err) = self.draw(snapshot) {
            warn!(%err, "render failed");
        }
    }
}

impl FeedbackSink for Terminal {
    fn on_event(&mut self, event: Event) {
        self.leds.on_event(event);
    }

    fn on_tick(&mut self) {
        self.leds.on_tick();
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = execute!(self.out, LeaveAlternateScreen, Show);
        let _ = disable_raw_mode();
    }
}
