//! Fixed-timestep loop and the collaborator seams it drives.
//!
//! Wall-clock time is accumulated as a debt; every full quantum of debt pays
//! for exactly one simulation tick and one render, so ball speed in pixels
//! per tick holds no matter how long input polling or drawing takes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::game::{Game, TickReport};
use crate::types::*;

/// Length of one simulation tick
pub const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_HZ as u64);

/// Polled once per tick; must not block
pub trait InputSource {
    /// Raw input gathered since the previous poll. Device errors are
    /// reported as an empty frame.
    fn poll(&mut self) -> InputFrame;
}

/// Receives the post-tick state
pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot);
}

/// Timed feedback (LEDs, sound) driven by match events
pub trait FeedbackSink {
    fn on_event(&mut self, event: Event);

    /// Called once per tick after the events of that tick
    fn on_tick(&mut self) {}
}

/// Source of time for the loop
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep_until(&mut self, deadline: Instant);
}

#[derive(Debug, Default, Copy, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&mut self, deadline: Instant) {
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

/// How the loop waits between ticks
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Pacing {
    /// Block until the next tick is due
    #[default]
    Sleep,
    /// Spin on the clock
    BusyPoll,
}

/// Elapsed time not yet paid for with ticks
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TickDebt {
    debt: Duration,
    quantum: Duration,
}

impl TickDebt {
    pub fn new(quantum: Duration) -> Self {
        TickDebt {
            debt: Duration::ZERO,
            quantum,
        }
    }

    pub fn accrue(&mut self, elapsed: Duration) {
        self.debt += elapsed;
    }

    /// Pay for one tick if a full quantum is owed
    pub fn try_consume(&mut self) -> bool {
        if self.debt >= self.quantum {
            self.debt -= self.quantum;
            true
        } else {
            false
        }
    }

    pub fn debt(&self) -> Duration {
        self.debt
    }

    /// Time left until the next tick is owed
    pub fn until_next(&self) -> Duration {
        self.quantum.saturating_sub(self.debt)
    }
}

impl Default for TickDebt {
    fn default() -> Self {
        TickDebt::new(TICK_DURATION)
    }
}

/// Drives a [`Game`] at the fixed tick rate
pub struct Scheduler<C = SystemClock> {
    clock: C,
    pacing: Pacing,
    debt: TickDebt,
}

impl Scheduler<SystemClock> {
    pub fn new(pacing: Pacing) -> Self {
        Scheduler::with_clock(SystemClock, pacing)
    }
}

impl<C: Clock> Scheduler<C> {
    pub fn with_clock(clock: C, pacing: Pacing) -> Self {
        Scheduler {
            clock,
            pacing,
            debt: TickDebt::default(),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Run until the match ends or `cancel` is raised.
    ///
    /// Returns the match result, or `None` when cancelled. Both conditions
    /// are checked between ticks only.
    pub fn run<T>(&mut self, game: &mut Game, io: &mut T, cancel: &AtomicBool) -> Option<MatchResult>
    where
        T: InputSource + Renderer + FeedbackSink,
    {
        self.debt = TickDebt::default();
        io.render(&game.snapshot());

        let mut last = self.clock.now();
        loop {
            if cancel.load(Ordering::Relaxed) {
                info!(tick = game.tick, "match cancelled");
                return None;
            }

            let now = self.clock.now();
            self.debt.accrue(now.saturating_duration_since(last));
            last = now;

            if self.debt.try_consume() {
                Self::tick(game, io);
                if game.is_over() {
                    return game.result();
                }
                continue;
            }

            match self.pacing {
                Pacing::Sleep => self.clock.sleep_until(now + self.debt.until_next()),
                Pacing::BusyPoll => std::hint::spin_loop(),
            }
        }
    }

    /// One tick: poll, simulate, report events, render
    pub fn tick<T>(game: &mut Game, io: &mut T) -> TickReport
    where
        T: InputSource + Renderer + FeedbackSink,
    {
        let frame = io.poll();
        let report = game.step(&frame);
        for &event in &report.events {
            debug!(?event, tick = game.tick, "event");
            io.on_event(event);
        }
        io.on_tick();
        io.render(&game.snapshot());
        report
    }
}
