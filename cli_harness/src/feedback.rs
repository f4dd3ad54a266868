//! LED panel emulation: two RGB diodes and a 32-LED line.

use knobpong_core::{Event, FeedbackSink, Side, TICK_HZ};

/// Hit blink length
pub const HIT_BLINK_MS: u32 = 200;
/// Ball-loss blink length
pub const LOSS_BLINK_MS: u32 = 1000;
/// Loss blink toggles between red and off this often
pub const LOSS_BLINK_PERIOD_MS: u32 = 200;
pub const LED_LINE_LEN: u8 = 32;

/// Duration in ticks, rounded to the nearest tick
pub fn ms_to_ticks(ms: u32) -> u32 {
    (ms * TICK_HZ + 500) / 1000
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LedColor {
    Off,
    Green,
    Blue,
    Red,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
struct Diode {
    hit: u32,
    loss: u32,
}

impl Diode {
    fn color(&self) -> LedColor {
        if self.loss > 0 {
            let period = ms_to_ticks(LOSS_BLINK_PERIOD_MS).max(1);
            if ((self.loss - 1) / period) % 2 == 0 {
                LedColor::Red
            } else {
                LedColor::Off
            }
        } else if self.hit > 0 {
            LedColor::Blue
        } else {
            LedColor::Green
        }
    }

    fn tick(&mut self) {
        if self.loss > 0 {
            self.loss -= 1;
        } else if self.hit > 0 {
            self.hit -= 1;
        }
    }
}

/// Turns match events into diode blinks and runs the LED line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedPanel {
    diodes: [Diode; 2],
    dot: u8,
    forward: bool,
}

impl Default for LedPanel {
    fn default() -> Self {
        LedPanel {
            diodes: [Diode::default(); 2],
            dot: 0,
            forward: true,
        }
    }
}

impl LedPanel {
    pub fn diode(&self, side: Side) -> LedColor {
        self.diodes[side.index()].color()
    }

    /// Index of the lit LED on the line
    pub fn dot(&self) -> u8 {
        self.dot
    }

    pub fn reset(&mut self) {
        *self = LedPanel::default();
    }
}

impl FeedbackSink for LedPanel {
    fn on_event(&mut self, event: Event) {
        match event {
            Event::PaddleHit(side) => {
                let diode = &mut self.diodes[side.index()];
                // A running loss blink wins
                if diode.loss == 0 {
                    diode.hit = ms_to_ticks(HIT_BLINK_MS);
                }
            }
            Event::BallLost(side) => {
                let diode = &mut self.diodes[side.index()];
                diode.loss = ms_to_ticks(LOSS_BLINK_MS);
                diode.hit = 0;
            }
        }
    }

    fn on_tick(&mut self) {
        for diode in &mut self.diodes {
            diode.tick();
        }

        if self.forward && self.dot == LED_LINE_LEN - 1 {
            self.forward = false;
        } else if self.dot == 0 {
            self.forward = true;
        }
        if self.forward {
            self.dot += 1;
        } else {
            self.dot -= 1;
        }
    }
}
