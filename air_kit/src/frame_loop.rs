//! The single-threaded capture → detect → render loop.
//!
//! Each iteration:
//!
//! 1. pull a frame (end of stream stops the loop),
//! 2. mirror it so on-screen motion matches the player's motion,
//! 3. if the debouncer is armed, evaluate every instrument and start a
//!    cooldown when any of them fired,
//! 4. composite icons, show the frame,
//! 5. poll the display for the quit key.
//!
//! While cooling, steps 1, 2, 4 and 5 still run, so the video stays live and
//! quitting is never delayed by a cooldown.

use std::time::Duration;

use image::{imageops, RgbImage};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::debounce::{DebounceState, TriggerDebouncer, DEFAULT_COOLDOWN};
use crate::error::KitError;
use crate::instrument::{Instrument, SoundPlayer};
use crate::overlay::composite_icon;

// ════════════════════════════════════════════════════════════════════════════
// Collaborator traits
// ════════════════════════════════════════════════════════════════════════════

/// Where frames come from.  `None` means the stream is over.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<RgbImage>;
}

/// Where frames go, and where the quit key comes from.
pub trait DisplaySink {
    fn show(&mut self, frame: &RgbImage, hud: &HudState<'_>);

    /// The most recent key press, if any, as a character.
    fn poll_key(&mut self) -> Option<char>;

    /// `false` once the user closed the display.
    fn is_open(&self) -> bool { true }
}

/// Per-frame state handed to the display alongside the frame.
pub struct HudState<'a> {
    pub state:       DebounceState,
    pub stats:       LoopStats,
    pub instruments: &'a [Instrument],
}

// ════════════════════════════════════════════════════════════════════════════
// Config / results
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct LoopConfig {
    pub mirror:   bool,
    pub quit_key: char,
    pub cooldown: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        LoopConfig {
            mirror:   true,
            quit_key: 'q',
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopExit {
    /// The quit key was pressed.
    Quit,
    /// The display was closed.
    DisplayClosed,
    /// The frame source ran dry or failed.
    EndOfStream,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub frames:    u64,
    /// Frames on which instruments were evaluated (armed frames).
    pub evaluated: u64,
    /// Individual instrument fires.
    pub fires:     u64,
    /// Armed → Cooling transitions.
    pub cooldowns: u64,
}

// ════════════════════════════════════════════════════════════════════════════
// FrameLoop
// ════════════════════════════════════════════════════════════════════════════

pub struct FrameLoop<C: Clock = SystemClock> {
    instruments: Vec<Instrument>,
    debouncer:   TriggerDebouncer,
    config:      LoopConfig,
    clock:       C,
    stats:       LoopStats,
}

impl FrameLoop<SystemClock> {
    pub fn with_system_clock(
        instruments: Vec<Instrument>,
        config:      LoopConfig,
    ) -> Result<Self, KitError> {
        FrameLoop::new(instruments, config, SystemClock)
    }
}

impl<C: Clock> FrameLoop<C> {
    /// Every instrument must already be placed.
    pub fn new(instruments: Vec<Instrument>, config: LoopConfig, clock: C) -> Result<Self, KitError> {
        if let Some(unplaced) = instruments.iter().find(|i| i.region().is_none()) {
            return Err(KitError::NotPlaced(unplaced.kind()));
        }
        Ok(FrameLoop {
            instruments,
            debouncer: TriggerDebouncer::new(config.cooldown),
            config,
            clock,
            stats: LoopStats::default(),
        })
    }

    pub fn instruments(&self) -> &[Instrument]       { &self.instruments }
    pub fn debouncer(&self)   -> &TriggerDebouncer   { &self.debouncer }
    pub fn config(&self)      -> &LoopConfig         { &self.config }
    pub fn stats(&self)       -> LoopStats           { self.stats }

    pub fn state(&self) -> DebounceState {
        self.debouncer.state(self.clock.now())
    }

    /// Run until quit, display close, or end of stream.
    pub fn run(
        &mut self,
        source:  &mut dyn FrameSource,
        display: &mut dyn DisplaySink,
        player:  &mut dyn SoundPlayer,
    ) -> Result<LoopExit, KitError> {
        info!(instruments = self.instruments.len(), "frame loop started");
        let exit = loop {
            if let Some(exit) = self.step(source, display, player)? {
                break exit;
            }
        };
        info!(
            ?exit,
            frames = self.stats.frames,
            fires = self.stats.fires,
            "frame loop finished"
        );
        Ok(exit)
    }

    /// One iteration.  `Some` when the loop should stop.
    pub fn step(
        &mut self,
        source:  &mut dyn FrameSource,
        display: &mut dyn DisplaySink,
        player:  &mut dyn SoundPlayer,
    ) -> Result<Option<LoopExit>, KitError> {
        if !display.is_open() {
            return Ok(Some(LoopExit::DisplayClosed));
        }
        let Some(mut frame) = source.next_frame() else {
            return Ok(Some(LoopExit::EndOfStream));
        };
        if self.config.mirror {
            imageops::flip_horizontal_in_place(&mut frame);
        }
        self.stats.frames += 1;

        let now = self.clock.now();
        if self.debouncer.is_armed(now) {
            self.stats.evaluated += 1;
            let mut contact = false;
            for inst in &mut self.instruments {
                let eval = inst.evaluate(&frame, player)?;
                if eval.fired {
                    contact = true;
                    self.stats.fires += 1;
                }
            }
            if contact {
                self.debouncer.record_fire(now);
                self.stats.cooldowns += 1;
                debug!(cooldown_ms = self.config.cooldown.as_millis() as u64, "cooling");
            }
        }

        for inst in &self.instruments {
            if let (Some(rect), Some(icon)) = (inst.region(), inst.icon()) {
                composite_icon(&mut frame, rect, icon);
            }
        }

        let hud = HudState {
            state:       self.debouncer.state(now),
            stats:       self.stats,
            instruments: &self.instruments,
        };
        display.show(&frame, &hud);

        if let Some(key) = display.poll_key() {
            if key.eq_ignore_ascii_case(&self.config.quit_key) {
                return Ok(Some(LoopExit::Quit));
            }
        }
        Ok(None)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
