//! Startup and the main loop.
//!
//! Startup order matters: the first frame fixes the frame size, the frame
//! size fixes the instrument regions, and the regions never move afterwards.

use std::sync::mpsc::Sender;

use air_kit::{place_all, FrameLoop, FrameSource, Instrument, KitError, LoopExit};
use image::RgbImage;
use thiserror::Error;
use tracing::{info, warn};

use crate::assets::{load_icon, AssetError};
use crate::audio::{open_backend, AudioBackend, AudioError};
use crate::config::{AppConfig, ConfigError};
use crate::sim::SimInput;
use crate::window::Window;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error(transparent)]
    Kit(#[from] KitError),
    #[error("camera: {0}")]
    Camera(String),
    #[error("camera produced no frame")]
    NoFrame,
    #[error("window: {0}")]
    Window(String),
}

// ════════════════════════════════════════════════════════════════════════════
// Frame sources
// ════════════════════════════════════════════════════════════════════════════

/// Replays a frame already pulled during startup, then defers to `rest`.
pub struct Primed {
    first: Option<RgbImage>,
    rest:  Box<dyn FrameSource>,
}

impl Primed {
    pub fn new(first: RgbImage, rest: Box<dyn FrameSource>) -> Self {
        Primed { first: Some(first), rest }
    }
}

impl FrameSource for Primed {
    fn next_frame(&mut self) -> Option<RgbImage> {
        self.first.take().or_else(|| self.rest.next_frame())
    }
}

/// The webcam, or the mouse-driven simulation when built without `camera`.
#[cfg(feature = "camera")]
fn open_source(cfg: &AppConfig) -> Result<(Box<dyn FrameSource>, Option<Sender<SimInput>>), AppError> {
    let cam = crate::camera::WebCamera::open(cfg.camera.index)
        .map_err(|e| AppError::Camera(e.to_string()))?;
    Ok((Box::new(cam), None))
}

#[cfg(not(feature = "camera"))]
fn open_source(cfg: &AppConfig) -> Result<(Box<dyn FrameSource>, Option<Sender<SimInput>>), AppError> {
    let (tx, rx) = std::sync::mpsc::channel::<SimInput>();
    info!(width = cfg.sim.width, height = cfg.sim.height, "simulated camera");
    Ok((Box::new(crate::sim::SimCamera::new(&cfg.sim, cfg.camera.mirror, rx)), Some(tx)))
}

// ════════════════════════════════════════════════════════════════════════════
// Instruments
// ════════════════════════════════════════════════════════════════════════════

/// Load every configured instrument's sound and icon, then lay them out
/// for a `width`×`height` frame.
pub fn build_instruments(
    cfg:     &AppConfig,
    backend: &mut dyn AudioBackend,
    width:   u32,
    height:  u32,
) -> Result<Vec<Instrument>, AppError> {
    let coverage = cfg.coverage()?;
    let mut instruments = Vec::with_capacity(cfg.instruments.len());
    for entry in &cfg.instruments {
        let sound = backend.load(entry.kind, &cfg.resolve(&entry.sound))?;
        let mut inst = Instrument::new(entry.kind, sound).with_coverage(coverage);
        if let Some(color) = entry.color {
            inst = inst.with_color(color);
        }
        if let Some(icon) = &entry.icon {
            inst = inst.with_icon(load_icon(&cfg.resolve(icon))?)?;
        }
        instruments.push(inst);
    }
    place_all(&mut instruments, width, height, cfg.trigger.layout)?;
    Ok(instruments)
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run until the quit key, window close, or end of the video stream.
pub fn run(cfg: AppConfig) -> Result<LoopExit, AppError> {
    cfg.validate()?;

    // ── Video ─────────────────────────────────────────────────────────────
    let (mut source, sim_tx) = open_source(&cfg)?;
    let first = source.next_frame().ok_or(AppError::NoFrame)?;
    let (width, height) = first.dimensions();
    info!(width, height, "first frame");

    // ── Audio + instruments ───────────────────────────────────────────────
    let mut backend = open_backend(cfg.audio.backend, cfg.audio.midi_velocity);
    let instruments = build_instruments(&cfg, backend.as_mut(), width, height)?;

    // ── Display ───────────────────────────────────────────────────────────
    let mut window = Window::new("Air Drums", width, height, cfg.trigger.quit_key, sim_tx)
        .map_err(AppError::Window)?;

    // ── Loop ──────────────────────────────────────────────────────────────
    let mut frames = Primed::new(first, source);
    let mut frame_loop = FrameLoop::with_system_clock(instruments, cfg.loop_config())?;
    let exit = frame_loop.run(&mut frames, &mut window, &mut backend)?;

    if exit == LoopExit::EndOfStream {
        warn!("video stream ended");
    }
    Ok(exit)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
