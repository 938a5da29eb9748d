//! # air_kit
//!
//! Instruments, the global trigger debounce, and the frame loop that ties a
//! video source, a display and a sound player together.
//!
//! ## Per-frame pipeline
//!
//! | Step | Armed | Cooling |
//! |---|---|---|
//! | Pull frame | yes | yes |
//! | Mirror horizontally | yes | yes |
//! | Evaluate every instrument | yes | **skipped** |
//! | Play sound of each firing instrument | yes | no |
//! | Composite icons, show frame | yes | yes |
//! | Poll quit key | yes | yes |
//!
//! Any fire on an armed frame starts a cooldown (200 ms by default) that
//! suppresses evaluation for *all* instruments.
//!
//! The loop talks to the outside world only through [`FrameSource`],
//! [`DisplaySink`] and [`SoundPlayer`], and reads time through [`Clock`], so
//! it can be driven entirely by scripted fakes.

pub mod clock;
pub mod debounce;
pub mod error;
pub mod instrument;
pub mod overlay;
pub mod frame_loop;

pub use clock::{Clock, ManualClock, SystemClock};
pub use debounce::{DebounceState, TriggerDebouncer, DEFAULT_COOLDOWN};
pub use error::KitError;
pub use instrument::{
    place_all, Evaluation, Instrument, InstrumentKind, OnFire, SoundHandle, SoundPlayer,
};
pub use overlay::composite_icon;
pub use frame_loop::{
    DisplaySink, FrameLoop, FrameSource, HudState, LoopConfig, LoopExit, LoopStats,
};
