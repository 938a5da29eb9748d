//! # air_drums
//!
//! Webcam air drums.  Up to four instrument regions sit along the top and
//! bottom of the mirrored camera image; sweeping a red drumstick tip into
//! a region plays its sound.  After any hit every region is silenced for a
//! short global cooldown so one stroke is one sound.
//!
//! ## Startup
//!
//! ```text
//!  config.toml ──► AppConfig ──validate──► open camera ──► first frame
//!                                                              │ (w, h)
//!  sounds/*.wav ──► AudioBackend::load ──┐                     ▼
//!  images/*.png ──► load_icon (200×100) ─┴──► Instrument ─► place_all
//!                                                              │
//!                                  Window + FrameLoop::run ◄───┘
//! ```
//!
//! ## Audio backends
//!
//! | `--audio` | Output | Sound files |
//! |---|---|---|
//! | `samples` (default) | WAV one-shots mixed on the default output device | decoded and played |
//! | `midi` | General MIDI percussion, channel 10 | ignored; each kind has a GM note |
//! | `none` | silent | still decoded, so a broken kit fails early |
//!
//! A backend that cannot open its device falls back to `none` with a warning.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: the mouse is the drumstick.  Hold the
//!   left button over a region to paint a red blob into the next frames.
//! * `camera` — **Hardware mode**: capture from a webcam via `nokhwa`.
//!
//! ### Keys
//!
//! | Key | Action |
//! |---|---|
//! | `Q` (configurable) | Quit |
//! | `M` | Toggle the stick-mask view |
//! | `Escape` | Close the window |

pub mod config;
pub mod assets;
pub mod audio;
pub mod sim;
pub mod window;
pub mod app;
#[cfg(feature = "camera")]
pub mod camera;
