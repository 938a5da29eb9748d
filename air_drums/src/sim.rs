//! Synthetic camera for running without a webcam.
//!
//! The window forwards the mouse as [`SimInput::Pointer`]; while the left
//! button is held, each frame carries a stick-colored block under the
//! pointer.  Pointer coordinates are in *display* space, so when the loop
//! mirrors frames the block is painted at the mirrored column and ends up
//! under the pointer on screen.

use std::sync::mpsc::{Receiver, TryRecvError};

use air_kit::FrameSource;
use image::{Rgb, RgbImage};
use region_mask::{Point, Rect, Size};

use crate::config::SimConfig;

/// Raw input event from the window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    Pointer { x: u32, y: u32, down: bool },
}

pub struct SimCamera {
    rx:         Receiver<SimInput>,
    background: RgbImage,
    stick:      Rgb<u8>,
    blob:       Size,
    mirror:     bool,
    /// Pointer position while the button is held, display coordinates.
    tip:        Option<Point>,
}

impl SimCamera {
    pub fn new(cfg: &SimConfig, mirror: bool, rx: Receiver<SimInput>) -> Self {
        SimCamera {
            rx,
            background: backdrop(cfg.width, cfg.height),
            stick:      Rgb(cfg.stick),
            blob:       Size::new(cfg.blob_width, cfg.blob_height),
            mirror,
            tip:        None,
        }
    }

    pub fn tip(&self) -> Option<Point> { self.tip }

    fn paint_tip(&self, frame: &mut RgbImage, tip: Point) {
        let x = if self.mirror { frame.width() as i32 - 1 - tip.x } else { tip.x };
        let rect = Rect::centered(Point::new(x, tip.y), self.blob);
        let Some((x0, y0, w, h)) = rect.clip(frame.width(), frame.height()) else {
            return;
        };
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                frame.put_pixel(x, y, self.stick);
            }
        }
    }
}

impl FrameSource for SimCamera {
    fn next_frame(&mut self) -> Option<RgbImage> {
        loop {
            match self.rx.try_recv() {
                Ok(SimInput::Pointer { x, y, down }) => {
                    self.tip = down.then(|| Point::new(x as i32, y as i32));
                }
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => return None,
            }
        }
        let mut frame = self.background.clone();
        if let Some(tip) = self.tip {
            self.paint_tip(&mut frame, tip);
        }
        Some(frame)
    }
}

/// Dim blue-gray vertical gradient, far from any stick color.
fn backdrop(width: u32, height: u32) -> RgbImage {
    let height = height.max(1);
    RgbImage::from_fn(width, height, |_, y| {
        let shade = (y * 40 / height) as u8;
        Rgb([30 + shade, 34 + shade, 48 + shade])
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
