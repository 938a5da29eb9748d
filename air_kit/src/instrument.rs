//! Instruments: a screen region, a color to look for, and a sound.
//!
//! Detection is the same for every kind of instrument; only the fire action
//! differs, and that is expressed through [`OnFire`].

use std::fmt;

use image::{imageops, GrayImage, RgbImage};
use region_mask::{
    classify, layout_all, ColorRange, ColumnMapping, Coverage, Occupancy, Rect, REGION_SIZE,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::KitError;

// ════════════════════════════════════════════════════════════════════════════
// InstrumentKind
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    Hat,
    Snare,
    Kick,
    Crash,
    Tom,
}

impl InstrumentKind {
    pub const ALL: [InstrumentKind; 5] = [
        InstrumentKind::Hat,
        InstrumentKind::Snare,
        InstrumentKind::Kick,
        InstrumentKind::Crash,
        InstrumentKind::Tom,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            InstrumentKind::Hat   => "Hi-hat",
            InstrumentKind::Snare => "Snare",
            InstrumentKind::Kick  => "Kick",
            InstrumentKind::Crash => "Crash",
            InstrumentKind::Tom   => "Tom",
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Sound playback seam
// ════════════════════════════════════════════════════════════════════════════

/// Opaque reference to a sound loaded by the audio backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SoundHandle(usize);

impl SoundHandle {
    pub const fn new(index: usize) -> Self { SoundHandle(index) }
    pub fn index(&self) -> usize { self.0 }
}

/// Fire-and-forget playback.  Must not block; overlapping plays are fine.
pub trait SoundPlayer {
    fn play(&mut self, sound: SoundHandle);
}

/// The per-kind action taken when an instrument fires.
pub trait OnFire {
    fn on_fire(&self, sound: SoundHandle, player: &mut dyn SoundPlayer);
}

impl OnFire for InstrumentKind {
    fn on_fire(&self, sound: SoundHandle, player: &mut dyn SoundPlayer) {
        info!(instrument = self.name(), sound = sound.index(), "fire");
        player.play(sound);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Instrument
// ════════════════════════════════════════════════════════════════════════════

/// Outcome of one evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub count:     u64,
    pub threshold: u64,
    pub fired:     bool,
}

#[derive(Debug)]
pub struct Instrument {
    kind:     InstrumentKind,
    color:    ColorRange,
    coverage: Coverage,
    region:   Option<Rect>,
    icon:     Option<RgbImage>,
    sound:    SoundHandle,
    firing:   bool,
    last:     Option<Occupancy>,
}

impl Instrument {
    pub fn new(kind: InstrumentKind, sound: SoundHandle) -> Self {
        Instrument {
            kind,
            color:    ColorRange::default(),
            coverage: Coverage::default(),
            region:   None,
            icon:     None,
            sound,
            firing:   false,
            last:     None,
        }
    }

    pub fn with_color(mut self, color: ColorRange) -> Self {
        self.color = color;
        self
    }

    pub fn with_coverage(mut self, coverage: Coverage) -> Self {
        self.coverage = coverage;
        self
    }

    /// Attach a display icon; it must be exactly the region size.
    pub fn with_icon(mut self, icon: RgbImage) -> Result<Self, KitError> {
        let (width, height) = icon.dimensions();
        if (width, height) != (REGION_SIZE.width, REGION_SIZE.height) {
            return Err(KitError::IconSize {
                kind: self.kind,
                width,
                height,
                expected_w: REGION_SIZE.width,
                expected_h: REGION_SIZE.height,
            });
        }
        self.icon = Some(icon);
        Ok(self)
    }

    /// Fix the screen region.  A region can only be set once.
    pub fn place(&mut self, rect: Rect) -> Result<(), KitError> {
        if self.region.is_some() {
            return Err(KitError::AlreadyPlaced(self.kind));
        }
        self.region = Some(rect);
        Ok(())
    }

    pub fn kind(&self)     -> InstrumentKind     { self.kind }
    pub fn color(&self)    -> &ColorRange        { &self.color }
    pub fn coverage(&self) -> Coverage           { self.coverage }
    pub fn region(&self)   -> Option<Rect>       { self.region }
    pub fn icon(&self)     -> Option<&RgbImage>  { self.icon.as_ref() }
    pub fn sound(&self)    -> SoundHandle        { self.sound }
    pub fn is_firing(&self) -> bool              { self.firing }

    /// Most recent classification, if the instrument has been evaluated.
    pub fn last_occupancy(&self) -> Option<&Occupancy> { self.last.as_ref() }

    /// Matching-pixel count above which the instrument fires.
    pub fn threshold(&self) -> u64 {
        self.coverage.threshold(REGION_SIZE)
    }

    /// Classify this instrument's region of `frame` without side effects.
    ///
    /// Parts of the region outside the frame contribute nothing.
    pub fn measure(&self, frame: &RgbImage) -> Result<Occupancy, KitError> {
        let rect = self.region.ok_or(KitError::NotPlaced(self.kind))?;
        let occ = match rect.clip(frame.width(), frame.height()) {
            Some((x, y, w, h)) => {
                let area = imageops::crop_imm(frame, x, y, w, h).to_image();
                classify(&area, &self.color)
            }
            None => Occupancy { count: 0, mask: GrayImage::new(0, 0) },
        };
        Ok(occ)
    }

    /// Measure, update `firing`, and play the sound on contact.
    pub fn evaluate(
        &mut self,
        frame:  &RgbImage,
        player: &mut dyn SoundPlayer,
    ) -> Result<Evaluation, KitError> {
        let occ = self.measure(frame)?;
        let threshold = self.threshold();
        let fired = self.coverage.exceeded_by(occ.count, REGION_SIZE);

        self.firing = fired;
        if fired {
            self.kind.on_fire(self.sound, player);
        }

        let eval = Evaluation { count: occ.count, threshold, fired };
        self.last = Some(occ);
        Ok(eval)
    }
}

/// Lay out every instrument for a `width`×`height` frame, in slice order.
pub fn place_all(
    instruments: &mut [Instrument],
    width:       u32,
    height:      u32,
    mapping:     ColumnMapping,
) -> Result<(), KitError> {
    let rects = layout_all(instruments.len(), width, height, mapping)?;
    for (inst, rect) in instruments.iter_mut().zip(rects) {
        inst.place(rect)?;
        let tl = rect.top_left();
        info!(instrument = inst.kind.name(), x = tl.x, y = tl.y, "placed");
        if !rect.fits_within(width, height) {
            warn!(
                instrument = inst.kind.name(),
                width, height,
                "region extends past the frame; only the visible part is sampled"
            );
        }
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
