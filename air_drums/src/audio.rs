//! Sound output backends.
//!
//! All backends are fire-and-forget: [`SoundPlayer::play`] never blocks the
//! frame loop.  The sample backend hands voices to the `cpal` callback thread
//! over a channel; the MIDI backend writes a three-byte message.

use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use air_kit::{InstrumentKind, SoundHandle, SoundPlayer};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::assets::{read_wav_mono, AssetError};

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device")]
    NoDevice,
    #[error("audio device config: {0}")]
    DeviceConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("unsupported device sample format {0}")]
    SampleFormat(SampleFormat),
    #[error("cannot open audio stream: {0}")]
    Build(#[from] cpal::BuildStreamError),
    #[error("cannot start audio stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
    #[error("MIDI: {0}")]
    Midi(String),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// Which backend to open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AudioChoice {
    /// WAV samples through the default output device.
    Samples,
    /// General MIDI percussion on the first MIDI output port.
    Midi,
    /// No sound.
    #[serde(rename = "none")]
    #[value(name = "none")]
    Mute,
}

/// A [`SoundPlayer`] that can also load sounds.
pub trait AudioBackend: SoundPlayer {
    fn name(&self) -> &'static str;

    /// Register the sound for `kind`, loaded from `path` where relevant.
    fn load(&mut self, kind: InstrumentKind, path: &Path) -> Result<SoundHandle, AudioError>;
}

impl SoundPlayer for Box<dyn AudioBackend> {
    fn play(&mut self, sound: SoundHandle) {
        (**self).play(sound)
    }
}

/// Open the requested backend, falling back to [`NullPlayer`] when the
/// device is missing.
pub fn open_backend(choice: AudioChoice, midi_velocity: u8) -> Box<dyn AudioBackend> {
    let opened: Result<Box<dyn AudioBackend>, AudioError> = match choice {
        AudioChoice::Samples => SampleBank::open().map(|b| Box::new(b) as Box<dyn AudioBackend>),
        AudioChoice::Midi    => MidiDrums::open(midi_velocity).map(|b| Box::new(b) as Box<dyn AudioBackend>),
        AudioChoice::Mute    => Ok(Box::new(NullPlayer::default())),
    };
    match opened {
        Ok(backend) => {
            info!(backend = backend.name(), "audio ready");
            backend
        }
        Err(error) => {
            warn!(%error, "audio unavailable, continuing silently");
            Box::new(NullPlayer::default())
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SampleBank — hound + cpal
// ════════════════════════════════════════════════════════════════════════════

/// Per-voice gain; several overlapping hits are summed then clipped.
const VOICE_GAIN: f32 = 0.8;

/// One playing sound inside the output callback.
pub struct Voice {
    data: Arc<[f32]>,
    pos:  usize,
}

impl Voice {
    pub fn new(data: Arc<[f32]>) -> Self {
        Voice { data, pos: 0 }
    }
}

/// Mix all voices into the interleaved `out` buffer, dropping finished ones.
pub fn mix_voices(voices: &mut Vec<Voice>, out: &mut [f32], channels: usize) {
    let channels = channels.max(1);
    for frame in out.chunks_mut(channels) {
        let mut acc = 0.0f32;
        for v in voices.iter_mut() {
            if let Some(s) = v.data.get(v.pos) {
                acc += s * VOICE_GAIN;
                v.pos += 1;
            }
        }
        frame.fill(acc.clamp(-1.0, 1.0));
    }
    voices.retain(|v| v.pos < v.data.len());
}

/// Linear resample of mono data.
pub fn resample(data: &[f32], from: u32, to: u32) -> Vec<f32> {
    if from == to || data.is_empty() || from == 0 || to == 0 {
        return data.to_vec();
    }
    let ratio = from as f64 / to as f64;
    let len = ((data.len() as f64) / ratio).round().max(1.0) as usize;
    (0..len)
        .map(|i| {
            let x = i as f64 * ratio;
            let i0 = (x.floor() as usize).min(data.len() - 1);
            let i1 = (i0 + 1).min(data.len() - 1);
            let t = (x - i0 as f64) as f32;
            data[i0] * (1.0 - t) + data[i1] * t
        })
        .collect()
}

pub struct SampleBank {
    _stream: cpal::Stream,
    tx:      Sender<Voice>,
    rate:    u32,
    sounds:  Vec<Arc<[f32]>>,
}

impl SampleBank {
    pub fn open() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        let supported = device.default_output_config()?;
        let format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();
        let rate = config.sample_rate.0;
        let channels = config.channels as usize;

        let (tx, rx) = mpsc::channel::<Voice>();
        let stream = match format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, channels, rx)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &config, channels, rx)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config, channels, rx)?,
            other => return Err(AudioError::SampleFormat(other)),
        };
        stream.play()?;

        info!(
            device = %device.name().unwrap_or_else(|_| "unknown".into()),
            rate, channels, "sample output"
        );
        Ok(SampleBank { _stream: stream, tx, rate, sounds: Vec::new() })
    }
}

fn build_stream<T>(
    device:   &cpal::Device,
    config:   &cpal::StreamConfig,
    channels: usize,
    rx:       Receiver<Voice>,
) -> Result<cpal::Stream, AudioError>
where
    T: SizedSample + FromSample<f32>,
{
    let mut voices: Vec<Voice> = Vec::new();
    let mut scratch: Vec<f32> = Vec::new();
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            while let Ok(v) = rx.try_recv() {
                voices.push(v);
            }
            scratch.resize(data.len(), 0.0);
            mix_voices(&mut voices, &mut scratch, channels);
            for (out, s) in data.iter_mut().zip(&scratch) {
                *out = T::from_sample(*s);
            }
        },
        |err| warn!(%err, "audio stream error"),
        None,
    )?;
    Ok(stream)
}

impl SoundPlayer for SampleBank {
    fn play(&mut self, sound: SoundHandle) {
        match self.sounds.get(sound.index()) {
            Some(data) => {
                let _ = self.tx.send(Voice::new(Arc::clone(data)));
            }
            None => warn!(sound = sound.index(), "unknown sound handle"),
        }
    }
}

impl AudioBackend for SampleBank {
    fn name(&self) -> &'static str { "samples" }

    fn load(&mut self, kind: InstrumentKind, path: &Path) -> Result<SoundHandle, AudioError> {
        let sample = read_wav_mono(path)?;
        let data = resample(&sample.data, sample.rate, self.rate);
        debug!(instrument = kind.name(), frames = data.len(), "sample loaded");
        self.sounds.push(data.into());
        Ok(SoundHandle::new(self.sounds.len() - 1))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MidiDrums — midir, General MIDI channel 10
// ════════════════════════════════════════════════════════════════════════════

/// Zero-based channel index of GM percussion (channel 10).
const GM_DRUM_CHANNEL: u8 = 9;

/// General MIDI percussion key for each instrument.
pub fn gm_note(kind: InstrumentKind) -> u8 {
    match kind {
        InstrumentKind::Hat   => 42, // closed hi-hat
        InstrumentKind::Snare => 38, // acoustic snare
        InstrumentKind::Kick  => 36, // bass drum 1
        InstrumentKind::Crash => 49, // crash cymbal 1
        InstrumentKind::Tom   => 45, // low tom
    }
}

pub fn note_on(note: u8, velocity: u8) -> [u8; 3] {
    [0x90 | GM_DRUM_CHANNEL, note & 0x7F, velocity & 0x7F]
}

pub fn note_off(note: u8) -> [u8; 3] {
    [0x80 | GM_DRUM_CHANNEL, note & 0x7F, 0]
}

pub struct MidiDrums {
    conn:     midir::MidiOutputConnection,
    velocity: u8,
    notes:    Vec<u8>,
}

impl MidiDrums {
    /// Connect to the first MIDI output, preferring a software synth.
    pub fn open(velocity: u8) -> Result<Self, AudioError> {
        let midi_out = midir::MidiOutput::new("air_drums")
            .map_err(|e| AudioError::Midi(e.to_string()))?;

        let ports = midi_out.ports();
        if ports.is_empty() {
            return Err(AudioError::Midi(
                "no output ports (start a synth such as `fluidsynth` or `timidity -iA`)".into(),
            ));
        }

        let port_idx = ports.iter()
            .position(|p| {
                midi_out.port_name(p).map(|n| {
                    let n = n.to_lowercase();
                    n.contains("fluid") || n.contains("timidity") ||
                    n.contains("microsoft") || n.contains("gm") ||
                    n.contains("synth")
                }).unwrap_or(false)
            })
            .unwrap_or(0);

        let port = &ports[port_idx];
        let name = midi_out.port_name(port).unwrap_or_else(|_| "Unknown".to_string());
        info!(port = %name, "opening MIDI port");

        let conn = midi_out
            .connect(port, "air-drums")
            .map_err(|e| AudioError::Midi(e.to_string()))?;
        Ok(MidiDrums { conn, velocity, notes: Vec::new() })
    }
}

impl SoundPlayer for MidiDrums {
    fn play(&mut self, sound: SoundHandle) {
        let Some(&note) = self.notes.get(sound.index()) else {
            warn!(sound = sound.index(), "unknown sound handle");
            return;
        };
        // Percussion ignores note length; release first so the synth retriggers.
        let _ = self.conn.send(&note_off(note));
        if let Err(error) = self.conn.send(&note_on(note, self.velocity)) {
            warn!(%error, "MIDI send failed");
        }
    }
}

impl AudioBackend for MidiDrums {
    fn name(&self) -> &'static str { "midi" }

    /// The path is not read; the kind picks the GM key.
    fn load(&mut self, kind: InstrumentKind, _path: &Path) -> Result<SoundHandle, AudioError> {
        self.notes.push(gm_note(kind));
        Ok(SoundHandle::new(self.notes.len() - 1))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// NullPlayer
// ════════════════════════════════════════════════════════════════════════════

/// Silent backend.  Still decodes every sound so a broken kit is caught
/// even when no device is present.
#[derive(Default)]
pub struct NullPlayer {
    loaded: Vec<InstrumentKind>,
    played: u64,
}

impl NullPlayer {
    pub fn played(&self) -> u64 { self.played }
}

impl SoundPlayer for NullPlayer {
    fn play(&mut self, sound: SoundHandle) {
        self.played += 1;
        debug!(
            sound = sound.index(),
            instrument = ?self.loaded.get(sound.index()),
            "silent play"
        );
    }
}

impl AudioBackend for NullPlayer {
    fn name(&self) -> &'static str { "none" }

    fn load(&mut self, kind: InstrumentKind, path: &Path) -> Result<SoundHandle, AudioError> {
        read_wav_mono(path)?;
        self.loaded.push(kind);
        Ok(SoundHandle::new(self.loaded.len() - 1))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
