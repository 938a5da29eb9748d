//! Icon and sample loading, done once at startup.

use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use region_mask::REGION_SIZE;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("cannot load icon {}: {source}", path.display())]
    Icon {
        path:   PathBuf,
        source: image::ImageError,
    },
    #[error("cannot load sound {}: {source}", path.display())]
    Sound {
        path:   PathBuf,
        source: hound::Error,
    },
    #[error("{}: unsupported WAV format {format:?}/{bits} bit", path.display())]
    SoundFormat {
        path:   PathBuf,
        format: SampleFormat,
        bits:   u16,
    },
    #[error("{} contains no audio", path.display())]
    EmptySound { path: PathBuf },
}

// ════════════════════════════════════════════════════════════════════════════
// Icons
// ════════════════════════════════════════════════════════════════════════════

/// Load an image and scale it to exactly the region size.
pub fn load_icon(path: &Path) -> Result<RgbImage, AssetError> {
    let img = image::open(path).map_err(|source| AssetError::Icon {
        path: path.to_owned(),
        source,
    })?;
    debug!(path = %path.display(), width = img.width(), height = img.height(), "icon");
    Ok(fit_icon(&img))
}

/// Cubic resize to the region size, ignoring aspect ratio.
pub fn fit_icon(img: &DynamicImage) -> RgbImage {
    imageops::resize(
        &img.to_rgb8(),
        REGION_SIZE.width,
        REGION_SIZE.height,
        FilterType::CatmullRom,
    )
}

// ════════════════════════════════════════════════════════════════════════════
// Samples
// ════════════════════════════════════════════════════════════════════════════

/// A decoded sound, downmixed to mono.
#[derive(Clone, Debug, PartialEq)]
pub struct MonoSample {
    pub rate: u32,
    pub data: Vec<f32>,
}

/// Decode a WAV file to mono `f32` in -1.0..=1.0.
pub fn read_wav_mono(path: &Path) -> Result<MonoSample, AssetError> {
    let sound_err = |source| AssetError::Sound { path: path.to_owned(), source };

    let mut reader = WavReader::open(path).map_err(sound_err)?;
    let spec = reader.spec();

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>(),
        (SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| v as f32 / i8::MAX as f32))
            .collect::<Result<Vec<_>, _>>(),
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
            .collect::<Result<Vec<_>, _>>(),
        (SampleFormat::Int, 24 | 32) => {
            let denom = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / denom))
                .collect::<Result<Vec<_>, _>>()
        }
        (format, bits) => {
            return Err(AssetError::SoundFormat { path: path.to_owned(), format, bits });
        }
    }
    .map_err(sound_err)?;

    let data = downmix(&samples, spec.channels as usize);
    if data.is_empty() {
        return Err(AssetError::EmptySound { path: path.to_owned() });
    }
    debug!(
        path = %path.display(),
        rate = spec.sample_rate,
        channels = spec.channels,
        frames = data.len(),
        "sound"
    );
    Ok(MonoSample { rate: spec.sample_rate, data })
}

/// Average interleaved channels into one.
fn downmix(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().copied().sum::<f32>() / channels as f32)
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
