//! Webcam capture via `nokhwa` (feature `camera`).

use air_kit::FrameSource;
use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use tracing::{info, warn};

pub struct WebCamera {
    camera: Camera,
}

impl WebCamera {
    pub fn open(index: u32) -> Result<Self, nokhwa::NokhwaError> {
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(index), requested)?;
        camera.open_stream()?;
        info!(
            index,
            name = %camera.info().human_name(),
            format = %camera.camera_format(),
            "camera opened"
        );
        Ok(WebCamera { camera })
    }
}

impl FrameSource for WebCamera {
    /// Any capture or decode failure ends the stream.
    fn next_frame(&mut self) -> Option<RgbImage> {
        let decoded = self
            .camera
            .frame()
            .and_then(|buf| buf.decode_image::<RgbFormat>());
        match decoded {
            Ok(img) => {
                let (w, h) = (img.width(), img.height());
                RgbImage::from_raw(w, h, img.into_raw())
            }
            Err(error) => {
                warn!(%error, "camera read failed");
                None
            }
        }
    }
}

impl Drop for WebCamera {
    fn drop(&mut self) {
        let _ = self.camera.stop_stream();
    }
}
