//! Headless backend that serves captures out of a full-screen PNG.
//!
//! Used by the CLI `replay` command and by tests. The screen image covers
//! the global physical desktop starting at (0, 0).

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::task;

use super::backend::CaptureBackend;
use super::file::{self, FileSaveConfig};
use super::types::{CaptureError, CaptureRegion, CaptureResult, FinalizeRequest};
use crate::draw::bitmap;
use crate::input::RawSnapTarget;

pub struct StillImageBackend {
    screen_png: Arc<Vec<u8>>,
    save_config: FileSaveConfig,
    windows: Vec<RawSnapTarget>,
    always_on_top: Mutex<Option<bool>>,
    finalized: Mutex<Vec<PathBuf>>,
}

impl StillImageBackend {
    pub fn new(screen_png: Vec<u8>, save_config: FileSaveConfig) -> Self {
        Self {
            screen_png: Arc::new(screen_png),
            save_config,
            windows: Vec::new(),
            always_on_top: Mutex::new(None),
            finalized: Mutex::new(Vec::new()),
        }
    }

    /// Windows reported by [`CaptureBackend::list_window_snap_targets`].
    pub fn with_windows(mut self, windows: Vec<RawSnapTarget>) -> Self {
        self.windows = windows;
        self
    }

    /// Last stacking hint received, if any.
    pub fn always_on_top(&self) -> Option<bool> {
        self.always_on_top.lock().ok().and_then(|value| *value)
    }

    /// Paths written by finalize, oldest first.
    pub fn finalized_paths(&self) -> Vec<PathBuf> {
        self.finalized
            .lock()
            .map(|paths| paths.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CaptureBackend for StillImageBackend {
    async fn capture_region(&self, region: CaptureRegion) -> Result<CaptureResult, CaptureError> {
        if region.is_empty() {
            return Err(CaptureError::InvalidPayload(
                "selection size is invalid".to_string(),
            ));
        }

        let screen = self.screen_png.clone();
        let rect = region.physical_rect();
        log::debug!("Cropping {:?} out of the screen image", rect);

        let png = task::spawn_blocking(move || -> Result<Vec<u8>, bitmap::BitmapError> {
            let surface = bitmap::decode_png(&screen)?;
            let cropped = bitmap::crop(
                &surface,
                rect.x,
                rect.y,
                rect.width as i32,
                rect.height as i32,
            )?;
            bitmap::encode_png(&cropped)
        })
        .await
        .map_err(|err| CaptureError::CaptureFailed(format!("capture task failed: {err}")))??;

        let path = file::temporary_capture_path();
        tokio::fs::write(&path, &png).await?;

        Ok(CaptureResult {
            path: path.to_string_lossy().into_owned(),
            base64: bitmap::encode_base64(&png),
            width: region.physical_width(),
            height: region.physical_height(),
            logical_width: region.width,
            logical_height: region.height,
            created_at: file::current_timestamp_millis(),
        })
    }

    async fn finalize_region_capture(
        &self,
        request: FinalizeRequest,
    ) -> Result<CaptureResult, CaptureError> {
        let bytes = bitmap::decode_base64_png(&request.base64)?;
        let config = self.save_config.clone();
        let data = bytes.clone();
        let path = task::spawn_blocking(move || file::save_image(&data, &config))
            .await
            .map_err(|err| CaptureError::FinalizeFailed(format!("save task failed: {err}")))??;

        if let Ok(mut finalized) = self.finalized.lock() {
            finalized.push(path.clone());
        }

        Ok(CaptureResult {
            path: path.to_string_lossy().into_owned(),
            base64: bitmap::encode_base64(&bytes),
            width: request.width,
            height: request.height,
            logical_width: request.logical_width,
            logical_height: request.logical_height,
            created_at: file::current_timestamp_millis(),
        })
    }

    async fn cancel_region_capture(&self) -> Result<(), CaptureError> {
        log::debug!("Region capture cancelled");
        Ok(())
    }

    async fn list_window_snap_targets(&self) -> Result<Vec<RawSnapTarget>, CaptureError> {
        Ok(self.windows.clone())
    }

    async fn set_current_window_always_on_top(
        &self,
        allow_input_panel: bool,
    ) -> Result<(), CaptureError> {
        if let Ok(mut value) = self.always_on_top.lock() {
            *value = Some(allow_input_panel);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn screen_png(width: i32, height: i32) -> Vec<u8> {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height).unwrap();
        let ctx = cairo::Context::new(&surface).unwrap();
        ctx.set_source_rgb(0.2, 0.4, 0.6);
        ctx.paint().unwrap();
        drop(ctx);
        bitmap::encode_png(&surface).unwrap()
    }

    fn region(x: i32, y: i32, width: u32, height: u32, scale: f64) -> CaptureRegion {
        CaptureRegion {
            x,
            y,
            width,
            height,
            scale_x: scale,
            scale_y: scale,
            monitor_origin_x: 0,
            monitor_origin_y: 0,
            monitor_logical_x: 0.0,
            monitor_logical_y: 0.0,
        }
    }

    #[tokio::test]
    async fn capture_crops_physical_pixels() {
        let backend = StillImageBackend::new(screen_png(400, 300), FileSaveConfig::default());
        let result = backend.capture_region(region(10, 10, 50, 40, 2.0)).await.unwrap();

        assert_eq!((result.width, result.height), (100, 80));
        assert_eq!((result.logical_width, result.logical_height), (50, 40));

        let png = bitmap::decode_base64_png(&result.base64).unwrap();
        let surface = bitmap::decode_png(&png).unwrap();
        assert_eq!((surface.width(), surface.height()), (100, 80));
        let _ = std::fs::remove_file(&result.path);
    }

    #[tokio::test]
    async fn empty_region_is_rejected() {
        let backend = StillImageBackend::new(screen_png(10, 10), FileSaveConfig::default());
        let err = backend.capture_region(region(0, 0, 0, 5, 1.0)).await.unwrap_err();
        assert!(matches!(err, CaptureError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn finalize_strips_data_url_and_saves() {
        let temp = TempDir::new().unwrap();
        let config = FileSaveConfig {
            save_directory: temp.path().to_path_buf(),
            filename_template: "final".to_string(),
            format: "png".to_string(),
        };
        let backend = StillImageBackend::new(screen_png(4, 4), config);
        let png = screen_png(8, 6);

        let result = backend
            .finalize_region_capture(FinalizeRequest {
                path: "ignored.png".to_string(),
                base64: format!("{}{}", bitmap::DATA_URL_PREFIX, bitmap::encode_base64(&png)),
                width: 8,
                height: 6,
                logical_width: 8,
                logical_height: 6,
            })
            .await
            .unwrap();

        assert!(result.path.ends_with("final.png"));
        assert_eq!(std::fs::read(&result.path).unwrap(), png);
        assert_eq!(backend.finalized_paths().len(), 1);
    }

    #[tokio::test]
    async fn finalize_rejects_garbage_payload() {
        let backend = StillImageBackend::new(screen_png(4, 4), FileSaveConfig::default());
        let err = backend
            .finalize_region_capture(FinalizeRequest {
                path: String::new(),
                base64: "%%%".to_string(),
                width: 1,
                height: 1,
                logical_width: 1,
                logical_height: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CaptureError::ImageError(_)));
    }
}
