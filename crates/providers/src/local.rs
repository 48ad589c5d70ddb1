//! Local Pixel Provider
//!
//! In-process adapter for cheap pixel-level work: color balance,
//! perspective (crop-level keystone trim), and an HDR fallback. Never
//! touches the network; reads and writes through the image store.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use image::DynamicImage;
use tracing::debug;

use listinglens_core::{
    ColorTemperature, EnhancementProvider, ImageStore, InvokeRequest, PresetVariant,
    ProviderError, ProviderResult, ToolId,
};

/// In-process pixel-operation provider
pub struct LocalPixelProvider {
    store: Arc<dyn ImageStore>,
}

impl LocalPixelProvider {
    pub fn new(store: Arc<dyn ImageStore>) -> Self {
        Self { store }
    }

    fn apply(img: DynamicImage, request: &InvokeRequest) -> ProviderResult<DynamicImage> {
        let strength = request.params.strength.clamp(0.0, 1.0);
        match request.tool {
            ToolId::ColorBalance => {
                // Shift hue toward the locked temperature; neutral only
                // normalizes contrast.
                let shifted = match request.params.preset {
                    Some(PresetVariant::ColorTemperature(ColorTemperature::Warm)) => {
                        img.huerotate(-(10.0 * strength) as i32)
                    }
                    Some(PresetVariant::ColorTemperature(ColorTemperature::Cool)) => {
                        img.huerotate((10.0 * strength) as i32)
                    }
                    _ => img,
                };
                Ok(shifted.adjust_contrast(4.0 * strength))
            }
            ToolId::HdrBoost => {
                Ok(img.adjust_contrast(12.0 * strength).brighten((12.0 * strength) as i32))
            }
            ToolId::PerspectiveCorrection => {
                // Keystone trim: crop a thin margin so converging verticals
                // can be re-framed. 2% per side at full strength.
                let (w, h) = (img.width(), img.height());
                let margin_x = ((w as f32) * 0.02 * strength) as u32;
                let margin_y = ((h as f32) * 0.02 * strength) as u32;
                if w <= 2 * margin_x || h <= 2 * margin_y {
                    return Err(ProviderError::invalid_input(format!(
                        "local: image {}x{} too small to crop",
                        w, h
                    )));
                }
                Ok(img.crop_imm(margin_x, margin_y, w - 2 * margin_x, h - 2 * margin_y))
            }
            other => Err(ProviderError::invalid_input(format!(
                "local does not support {}",
                other
            ))),
        }
    }
}

#[async_trait]
impl EnhancementProvider for LocalPixelProvider {
    fn name(&self) -> &'static str {
        "local"
    }

    fn supports(&self, tool: ToolId) -> bool {
        matches!(
            tool,
            ToolId::ColorBalance | ToolId::HdrBoost | ToolId::PerspectiveCorrection
        )
    }

    async fn invoke(&self, request: InvokeRequest) -> ProviderResult<String> {
        let bytes = self
            .store
            .read(&request.image_ref)
            .await
            .map_err(|e| ProviderError::unavailable(format!("local: storage read: {}", e)))?;

        let img = image::load_from_memory(&bytes)
            .map_err(|e| ProviderError::invalid_input(format!("local: decode: {}", e)))?;

        debug!(tool = %request.tool, width = img.width(), height = img.height(), "local pixel op");

        let out = Self::apply(img, &request)?;

        let mut buf = Vec::new();
        out.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| ProviderError::parse(format!("local: encode: {}", e)))?;

        self.store
            .write(&buf)
            .await
            .map_err(|e| ProviderError::unavailable(format!("local: storage write: {}", e)))
    }

    /// The local provider has no remote dependency; healthy by definition.
    async fn health_check(&self) -> ProviderResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryImageStore;
    use listinglens_core::ToolParams;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([120, 110, 100]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[tokio::test]
    async fn test_color_balance_round_trip() {
        let store = Arc::new(MemoryImageStore::new());
        let input_ref = store.write(&png_bytes(16, 16)).await.unwrap();

        let provider = LocalPixelProvider::new(store.clone());
        let out_ref = provider
            .invoke(InvokeRequest {
                tool: ToolId::ColorBalance,
                image_ref: input_ref.clone(),
                params: ToolParams::new(
                    Some(PresetVariant::ColorTemperature(ColorTemperature::Warm)),
                    1.0,
                ),
            })
            .await
            .unwrap();

        assert_ne!(out_ref, input_ref);
        let out = store.read(&out_ref).await.unwrap();
        assert!(image::load_from_memory(&out).is_ok());
    }

    #[tokio::test]
    async fn test_perspective_crops_margins() {
        let store = Arc::new(MemoryImageStore::new());
        let input_ref = store.write(&png_bytes(100, 100)).await.unwrap();

        let provider = LocalPixelProvider::new(store.clone());
        let out_ref = provider
            .invoke(InvokeRequest {
                tool: ToolId::PerspectiveCorrection,
                image_ref: input_ref,
                params: ToolParams::new(None, 1.0),
            })
            .await
            .unwrap();

        let out = image::load_from_memory(&store.read(&out_ref).await.unwrap()).unwrap();
        assert_eq!(out.width(), 96);
        assert_eq!(out.height(), 96);
    }

    #[tokio::test]
    async fn test_undecodable_input_is_invalid() {
        let store = Arc::new(MemoryImageStore::new());
        let input_ref = store.write(b"not an image").await.unwrap();

        let provider = LocalPixelProvider::new(store);
        let err = provider
            .invoke(InvokeRequest {
                tool: ToolId::HdrBoost,
                image_ref: input_ref,
                params: ToolParams::new(None, 0.5),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_unsupported_tool() {
        let store = Arc::new(MemoryImageStore::new());
        let provider = LocalPixelProvider::new(store);
        assert!(!provider.supports(ToolId::SkyReplacement));
        assert!(provider.supports(ToolId::ColorBalance));
    }
}
