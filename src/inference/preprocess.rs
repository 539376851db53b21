//! Image Preprocessing
//!
//! The fixed transform applied to every upload before classification:
//! RGB conversion, exact resize, scaling to [0, 1] and per-channel
//! normalisation. Output is a flat CHW buffer.

use std::path::Path;

use burn::tensor::{backend::Backend, Tensor, TensorData};
use image::{imageops::FilterType, DynamicImage};
use serde::{Deserialize, Serialize};

use crate::utils::error::{AgriAidError, Result};

/// Side length the classifiers were fine-tuned at
pub const DEFAULT_IMAGE_SIZE: u32 = 299;

/// Per-channel mean used during fine-tuning
pub const DEFAULT_MEAN: [f32; 3] = [0.5, 0.5, 0.5];

/// Per-channel standard deviation used during fine-tuning
pub const DEFAULT_STD: [f32; 3] = [0.5, 0.5, 0.5];

/// Configuration for image preprocessing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Target width and height (aspect ratio is not preserved)
    pub image_size: u32,
    /// Normalization means [R, G, B]
    pub mean: [f32; 3],
    /// Normalization standard deviations [R, G, B]
    pub std: [f32; 3],
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            image_size: DEFAULT_IMAGE_SIZE,
            mean: DEFAULT_MEAN,
            std: DEFAULT_STD,
        }
    }
}

impl PreprocessConfig {
    /// Configure image size
    pub fn with_image_size(mut self, size: u32) -> Self {
        self.image_size = size;
        self
    }

    /// Number of values produced for one image
    pub fn tensor_len(&self) -> usize {
        let side = self.image_size as usize;
        3 * side * side
    }
}

/// Decode an uploaded image, guessing the format from its content
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(AgriAidError::ImageDecode("empty upload".to_string()));
    }

    let image = image::load_from_memory(bytes)?;
    if image.width() == 0 || image.height() == 0 {
        return Err(AgriAidError::ImageDecode("image has no pixels".to_string()));
    }

    Ok(image)
}

/// Open an image from disk
pub fn open_image(path: &Path) -> Result<DynamicImage> {
    if !path.exists() {
        return Err(AgriAidError::PathNotFound(path.to_path_buf()));
    }

    image::open(path).map_err(|e| AgriAidError::ImageLoad(path.to_path_buf(), e.to_string()))
}

/// Image preprocessor shared by every crop
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    /// Create a preprocessor with the given configuration
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// Resize and normalize an image into a CHW buffer
    pub fn preprocess(&self, image: &DynamicImage) -> Vec<f32> {
        let size = self.config.image_size;
        let rgb = image
            .resize_exact(size, size, FilterType::Triangle)
            .to_rgb8();

        let num_pixels = (size * size) as usize;
        let mut normalized = vec![0.0f32; self.config.tensor_len()];

        for (i, pixel) in rgb.pixels().enumerate() {
            for channel in 0..3 {
                let value = pixel[channel] as f32 / 255.0;
                normalized[channel * num_pixels + i] =
                    (value - self.config.mean[channel]) / self.config.std[channel];
            }
        }

        normalized
    }

    /// Preprocess an image into a `[1, 3, size, size]` tensor
    pub fn to_tensor<B: Backend>(&self, image: &DynamicImage, device: &B::Device) -> Tensor<B, 4> {
        let size = self.config.image_size as usize;
        let data = TensorData::new(self.preprocess(image), [1, 3, size, size]);
        Tensor::from_data(data, device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn solid_image(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_default_config() {
        let config = PreprocessConfig::default();
        assert_eq!(config.image_size, 299);
        assert_eq!(config.mean, [0.5; 3]);
        assert_eq!(config.std, [0.5; 3]);
        assert_eq!(config.tensor_len(), 3 * 299 * 299);
    }

    #[test]
    fn test_preprocess_shape_and_range() {
        let preprocessor = Preprocessor::default();
        let values = preprocessor.preprocess(&solid_image(640, 480, [0, 128, 255]));

        assert_eq!(values.len(), 3 * 299 * 299);
        assert!(values.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_channels_are_planar() {
        let preprocessor = Preprocessor::new(PreprocessConfig::default().with_image_size(4));
        let values = preprocessor.preprocess(&solid_image(8, 8, [255, 0, 255]));
        let plane = 16;

        // R plane -> 1.0, G plane -> -1.0, B plane -> 1.0
        assert!(values[..plane].iter().all(|v| (*v - 1.0).abs() < 1e-6));
        assert!(values[plane..2 * plane].iter().all(|v| (*v + 1.0).abs() < 1e-6));
        assert!(values[2 * plane..].iter().all(|v| (*v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_grayscale_is_expanded_to_rgb() {
        let gray = DynamicImage::new_luma8(10, 10);
        let preprocessor = Preprocessor::new(PreprocessConfig::default().with_image_size(8));
        assert_eq!(preprocessor.preprocess(&gray).len(), 3 * 8 * 8);
    }

    #[test]
    fn test_preprocess_is_deterministic() {
        let preprocessor = Preprocessor::new(PreprocessConfig::default().with_image_size(16));
        let image = solid_image(33, 17, [10, 200, 90]);
        assert_eq!(preprocessor.preprocess(&image), preprocessor.preprocess(&image));
    }

    #[test]
    fn test_decode_image() {
        let bytes = png_bytes(&solid_image(5, 7, [1, 2, 3]));
        let image = decode_image(&bytes).unwrap();
        assert_eq!((image.width(), image.height()), (5, 7));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_image(b"not an image"),
            Err(AgriAidError::ImageDecode(_))
        ));
        assert!(matches!(decode_image(&[]), Err(AgriAidError::ImageDecode(_))));
    }

    #[test]
    fn test_open_missing_image() {
        assert!(matches!(
            open_image(Path::new("/no/such/leaf.jpg")),
            Err(AgriAidError::PathNotFound(_))
        ));
    }

    #[test]
    fn test_to_tensor_shape() {
        use crate::backend::InferenceBackend;

        let device = Default::default();
        let preprocessor = Preprocessor::new(PreprocessConfig::default().with_image_size(12));
        let tensor = preprocessor.to_tensor::<InferenceBackend>(&solid_image(3, 3, [9, 9, 9]), &device);
        assert_eq!(tensor.dims(), [1, 3, 12, 12]);
    }
}
