use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat};

use super::extractor::ExtractResult;

/// Reduces a scan to pure black and white before OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binarizer {
    threshold: u8,
}

impl Binarizer {
    pub const DEFAULT_THRESHOLD: u8 = 128;

    #[must_use]
    pub const fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    #[must_use]
    pub const fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Luminance at or above the threshold becomes white, everything else
    /// black.
    #[must_use]
    pub fn apply(&self, image: &DynamicImage) -> GrayImage {
        let mut gray = image.to_luma8();
        for pixel in gray.pixels_mut() {
            pixel.0[0] = if pixel.0[0] >= self.threshold { u8::MAX } else { 0 };
        }
        gray
    }

    /// Decodes `input` and writes the black and white version to `output`
    /// as PNG. Blocking; run it off the async executor.
    pub fn binarize(&self, input: &Path, output: &Path) -> ExtractResult<()> {
        let image = image::open(input)?;
        self.apply(&image).save_with_format(output, ImageFormat::Png)?;
        Ok(())
    }
}

impl Default for Binarizer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn gradient() -> GrayImage {
        GrayImage::from_fn(16, 16, |x, y| Luma([u8::try_from(x * 16 + y).unwrap_or(u8::MAX)]))
    }

    #[test]
    fn test_apply_produces_two_levels() {
        let image = DynamicImage::ImageLuma8(gradient());

        let bw = Binarizer::default().apply(&image);

        assert!(bw.pixels().all(|p| p.0[0] == 0 || p.0[0] == u8::MAX));
        assert_eq!(bw.get_pixel(0, 0).0[0], 0);
        assert_eq!(bw.get_pixel(15, 15).0[0], u8::MAX);
    }

    #[test]
    fn test_threshold_boundary() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(1, 2, Luma([100])));

        assert_eq!(Binarizer::new(100).apply(&image).get_pixel(0, 0).0[0], u8::MAX);
        assert_eq!(Binarizer::new(101).apply(&image).get_pixel(0, 1).0[0], 0);
    }

    #[test]
    fn test_binarize_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("scan.png");
        let output = dir.path().join("scan-bw.png");
        gradient().save(&input).unwrap();

        Binarizer::default().binarize(&input, &output).unwrap();

        let result = image::open(&output).unwrap().to_luma8();
        assert_eq!(result.dimensions(), (16, 16));
        assert!(result.pixels().all(|p| p.0[0] == 0 || p.0[0] == u8::MAX));
    }

    #[test]
    fn test_binarize_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.png");
        std::fs::write(&input, b"not an image").unwrap();

        let result = Binarizer::default().binarize(&input, &dir.path().join("out.png"));

        assert!(result.is_err());
    }
}
