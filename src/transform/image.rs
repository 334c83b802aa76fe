//! Lossy image recompression.
//!
//! - JPEG: re-encoded at the configured quality.
//! - PNG: colour channels quantized to `levels` per channel, then encoded
//!   with maximum deflate compression and adaptive filtering.
//! - GIF: passed through.
//!
//! Whenever re-encoding does not shrink the file the source bytes win.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageEncoder, ImageFormat};

use crate::config::ImagesConfig;
use crate::pipeline::BuildError;

const STAGE: &str = "image";

/// Recompress `bytes` read from `path`, returning whichever encoding is smaller.
pub fn compress_image(path: &Path, bytes: &[u8], config: ImagesConfig) -> Result<Vec<u8>, BuildError> {
    let format = match ImageFormat::from_path(path) {
        Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png)) => format,
        _ => return Ok(bytes.to_vec()),
    };

    let image = image::load_from_memory_with_format(bytes, format)
        .map_err(|err| BuildError::tool(STAGE, path, err))?;

    let encoded = match format {
        ImageFormat::Jpeg => encode_jpeg(&image, config.jpeg_quality),
        _ => encode_png(image, config.png_levels),
    }
    .map_err(|err| BuildError::tool(STAGE, path, err))?;

    if encoded.len() < bytes.len() {
        Ok(encoded)
    } else {
        Ok(bytes.to_vec())
    }
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> image::ImageResult<Vec<u8>> {
    let rgb = image.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality).write_image(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(out)
}

fn encode_png(image: DynamicImage, levels: u16) -> image::ImageResult<Vec<u8>> {
    let mut out = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive);

    if image.color().has_alpha() {
        let mut rgba = image.into_rgba8();
        for pixel in rgba.pixels_mut() {
            for channel in &mut pixel.0[..3] {
                *channel = quantize(*channel, levels);
            }
        }
        encoder.write_image(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            image::ExtendedColorType::Rgba8,
        )?;
    } else {
        let mut rgb = image.into_rgb8();
        for channel in rgb.iter_mut() {
            *channel = quantize(*channel, levels);
        }
        encoder.write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )?;
    }
    Ok(out)
}

/// Snap a channel value to the centre of its bucket. 256 levels is identity.
fn quantize(value: u8, levels: u16) -> u8 {
    let step = 256 / levels.clamp(2, 256);
    let bucket = u16::from(value) / step * step;
    (bucket + step / 2).min(255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn gradient_png() -> Vec<u8> {
        let img = RgbImage::from_fn(64, 64, |x, y| {
            Rgb([(x * 3 + y) as u8, (y * 3 + x) as u8, (x * y % 256) as u8])
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_quantize_buckets() {
        assert_eq!(quantize(0, 64), 2);
        assert_eq!(quantize(3, 64), 2);
        assert_eq!(quantize(255, 64), 254);
        for v in [0u8, 17, 128, 255] {
            assert_eq!(quantize(v, 256), v);
        }
    }

    #[test]
    fn test_png_shrinks() {
        let source = gradient_png();
        let out = compress_image(Path::new("a.png"), &source, ImagesConfig::default()).unwrap();
        assert!(out.len() < source.len());
        let decoded = image::load_from_memory_with_format(&out, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 64));
    }

    #[test]
    fn test_png_alpha_kept() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 77]));
        let out = encode_png(DynamicImage::ImageRgba8(img), 64).unwrap();
        let decoded = image::load_from_memory(&out).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0)[3], 77);
    }

    #[test]
    fn test_jpeg_reencoded() {
        let img = RgbImage::from_fn(32, 32, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, 128]));
        let mut source = Vec::new();
        JpegEncoder::new_with_quality(&mut source, 100)
            .write_image(img.as_raw(), 32, 32, image::ExtendedColorType::Rgb8)
            .unwrap();

        let out = compress_image(Path::new("a.jpg"), &source, ImagesConfig::default()).unwrap();
        assert!(out.len() < source.len());
    }

    #[test]
    fn test_never_grows() {
        // A 1x1 PNG is already minimal.
        let mut source = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(1, 1))
            .write_to(&mut Cursor::new(&mut source), ImageFormat::Png)
            .unwrap();
        let out = compress_image(Path::new("a.png"), &source, ImagesConfig::default()).unwrap();
        assert!(out.len() <= source.len());
    }

    #[test]
    fn test_gif_passthrough() {
        let bytes = b"GIF89a-not-really".to_vec();
        let out = compress_image(Path::new("a.gif"), &bytes, ImagesConfig::default()).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_corrupt_png_is_tool_error() {
        let err = compress_image(Path::new("a.png"), b"nope", ImagesConfig::default()).unwrap_err();
        assert!(matches!(err, BuildError::Tool { stage: "image", .. }));
    }
}
