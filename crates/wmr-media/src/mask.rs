//! Binary mask rasterisation and PNG preparation for inpainting.

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, GrayImage, ImageFormat, ImageOutputFormat, Luma};

use crate::error::MediaResult;
use wmr_models::PixelRect;

const MASK_ON: Luma<u8> = Luma([255]);
const MASK_OFF: Luma<u8> = Luma([0]);

/// An input frame ready to be sent to the inpainting endpoint.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// PNG-encoded frame
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode `bytes` and make sure they are PNG-encoded.
///
/// PNG input is passed along untouched; other formats are re-encoded.
pub fn prepare_png(bytes: &[u8]) -> MediaResult<PreparedImage> {
    let image = image::load_from_memory(bytes)?;
    let (width, height) = image.dimensions();

    let png = if image::guess_format(bytes)? == ImageFormat::Png {
        bytes.to_vec()
    } else {
        encode_png(&image)?
    };

    Ok(PreparedImage { png, width, height })
}

/// Rasterise `rect` as a white rectangle on a black `width` x `height` canvas.
pub fn build_mask(width: u32, height: u32, rect: &PixelRect) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        if rect.contains(x, y) {
            MASK_ON
        } else {
            MASK_OFF
        }
    })
}

/// [`build_mask`], PNG-encoded.
pub fn build_mask_png(width: u32, height: u32, rect: &PixelRect) -> MediaResult<Vec<u8>> {
    encode_png(&DynamicImage::ImageLuma8(build_mask(width, height, rect)))
}

fn encode_png(image: &DynamicImage) -> MediaResult<Vec<u8>> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use wmr_models::WatermarkRegion;

    fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([10, 200, 30]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Jpeg(90))
            .unwrap();
        buf
    }

    #[test]
    fn test_mask_matches_region() {
        let rect = WatermarkRegion::new(0.7, 0.85, 0.3, 0.15).to_pixels(100, 40);
        let mask = build_mask(100, 40, &rect);

        assert_eq!(mask.dimensions(), (100, 40));
        assert_eq!(mask.get_pixel(70, 34), &MASK_ON);
        assert_eq!(mask.get_pixel(99, 39), &MASK_ON);
        assert_eq!(mask.get_pixel(69, 34), &MASK_OFF);
        assert_eq!(mask.get_pixel(70, 33), &MASK_OFF);

        let white = mask.pixels().filter(|p| **p == MASK_ON).count() as u32;
        assert_eq!(white, rect.width * rect.height);
    }

    #[test]
    fn test_mask_png_decodes_to_same_size() {
        let rect = PixelRect {
            x: 0,
            y: 0,
            width: 3,
            height: 2,
        };
        let png = build_mask_png(8, 6, &rect).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.dimensions(), (8, 6));
        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_prepare_png_reencodes_jpeg() {
        let prepared = prepare_png(&sample_jpeg(16, 9)).unwrap();
        assert_eq!((prepared.width, prepared.height), (16, 9));
        assert_eq!(image::guess_format(&prepared.png).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_prepare_png_keeps_png_bytes() {
        let png = build_mask_png(4, 4, &PixelRect { x: 1, y: 1, width: 1, height: 1 }).unwrap();
        let prepared = prepare_png(&png).unwrap();
        assert_eq!(prepared.png, png);
    }

    #[test]
    fn test_prepare_png_rejects_garbage() {
        assert!(prepare_png(b"not an image").is_err());
    }
}
