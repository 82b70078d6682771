//! Overlay-frame compositing.
//!
//! The pipeline is a chain of typed stages, each failable on its own:
//! decoded photo -> decoded frame -> composited raster -> encoded file.
//! Both images are fully decoded before any drawing starts. The frame
//! dictates the output geometry; the photo is stretched to fill it exactly.
//! Stretching does not preserve aspect ratio — that is a carried design
//! decision, not an oversight to fix here.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::io::Reader as ImageReader;
use image::{DynamicImage, RgbaImage};
use ps_core::error::{AppError, Result};
use ps_core::models::UploadItem;
use std::io::Cursor;

/// Matches the former canvas encoding quality of roughly 0.9.
pub const JPEG_QUALITY: u8 = 90;

fn image_error(file: &str, reason: impl std::fmt::Display) -> AppError {
    AppError::ImageError {
        file: file.to_string(),
        reason: reason.to_string(),
    }
}

/// Fully decodes one image, failing the owning item on corrupt or
/// unsupported input.
pub fn decode(file: &str, bytes: &[u8]) -> Result<DynamicImage> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| image_error(file, e))?
        .decode()
        .map_err(|e| image_error(file, e))
}

/// Draws `photo` stretched to the frame's dimensions, then the frame on top.
/// The frame's alpha channel reveals the photo beneath.
pub fn composite(photo: &DynamicImage, frame: &DynamicImage) -> RgbaImage {
    let (width, height) = (frame.width(), frame.height());
    let mut canvas = photo
        .resize_exact(width, height, FilterType::Lanczos3)
        .to_rgba8();
    imageops::overlay(&mut canvas, &frame.to_rgba8(), 0, 0);
    canvas
}

/// Flattens the composited raster to a JPEG buffer.
pub fn encode_jpeg(canvas: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(&rgb)
        .map_err(|e| image_error("composited canvas", e))?;
    Ok(out)
}

/// Derived name marking the file as a composited version of the original.
fn framed_name(original: &str) -> String {
    let stem = original
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(original);
    format!("framed_{stem}.jpg")
}

/// Runs the full chain for one item. A failure anywhere produces no partial
/// output; the original item is left untouched for a manual retry.
pub fn apply_frame(item: &UploadItem, frame_bytes: &[u8]) -> Result<UploadItem> {
    let photo = decode(&item.file_name, &item.bytes)?;
    let frame = decode("overlay frame", frame_bytes)?;
    let canvas = composite(&photo, &frame);
    let bytes = encode_jpeg(&canvas, JPEG_QUALITY)?;
    Ok(UploadItem {
        file_name: framed_name(&item.file_name),
        content_type: "image/jpeg".to_string(),
        bytes,
    })
}

/// Entry point for the submission path: compositing only happens when the
/// event configured a frame; otherwise the original passes through unmodified.
pub fn prepare(item: UploadItem, frame_bytes: Option<&[u8]>) -> Result<UploadItem> {
    match frame_bytes {
        Some(frame) => apply_frame(&item, frame),
        None => Ok(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img.clone())
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    /// Solid red photo, deliberately non-square.
    fn red_photo(width: u32, height: u32) -> Vec<u8> {
        png_bytes(&RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255])))
    }

    /// 80x80 frame: opaque blue 10px border, fully transparent center.
    fn blue_border_frame() -> Vec<u8> {
        let frame = RgbaImage::from_fn(80, 80, |x, y| {
            if x < 10 || y < 10 || x >= 70 || y >= 70 {
                Rgba([0, 0, 255, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        png_bytes(&frame)
    }

    fn item(bytes: Vec<u8>) -> UploadItem {
        UploadItem {
            file_name: "selfie.png".into(),
            content_type: "image/png".into(),
            bytes,
        }
    }

    #[test]
    fn output_geometry_comes_from_the_frame() {
        // Source is 200x50; the frame is 80x80 and must win.
        let out = apply_frame(&item(red_photo(200, 50)), &blue_border_frame()).unwrap();
        let decoded = decode(&out.file_name, &out.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (80, 80));
        assert_eq!(out.content_type, "image/jpeg");
        assert_eq!(out.file_name, "framed_selfie.jpg");
    }

    #[test]
    fn frame_alpha_reveals_the_photo() {
        let out = apply_frame(&item(red_photo(100, 100)), &blue_border_frame()).unwrap();
        let decoded = decode(&out.file_name, &out.bytes).unwrap().to_rgb8();
        // Center: transparent in the frame, so the red photo shows through
        // (JPEG is lossy, so compare loosely).
        let center = decoded.get_pixel(40, 40);
        assert!(center[0] > 200 && center[2] < 80, "center not red: {center:?}");
        // Border: opaque frame pixel wins.
        let border = decoded.get_pixel(2, 2);
        assert!(border[2] > 200 && border[0] < 80, "border not blue: {border:?}");
    }

    #[test]
    fn no_frame_means_byte_identical_passthrough() {
        let original = item(red_photo(30, 30));
        let passed = prepare(original.clone(), None).unwrap();
        assert_eq!(passed.bytes, original.bytes);
        assert_eq!(passed.file_name, original.file_name);
    }

    #[test]
    fn corrupt_photo_fails_the_single_item() {
        let err = apply_frame(&item(vec![0xde, 0xad, 0xbe, 0xef]), &blue_border_frame())
            .unwrap_err();
        match err {
            AppError::ImageError { file, .. } => assert_eq!(file, "selfie.png"),
            other => panic!("expected image error, got {other:?}"),
        }
    }

    #[test]
    fn corrupt_frame_fails_before_any_drawing() {
        let err = apply_frame(&item(red_photo(10, 10)), &[1, 2, 3]).unwrap_err();
        match err {
            AppError::ImageError { file, .. } => assert_eq!(file, "overlay frame"),
            other => panic!("expected image error, got {other:?}"),
        }
    }
}
