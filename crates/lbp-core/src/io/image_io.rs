use std::path::Path;

use image::{DynamicImage, ImageBuffer, ImageFormat, Luma};
use ndarray::Array2;

use crate::error::{LbpError, Result};
use crate::sample::SampleImage;

fn to_array<T>(width: u32, height: u32, raw: Vec<T>) -> Result<Array2<T>> {
    let (h, w) = (height as usize, width as usize);
    let len = raw.len();
    Array2::from_shape_vec((h, w), raw).map_err(|_| LbpError::ShapeMismatch {
        what: "image buffer",
        expected: vec![h * w],
        actual: vec![len],
    })
}

impl TryFrom<DynamicImage> for SampleImage {
    type Error = LbpError;

    /// Accepts 8- and 16-bit grayscale images as they are; any color layout
    /// fails with [`LbpError::UnsupportedElementType`].
    fn try_from(img: DynamicImage) -> Result<Self> {
        match img {
            DynamicImage::ImageLuma8(buf) => {
                let (w, h) = buf.dimensions();
                Ok(SampleImage::U8(to_array(w, h, buf.into_raw())?))
            }
            DynamicImage::ImageLuma16(buf) => {
                let (w, h) = buf.dimensions();
                Ok(SampleImage::U16(to_array(w, h, buf.into_raw())?))
            }
            other => Err(LbpError::UnsupportedElementType(format!(
                "{:?} (LBP operators sample grayscale uint8, uint16 or float64 data)",
                other.color()
            ))),
        }
    }
}

/// Load an image file for LBP extraction.
///
/// Grayscale files keep their bit depth. Any other layout (color, or gray
/// with alpha) fails with [`LbpError::UnsupportedElementType`] unless
/// `to_grayscale` is set, in which case it is converted to 8- or 16-bit luma
/// depending on its depth.
pub fn load_sample_image(path: &Path, to_grayscale: bool) -> Result<SampleImage> {
    let img = image::open(path)?;
    let is_luma = matches!(
        img,
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageLuma16(_)
    );
    let img = if to_grayscale && !is_luma {
        if img.color().bytes_per_pixel() / img.color().channel_count() > 1 {
            DynamicImage::ImageLuma16(img.to_luma16())
        } else {
            DynamicImage::ImageLuma8(img.to_luma8())
        }
    } else {
        img
    };
    SampleImage::try_from(img)
}

/// Save a code image as 16-bit grayscale PNG.
///
/// Labels are spread over the full 16-bit range (`label * 65535 / (max_label - 1)`)
/// so that small label sets stay visible.
pub fn save_codes_png(codes: &Array2<u16>, max_label: usize, path: &Path) -> Result<()> {
    let (h, w) = codes.dim();
    let scale = 65535.0 / (max_label.max(2) - 1) as f64;

    let mut pixels: Vec<u16> = Vec::with_capacity(h * w);
    for row in 0..h {
        for col in 0..w {
            pixels.push((f64::from(codes[[row, col]]) * scale).round().min(65535.0) as u16);
        }
    }

    let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
        .ok_or_else(|| LbpError::ShapeMismatch {
            what: "code image buffer",
            expected: vec![h, w],
            actual: vec![h * w],
        })?;
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
