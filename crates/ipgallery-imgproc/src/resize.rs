use fast_image_resize as fr;

use ipgallery_image::{Image, ImageError, ImageSize};

/// Interpolation mode for the resize operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InterpolationMode {
    /// Bilinear interpolation
    #[default]
    Bilinear,
    /// Nearest neighbor interpolation
    Nearest,
    /// Bicubic (Catmull-Rom) interpolation
    Bicubic,
}

/// Scale an image size by a factor, rounding to the nearest pixel.
///
/// Each dimension is at least 1 pixel.
///
/// # Example
///
/// ```
/// use ipgallery_image::ImageSize;
/// use ipgallery_imgproc::resize::rescale_size;
///
/// let size = rescale_size([640, 480].into(), 0.5);
/// assert_eq!(size, ImageSize { width: 320, height: 240 });
/// ```
pub fn rescale_size(size: ImageSize, factor: f64) -> ImageSize {
    let scale = |v: usize| ((v as f64 * factor).round() as usize).max(1);
    ImageSize {
        width: scale(size.width),
        height: scale(size.height),
    }
}

fn pixel_type<const C: usize>() -> Result<fr::PixelType, ImageError> {
    match C {
        1 => Ok(fr::PixelType::U8),
        2 => Ok(fr::PixelType::U8x2),
        3 => Ok(fr::PixelType::U8x3),
        4 => Ok(fr::PixelType::U8x4),
        _ => Err(ImageError::InvalidParameter(format!(
            "cannot resize images with {C} channels"
        ))),
    }
}

/// Resize an image to a new size using the [fast_image_resize](https://crates.io/crates/fast_image_resize) crate.
///
/// The output size is taken from `dst`. It supports u8 images with one to
/// four channels.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image with the target size.
/// * `interpolation` - The interpolation mode to use.
///
/// # Example
///
/// ```
/// use ipgallery_image::{Image, ImageSize};
/// use ipgallery_imgproc::resize::{resize_fast, InterpolationMode};
///
/// let image = Image::<u8, 3>::from_size_val([4, 5].into(), 7).unwrap();
/// let mut resized = Image::<u8, 3>::from_size_val([2, 3].into(), 0).unwrap();
///
/// resize_fast(&image, &mut resized, InterpolationMode::Bilinear).unwrap();
/// assert_eq!(resized.size(), ImageSize { width: 2, height: 3 });
/// assert!(resized.as_slice().iter().all(|&v| v == 7));
/// ```
pub fn resize_fast<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    if src.size() == dst.size() {
        dst.as_slice_mut().copy_from_slice(src.as_slice());
        return Ok(());
    }

    if src.size().area() == 0 || dst.size().area() == 0 {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    let pixel_type = pixel_type::<C>()?;

    let src_image = fr::images::ImageRef::new(
        src.width() as u32,
        src.height() as u32,
        src.as_slice(),
        pixel_type,
    )
    .map_err(|e| ImageError::ResizeError(e.to_string()))?;

    let (dst_width, dst_height) = (dst.width() as u32, dst.height() as u32);
    let mut dst_image =
        fr::images::Image::from_slice_u8(dst_width, dst_height, dst.as_slice_mut(), pixel_type)
            .map_err(|e| ImageError::ResizeError(e.to_string()))?;

    let alg = match interpolation {
        InterpolationMode::Bilinear => fr::ResizeAlg::Convolution(fr::FilterType::Bilinear),
        InterpolationMode::Nearest => fr::ResizeAlg::Nearest,
        InterpolationMode::Bicubic => fr::ResizeAlg::Convolution(fr::FilterType::CatmullRom),
    };
    let options = fr::ResizeOptions::new().resize_alg(alg);

    let mut resizer = fr::Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| ImageError::ResizeError(e.to_string()))?;

    Ok(())
}

/// Resize an image by a scale factor, returning a new image.
///
/// A factor of 1.0 returns a copy.
pub fn rescale<const C: usize>(src: &Image<u8, C>, factor: f64) -> Result<Image<u8, C>, ImageError> {
    let mut dst = Image::<u8, C>::from_size_val(rescale_size(src.size(), factor), 0)?;
    resize_fast(src, &mut dst, InterpolationMode::Bilinear)?;
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rescale_size() {
        assert_eq!(rescale_size([3, 3].into(), 0.1), [1, 1].into());
        assert_eq!(rescale_size([5, 3].into(), 1.5), [8, 5].into());
    }

    #[test]
    fn test_resize_gray_nearest() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new([2, 1].into(), vec![10, 200])?;
        let mut dst = Image::<u8, 1>::from_size_val([4, 1].into(), 0)?;
        resize_fast(&image, &mut dst, InterpolationMode::Nearest)?;
        assert_eq!(dst.as_slice(), &[10, 10, 200, 200]);
        Ok(())
    }

    #[test]
    fn test_resize_bicubic() -> Result<(), ImageError> {
        let flat = Image::<u8, 3>::from_size_val([6, 4].into(), 90)?;
        let mut dst = Image::<u8, 3>::from_size_val([12, 9].into(), 0)?;
        resize_fast(&flat, &mut dst, InterpolationMode::Bicubic)?;
        assert!(dst.as_slice().iter().all(|&v| v == 90));

        // a step edge stays ordered across the upscaled row
        let step = Image::<u8, 1>::new([4, 1].into(), vec![0, 0, 255, 255])?;
        let mut wide = Image::<u8, 1>::from_size_val([16, 1].into(), 0)?;
        resize_fast(&step, &mut wide, InterpolationMode::Bicubic)?;
        let row = wide.as_slice();
        assert!(row[0] < 16 && row[15] > 240);
        assert!(row[0] < row[8] && row[8] < row[15]);
        Ok(())
    }

    #[test]
    fn test_rescale_identity() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new([2, 1].into(), vec![1, 2, 3, 4, 5, 6])?;
        let same = rescale(&image, 1.0)?;
        assert_eq!(same, image);

        let half = rescale(&Image::<u8, 3>::from_size_val([8, 6].into(), 3)?, 0.5)?;
        assert_eq!(half.size(), [4, 3].into());
        Ok(())
    }
}
