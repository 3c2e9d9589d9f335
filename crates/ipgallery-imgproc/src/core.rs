use ipgallery_image::{Image, ImageError};

use crate::parallel;

/// Compute the per element absolute difference of two images.
///
/// # Arguments
///
/// * `src1` - The first input image.
/// * `src2` - The second input image.
/// * `dst` - The output image with `|src1 - src2|`.
///
/// # Example
///
/// ```
/// use ipgallery_image::Image;
/// use ipgallery_imgproc::core::abs_diff;
///
/// let a = Image::<u8, 1>::new([3, 1].into(), vec![10, 200, 50]).unwrap();
/// let b = Image::<u8, 1>::new([3, 1].into(), vec![30, 100, 50]).unwrap();
/// let mut diff = Image::<u8, 1>::from_size_val(a.size(), 0).unwrap();
///
/// abs_diff(&a, &b, &mut diff).unwrap();
/// assert_eq!(diff.as_slice(), &[20, 100, 0]);
/// ```
pub fn abs_diff<const C: usize>(
    src1: &Image<u8, C>,
    src2: &Image<u8, C>,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    if src1.size() != src2.size() {
        return Err(ImageError::InvalidImageSize(
            src1.width(),
            src1.height(),
            src2.width(),
            src2.height(),
        ));
    }

    if src1.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src1.width(),
            src1.height(),
            dst.width(),
            dst.height(),
        ));
    }

    parallel::par_iter_rows_val_two(src1, src2, dst, |a, b, out| {
        *out = a.abs_diff(*b);
    });

    Ok(())
}

/// Multiply every sample by `alpha` and saturate the result to the u8 range.
///
/// Negative scales are allowed; the absolute value is taken before rounding.
pub fn scale_saturate<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    alpha: f32,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    parallel::par_iter_rows_val(src, dst, |src_val, dst_val| {
        *dst_val = (*src_val as f32 * alpha).abs().round().min(255.0) as u8;
    });

    Ok(())
}

/// Invert every bit of every sample, i.e. `255 - v` for u8 images.
pub fn bitwise_not<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    parallel::par_iter_rows_val(src, dst, |src_val, dst_val| {
        *dst_val = !*src_val;
    });

    Ok(())
}

/// Crop an image to the size of `dst`, starting at `(x, y)` in `src`.
///
/// # Errors
///
/// Returns an error if the crop window does not fit inside `src`.
///
/// # Example
///
/// ```
/// use ipgallery_image::Image;
/// use ipgallery_imgproc::core::crop_image;
///
/// let image = Image::<u8, 1>::new([3, 2].into(), vec![1, 2, 3, 4, 5, 6]).unwrap();
/// let mut roi = Image::<u8, 1>::from_size_val([2, 1].into(), 0).unwrap();
///
/// crop_image(&image, &mut roi, 1, 1).unwrap();
/// assert_eq!(roi.as_slice(), &[5, 6]);
/// ```
pub fn crop_image<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    x: usize,
    y: usize,
) -> Result<(), ImageError>
where
    T: Copy,
{
    if x + dst.width() > src.width() || y + dst.height() > src.height() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            x + dst.width(),
            y + dst.height(),
        ));
    }

    let src_stride = src.width() * C;
    let dst_stride = dst.width() * C;
    if dst_stride == 0 {
        return Ok(());
    }

    for (i, dst_row) in dst.as_slice_mut().chunks_exact_mut(dst_stride).enumerate() {
        let start = (y + i) * src_stride + x * C;
        dst_row.copy_from_slice(&src.as_slice()[start..start + dst_stride]);
    }

    Ok(())
}

/// The extrema of a single channel image and where they were first found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxLoc {
    /// Minimum value.
    pub min: f32,
    /// Maximum value.
    pub max: f32,
    /// Location `(x, y)` of the first minimum in row-major order.
    pub min_loc: (usize, usize),
    /// Location `(x, y)` of the first maximum in row-major order.
    pub max_loc: (usize, usize),
}

/// Find the minimum and maximum values of a float image and their locations.
///
/// NaN samples are ignored.
///
/// # Errors
///
/// Returns an error if the image is empty.
pub fn min_max_loc(src: &Image<f32, 1>) -> Result<MinMaxLoc, ImageError> {
    let width = src.width();
    let mut found: Option<MinMaxLoc> = None;

    for (i, &v) in src.as_slice().iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        let loc = (i % width, i / width);
        match found.as_mut() {
            None => {
                found = Some(MinMaxLoc {
                    min: v,
                    max: v,
                    min_loc: loc,
                    max_loc: loc,
                })
            }
            Some(mm) => {
                if v < mm.min {
                    mm.min = v;
                    mm.min_loc = loc;
                }
                if v > mm.max {
                    mm.max = v;
                    mm.max_loc = loc;
                }
            }
        }
    }

    found.ok_or(ImageError::ImageDataNotInitialized)
}

#[cfg(test)]
mod tests {
    use ipgallery_image::{Image, ImageError};

    #[test]
    fn abs_diff_rgb() -> Result<(), ImageError> {
        let a = Image::<u8, 3>::new([1, 1].into(), vec![0, 128, 255])?;
        let b = Image::<u8, 3>::new([1, 1].into(), vec![255, 120, 0])?;
        let mut diff = Image::<u8, 3>::from_size_val(a.size(), 0)?;
        super::abs_diff(&a, &b, &mut diff)?;
        assert_eq!(diff.as_slice(), &[255, 8, 255]);

        let mut wrong = Image::<u8, 3>::from_size_val([2, 1].into(), 0)?;
        assert!(super::abs_diff(&a, &b, &mut wrong).is_err());
        Ok(())
    }

    #[test]
    fn scale_saturate_clamps() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::new([3, 1].into(), vec![10, 100, 200])?;
        let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0)?;
        super::scale_saturate(&src, &mut dst, 2.0)?;
        assert_eq!(dst.as_slice(), &[20, 200, 255]);
        Ok(())
    }

    #[test]
    fn bitwise_not_inverts() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::new([3, 1].into(), vec![0, 100, 255])?;
        let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0)?;
        super::bitwise_not(&src, &mut dst)?;
        assert_eq!(dst.as_slice(), &[255, 155, 0]);
        Ok(())
    }

    #[test]
    fn crop_image_bounds() -> Result<(), ImageError> {
        let src = Image::<u8, 3>::from_size_val([4, 4].into(), 1)?;
        let mut dst = Image::<u8, 3>::from_size_val([2, 3].into(), 0)?;
        super::crop_image(&src, &mut dst, 2, 1)?;
        assert!(dst.as_slice().iter().all(|&v| v == 1));
        assert!(super::crop_image(&src, &mut dst, 3, 1).is_err());
        Ok(())
    }

    #[test]
    fn min_max_loc_first_occurrence() -> Result<(), ImageError> {
        let src = Image::<f32, 1>::new(
            [3, 2].into(),
            vec![0.5, -1.0, 0.9, 0.9, f32::NAN, -1.0],
        )?;
        let mm = super::min_max_loc(&src)?;
        assert_eq!(mm.min, -1.0);
        assert_eq!(mm.min_loc, (1, 0));
        assert_eq!(mm.max, 0.9);
        assert_eq!(mm.max_loc, (2, 0));

        let empty = Image::<f32, 1>::new([0, 0].into(), vec![])?;
        assert!(super::min_max_loc(&empty).is_err());
        Ok(())
    }
}
