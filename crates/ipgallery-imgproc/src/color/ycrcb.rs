use crate::parallel;
use ipgallery_image::{Image, ImageError, ImageSize};

const DELTA: f32 = 128.0;

#[inline]
fn saturate(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Convert an RGB8 image to a YCrCb8 image.
///
/// The output channels are ordered Y, Cr, Cb:
///
/// * Y  = 0.299 * R + 0.587 * G + 0.114 * B
/// * Cr = (R - Y) * 0.713 + 128
/// * Cb = (B - Y) * 0.564 + 128
///
/// Precondition: the input and output images must have the same size.
pub fn ycrcb_from_rgb(src: &Image<u8, 3>, dst: &mut Image<u8, 3>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let r = src_pixel[0] as f32;
        let g = src_pixel[1] as f32;
        let b = src_pixel[2] as f32;

        let y = 0.299 * r + 0.587 * g + 0.114 * b;
        let cr = (r - y) * 0.713 + DELTA;
        let cb = (b - y) * 0.564 + DELTA;

        dst_pixel[0] = saturate(y);
        dst_pixel[1] = saturate(cr);
        dst_pixel[2] = saturate(cb);
    });

    Ok(())
}

/// Convert a YCrCb8 image (channels Y, Cr, Cb) back to an RGB8 image.
///
/// Precondition: the input and output images must have the same size.
pub fn rgb_from_ycrcb(src: &Image<u8, 3>, dst: &mut Image<u8, 3>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let y = src_pixel[0] as f32;
        let cr = src_pixel[1] as f32 - DELTA;
        let cb = src_pixel[2] as f32 - DELTA;

        dst_pixel[0] = saturate(y + 1.403 * cr);
        dst_pixel[1] = saturate(y - 0.714 * cr - 0.344 * cb);
        dst_pixel[2] = saturate(y + 1.773 * cb);
    });

    Ok(())
}

/// Subsample a chroma plane by two in both directions.
///
/// Each output sample is the mean of the corresponding 2x2 block of the
/// input; blocks on an odd border reuse the last row/column. The output size
/// is `ceil(width / 2) x ceil(height / 2)`.
///
/// # Example
///
/// ```
/// use ipgallery_image::Image;
/// use ipgallery_imgproc::color::chroma_subsample;
///
/// let plane = Image::<u8, 1>::new([2, 2].into(), vec![10, 20, 30, 40]).unwrap();
/// let sub = chroma_subsample(&plane).unwrap();
/// assert_eq!(sub.as_slice(), &[25]);
/// ```
pub fn chroma_subsample(src: &Image<u8, 1>) -> Result<Image<u8, 1>, ImageError> {
    let size = ImageSize {
        width: src.width().div_ceil(2),
        height: src.height().div_ceil(2),
    };
    let mut dst = Image::<u8, 1>::from_size_val(size, 0)?;

    let (w, h) = (src.width(), src.height());
    let data = src.as_slice();

    parallel::par_rows_indexed(&mut dst, |row, dst_row| {
        let y0 = 2 * row;
        let y1 = (y0 + 1).min(h - 1);
        for (col, out) in dst_row.iter_mut().enumerate() {
            let x0 = 2 * col;
            let x1 = (x0 + 1).min(w - 1);
            let sum = data[y0 * w + x0] as u32
                + data[y0 * w + x1] as u32
                + data[y1 * w + x0] as u32
                + data[y1 * w + x1] as u32;
            *out = ((sum + 2) / 4) as u8;
        }
    });

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use ipgallery_image::{Image, ImageError};

    #[test]
    fn ycrcb_from_rgb_gray_is_neutral() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new([2, 1].into(), vec![0, 0, 0, 200, 200, 200])?;
        let mut ycrcb = Image::<u8, 3>::from_size_val(image.size(), 0)?;
        super::ycrcb_from_rgb(&image, &mut ycrcb)?;
        assert_eq!(ycrcb.as_slice(), &[0, 128, 128, 200, 128, 128]);
        Ok(())
    }

    #[test]
    fn ycrcb_round_trip() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            [3, 1].into(),
            vec![200, 40, 10, 15, 180, 90, 60, 70, 220],
        )?;
        let mut ycrcb = Image::<u8, 3>::from_size_val(image.size(), 0)?;
        super::ycrcb_from_rgb(&image, &mut ycrcb)?;

        let mut rgb = Image::<u8, 3>::from_size_val(image.size(), 0)?;
        super::rgb_from_ycrcb(&ycrcb, &mut rgb)?;

        for (a, b) in rgb.as_slice().iter().zip(image.as_slice()) {
            assert!((*a as i32 - *b as i32).abs() <= 2, "{a} vs {b}");
        }
        Ok(())
    }

    #[test]
    fn chroma_subsample_odd_size() -> Result<(), ImageError> {
        let plane = Image::<u8, 1>::new([3, 3].into(), vec![0, 0, 90, 0, 0, 90, 30, 30, 60])?;
        let sub = super::chroma_subsample(&plane)?;
        assert_eq!(sub.size(), [2, 2].into());
        assert_eq!(sub.as_slice(), &[0, 90, 30, 60]);
        Ok(())
    }
}
