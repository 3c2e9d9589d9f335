use crate::parallel;
use ipgallery_image::{Image, ImageError};

/// Convert an RGB8 image to an HSV8 image.
///
/// The channels of the output follow the 8-bit convention used by most
/// vision toolkits:
///
/// * H: The hue channel in the range [0, 180) (degrees / 2).
/// * S: The saturation channel in the range [0, 255].
/// * V: The value channel in the range [0, 255].
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use ipgallery_image::Image;
/// use ipgallery_imgproc::color::hsv_from_rgb;
///
/// let image = Image::<u8, 3>::new([1, 1].into(), vec![0, 0, 255]).unwrap();
/// let mut hsv = Image::<u8, 3>::from_size_val(image.size(), 0).unwrap();
///
/// hsv_from_rgb(&image, &mut hsv).unwrap();
/// assert_eq!(hsv.as_slice(), &[120, 255, 255]);
/// ```
pub fn hsv_from_rgb(src: &Image<u8, 3>, dst: &mut Image<u8, 3>) -> Result<(), ImageError> {
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

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let h = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * (g - b) / delta
        } else if max == g {
            120.0 + 60.0 * (b - r) / delta
        } else {
            240.0 + 60.0 * (r - g) / delta
        };

        // ensure h is in the range [0, 360)
        let h = if h < 0.0 { h + 360.0 } else { h };

        let s = if max == 0.0 { 0.0 } else { 255.0 * delta / max };

        // half degrees so the hue fits in a byte, 360 wraps to 0
        let h = (h / 2.0).round() as u32 % 180;

        dst_pixel[0] = h as u8;
        dst_pixel[1] = s.round().clamp(0.0, 255.0) as u8;
        dst_pixel[2] = max as u8;
    });

    Ok(())
}

/// Convert an HSV8 image (H in [0, 180)) back to an RGB8 image.
///
/// Precondition: the input and output images must have the same size.
pub fn rgb_from_hsv(src: &Image<u8, 3>, dst: &mut Image<u8, 3>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let h = (src_pixel[0] as f32 * 2.0) % 360.0;
        let s = src_pixel[1] as f32 / 255.0;
        let v = src_pixel[2] as f32 / 255.0;

        let c = v * s;
        let hp = h / 60.0;
        let x = c * (1.0 - ((hp % 2.0) - 1.0).abs());
        let m = v - c;

        let (r, g, b) = match hp as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        dst_pixel[0] = ((r + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        dst_pixel[1] = ((g + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        dst_pixel[2] = ((b + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use ipgallery_image::{Image, ImageError};

    #[test]
    fn hsv_from_rgb() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            [4, 1].into(),
            vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 128, 128, 128],
        )?;

        let mut hsv = Image::<u8, 3>::from_size_val(image.size(), 0)?;
        super::hsv_from_rgb(&image, &mut hsv)?;

        assert_eq!(
            hsv.as_slice(),
            &[0, 255, 255, 60, 255, 255, 120, 255, 255, 0, 0, 128]
        );

        Ok(())
    }

    #[test]
    fn hsv_round_trip_primaries() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            [3, 1].into(),
            vec![255, 255, 0, 0, 255, 255, 255, 0, 255],
        )?;

        let mut hsv = Image::<u8, 3>::from_size_val(image.size(), 0)?;
        super::hsv_from_rgb(&image, &mut hsv)?;

        let mut rgb = Image::<u8, 3>::from_size_val(image.size(), 0)?;
        super::rgb_from_hsv(&hsv, &mut rgb)?;

        assert_eq!(rgb.as_slice(), image.as_slice());

        Ok(())
    }

    #[test]
    fn full_saturation_hue_map() -> Result<(), ImageError> {
        // a hue of 30 (60 degrees) at full saturation and value is yellow
        let hsv = Image::<u8, 3>::new([1, 1].into(), vec![30, 255, 255])?;
        let mut rgb = Image::<u8, 3>::from_size_val(hsv.size(), 0)?;
        super::rgb_from_hsv(&hsv, &mut rgb)?;
        assert_eq!(rgb.as_slice(), &[255, 255, 0]);
        Ok(())
    }
}
