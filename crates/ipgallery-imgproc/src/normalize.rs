//! Min-max normalization of image samples.
//!
//! The frequency domain demos produce float planes of arbitrary range which
//! are mapped to u8 for display with [`normalize_to_u8`]. The contrast
//! stretching demo maps the range of a u8 image onto `[0, 255]` with
//! [`normalize_min_max_u8`].

use num_traits::Float;

use ipgallery_image::{Image, ImageError};

use crate::parallel;

/// Find the minimum and maximum values in an image.
///
/// # Errors
///
/// If the image holds no samples, an error is returned.
///
/// # Example
///
/// ```
/// use ipgallery_image::{Image, ImageSize};
/// use ipgallery_imgproc::normalize::find_min_max;
///
/// let image_data = vec![0u8, 1, 0, 1, 2, 3, 0, 1, 0, 1, 2, 3];
/// let image = Image::<u8, 3>::new(
///   ImageSize {
///     width: 2,
///     height: 2,
///   },
///   image_data,
/// )
/// .unwrap();
///
/// let (min, max) = find_min_max(&image).unwrap();
/// assert_eq!(min, 0);
/// assert_eq!(max, 3);
/// ```
pub fn find_min_max<T, const C: usize>(image: &Image<T, C>) -> Result<(T, T), ImageError>
where
    T: Clone + Copy + PartialOrd,
{
    let first_element = match image.as_slice().iter().next() {
        Some(x) => x,
        None => return Err(ImageError::ImageDataNotInitialized),
    };

    let mut min = first_element;
    let mut max = first_element;

    for x in image.as_slice().iter() {
        if x < min {
            min = x;
        }
        if x > max {
            max = x;
        }
    }

    Ok((*min, *max))
}

/// Normalize an image using the minimum and maximum values.
///
/// The formula for normalizing an image is:
///
/// (image - min_val) * (max - min) / (max_val - min_val) + min
///
/// The extrema are taken over all channels. A constant image maps to `min`.
///
/// # Arguments
///
/// * `src` - The input image of shape (height, width, channels).
/// * `dst` - The output image of shape (height, width, channels).
/// * `min` - The lower bound of the output range.
/// * `max` - The upper bound of the output range.
pub fn normalize_min_max<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    min: T,
    max: T,
) -> Result<(), ImageError>
where
    T: Send + Sync + Float,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let (min_val, max_val) = find_min_max(src)?;
    let range = max_val - min_val;

    parallel::par_iter_rows_val(src, dst, |&src_val, dst_val| {
        *dst_val = if range > T::zero() {
            (src_val - min_val) * (max - min) / range + min
        } else {
            min
        };
    });

    Ok(())
}

/// Map a float image onto `[0, 255]` and round to u8.
///
/// This is what the frequency domain demos use to display spectra and
/// filtered planes. A constant image yields all zeros.
///
/// # Example
///
/// ```
/// use ipgallery_image::Image;
/// use ipgallery_imgproc::normalize::normalize_to_u8;
///
/// let image = Image::<f32, 1>::new([3, 1].into(), vec![-1.0, 0.0, 1.0]).unwrap();
/// let display = normalize_to_u8(&image).unwrap();
/// assert_eq!(display.as_slice(), &[0, 128, 255]);
/// ```
pub fn normalize_to_u8<const C: usize>(src: &Image<f32, C>) -> Result<Image<u8, C>, ImageError> {
    let mut scaled = Image::<f32, C>::from_size_val(src.size(), 0.0)?;
    normalize_min_max(src, &mut scaled, 0.0, 255.0)?;
    Ok(scaled.map(|&v| v.round().clamp(0.0, 255.0) as u8))
}

/// Stretch the intensity range of a u8 image to the full `[0, 255]` range.
///
/// Implementation of linear contrast stretching. A constant image yields all
/// zeros.
pub fn normalize_min_max_u8<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let (min_val, max_val) = find_min_max(src)?;
    let range = (max_val - min_val) as f32;

    let mut lut = [0u8; 256];
    if range > 0.0 {
        for (v, out) in lut.iter_mut().enumerate().skip(min_val as usize) {
            let stretched = (v as f32 - min_val as f32) * 255.0 / range;
            *out = stretched.round().clamp(0.0, 255.0) as u8;
        }
    }

    parallel::par_iter_rows_val(src, dst, |&src_val, dst_val| {
        *dst_val = lut[src_val as usize];
    });

    Ok(())
}
