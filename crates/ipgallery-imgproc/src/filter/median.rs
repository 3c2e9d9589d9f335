use ipgallery_image::{Image, ImageError};
use rayon::prelude::*;

use super::separable_filter::replicate;

/// Blur an image with a median filter.
///
/// Each output sample is the median of the `kernel_size x kernel_size`
/// neighbourhood of the input, channel by channel. Samples outside the
/// image replicate the border.
///
/// A running 256 bin histogram is slid along every row, so the cost per
/// sample grows linearly with the kernel size.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The odd size of the square neighbourhood.
///
/// # Example
///
/// ```
/// use ipgallery_image::Image;
/// use ipgallery_imgproc::filter::median_blur;
///
/// // salt noise in the middle is removed
/// let image = Image::<u8, 1>::new([3, 3].into(), vec![10, 10, 10, 10, 255, 10, 10, 10, 10]).unwrap();
/// let mut filtered = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// median_blur(&image, &mut filtered, 3).unwrap();
/// assert_eq!(filtered.as_slice(), &[10; 9]);
/// ```
pub fn median_blur<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    kernel_size: usize,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    if kernel_size % 2 == 0 {
        return Err(ImageError::InvalidKernelSize(
            kernel_size,
            "median kernel size must be odd".to_string(),
        ));
    }

    let rows = src.rows();
    let cols = src.cols();
    if rows == 0 || cols == 0 {
        return Ok(());
    }

    let half = (kernel_size / 2) as isize;
    let rank = (kernel_size * kernel_size) / 2;
    let src_data = src.as_slice();

    dst.as_slice_mut()
        .par_chunks_exact_mut(cols * C)
        .enumerate()
        .for_each(|(r, dst_row)| {
            let window_rows = (-half..=half)
                .map(|dy| replicate(r as isize + dy, rows))
                .collect::<Vec<_>>();

            for ch in 0..C {
                let sample = |y: usize, x: usize| src_data[(y * cols + x) * C + ch] as usize;
                let mut hist = [0u32; 256];

                // seed the histogram with the window of the first column
                for dx in -half..=half {
                    let x = replicate(dx, cols);
                    for &y in window_rows.iter() {
                        hist[sample(y, x)] += 1;
                    }
                }

                for c in 0..cols {
                    if c > 0 {
                        let x_out = replicate(c as isize - 1 - half, cols);
                        let x_in = replicate(c as isize + half, cols);
                        for &y in window_rows.iter() {
                            hist[sample(y, x_out)] -= 1;
                            hist[sample(y, x_in)] += 1;
                        }
                    }

                    let mut count = 0usize;
                    let mut median = 0u8;
                    for (v, &n) in hist.iter().enumerate() {
                        count += n as usize;
                        if count > rank {
                            median = v as u8;
                            break;
                        }
                    }
                    dst_row[c * C + ch] = median;
                }
            }
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_blur_rgb() -> Result<(), ImageError> {
        let mut data = vec![50u8; 5 * 5 * 3];
        // a single hot pixel in the red channel
        data[(2 * 5 + 2) * 3] = 250;
        let img = Image::<u8, 3>::new([5, 5].into(), data)?;
        let mut dst = Image::<u8, 3>::from_size_val(img.size(), 0)?;

        median_blur(&img, &mut dst, 3)?;
        assert!(dst.as_slice().iter().all(|&v| v == 50));

        Ok(())
    }

    #[test]
    fn test_median_blur_keeps_edges() -> Result<(), ImageError> {
        // left half dark, right half bright
        let data = (0..36)
            .map(|i| if i % 6 < 3 { 0u8 } else { 200u8 })
            .collect::<Vec<_>>();
        let img = Image::<u8, 1>::new([6, 6].into(), data)?;
        let mut dst = Image::<u8, 1>::from_size_val(img.size(), 0)?;

        median_blur(&img, &mut dst, 5)?;
        assert_eq!(dst.as_slice(), img.as_slice());

        Ok(())
    }

    #[test]
    fn test_median_blur_even_kernel() -> Result<(), ImageError> {
        let img = Image::<u8, 1>::from_size_val([3, 3].into(), 0)?;
        let mut dst = Image::<u8, 1>::from_size_val(img.size(), 0)?;
        assert!(median_blur(&img, &mut dst, 4).is_err());
        Ok(())
    }
}
