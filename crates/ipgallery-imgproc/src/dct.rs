use std::sync::Arc;

use rayon::prelude::*;
use rustdct::{Dct2, Dct3, DctPlanner, TransformType2And3};

use ipgallery_image::{Image, ImageError, ImageSize};

use crate::{fourier, parallel};

/// Return the fastest even transform size `>= n`.
///
/// This is `2 * optimal_dft_size(floor((n + 1) / 2))`.
///
/// # Example
///
/// ```
/// use ipgallery_imgproc::dct::optimal_dct_size;
///
/// assert_eq!(optimal_dct_size(480), 480);
/// assert_eq!(optimal_dct_size(481), 486);
/// ```
pub fn optimal_dct_size(n: usize) -> usize {
    2 * fourier::optimal_dft_size((n + 1) / 2)
}

enum Direction {
    Forward,
    Inverse,
}

fn transform_rows(
    data: &mut [f32],
    len: usize,
    plan: &Arc<dyn TransformType2And3<f32>>,
    direction: &Direction,
) {
    let dc_scale = (1.0 / len as f32).sqrt();
    let ac_scale = (2.0 / len as f32).sqrt();

    data.par_chunks_exact_mut(len).for_each(|row| match direction {
        Direction::Forward => {
            plan.process_dct2(row);
            row[0] *= dc_scale;
            row[1..].iter_mut().for_each(|v| *v *= ac_scale);
        }
        Direction::Inverse => {
            row[0] *= 2.0 * dc_scale;
            row[1..].iter_mut().for_each(|v| *v *= ac_scale);
            plan.process_dct3(row);
        }
    });
}

fn transform_2d(src: &Image<f32, 1>, direction: Direction) -> Result<Image<f32, 1>, ImageError> {
    let (w, h) = (src.width(), src.height());
    let mut data = src.as_slice().to_vec();
    if w == 0 || h == 0 {
        return Image::new(src.size(), data);
    }

    let mut planner = DctPlanner::<f32>::new();
    let row_plan = planner.plan_dct2(w);
    let col_plan = planner.plan_dct2(h);

    transform_rows(&mut data, w, &row_plan, &direction);
    let mut columns = parallel::transpose(&data, w, h);
    transform_rows(&mut columns, h, &col_plan, &direction);

    Image::new(src.size(), parallel::transpose(&columns, h, w))
}

/// Compute the orthonormal 2D discrete cosine transform (type II).
///
/// # Example
///
/// ```
/// use ipgallery_image::Image;
/// use ipgallery_imgproc::dct::dct_2d;
///
/// let image = Image::<f32, 1>::from_size_val([4, 4].into(), 2.0).unwrap();
/// let coeffs = dct_2d(&image).unwrap();
///
/// // sqrt(16) * 2
/// assert!((coeffs.as_slice()[0] - 8.0).abs() < 1e-5);
/// ```
pub fn dct_2d(src: &Image<f32, 1>) -> Result<Image<f32, 1>, ImageError> {
    transform_2d(src, Direction::Forward)
}

/// Compute the inverse of [`dct_2d`] (orthonormal type III).
pub fn idct_2d(src: &Image<f32, 1>) -> Result<Image<f32, 1>, ImageError> {
    transform_2d(src, Direction::Inverse)
}

/// Create a low-pass mask for DCT coefficients.
///
/// Coefficients whose index `(u, v)` is within `radius` of the origin are
/// kept, the rest are zeroed: a quarter disk anchored at the top left.
pub fn dct_low_pass_mask(size: ImageSize, radius: u32) -> Result<Image<f32, 1>, ImageError> {
    let mut mask = Image::<f32, 1>::from_size_val(size, 0.0)?;
    let r2 = (radius as usize).pow(2);

    parallel::par_rows_indexed(&mut mask, |v, row| {
        for (u, m) in row.iter_mut().enumerate() {
            if u * u + v * v <= r2 {
                *m = 1.0;
            }
        }
    });

    Ok(mask)
}

/// Log scale the absolute value of coefficients, `ln(1 + |c|)`, for display.
pub fn log_abs(src: &Image<f32, 1>) -> Image<f32, 1> {
    src.map(|c| c.abs().ln_1p())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimal_dct_size() {
        assert_eq!(optimal_dct_size(1), 2);
        assert_eq!(optimal_dct_size(7), 8);
        assert_eq!(optimal_dct_size(13), 16);
        assert_eq!(optimal_dct_size(640), 640);
    }

    #[test]
    fn test_dct_idct_identity() -> Result<(), ImageError> {
        let data = (0..24).map(|i| ((i * 13) % 17) as f32).collect::<Vec<_>>();
        let img = Image::<f32, 1>::new([6, 4].into(), data)?;

        let coeffs = dct_2d(&img)?;
        let back = idct_2d(&coeffs)?;

        for (a, b) in back.as_slice().iter().zip(img.as_slice()) {
            approx::assert_relative_eq!(a, b, epsilon = 1e-3);
        }
        Ok(())
    }

    #[test]
    fn test_dct_energy_preserved() -> Result<(), ImageError> {
        let data = (0..16).map(|i| (i % 5) as f32).collect::<Vec<_>>();
        let img = Image::<f32, 1>::new([4, 4].into(), data)?;
        let coeffs = dct_2d(&img)?;

        let energy = |im: &Image<f32, 1>| im.as_slice().iter().map(|v| v * v).sum::<f32>();
        approx::assert_relative_eq!(energy(&coeffs), energy(&img), epsilon = 1e-2);
        Ok(())
    }

    #[test]
    fn test_dct_low_pass_mask() -> Result<(), ImageError> {
        let mask = dct_low_pass_mask([4, 4].into(), 2)?;
        #[rustfmt::skip]
        assert_eq!(
            mask.as_slice(),
            &[
                1.0, 1.0, 1.0, 0.0,
                1.0, 1.0, 0.0, 0.0,
                1.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 0.0,
            ]
        );
        Ok(())
    }
}
