//! Discrete Fourier transform of gray images.
//!
//! [`Spectrum`] holds the complex coefficients of a padded image, row major.
//! Sizes from [`optimal_dft_size`] keep the transforms fast.

use std::sync::Arc;

use rayon::prelude::*;
use rustfft::{Fft, FftPlanner};

use ipgallery_image::{Image, ImageError, ImageSize};

use crate::parallel;

pub use rustfft::num_complex::Complex;

/// Return the smallest size `>= n` whose only prime factors are 2, 3 and 5.
///
/// Transforms of such sizes are the fastest to compute.
///
/// # Example
///
/// ```
/// use ipgallery_imgproc::fourier::optimal_dft_size;
///
/// assert_eq!(optimal_dft_size(7), 8);
/// assert_eq!(optimal_dft_size(481), 486);
/// assert_eq!(optimal_dft_size(640), 640);
/// ```
pub fn optimal_dft_size(n: usize) -> usize {
    let mut candidate = n.max(1);
    loop {
        let mut m = candidate;
        for p in [2, 3, 5] {
            while m % p == 0 {
                m /= p;
            }
        }
        if m == 1 {
            return candidate;
        }
        candidate += 1;
    }
}

/// Pad an image on the bottom and right with a constant value.
///
/// # Errors
///
/// Returns an error if `size` is smaller than the image in any dimension.
pub fn pad_constant<T, const C: usize>(
    src: &Image<T, C>,
    size: ImageSize,
    value: T,
) -> Result<Image<T, C>, ImageError>
where
    T: Copy,
{
    if size.width < src.width() || size.height < src.height() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            size.width,
            size.height,
        ));
    }

    let mut dst = Image::<T, C>::from_size_val(size, value)?;
    let src_stride = src.width() * C;
    let dst_stride = size.width * C;
    if src_stride > 0 {
        for (src_row, dst_row) in src
            .as_slice()
            .chunks_exact(src_stride)
            .zip(dst.as_slice_mut().chunks_exact_mut(dst_stride))
        {
            dst_row[..src_stride].copy_from_slice(src_row);
        }
    }

    Ok(dst)
}

/// A complex valued 2D plane in row-major order.
///
/// Holds either the spectrum of an image or, after [`Spectrum::inverse`],
/// the complex spatial result.
#[derive(Clone, Debug)]
pub struct Spectrum {
    size: ImageSize,
    data: Vec<Complex<f32>>,
}

impl Spectrum {
    /// The size of the plane.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The coefficients in row-major order.
    pub fn as_slice(&self) -> &[Complex<f32>] {
        &self.data
    }

    /// The coefficients in row-major order, mutable.
    pub fn as_slice_mut(&mut self) -> &mut [Complex<f32>] {
        &mut self.data
    }

    /// Compute the forward 2D discrete fourier transform of a float image.
    ///
    /// # Example
    ///
    /// ```
    /// use ipgallery_image::Image;
    /// use ipgallery_imgproc::fourier::Spectrum;
    ///
    /// let image = Image::<f32, 1>::from_size_val([4, 2].into(), 1.0).unwrap();
    /// let spectrum = Spectrum::forward(&image).unwrap();
    ///
    /// // all the energy lands in the DC term
    /// assert_eq!(spectrum.as_slice()[0].re, 8.0);
    /// ```
    pub fn forward(src: &Image<f32, 1>) -> Result<Self, ImageError> {
        let mut spectrum = Self {
            size: src.size(),
            data: src
                .as_slice()
                .iter()
                .map(|&v| Complex::new(v, 0.0))
                .collect(),
        };
        spectrum.transform(false);
        Ok(spectrum)
    }

    /// Compute the inverse 2D transform, scaled by `1 / (width * height)`.
    pub fn inverse(&self) -> Spectrum {
        let mut spatial = self.clone();
        spatial.transform(true);
        let scale = 1.0 / self.size.area().max(1) as f32;
        spatial.data.par_iter_mut().for_each(|c| *c *= scale);
        spatial
    }

    fn transform(&mut self, inverse: bool) {
        let (w, h) = (self.size.width, self.size.height);
        if w == 0 || h == 0 {
            return;
        }

        let mut planner = FftPlanner::<f32>::new();
        let plan = |planner: &mut FftPlanner<f32>, n: usize| -> Arc<dyn Fft<f32>> {
            if inverse {
                planner.plan_fft_inverse(n)
            } else {
                planner.plan_fft_forward(n)
            }
        };
        let row_fft = plan(&mut planner, w);
        let col_fft = plan(&mut planner, h);

        // rows
        self.data
            .par_chunks_exact_mut(w)
            .for_each(|row| row_fft.process(row));

        // columns, through a transposed buffer
        let mut transposed = parallel::transpose(&self.data, w, h);
        transposed
            .par_chunks_exact_mut(h)
            .for_each(|col| col_fft.process(col));
        self.data = parallel::transpose(&transposed, h, w);
    }

    /// Move the zero frequency term to the centre of the plane.
    pub fn fftshift(&mut self) {
        let (w, h) = (self.size.width, self.size.height);
        self.data = roll(&self.data, w, h, w / 2, h / 2);
    }

    /// Undo [`Spectrum::fftshift`], also for odd sizes.
    pub fn ifftshift(&mut self) {
        let (w, h) = (self.size.width, self.size.height);
        self.data = roll(&self.data, w, h, w.div_ceil(2), h.div_ceil(2));
    }

    /// Multiply every coefficient by the real weight of a mask of the same size.
    pub fn apply_mask(&mut self, mask: &Image<f32, 1>) -> Result<(), ImageError> {
        if mask.size() != self.size {
            return Err(ImageError::InvalidImageSize(
                self.size.width,
                self.size.height,
                mask.width(),
                mask.height(),
            ));
        }

        self.data
            .par_iter_mut()
            .zip(mask.as_slice().par_iter())
            .for_each(|(c, &m)| *c *= m);

        Ok(())
    }

    /// The magnitude `|F|` of every coefficient.
    pub fn magnitude(&self) -> Result<Image<f32, 1>, ImageError> {
        Image::new(self.size, self.data.par_iter().map(|c| c.norm()).collect())
    }

    /// The log scaled magnitude `ln(1 + |F|)` used to display spectra.
    pub fn log_magnitude(&self) -> Result<Image<f32, 1>, ImageError> {
        Image::new(
            self.size,
            self.data.par_iter().map(|c| c.norm().ln_1p()).collect(),
        )
    }

    /// The real part of every coefficient.
    pub fn real_part(&self) -> Result<Image<f32, 1>, ImageError> {
        Image::new(self.size, self.data.iter().map(|c| c.re).collect())
    }
}

// circular shift so that sample (x, y) moves to ((x + sx) % w, (y + sy) % h)
fn roll<T: Copy + Default>(data: &[T], w: usize, h: usize, sx: usize, sy: usize) -> Vec<T> {
    let mut out = vec![T::default(); data.len()];
    for y in 0..h {
        let ty = (y + sy) % h;
        for x in 0..w {
            let tx = (x + sx) % w;
            out[ty * w + tx] = data[y * w + x];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimal_dft_size() {
        assert_eq!(optimal_dft_size(0), 1);
        assert_eq!(optimal_dft_size(1), 1);
        assert_eq!(optimal_dft_size(11), 12);
        assert_eq!(optimal_dft_size(17), 18);
        assert_eq!(optimal_dft_size(31), 32);
        assert_eq!(optimal_dft_size(125), 125);
    }

    #[test]
    fn test_pad_constant() -> Result<(), ImageError> {
        let img = Image::<f32, 1>::new([2, 2].into(), vec![1.0, 2.0, 3.0, 4.0])?;
        let padded = pad_constant(&img, [3, 3].into(), 0.0)?;
        assert_eq!(
            padded.as_slice(),
            &[1.0, 2.0, 0.0, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0]
        );
        assert!(pad_constant(&img, [1, 3].into(), 0.0).is_err());
        Ok(())
    }

    #[test]
    fn test_forward_inverse_identity() -> Result<(), ImageError> {
        let data = (0..15).map(|i| (i * 7 % 11) as f32).collect::<Vec<_>>();
        let img = Image::<f32, 1>::new([5, 3].into(), data)?;

        let spectrum = Spectrum::forward(&img)?;
        let back = spectrum.inverse().real_part()?;

        for (a, b) in back.as_slice().iter().zip(img.as_slice()) {
            approx::assert_relative_eq!(a, b, epsilon = 1e-4);
        }
        Ok(())
    }

    #[test]
    fn test_fftshift_odd_round_trip() -> Result<(), ImageError> {
        let data = (0..15).map(|i| i as f32).collect::<Vec<_>>();
        let img = Image::<f32, 1>::new([5, 3].into(), data)?;
        let mut spectrum = Spectrum::forward(&img)?;
        let original = spectrum.as_slice().to_vec();

        spectrum.fftshift();
        // the DC term sits at (w / 2, h / 2)
        assert_eq!(spectrum.as_slice()[5 + 2], original[0]);

        spectrum.ifftshift();
        assert_eq!(spectrum.as_slice(), original.as_slice());
        Ok(())
    }

    #[test]
    fn test_apply_mask_zeroes() -> Result<(), ImageError> {
        let img = Image::<f32, 1>::from_size_val([4, 4].into(), 2.0)?;
        let mut spectrum = Spectrum::forward(&img)?;
        let mask = Image::<f32, 1>::from_size_val([4, 4].into(), 0.0)?;
        spectrum.apply_mask(&mask)?;
        assert!(spectrum.magnitude()?.as_slice().iter().all(|&m| m == 0.0));

        let wrong = Image::<f32, 1>::from_size_val([2, 4].into(), 0.0)?;
        assert!(spectrum.apply_mask(&wrong).is_err());
        Ok(())
    }

    #[test]
    fn test_log_magnitude_dc() -> Result<(), ImageError> {
        let img = Image::<f32, 1>::from_size_val([2, 2].into(), 1.0)?;
        let log_mag = Spectrum::forward(&img)?.log_magnitude()?;
        approx::assert_relative_eq!(log_mag.as_slice()[0], 5.0f32.ln(), epsilon = 1e-6);
        approx::assert_relative_eq!(log_mag.as_slice()[1], 0.0, epsilon = 1e-6);
        Ok(())
    }
}
