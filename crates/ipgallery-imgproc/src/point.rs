//! Intensity point transforms.
//!
//! Each transform is evaluated once per intensity into a 256 entry lookup
//! table which is then applied to every sample. Results are truncated
//! towards zero and saturated to `[0, 255]`.

use ipgallery_image::{Image, ImageError};

use crate::parallel;

/// A 256 entry intensity lookup table.
pub type Lut = [u8; 256];

fn build_lut(f: impl Fn(f32) -> f32) -> Lut {
    let mut lut = [0u8; 256];
    for (v, out) in lut.iter_mut().enumerate() {
        let y = f(v as f32);
        // NaN saturates to 0
        *out = if y.is_nan() { 0 } else { y.clamp(0.0, 255.0) as u8 };
    }
    lut
}

/// Lookup table of the exponential transform `C * ((1 + alpha)^v - 1)`.
pub fn exponential_lut(c: f32, alpha: f32) -> Lut {
    build_lut(|v| c * ((1.0 + alpha).powf(v) - 1.0))
}

/// Lookup table of the logarithmic transform `c * ln(1 + (e^sigma - 1) * v)`.
pub fn logarithmic_lut(c: f32, sigma: f32) -> Lut {
    let k = sigma.exp() - 1.0;
    build_lut(|v| c * (k * v).ln_1p())
}

/// Lookup table of the power law transform `v^gamma` on raw 0-255 samples.
pub fn power_law_lut(gamma: f32) -> Lut {
    build_lut(|v| v.powf(gamma))
}

/// Apply a lookup table to every sample of an image.
///
/// Precondition: the input and output images must have the same size.
pub fn apply_lut<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    lut: &Lut,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows_val(src, dst, |&src_val, dst_val| {
        *dst_val = lut[src_val as usize];
    });

    Ok(())
}

/// Apply the exponential transform `C * ((1 + alpha)^v - 1)`.
///
/// # Example
///
/// ```
/// use ipgallery_image::Image;
/// use ipgallery_imgproc::point::exponential_transform;
///
/// let image = Image::<u8, 1>::new([3, 1].into(), vec![0, 100, 255]).unwrap();
/// let mut out = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// exponential_transform(&image, &mut out, 10.0, 0.01).unwrap();
/// assert_eq!(out.as_slice(), &[0, 17, 116]);
/// ```
pub fn exponential_transform<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    c: f32,
    alpha: f32,
) -> Result<(), ImageError> {
    apply_lut(src, dst, &exponential_lut(c, alpha))
}

/// Apply the logarithmic transform `c * ln(1 + (e^sigma - 1) * v)`.
pub fn logarithmic_transform<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    c: f32,
    sigma: f32,
) -> Result<(), ImageError> {
    apply_lut(src, dst, &logarithmic_lut(c, sigma))
}

/// Apply the power law (gamma) transform `v^gamma`.
pub fn power_law_transform<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    gamma: f32,
) -> Result<(), ImageError> {
    apply_lut(src, dst, &power_law_lut(gamma))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_maps_to_zero() {
        for c in [0.0, 10.0, 100.0] {
            assert_eq!(exponential_lut(c, 0.02)[0], 0);
            assert_eq!(logarithmic_lut(c, 0.05)[0], 0);
        }
        assert_eq!(power_law_lut(1.5)[0], 0);
    }

    #[test]
    fn power_law_identity_and_saturation() {
        let identity = power_law_lut(1.0);
        assert!(identity.iter().enumerate().all(|(i, &v)| v as usize == i));

        let steep = power_law_lut(2.0);
        assert_eq!(steep[15], 225);
        assert_eq!(steep[16], 255);
        assert_eq!(steep[255], 255);

        let zero = power_law_lut(0.0);
        assert!(zero.iter().all(|&v| v == 1));
    }

    #[test]
    fn logarithmic_values() {
        let lut = logarithmic_lut(10.0, 0.1);
        // 10 * ln(1 + 0.10517 * 255) = 33.2
        assert_eq!(lut[255], 33);
        assert!(lut.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn transforms_apply_to_rgb() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new([1, 1].into(), vec![2, 4, 8])?;
        let mut out = Image::<u8, 3>::from_size_val(image.size(), 0)?;
        power_law_transform(&image, &mut out, 2.0)?;
        assert_eq!(out.as_slice(), &[4, 16, 64]);

        let mut wrong = Image::<u8, 3>::from_size_val([2, 1].into(), 0)?;
        assert!(logarithmic_transform(&image, &mut wrong, 1.0, 1.0).is_err());
        Ok(())
    }
}
