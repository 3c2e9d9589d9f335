//! Frequency domain filter masks.
//!
//! The masks are laid out for a centred spectrum (see
//! [`crate::fourier::Spectrum::fftshift`]): the zero frequency sits at
//! `(width / 2, height / 2)`.

use ipgallery_image::{Image, ImageError, ImageSize};

use crate::{normalize, parallel};

/// The pass band of a frequency domain filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassBand {
    /// Keep the low frequencies.
    LowPass,
    /// Keep the high frequencies.
    HighPass,
}

fn radial_mask(
    size: ImageSize,
    f: impl Fn(f32) -> f32 + Send + Sync,
) -> Result<Image<f32, 1>, ImageError> {
    let mut mask = Image::<f32, 1>::from_size_val(size, 0.0)?;
    let cx = (size.width / 2) as f32;
    let cy = (size.height / 2) as f32;

    parallel::par_rows_indexed(&mut mask, |y, row| {
        let dy = y as f32 - cy;
        for (x, m) in row.iter_mut().enumerate() {
            let dx = x as f32 - cx;
            *m = f((dx * dx + dy * dy).sqrt());
        }
    });

    Ok(mask)
}

/// Create a Butterworth low-pass mask `1 / (1 + (r / D)^(2n))`.
///
/// `r` is the distance to the centre of the plane, clamped to at least 1.
///
/// # Arguments
///
/// * `size` - The size of the (padded) spectrum.
/// * `radius` - The cut-off radius `D`.
/// * `order` - The filter order `n`.
pub fn butterworth_low_pass(
    size: ImageSize,
    radius: f32,
    order: u32,
) -> Result<Image<f32, 1>, ImageError> {
    let exponent = 2.0 * order as f32;
    radial_mask(size, |r| 1.0 / (1.0 + (r.max(1.0) / radius).powf(exponent)))
}

/// Create a Butterworth high-pass mask `1 / (1 + (D / r)^(2n))`.
///
/// `r` is the distance to the centre of the plane, clamped to at least 1.
pub fn butterworth_high_pass(
    size: ImageSize,
    radius: f32,
    order: u32,
) -> Result<Image<f32, 1>, ImageError> {
    let exponent = 2.0 * order as f32;
    radial_mask(size, |r| 1.0 / (1.0 + (radius / r.max(1.0)).powf(exponent)))
}

/// Create an ideal high-pass mask: zero inside the disk of `radius` around
/// the centre, one elsewhere.
pub fn ideal_high_pass(size: ImageSize, radius: u32) -> Result<Image<f32, 1>, ImageError> {
    let radius = radius as f32;
    radial_mask(size, |r| if r <= radius { 0.0 } else { 1.0 })
}

/// A Butterworth mask that is only recomputed when its parameters change.
///
/// # Example
///
/// ```
/// use ipgallery_imgproc::frequency::{ButterworthCache, PassBand};
///
/// let mut cache = ButterworthCache::new(PassBand::LowPass);
/// let mask = cache.get([64, 48].into(), 5, 1).unwrap();
/// assert_eq!(mask.size(), [64, 48].into());
/// assert_eq!(cache.rebuilds(), 1);
///
/// cache.get([64, 48].into(), 5, 1).unwrap();
/// assert_eq!(cache.rebuilds(), 1);
/// ```
#[derive(Debug)]
pub struct ButterworthCache {
    band: PassBand,
    key: Option<(ImageSize, u32, u32)>,
    mask: Option<Image<f32, 1>>,
    rebuilds: usize,
}

impl ButterworthCache {
    /// Create an empty cache for the given pass band.
    pub fn new(band: PassBand) -> Self {
        Self {
            band,
            key: None,
            mask: None,
            rebuilds: 0,
        }
    }

    /// Invalidate the cached mask so the next [`ButterworthCache::get`] rebuilds it.
    pub fn reset(&mut self) {
        self.key = None;
    }

    /// Number of times the mask has been computed.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    /// Return the mask for `(size, radius, order)`, rebuilding it if needed.
    pub fn get(
        &mut self,
        size: ImageSize,
        radius: u32,
        order: u32,
    ) -> Result<&Image<f32, 1>, ImageError> {
        let key = (size, radius, order);
        let mask = match self.mask.take() {
            Some(mask) if self.key == Some(key) => mask,
            _ => {
                log::debug!(
                    "rebuilding {:?} butterworth filter {size} D={radius} n={order}",
                    self.band
                );
                self.rebuilds += 1;
                self.key = Some(key);
                match self.band {
                    PassBand::LowPass => butterworth_low_pass(size, radius as f32, order)?,
                    PassBand::HighPass => butterworth_high_pass(size, radius as f32, order)?,
                }
            }
        };
        Ok(self.mask.insert(mask))
    }
}

/// Render a mask in `[0, 1]` (or any range) as u8 for display.
pub fn filter_to_u8(mask: &Image<f32, 1>) -> Result<Image<u8, 1>, ImageError> {
    normalize::normalize_to_u8(mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_butterworth_half_power_at_cutoff() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 32,
            height: 32,
        };
        let lp = butterworth_low_pass(size, 10.0, 2)?;
        let hp = butterworth_high_pass(size, 10.0, 2)?;

        // (16 + 10, 16) is exactly at r = D
        let idx = 16 * 32 + 26;
        approx::assert_relative_eq!(lp.as_slice()[idx], 0.5, epsilon = 1e-6);
        approx::assert_relative_eq!(hp.as_slice()[idx], 0.5, epsilon = 1e-6);

        // the centre passes for low-pass, is attenuated by high-pass
        let centre = 16 * 32 + 16;
        assert!(lp.as_slice()[centre] > 0.99);
        assert!(hp.as_slice()[centre] < 0.01);
        Ok(())
    }

    #[test]
    fn test_ideal_high_pass() -> Result<(), ImageError> {
        let mask = ideal_high_pass([9, 9].into(), 2)?;
        assert_eq!(mask.as_slice()[4 * 9 + 4], 0.0);
        assert_eq!(mask.as_slice()[4 * 9 + 6], 0.0);
        assert_eq!(mask.as_slice()[4 * 9 + 7], 1.0);
        assert_eq!(mask.as_slice()[0], 1.0);
        Ok(())
    }

    #[test]
    fn test_cache_rebuilds_on_change() -> Result<(), ImageError> {
        let mut cache = ButterworthCache::new(PassBand::HighPass);
        cache.get([16, 16].into(), 5, 1)?;
        cache.get([16, 16].into(), 5, 1)?;
        assert_eq!(cache.rebuilds(), 1);

        cache.get([16, 16].into(), 6, 1)?;
        assert_eq!(cache.rebuilds(), 2);

        cache.reset();
        let mask = cache.get([16, 16].into(), 6, 1)?;
        assert_eq!(mask.size(), [16, 16].into());
        assert_eq!(cache.rebuilds(), 3);
        Ok(())
    }

    #[test]
    fn test_filter_to_u8() -> Result<(), ImageError> {
        let mask = butterworth_low_pass([8, 8].into(), 2.0, 1)?;
        let display = filter_to_u8(&mask)?;
        assert_eq!(display.as_slice()[4 * 8 + 4], 255);
        Ok(())
    }
}
