use ipgallery_image::{Image, ImageError};
use rayon::prelude::*;

use super::separable_filter::replicate;

/// Apply an edge preserving bilateral filter.
///
/// Every output sample is a weighted mean over a disk shaped neighbourhood.
/// The weight of a neighbour is the product of a spatial gaussian on its
/// distance and a range gaussian on its colour difference, where the colour
/// difference is the L1 sum over the channels.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `diameter` - The neighbourhood diameter. When not positive the radius
///   is derived as `round(1.5 * sigma_space)`.
/// * `sigma_color` - The range sigma. Non positive values are treated as 1.
/// * `sigma_space` - The spatial sigma. Non positive values are treated as 1.
///
/// Samples outside the image replicate the border.
pub fn bilateral_filter<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    diameter: i32,
    sigma_color: f32,
    sigma_space: f32,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let rows = src.rows();
    let cols = src.cols();
    if rows == 0 || cols == 0 {
        return Ok(());
    }

    let sigma_color = if sigma_color <= 0.0 { 1.0 } else { sigma_color };
    let sigma_space = if sigma_space <= 0.0 { 1.0 } else { sigma_space };

    let radius = if diameter <= 0 {
        (sigma_space * 1.5).round() as isize
    } else {
        (diameter / 2) as isize
    }
    .max(1);

    let color_coeff = -0.5 / (sigma_color * sigma_color);
    let space_coeff = -0.5 / (sigma_space * sigma_space);

    // range weights indexed by the L1 colour difference
    let color_weights = (0..=255 * C)
        .map(|d| ((d * d) as f32 * color_coeff).exp())
        .collect::<Vec<_>>();

    // disk shaped spatial support
    let mut offsets = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r2 = (dx * dx + dy * dy) as f32;
            if r2 <= (radius * radius) as f32 {
                offsets.push((dx, dy, (r2 * space_coeff).exp()));
            }
        }
    }

    let src_data = src.as_slice();

    dst.as_slice_mut()
        .par_chunks_exact_mut(cols * C)
        .enumerate()
        .for_each(|(r, dst_row)| {
            for c in 0..cols {
                let centre = &src_data[(r * cols + c) * C..(r * cols + c + 1) * C];
                let mut acc = [0.0f32; C];
                let mut norm = 0.0f32;

                for &(dx, dy, space_w) in offsets.iter() {
                    let y = replicate(r as isize + dy, rows);
                    let x = replicate(c as isize + dx, cols);
                    let neighbour = &src_data[(y * cols + x) * C..(y * cols + x + 1) * C];

                    let diff = centre
                        .iter()
                        .zip(neighbour.iter())
                        .map(|(&a, &b)| a.abs_diff(b) as usize)
                        .sum::<usize>();

                    let w = space_w * color_weights[diff];
                    for (acc_val, &v) in acc.iter_mut().zip(neighbour.iter()) {
                        *acc_val += w * v as f32;
                    }
                    norm += w;
                }

                for (ch, &acc_val) in acc.iter().enumerate() {
                    dst_row[c * C + ch] = (acc_val / norm).round().clamp(0.0, 255.0) as u8;
                }
            }
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bilateral_constant() -> Result<(), ImageError> {
        let img = Image::<u8, 3>::from_size_val([6, 4].into(), 77)?;
        let mut dst = Image::<u8, 3>::from_size_val(img.size(), 0)?;
        bilateral_filter(&img, &mut dst, -1, 10.0, 10.0)?;
        assert_eq!(dst.as_slice(), img.as_slice());
        Ok(())
    }

    #[test]
    fn test_bilateral_preserves_step_edge() -> Result<(), ImageError> {
        // a strong step edge survives a small range sigma
        let data = (0..64)
            .map(|i| if i % 8 < 4 { 20u8 } else { 220u8 })
            .collect::<Vec<_>>();
        let img = Image::<u8, 1>::new([8, 8].into(), data)?;
        let mut dst = Image::<u8, 1>::from_size_val(img.size(), 0)?;

        bilateral_filter(&img, &mut dst, 5, 10.0, 3.0)?;
        assert_eq!(dst.as_slice(), img.as_slice());
        Ok(())
    }

    #[test]
    fn test_bilateral_smooths_small_noise() -> Result<(), ImageError> {
        let mut data = vec![100u8; 49];
        data[24] = 110;
        let img = Image::<u8, 1>::new([7, 7].into(), data)?;
        let mut dst = Image::<u8, 1>::from_size_val(img.size(), 0)?;

        bilateral_filter(&img, &mut dst, -1, 25.0, 2.0)?;
        let centre = dst.as_slice()[24];
        assert!(centre < 110 && centre >= 100, "centre = {centre}");
        Ok(())
    }
}
