use ipgallery_image::{Image, ImageError, ImageSize};
use rayon::prelude::*;

use crate::core;

/// Return the size of the correlation map of `template` slid over `src`.
///
/// # Errors
///
/// Returns an error if the template is empty or larger than the image.
pub fn match_size(src: ImageSize, template: ImageSize) -> Result<ImageSize, ImageError> {
    if template.width == 0
        || template.height == 0
        || template.width > src.width
        || template.height > src.height
    {
        return Err(ImageError::InvalidImageSize(
            src.width,
            src.height,
            template.width,
            template.height,
        ));
    }

    Ok(ImageSize {
        width: src.width - template.width + 1,
        height: src.height - template.height + 1,
    })
}

/// Match a template with the normalized correlation coefficient.
///
/// For every placement `(x, y)` of the template inside the image:
///
/// R(x, y) = sum(T' * I') / sqrt(sum(T'^2) * sum(I'^2))
///
/// with `T'` and `I'` the template and the covered image patch minus their
/// per channel means, summed over all channels. The result is in `[-1, 1]`
/// and 0 where either patch is flat.
///
/// # Arguments
///
/// * `src` - The image to search.
/// * `template` - The template to look for.
/// * `dst` - The correlation map of size `(W - w + 1) x (H - h + 1)`.
///
/// # Example
///
/// ```
/// use ipgallery_image::Image;
/// use ipgallery_imgproc::template::{best_match, match_size, match_template_ccoeff_normed};
///
/// let image = Image::<u8, 1>::new(
///     [4, 3].into(),
///     vec![0, 0, 0, 0, 0, 9, 3, 0, 0, 1, 7, 0],
/// ).unwrap();
/// let template = Image::<u8, 1>::new([2, 2].into(), vec![9, 3, 1, 7]).unwrap();
///
/// let mut result = Image::<f32, 1>::from_size_val(
///     match_size(image.size(), template.size()).unwrap(),
///     0.0,
/// ).unwrap();
/// match_template_ccoeff_normed(&image, &template, &mut result).unwrap();
///
/// let (loc, score) = best_match(&result).unwrap();
/// assert_eq!(loc, (1, 1));
/// assert!((score - 1.0).abs() < 1e-5);
/// ```
pub fn match_template_ccoeff_normed<const C: usize>(
    src: &Image<u8, C>,
    template: &Image<u8, C>,
    dst: &mut Image<f32, 1>,
) -> Result<(), ImageError> {
    let out_size = match_size(src.size(), template.size())?;
    if dst.size() != out_size {
        return Err(ImageError::InvalidImageSize(
            out_size.width,
            out_size.height,
            dst.width(),
            dst.height(),
        ));
    }

    let (tw, th) = (template.width(), template.height());
    let n = (tw * th) as f64;

    // zero mean template per channel
    let mut t_mean = [0.0f64; C];
    for px in template.as_slice().chunks_exact(C) {
        for (m, &v) in t_mean.iter_mut().zip(px.iter()) {
            *m += v as f64;
        }
    }
    t_mean.iter_mut().for_each(|m| *m /= n);

    let t_zero = template
        .as_slice()
        .chunks_exact(C)
        .flat_map(|px| {
            px.iter()
                .zip(t_mean.iter())
                .map(|(&v, &m)| v as f64 - m)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    let t_norm2 = t_zero.iter().map(|v| v * v).sum::<f64>();

    // integral images of the samples and squared samples per channel
    let (w, h) = (src.width(), src.height());
    let iw = w + 1;
    let mut sum = vec![[0.0f64; C]; iw * (h + 1)];
    let mut sq_sum = vec![[0.0f64; C]; iw * (h + 1)];
    let src_data = src.as_slice();
    for y in 0..h {
        let mut row_sum = [0.0f64; C];
        let mut row_sq = [0.0f64; C];
        for x in 0..w {
            for ch in 0..C {
                let v = src_data[(y * w + x) * C + ch] as f64;
                row_sum[ch] += v;
                row_sq[ch] += v * v;
                sum[(y + 1) * iw + x + 1][ch] = sum[y * iw + x + 1][ch] + row_sum[ch];
                sq_sum[(y + 1) * iw + x + 1][ch] = sq_sum[y * iw + x + 1][ch] + row_sq[ch];
            }
        }
    }

    let box_sum = |table: &[[f64; C]], x: usize, y: usize, ch: usize| {
        table[(y + th) * iw + x + tw][ch] - table[y * iw + x + tw][ch] - table[(y + th) * iw + x][ch]
            + table[y * iw + x][ch]
    };

    let out_w = out_size.width;
    dst.as_slice_mut()
        .par_chunks_exact_mut(out_w)
        .enumerate()
        .for_each(|(y, dst_row)| {
            for (x, out) in dst_row.iter_mut().enumerate() {
                // sum(T' * I') == sum(T' * I) since sum(T') == 0
                let mut cross = 0.0f64;
                for ty in 0..th {
                    let img_row = &src_data[((y + ty) * w + x) * C..((y + ty) * w + x + tw) * C];
                    let tpl_row = &t_zero[ty * tw * C..(ty + 1) * tw * C];
                    cross += img_row
                        .iter()
                        .zip(tpl_row.iter())
                        .map(|(&i, &t)| i as f64 * t)
                        .sum::<f64>();
                }

                let mut i_norm2 = 0.0f64;
                for ch in 0..C {
                    let s = box_sum(&sum, x, y, ch);
                    let s2 = box_sum(&sq_sum, x, y, ch);
                    i_norm2 += (s2 - s * s / n).max(0.0);
                }

                let denom = (t_norm2 * i_norm2).sqrt();
                *out = if denom > f64::EPSILON * n {
                    (cross / denom).clamp(-1.0, 1.0) as f32
                } else {
                    0.0
                };
            }
        });

    Ok(())
}

/// Return the location `(x, y)` and score of the best match in a
/// correlation map.
pub fn best_match(result: &Image<f32, 1>) -> Result<((usize, usize), f32), ImageError> {
    let mm = core::min_max_loc(result)?;
    Ok((mm.max_loc, mm.max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_size() -> Result<(), ImageError> {
        assert_eq!(
            match_size([10, 8].into(), [3, 2].into())?,
            ImageSize {
                width: 8,
                height: 7
            }
        );
        assert!(match_size([2, 2].into(), [3, 1].into()).is_err());
        assert!(match_size([2, 2].into(), [0, 1].into()).is_err());
        Ok(())
    }

    #[test]
    fn test_match_rgb_patch() -> Result<(), ImageError> {
        // deterministic texture
        let (w, h) = (12usize, 10usize);
        let data = (0..w * h * 3)
            .map(|i| ((i * 37 + i / 7 * 11) % 251) as u8)
            .collect::<Vec<_>>();
        let image = Image::<u8, 3>::new([w, h].into(), data)?;

        let (x0, y0, tw, th) = (5usize, 3usize, 4usize, 3usize);
        let mut tpl = Vec::new();
        for y in y0..y0 + th {
            tpl.extend_from_slice(&image.as_slice()[(y * w + x0) * 3..(y * w + x0 + tw) * 3]);
        }
        let template = Image::<u8, 3>::new([tw, th].into(), tpl)?;

        let mut result =
            Image::<f32, 1>::from_size_val(match_size(image.size(), template.size())?, 0.0)?;
        match_template_ccoeff_normed(&image, &template, &mut result)?;

        let (loc, score) = best_match(&result)?;
        assert_eq!(loc, (x0, y0));
        approx::assert_relative_eq!(score, 1.0, epsilon = 1e-5);
        assert!(result.as_slice().iter().all(|v| (-1.0..=1.0).contains(v)));
        Ok(())
    }

    #[test]
    fn test_match_flat_is_zero() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_size_val([5, 5].into(), 10)?;
        let template = Image::<u8, 1>::from_size_val([2, 2].into(), 10)?;
        let mut result = Image::<f32, 1>::from_size_val([4, 4].into(), 1.0)?;
        match_template_ccoeff_normed(&image, &template, &mut result)?;
        assert!(result.as_slice().iter().all(|&v| v == 0.0));

        let mut wrong = Image::<f32, 1>::from_size_val([5, 5].into(), 0.0)?;
        assert!(match_template_ccoeff_normed(&image, &template, &mut wrong).is_err());
        Ok(())
    }
}
