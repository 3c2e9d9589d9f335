use ipgallery_image::{Image, ImageError};
use rayon::prelude::*;

use super::separable_filter::replicate;
use crate::color::{rgb_from_ycrcb, ycrcb_from_rgb};

/// Denoise an image with the non-local means algorithm.
///
/// Every output sample is a weighted mean of the samples in a
/// `search_window x search_window` area around it. A candidate is weighted
/// by `exp(-d / h^2)` where `d` is the mean squared difference between the
/// `template_window x template_window` patches centred on the two samples.
///
/// Patch distances for one displacement are computed for the whole image at
/// once from an integral image of the squared differences.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `h` - The filter strength. A non positive value copies the input.
/// * `template_window` - The patch size in pixels.
/// * `search_window` - The size of the area searched for similar patches.
///
/// Samples outside the image replicate the border.
pub fn non_local_means<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    h: f32,
    template_window: usize,
    search_window: usize,
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

    if h <= 0.0 {
        dst.as_slice_mut().copy_from_slice(src.as_slice());
        return Ok(());
    }

    let rt = template_window / 2;
    let rs = search_window / 2;
    let pad = rt + rs;

    // replicate padded copy of the input
    let pw = cols + 2 * pad;
    let ph = rows + 2 * pad;
    let src_data = src.as_slice();
    let mut padded = vec![0.0f32; pw * ph * C];
    padded
        .par_chunks_exact_mut(pw * C)
        .enumerate()
        .for_each(|(py, row)| {
            let y = replicate(py as isize - pad as isize, rows);
            for px in 0..pw {
                let x = replicate(px as isize - pad as isize, cols);
                for ch in 0..C {
                    row[px * C + ch] = src_data[(y * cols + x) * C + ch] as f32;
                }
            }
        });

    // the squared difference plane covers the output plus the patch radius
    let dw = cols + 2 * rt;
    let dh = rows + 2 * rt;
    let iw = dw + 1;
    let mut integral = vec![0.0f64; iw * (dh + 1)];

    let inv_area = 1.0 / ((2 * rt + 1) * (2 * rt + 1) * C) as f64;
    let inv_h2 = 1.0 / (h as f64 * h as f64);

    let mut weight_sum = vec![0.0f32; rows * cols];
    let mut value_sum = vec![0.0f32; rows * cols * C];

    let rs = rs as isize;
    for dy in -rs..=rs {
        for dx in -rs..=rs {
            // row prefix sums of the squared differences
            integral[iw..]
                .par_chunks_exact_mut(iw)
                .enumerate()
                .for_each(|(v, row)| {
                    let py = v + rs as usize;
                    let qy = (py as isize + dy) as usize;
                    let mut acc = 0.0f64;
                    row[0] = 0.0;
                    for u in 0..dw {
                        let px = u + rs as usize;
                        let qx = (px as isize + dx) as usize;
                        let a = &padded[(py * pw + px) * C..(py * pw + px + 1) * C];
                        let b = &padded[(qy * pw + qx) * C..(qy * pw + qx + 1) * C];
                        let d = a
                            .iter()
                            .zip(b.iter())
                            .map(|(&a, &b)| (a - b) * (a - b))
                            .sum::<f32>();
                        acc += d as f64;
                        row[u + 1] = acc;
                    }
                });

            // column accumulation turns the prefix rows into an integral image
            for v in 1..=dh {
                let (prev, cur) = integral.split_at_mut(v * iw);
                let prev = &prev[(v - 1) * iw..];
                cur[..iw]
                    .iter_mut()
                    .zip(prev.iter())
                    .for_each(|(c, &p)| *c += p);
            }

            let integral = &integral;
            let padded = &padded;
            let side = 2 * rt + 1;

            weight_sum
                .par_chunks_exact_mut(cols)
                .zip(value_sum.par_chunks_exact_mut(cols * C))
                .enumerate()
                .for_each(|(y, (w_row, v_row))| {
                    let top = y * iw;
                    let bottom = (y + side) * iw;
                    let qy = (y as isize + pad as isize + dy) as usize;
                    for x in 0..cols {
                        let box_sum = integral[bottom + x + side] - integral[top + x + side]
                            - integral[bottom + x]
                            + integral[top + x];
                        let dist = box_sum.max(0.0) * inv_area;
                        let w = (-dist * inv_h2).exp() as f32;

                        let qx = (x as isize + pad as isize + dx) as usize;
                        let q = &padded[(qy * pw + qx) * C..(qy * pw + qx + 1) * C];

                        w_row[x] += w;
                        for (acc, &val) in v_row[x * C..(x + 1) * C].iter_mut().zip(q.iter()) {
                            *acc += w * val;
                        }
                    }
                });
        }
    }

    dst.as_slice_mut()
        .par_chunks_exact_mut(C)
        .zip(value_sum.par_chunks_exact(C))
        .zip(weight_sum.par_iter())
        .for_each(|((out, values), &w)| {
            for (o, &v) in out.iter_mut().zip(values.iter()) {
                *o = (v / w).round().clamp(0.0, 255.0) as u8;
            }
        });

    Ok(())
}

/// Denoise a colour image with non-local means.
///
/// The image is converted to YCrCb; the luma plane is denoised with the
/// strength `h` and the two chroma planes together with `h_color`. The
/// result is converted back to RGB.
///
/// # Arguments
///
/// * `src` - The source RGB image.
/// * `dst` - The destination RGB image.
/// * `h` - Strength for the luma plane.
/// * `h_color` - Strength for the chroma planes.
/// * `template_window` - The patch size in pixels.
/// * `search_window` - The size of the area searched for similar patches.
pub fn non_local_means_colored(
    src: &Image<u8, 3>,
    dst: &mut Image<u8, 3>,
    h: f32,
    h_color: f32,
    template_window: usize,
    search_window: usize,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let mut ycrcb = Image::<u8, 3>::from_size_val(src.size(), 0)?;
    ycrcb_from_rgb(src, &mut ycrcb)?;

    let luma = ycrcb.channel(0)?;
    let chroma = Image::<u8, 2>::from_channels(&[ycrcb.channel(1)?, ycrcb.channel(2)?])?;

    let mut luma_out = Image::<u8, 1>::from_size_val(src.size(), 0)?;
    non_local_means(&luma, &mut luma_out, h, template_window, search_window)?;

    let mut chroma_out = Image::<u8, 2>::from_size_val(src.size(), 0)?;
    non_local_means(&chroma, &mut chroma_out, h_color, template_window, search_window)?;

    let denoised = Image::<u8, 3>::from_channels(&[
        luma_out,
        chroma_out.channel(0)?,
        chroma_out.channel(1)?,
    ])?;

    rgb_from_ycrcb(&denoised, dst)
}
