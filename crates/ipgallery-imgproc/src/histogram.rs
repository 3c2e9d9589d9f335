use ipgallery_image::{Image, ImageError, ImageSize};
use rayon::prelude::*;

use crate::draw;

/// Height of the canvas used to draw histograms.
pub const HISTOGRAM_CANVAS_HEIGHT: usize = 300;

/// Compute the pixel intensity histogram of an image.
///
/// NOTE: this is limited to 8-bit 1-channel images.
///
/// # Arguments
///
/// * `src` - The input image to compute the histogram.
/// * `hist` - The output histogram, counts are added to it.
/// * `num_bins` - The number of bins to use for the histogram.
///
/// # Errors
///
/// Returns an error if the number of bins is invalid.
///
/// # Example
///
/// ```
/// use ipgallery_image::{Image, ImageSize};
/// use ipgallery_imgproc::histogram::compute_histogram;
///
/// let image = Image::<u8, 1>::new(
///   ImageSize {
///     width: 3,
///     height: 3,
///   },
///   vec![0, 2, 4, 128, 130, 132, 254, 255, 255],
/// ).unwrap();
///
/// let mut histogram = vec![0; 3];
///
/// compute_histogram(&image, &mut histogram, 3).unwrap();
/// assert_eq!(histogram, vec![3, 3, 3]);
/// ```
pub fn compute_histogram(
    src: &Image<u8, 1>,
    hist: &mut [usize],
    num_bins: usize,
) -> Result<(), ImageError> {
    if num_bins == 0 || num_bins > 256 {
        return Err(ImageError::InvalidHistogramBins(num_bins));
    }

    if hist.len() != num_bins {
        return Err(ImageError::InvalidHistogramBins(num_bins));
    }

    let mut bin_lut = [0usize; 256];
    for (i, bin) in bin_lut.iter_mut().enumerate() {
        *bin = (i * num_bins) >> 8;
    }

    let counts = src
        .as_slice()
        .par_chunks(4096)
        .fold(
            || vec![0usize; num_bins],
            |mut local, chunk| {
                for &px in chunk {
                    local[bin_lut[px as usize]] += 1;
                }
                local
            },
        )
        .reduce(
            || vec![0usize; num_bins],
            |mut a, b| {
                a.iter_mut().zip(b.iter()).for_each(|(a, b)| *a += b);
                a
            },
        );

    hist.iter_mut()
        .zip(counts.iter())
        .for_each(|(h, c)| *h += c);

    Ok(())
}

fn apply_lut(src: &Image<u8, 1>, dst: &mut Image<u8, 1>, lut: &[u8; 256]) {
    dst.as_slice_mut()
        .par_iter_mut()
        .zip(src.as_slice().par_iter())
        .for_each(|(d, &s)| *d = lut[s as usize]);
}

/// Equalize the histogram of a grayscale image.
///
/// The cumulative histogram is remapped so that the first occupied
/// intensity maps to 0 and the last to 255.
///
/// # Example
///
/// ```
/// use ipgallery_image::Image;
/// use ipgallery_imgproc::histogram::equalize_histogram;
///
/// let image = Image::<u8, 1>::new([4, 1].into(), vec![10, 10, 20, 30]).unwrap();
/// let mut equalized = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// equalize_histogram(&image, &mut equalized).unwrap();
/// assert_eq!(equalized.as_slice(), &[0, 0, 128, 255]);
/// ```
pub fn equalize_histogram(src: &Image<u8, 1>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let total = src.as_slice().len();
    if total == 0 {
        return Ok(());
    }

    let mut hist = vec![0usize; 256];
    compute_histogram(src, &mut hist, 256)?;

    let first = hist.iter().position(|&n| n > 0).unwrap_or(0);

    let mut lut = [0u8; 256];
    if hist[first] == total {
        // a constant image keeps its value
        lut[first] = first as u8;
    } else {
        let scale = 255.0 / (total - hist[first]) as f32;
        let mut sum = 0usize;
        for i in first + 1..256 {
            sum += hist[i];
            lut[i] = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
        }
    }

    apply_lut(src, dst, &lut);
    Ok(())
}

/// Contrast limited adaptive histogram equalization (CLAHE).
///
/// The image is split into a grid of tiles, each tile gets its own clipped
/// and equalized lookup table, and every pixel is bilinearly interpolated
/// between the tables of the four nearest tile centres.
///
/// # Arguments
///
/// * `src` - The grayscale input image.
/// * `dst` - The grayscale output image.
/// * `clip_limit` - Contrast limit relative to a uniform histogram. A non
///   positive value disables clipping.
/// * `tile_grid` - Number of tiles along (x, y). Both must be at least 1.
pub fn clahe(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    clip_limit: f32,
    tile_grid: (usize, usize),
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let (tiles_x, tiles_y) = tile_grid;
    if tiles_x == 0 || tiles_y == 0 {
        return Err(ImageError::InvalidParameter(format!(
            "clahe tile grid must be at least 1x1, got {tiles_x}x{tiles_y}"
        )));
    }

    let (w, h) = (src.width(), src.height());
    if w == 0 || h == 0 {
        return Ok(());
    }

    let tile_w = w.div_ceil(tiles_x);
    let tile_h = h.div_ceil(tiles_y);
    let src_data = src.as_slice();

    // one lookup table per tile, row-major over the grid
    let luts = (0..tiles_x * tiles_y)
        .into_par_iter()
        .map(|t| {
            let (tx, ty) = (t % tiles_x, t / tiles_x);
            let x0 = (tx * tile_w).min(w);
            let x1 = ((tx + 1) * tile_w).min(w);
            let y0 = (ty * tile_h).min(h);
            let y1 = ((ty + 1) * tile_h).min(h);

            let mut hist = [0usize; 256];
            for y in y0..y1 {
                for &v in &src_data[y * w + x0..y * w + x1] {
                    hist[v as usize] += 1;
                }
            }
            tile_lut(&mut hist, (x1 - x0) * (y1 - y0), clip_limit)
        })
        .collect::<Vec<_>>();

    let inv_tw = 1.0 / tile_w as f32;
    let inv_th = 1.0 / tile_h as f32;

    dst.as_slice_mut()
        .par_chunks_exact_mut(w)
        .enumerate()
        .for_each(|(y, dst_row)| {
            let tyf = y as f32 * inv_th - 0.5;
            let ty1 = tyf.floor() as isize;
            let ya = tyf - ty1 as f32;
            let ty2 = (ty1 + 1).min(tiles_y as isize - 1) as usize;
            let ty1 = ty1.max(0) as usize;

            for (x, out) in dst_row.iter_mut().enumerate() {
                let txf = x as f32 * inv_tw - 0.5;
                let tx1 = txf.floor() as isize;
                let xa = txf - tx1 as f32;
                let tx2 = (tx1 + 1).min(tiles_x as isize - 1) as usize;
                let tx1 = tx1.max(0) as usize;

                let v = src_data[y * w + x] as usize;
                let lut = |tx: usize, ty: usize| luts[ty * tiles_x + tx][v] as f32;

                let top = lut(tx1, ty1) * (1.0 - xa) + lut(tx2, ty1) * xa;
                let bottom = lut(tx1, ty2) * (1.0 - xa) + lut(tx2, ty2) * xa;
                *out = (top * (1.0 - ya) + bottom * ya).round().clamp(0.0, 255.0) as u8;
            }
        });

    Ok(())
}

// clip the histogram, redistribute the excess and integrate it into a lut
fn tile_lut(hist: &mut [usize; 256], tile_area: usize, clip_limit: f32) -> [u8; 256] {
    let mut lut = [0u8; 256];
    if tile_area == 0 {
        return lut;
    }

    if clip_limit > 0.0 {
        let clip = ((clip_limit * tile_area as f32 / 256.0) as usize).max(1);

        let mut clipped = 0usize;
        for bin in hist.iter_mut() {
            if *bin > clip {
                clipped += *bin - clip;
                *bin = clip;
            }
        }

        let batch = clipped / 256;
        let mut residual = clipped - batch * 256;
        hist.iter_mut().for_each(|bin| *bin += batch);

        if residual > 0 {
            let step = (256 / residual).max(1);
            let mut i = 0;
            while i < 256 && residual > 0 {
                hist[i] += 1;
                residual -= 1;
                i += step;
            }
        }
    }

    let scale = 255.0 / tile_area as f32;
    let mut sum = 0usize;
    for (out, &n) in lut.iter_mut().zip(hist.iter()) {
        sum += n;
        *out = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

// counts min-max normalized to [0, 255], rounded half to even
fn normalized_counts(hist: &[usize]) -> Vec<i64> {
    let min = hist.iter().copied().min().unwrap_or(0);
    let max = hist.iter().copied().max().unwrap_or(0);
    if max == min {
        return vec![0; hist.len()];
    }
    let range = (max - min) as f64;
    hist.iter()
        .map(|&n| ((n - min) as f64 * 255.0 / range).round_ties_even() as i64)
        .collect()
}

fn histogram_canvas(num_bins: usize) -> Result<Image<u8, 3>, ImageError> {
    Image::from_size_val(
        ImageSize {
            width: num_bins,
            height: HISTOGRAM_CANVAS_HEIGHT,
        },
        255,
    )
}

/// Draw a histogram as black vertical bars on a white canvas.
///
/// The canvas is one column per bin wide and [`HISTOGRAM_CANVAS_HEIGHT`]
/// rows high. Counts are min-max normalized to `[0, 255]` and drawn from
/// the bottom row upwards.
pub fn draw_histogram_bars(hist: &[usize]) -> Result<Image<u8, 3>, ImageError> {
    let mut canvas = histogram_canvas(hist.len())?;
    let bottom = HISTOGRAM_CANVAS_HEIGHT as i64 - 1;
    for (x, h) in normalized_counts(hist).into_iter().enumerate() {
        draw::draw_line(&mut canvas, (x as i64, bottom), (x as i64, bottom - h), [0; 3], 1);
    }
    Ok(canvas)
}

/// Draw a histogram as a black curve on a white canvas.
///
/// Same layout as [`draw_histogram_bars`].
pub fn draw_histogram_curve(hist: &[usize]) -> Result<Image<u8, 3>, ImageError> {
    let mut canvas = histogram_canvas(hist.len())?;
    let bottom = HISTOGRAM_CANVAS_HEIGHT as i64 - 1;
    let points = normalized_counts(hist)
        .into_iter()
        .enumerate()
        .map(|(x, h)| (x as i64, bottom - h))
        .collect::<Vec<_>>();
    draw::draw_polyline(&mut canvas, &points, [0; 3], 1);
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_histogram() -> Result<(), ImageError> {
        let image = Image::new(
            ImageSize {
                width: 3,
                height: 3,
            },
            vec![0, 2, 4, 128, 130, 132, 254, 255, 255],
        )?;

        let mut histogram = vec![0; 3];

        compute_histogram(&image, &mut histogram, 3)?;
        assert_eq!(histogram, vec![3, 3, 3]);

        let mut wrong = vec![0; 2];
        assert!(compute_histogram(&image, &mut wrong, 3).is_err());
        assert!(compute_histogram(&image, &mut wrong, 0).is_err());

        Ok(())
    }

    #[test]
    fn test_equalize_constant() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_size_val([3, 3].into(), 77)?;
        let mut dst = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        equalize_histogram(&image, &mut dst)?;
        assert_eq!(dst.as_slice(), image.as_slice());
        Ok(())
    }

    #[test]
    fn test_equalize_spreads_range() -> Result<(), ImageError> {
        let data = (0..64).map(|i| 100 + (i % 8) as u8).collect::<Vec<_>>();
        let image = Image::<u8, 1>::new([8, 8].into(), data)?;
        let mut dst = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        equalize_histogram(&image, &mut dst)?;

        let (min, max) = crate::normalize::find_min_max(&dst)?;
        assert_eq!((min, max), (0, 255));
        Ok(())
    }

    #[test]
    fn test_clahe_constant_image() -> Result<(), ImageError> {
        // without clipping the lut of a constant tile maps everything to 255
        let image = Image::<u8, 1>::from_size_val([16, 16].into(), 40)?;
        let mut dst = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        clahe(&image, &mut dst, 0.0, (2, 2))?;
        assert!(dst.as_slice().iter().all(|&v| v == 255));
        Ok(())
    }

    #[test]
    fn test_clahe_clip_limits_contrast() -> Result<(), ImageError> {
        let data = (0..64 * 64)
            .map(|i| if (i % 64) < 32 { 100u8 } else { 110u8 })
            .collect::<Vec<_>>();
        let image = Image::<u8, 1>::new([64, 64].into(), data)?;

        let mut unclipped = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        clahe(&image, &mut unclipped, 0.0, (1, 1))?;

        let mut clipped = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        clahe(&image, &mut clipped, 2.0, (1, 1))?;

        let spread = |im: &Image<u8, 1>| {
            let (min, max) = crate::normalize::find_min_max(im)?;
            Ok::<_, ImageError>(max - min)
        };
        assert!(spread(&clipped)? < spread(&unclipped)?);
        assert!(spread(&clipped)? >= 10);
        Ok(())
    }

    #[test]
    fn test_clahe_rejects_empty_grid() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_size_val([4, 4].into(), 0)?;
        let mut dst = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        assert!(clahe(&image, &mut dst, 2.0, (0, 8)).is_err());
        Ok(())
    }

    #[test]
    fn test_draw_histogram_bars() -> Result<(), ImageError> {
        let mut hist = vec![0usize; 256];
        hist[10] = 50;
        hist[20] = 100;
        let canvas = draw_histogram_bars(&hist)?;
        assert_eq!(canvas.size(), [256, 300].into());

        // the tallest bar reaches 255 rows above the bottom row
        assert_eq!(canvas.pixel(20, 299 - 255)?, &[0, 0, 0]);
        assert_eq!(canvas.pixel(20, 299 - 256)?, &[255, 255, 255]);
        // half height bar (rounded)
        assert_eq!(canvas.pixel(10, 299 - 128)?, &[0, 0, 0]);
        assert_eq!(canvas.pixel(10, 299 - 129)?, &[255, 255, 255]);
        // empty bins only mark the bottom row
        assert_eq!(canvas.pixel(0, 299)?, &[0, 0, 0]);
        assert_eq!(canvas.pixel(0, 298)?, &[255, 255, 255]);
        Ok(())
    }

    #[test]
    fn test_normalized_counts_ties() {
        // 1 * 255 / 2 = 127.5 and 1 * 255 / 510 = 0.5 are exact halves
        assert_eq!(normalized_counts(&[0, 1, 2]), vec![0, 128, 255]);
        assert_eq!(normalized_counts(&[0, 1, 510]), vec![0, 0, 255]);
        assert_eq!(normalized_counts(&[0, 3, 510]), vec![0, 2, 255]);
        assert_eq!(normalized_counts(&[7, 7]), vec![0, 0]);
    }

    #[test]
    fn test_draw_histogram_curve() -> Result<(), ImageError> {
        let hist = (0..256).collect::<Vec<usize>>();
        let canvas = draw_histogram_curve(&hist)?;
        assert_eq!(canvas.pixel(0, 299)?, &[0, 0, 0]);
        assert_eq!(canvas.pixel(255, 299 - 255)?, &[0, 0, 0]);
        assert_eq!(canvas.pixel(255, 299)?, &[255, 255, 255]);
        Ok(())
    }
}
