use ipgallery_image::{Image, ImageError};

use super::{kernels, separable_filter, FloatConversion};

/// Blur an image using a box blur filter
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The size of the kernel (kernel_x, kernel_y).
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn box_blur<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel_size: (usize, usize),
) -> Result<(), ImageError>
where
    T: FloatConversion + Clone + Send + Sync,
{
    let kernel_x = kernels::box_blur_kernel_1d(kernel_size.0);
    let kernel_y = kernels::box_blur_kernel_1d(kernel_size.1);
    separable_filter(src, dst, &kernel_x, &kernel_y)?;
    Ok(())
}

/// Blur an image using a gaussian blur filter
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The size of the kernel (kernel_x, kernel_y). Both must be odd.
/// * `sigma` - The sigma of the gaussian kernel, xy-ordered. Zero derives
///   the sigma from the kernel size.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
///
/// # Example
///
/// ```
/// use ipgallery_image::Image;
/// use ipgallery_imgproc::filter::gaussian_blur;
///
/// let image = Image::<u8, 3>::from_size_val([8, 8].into(), 100).unwrap();
/// let mut blurred = Image::<u8, 3>::from_size_val(image.size(), 0).unwrap();
///
/// gaussian_blur(&image, &mut blurred, (5, 5), (0.0, 0.0)).unwrap();
/// assert!(blurred.as_slice().iter().all(|&v| v == 100));
/// ```
pub fn gaussian_blur<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel_size: (usize, usize),
    sigma: (f32, f32),
) -> Result<(), ImageError>
where
    T: FloatConversion + Clone + Send + Sync,
{
    for k in [kernel_size.0, kernel_size.1] {
        if k % 2 == 0 {
            return Err(ImageError::InvalidKernelSize(
                k,
                "gaussian kernel size must be odd".to_string(),
            ));
        }
    }
    let kernel_x = kernels::gaussian_kernel_1d(kernel_size.0, sigma.0);
    let kernel_y = kernels::gaussian_kernel_1d(kernel_size.1, sigma.1);
    separable_filter(src, dst, &kernel_x, &kernel_y)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipgallery_image::ImageSize;

    #[test]
    fn test_box_blur() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 3,
            height: 3,
        };

        let img = Image::<f32, 1>::new(size, vec![0.0, 0.0, 0.0, 0.0, 9.0, 0.0, 0.0, 0.0, 0.0])?;
        let mut dst = Image::<f32, 1>::from_size_val(size, 0.0)?;

        box_blur(&img, &mut dst, (3, 3))?;

        for v in dst.as_slice() {
            approx::assert_relative_eq!(*v, 1.0, epsilon = 1e-5);
        }

        Ok(())
    }

    #[test]
    fn test_gaussian_blur_preserves_mass() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 9,
            height: 9,
        };
        let mut img = Image::<f32, 1>::from_size_val(size, 0.0)?;
        img.as_slice_mut()[40] = 1.0;

        let mut dst = Image::<f32, 1>::from_size_val(size, 0.0)?;
        gaussian_blur(&img, &mut dst, (5, 5), (1.0, 1.0))?;

        let total = dst.as_slice().iter().sum::<f32>();
        approx::assert_relative_eq!(total, 1.0, epsilon = 1e-5);

        let centre = dst.as_slice()[40];
        assert!(dst.as_slice().iter().all(|&v| v <= centre));

        Ok(())
    }

    #[test]
    fn test_gaussian_blur_even_kernel() -> Result<(), ImageError> {
        let img = Image::<u8, 1>::from_size_val([4, 4].into(), 0)?;
        let mut dst = Image::<u8, 1>::from_size_val(img.size(), 0)?;
        assert!(gaussian_blur(&img, &mut dst, (4, 5), (0.0, 0.0)).is_err());
        Ok(())
    }
}
