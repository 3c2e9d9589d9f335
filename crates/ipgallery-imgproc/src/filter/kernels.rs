/// Create a box blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
///
/// # Returns
///
/// A vector of the kernel.
pub fn box_blur_kernel_1d(kernel_size: usize) -> Vec<f32> {
    vec![1.0 / kernel_size as f32; kernel_size]
}

/// Derive the gaussian sigma from the kernel size.
///
/// sigma = 0.3 * ((kernel_size - 1) * 0.5 - 1) + 0.8
pub fn sigma_from_kernel_size(kernel_size: usize) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel. A non positive sigma is
///   derived from the kernel size with [`sigma_from_kernel_size`].
///
/// # Returns
///
/// A vector of the kernel.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        sigma_from_kernel_size(kernel_size)
    };

    let mut kernel = Vec::with_capacity(kernel_size);

    let mean = (kernel_size as f32 - 1.0) / 2.0;
    let sigma_sq = sigma * sigma;

    // compute the kernel
    for i in 0..kernel_size {
        let x = i as f32 - mean;
        kernel.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    // normalize the kernel
    let norm = kernel.iter().sum::<f32>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// Make a neighbourhood size usable as a kernel size.
///
/// The size is raised to at least 3 and rounded up to the next odd value.
///
/// # Example
///
/// ```
/// use ipgallery_imgproc::filter::kernels::odd_kernel_size;
///
/// assert_eq!(odd_kernel_size(0), 3);
/// assert_eq!(odd_kernel_size(4), 5);
/// assert_eq!(odd_kernel_size(7), 7);
/// ```
pub fn odd_kernel_size(size: usize) -> usize {
    let size = size.max(3);
    if size % 2 == 0 {
        size + 1
    } else {
        size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_kernel_1d() {
        let kernel = gaussian_kernel_1d(5, 0.5);

        let expected = [
            0.00026386508,
            0.10645077,
            0.78657067,
            0.10645077,
            0.00026386508,
        ];

        for (&k, &e) in kernel.iter().zip(expected.iter()) {
            approx::assert_relative_eq!(k, e, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_gaussian_kernel_default_sigma() {
        // a 5 tap kernel derives sigma = 1.1
        approx::assert_relative_eq!(sigma_from_kernel_size(5), 1.1, epsilon = 1e-6);
        let derived = gaussian_kernel_1d(5, 0.0);
        let explicit = gaussian_kernel_1d(5, 1.1);
        for (a, b) in derived.iter().zip(explicit.iter()) {
            approx::assert_relative_eq!(a, b, epsilon = 1e-6);
        }
        approx::assert_relative_eq!(derived.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_box_blur_kernel_1d() {
        let kernel = box_blur_kernel_1d(4);
        assert_eq!(kernel, vec![0.25; 4]);
    }

    #[test]
    fn test_odd_kernel_size() {
        assert_eq!(odd_kernel_size(1), 3);
        assert_eq!(odd_kernel_size(3), 3);
        assert_eq!(odd_kernel_size(40), 41);
    }
}
