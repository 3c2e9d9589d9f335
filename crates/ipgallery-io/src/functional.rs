use std::path::Path;

use ipgallery_image::{Image, ImageSize};

use crate::error::IoError;

/// Reads an image from the given file path as _(rgb8)_.
///
/// The method tries to read from any image format supported by the image crate.
/// Grayscale or alpha images are converted to three channels.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An RGB image containing the image data.
pub fn read_image_any_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref().to_owned();

    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::ImageReader::open(&file_path)?
        .with_guessed_format()?
        .decode()?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    Ok(Image::new(size, img.into_rgb8().into_raw())?)
}

/// Writes an _(rgb8)_ image to the given file path.
///
/// The format is deduced from the file extension.
///
/// # Arguments
///
/// * `file_path` - The path to the output file.
/// * `image` - The image to write.
pub fn write_image_any_rgb8(file_path: impl AsRef<Path>, image: &Image<u8, 3>) -> Result<(), IoError> {
    let file_path = file_path.as_ref();

    let buffer = image::RgbImage::from_raw(
        image.width() as u32,
        image.height() as u32,
        image.as_slice().to_vec(),
    )
    .ok_or(IoError::UnsupportedImageSize(image.width(), image.height()))?;

    buffer.save(file_path)?;

    Ok(())
}

/// Returns true if the path has an extension of a still image format.
pub fn is_image_file(file_path: impl AsRef<Path>) -> bool {
    image::ImageFormat::from_path(file_path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_any() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("checker.png");

        let data = (0..6 * 4)
            .flat_map(|i| if i % 2 == 0 { [255, 0, 0] } else { [0, 0, 255] })
            .collect::<Vec<u8>>();
        let image = Image::<u8, 3>::new([6, 4].into(), data)?;

        write_image_any_rgb8(&file_path, &image)?;
        let image_back = read_image_any_rgb8(&file_path)?;

        // png is lossless
        assert_eq!(image_back, image);
        Ok(())
    }

    #[test]
    fn read_missing() {
        let res = read_image_any_rgb8("does/not/exist.png");
        assert!(matches!(res, Err(IoError::FileDoesNotExist(_))));
    }

    #[test]
    fn image_extensions() {
        assert!(is_image_file("a.jpg"));
        assert!(is_image_file("b.PNG"));
        assert!(!is_image_file("video.avi"));
        assert!(!is_image_file("noext"));
    }
}
