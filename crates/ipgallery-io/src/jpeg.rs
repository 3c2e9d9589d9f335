use crate::error::IoError;
use ipgallery_image::{Image, ImageSize};
use jpeg_encoder::{ColorType, Encoder};
use std::{fs, path::Path};

// the encoder works on u16 dimensions
fn encoder_dims<const C: usize>(image: &Image<u8, C>) -> Result<(u16, u16), IoError> {
    match (u16::try_from(image.width()), u16::try_from(image.height())) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(IoError::UnsupportedImageSize(image.width(), image.height())),
    }
}

/// Writes the given JPEG _(rgb8)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the JPEG image.
/// - `image` - The image to encode.
/// - `quality` - The quality of the JPEG encoding, range from 0 (lowest) to 100 (highest)
pub fn write_image_jpeg_rgb8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 3>,
    quality: u8,
) -> Result<(), IoError> {
    let (width, height) = encoder_dims(image)?;
    let encoder = Encoder::new_file(file_path, clamp_quality(quality))?;
    encoder.encode(image.as_slice(), width, height, ColorType::Rgb)?;
    Ok(())
}

// the encoder accepts 1..=100
fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(1, 100)
}

/// Encodes an _(rgb8)_ image into an in-memory JPEG stream.
///
/// A quality of 0 is encoded as the lowest quality the encoder supports.
///
/// # Example
///
/// ```
/// use ipgallery_image::Image;
/// use ipgallery_io::jpeg::{decode_image_jpeg_rgb8, encode_image_jpeg_rgb8};
///
/// let image = Image::<u8, 3>::from_size_val([16, 8].into(), 128).unwrap();
/// let bytes = encode_image_jpeg_rgb8(&image, 90).unwrap();
///
/// let mut decoded = Image::<u8, 3>::from_size_val(image.size(), 0).unwrap();
/// decode_image_jpeg_rgb8(&bytes, &mut decoded).unwrap();
/// assert_eq!(decoded.size(), image.size());
/// ```
pub fn encode_image_jpeg_rgb8(image: &Image<u8, 3>, quality: u8) -> Result<Vec<u8>, IoError> {
    let (width, height) = encoder_dims(image)?;
    let mut buffer = Vec::new();
    let encoder = Encoder::new(&mut buffer, clamp_quality(quality));
    encoder.encode(image.as_slice(), width, height, ColorType::Rgb)?;
    Ok(buffer)
}

/// Read a JPEG image with three channels _(rgb8)_.
///
/// # Arguments
///
/// - `file_path` - The path to the JPEG file.
///
/// # Returns
///
/// A RGB image with three channels _(rgb8)_.
pub fn read_image_jpeg_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref().to_owned();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    if file_path.extension().map_or(true, |ext| {
        !ext.eq_ignore_ascii_case("jpg") && !ext.eq_ignore_ascii_case("jpeg")
    }) {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    let jpeg_data = fs::read(file_path)?;
    let mut decoder = zune_jpeg::JpegDecoder::new(jpeg_data.as_slice());
    decoder.decode_headers()?;

    let image_size = decoded_size(&decoder)?;
    let img_data = decoder.decode()?;

    Ok(Image::new(image_size, img_data)?)
}

/// Decodes a JPEG image with three channels (rgb8) from raw bytes.
///
/// # Arguments
///
/// - `src` - Raw bytes of the jpeg file
/// - `dst` - The destination image, which must match the encoded size.
pub fn decode_image_jpeg_rgb8(src: &[u8], dst: &mut Image<u8, 3>) -> Result<(), IoError> {
    let mut decoder = zune_jpeg::JpegDecoder::new(src);
    decoder.decode_headers()?;

    let size = decoded_size(&decoder)?;
    if size != dst.size() {
        return Err(IoError::DecodeMismatchResolution(
            size.width,
            size.height,
            dst.width(),
            dst.height(),
        ));
    }

    decoder.decode_into(dst.as_slice_mut())?;
    Ok(())
}

fn decoded_size(decoder: &zune_jpeg::JpegDecoder<&[u8]>) -> Result<ImageSize, IoError> {
    let image_info = decoder.info().ok_or_else(|| {
        IoError::JpegDecodingError(zune_jpeg::errors::DecodeErrors::Format(String::from(
            "Failed to find image info from its metadata",
        )))
    })?;

    Ok(ImageSize {
        width: image_info.width as usize,
        height: image_info.height as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: usize, height: usize) -> Result<Image<u8, 3>, IoError> {
        let mut data = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[(x * 4) as u8, (y * 4) as u8, 128]);
            }
        }
        Ok(Image::new([width, height].into(), data)?)
    }

    #[test]
    fn read_write_jpeg() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("gradient.jpeg");

        let image = gradient(40, 30)?;
        write_image_jpeg_rgb8(&file_path, &image, 100)?;
        assert!(file_path.exists(), "File does not exist: {:?}", file_path);

        let image_back = read_image_jpeg_rgb8(&file_path)?;
        assert_eq!(image_back.cols(), 40);
        assert_eq!(image_back.rows(), 30);

        let max_err = image
            .as_slice()
            .iter()
            .zip(image_back.as_slice())
            .map(|(&a, &b)| a.abs_diff(b))
            .max();
        assert!(max_err.is_some_and(|e| e < 16));
        Ok(())
    }

    #[test]
    fn read_rejects_bad_paths() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let missing = tmp_dir.path().join("missing.jpg");
        assert!(matches!(
            read_image_jpeg_rgb8(&missing),
            Err(IoError::FileDoesNotExist(_))
        ));

        let not_jpeg = tmp_dir.path().join("image.png");
        fs::write(&not_jpeg, b"not an image")?;
        assert!(matches!(
            read_image_jpeg_rgb8(&not_jpeg),
            Err(IoError::InvalidFileExtension(_))
        ));
        Ok(())
    }

    #[test]
    fn encode_quality_changes_stream() -> Result<(), IoError> {
        let image = gradient(64, 64)?;
        let low = encode_image_jpeg_rgb8(&image, 0)?;
        let high = encode_image_jpeg_rgb8(&image, 100)?;
        assert!(low.len() < high.len());

        let mut decoded = Image::<u8, 3>::from_size_val(image.size(), 0)?;
        decode_image_jpeg_rgb8(&high, &mut decoded)?;

        let mut wrong = Image::<u8, 3>::from_size_val([8, 8].into(), 0)?;
        assert!(matches!(
            decode_image_jpeg_rgb8(&high, &mut wrong),
            Err(IoError::DecodeMismatchResolution(64, 64, 8, 8))
        ));
        Ok(())
    }
}
