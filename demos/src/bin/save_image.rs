use std::path::PathBuf;

use argh::FromArgs;
use ipgallery::{
    image::Image,
    imgproc::core,
    io::{functional, jpeg},
};

// the quality used when none is given
const JPEG_QUALITY: u8 = 95;

#[derive(FromArgs)]
/// Invert an image and save it as a JPEG file
struct Args {
    /// the image to invert
    #[argh(positional, default = "PathBuf::from(\"example.jpg\")")]
    image: PathBuf,

    /// the JPEG file to write
    #[argh(option, short = 'o', default = "PathBuf::from(\"inverted.jpg\")")]
    output: PathBuf,

    /// the JPEG quality, 1 to 100
    #[argh(option, short = 'q', default = "JPEG_QUALITY")]
    quality: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let img = match functional::read_image_any_rgb8(&args.image) {
        Ok(img) => img,
        Err(err) => {
            log::debug!("cannot read {}: {err}", args.image.display());
            println!("No image file successfully loaded.");
            return Ok(());
        }
    };

    let mut inverted = Image::from_size_val(img.size(), 0u8)?;
    core::bitwise_not(&img, &mut inverted)?;

    jpeg::write_image_jpeg_rgb8(&args.output, &inverted, args.quality)?;
    log::info!("saved {}", args.output.display());

    Ok(())
}
