use std::path::PathBuf;

use argh::FromArgs;
use ipgallery::{
    app::{controls::Controls, display::Display, trackbar::Trackbars},
    image::Image,
    imgproc::filter,
    io::functional,
};

const OUTPUT_WINDOW: &str = "Smoothed Image";

#[derive(FromArgs)]
/// Smooth an image with a 5x5 gaussian filter and display it
struct Args {
    /// the image to smooth
    #[argh(positional, default = "PathBuf::from(\"example.jpg\")")]
    image: PathBuf,
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

    // a zero sigma is derived from the kernel size
    let mut blur = Image::from_size_val(img.size(), 0u8)?;
    filter::gaussian_blur(&img, &mut blur, (5, 5), (0.0, 0.0))?;

    let display = Display::new("smooth_image", &Display::mode_from_env())?;
    display.show(OUTPUT_WINDOW, &blur)?;
    display.flush();

    // wait for any key
    let controls = Controls::new()?;
    let mut trackbars = Trackbars::new();
    controls.wait_key(None, &mut trackbars);

    Ok(())
}
