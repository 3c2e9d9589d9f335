use std::{path::PathBuf, time::Duration};

use argh::FromArgs;
use ipgallery::{
    app::{
        args::parse_point,
        controls::{Controls, EXIT_KEY},
        display::Display,
        trackbar::Trackbars,
        AppError,
    },
    image::Image,
    io::functional,
};

const IMAGE_WINDOW: &str = "Displayed Image";

const X: &str = "x";
const Y: &str = "y";

#[derive(FromArgs)]
/// Print the colour of image pixels and paint pixels white
struct Args {
    /// the image to query
    #[argh(positional, default = "PathBuf::from(\"example.jpg\")")]
    image: PathBuf,

    /// print the colour at x,y, may be repeated
    #[argh(option, from_str_fn(parse_point))]
    query: Vec<(usize, usize)>,

    /// set the pixel at x,y to white, may be repeated
    #[argh(option, from_str_fn(parse_point))]
    paint: Vec<(usize, usize)>,
}

fn in_bounds(img: &Image<u8, 3>, (x, y): (usize, usize)) -> bool {
    if x < img.width() && y < img.height() {
        return true;
    }
    log::warn!("position ({x},{y}) is outside the {} image, skipped", img.size());
    false
}

fn query(img: &Image<u8, 3>, display: &Display, (x, y): (usize, usize)) -> Result<(), AppError> {
    let rgb = img.pixel(x, y)?;
    let message = format!(
        "RGB colour @ position ({x},{y}) = {}",
        rgb.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
    );
    println!("{message}");
    display.show_text(IMAGE_WINDOW, &message)
}

fn paint(img: &mut Image<u8, 3>, (x, y): (usize, usize)) -> Result<(), AppError> {
    for ch in 0..3 {
        img.set_pixel(x, y, ch, 255)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut img = match functional::read_image_any_rgb8(&args.image) {
        Ok(img) => img,
        Err(err) => {
            log::debug!("cannot read {}: {err}", args.image.display());
            println!("No image file successfully loaded.");
            return Ok(());
        }
    };

    let display = Display::new("colour_query", &Display::mode_from_env())?;
    let controls = Controls::new()?;

    for &point in &args.query {
        if in_bounds(&img, point) {
            query(&img, &display, point)?;
        }
    }
    for &point in &args.paint {
        if in_bounds(&img, point) {
            paint(&mut img, point)?;
        }
    }

    // the trackbars select the pixel used by the 'q' and 'p' keys
    let mut trackbars = Trackbars::new();
    trackbars.add(X, 0, img.width().saturating_sub(1) as i32);
    trackbars.add(Y, 0, img.height().saturating_sub(1) as i32);
    println!("USAGE: set x=.. and y=.., press 'q' to query the colour, 'p' to paint it white");

    loop {
        display.show(IMAGE_WINDOW, &img)?;
        let point = (trackbars.value(X) as usize, trackbars.value(Y) as usize);
        match controls.wait_key(Some(Duration::from_millis(40)), &mut trackbars) {
            Some(EXIT_KEY) => break,
            Some('q') => query(&img, &display, point)?,
            Some('p') => paint(&mut img, point)?,
            _ => {}
        }
    }
    display.flush();

    Ok(())
}
