use argh::FromArgs;
use ipgallery::app::{args::SourceOptions, runner::FrameLoop};

const INPUT_WINDOW: &str = "Live Camera Input";

#[derive(FromArgs)]
/// Capture a single image from a camera and display it
struct Args {
    /// specify camera to use
    #[argh(option, short = 'c', default = "0")]
    camera_to_use: u32,

    /// rescale image by this factor
    #[argh(option, short = 'r', default = "1.0")]
    rescale: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();
    let options = SourceOptions::new(None, args.camera_to_use, args.rescale, Vec::new())?;

    let Some(mut frame_loop) = FrameLoop::open("capture_camera", &options)? else {
        return Ok(());
    };

    // many cameras deliver a black first frame
    let _ = frame_loop.grab()?;
    let Some(frame) = frame_loop.grab()? else {
        println!("No image successfully loaded from camera.");
        return Ok(());
    };

    frame_loop.display().show(INPUT_WINDOW, &frame)?;
    frame_loop.display().flush();

    // wait for any key
    frame_loop.wait_key(None);
    frame_loop.close()?;

    Ok(())
}
