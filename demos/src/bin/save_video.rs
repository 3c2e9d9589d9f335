use std::path::PathBuf;

use argh::FromArgs;
use ipgallery::{
    app::{
        args::SourceOptions,
        runner::{Context, FrameLoop, Pacing},
        AppError,
    },
    image::{Image, ImageSize},
    imgproc::resize::{self, InterpolationMode},
    io::{gstreamer::VideoWriter, IoError},
};

const INPUT_WINDOW: &str = "Live Camera Input -> Video File";

const VIDEO_SIZE: ImageSize = ImageSize {
    width: 640,
    height: 480,
};
const VIDEO_FPS: u32 = 25;

#[derive(FromArgs)]
/// Record the camera or a video to an MJPEG AVI file
struct Args {
    /// the video to read before falling back to the camera
    #[argh(option, short = 'i', default = "PathBuf::from(\"input.avi\")")]
    input: PathBuf,

    /// the video file to write
    #[argh(option, short = 'o', default = "PathBuf::from(\"output.avi\")")]
    output: PathBuf,

    /// specify camera to use
    #[argh(option, short = 'c', default = "0")]
    camera_to_use: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();
    let options = SourceOptions::new(Some(args.input), args.camera_to_use, 1.0, Vec::new())?;

    let Some(frame_loop) = FrameLoop::open("save_video", &options)? else {
        return Ok(());
    };
    // keep the capture rate close to the playback rate of the file
    let mut frame_loop = frame_loop.with_pacing(Pacing::Minimal);

    let mut writer = VideoWriter::new(&args.output, VIDEO_FPS, VIDEO_SIZE)?;
    writer.start()?;
    log::info!("writing {} at {VIDEO_FPS} fps to {}", VIDEO_SIZE, args.output.display());

    let mut resized = Image::from_size_val(VIDEO_SIZE, 0u8)?;
    frame_loop.run(
        &mut |frame: &Image<u8, 3>, ctx: &mut Context<'_>| -> Result<(), AppError> {
            resize::resize_fast(frame, &mut resized, InterpolationMode::Bicubic)?;
            writer.write(&resized).map_err(IoError::from)?;

            ctx.display.show(INPUT_WINDOW, frame)?;
            Ok(())
        },
    )?;

    writer.close()?;
    frame_loop.close()?;
    log::info!("wrote {} frames", writer.frames_written());

    Ok(())
}
