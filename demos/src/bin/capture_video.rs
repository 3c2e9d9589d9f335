use std::path::PathBuf;

use ipgallery::{
    app::{
        args::{SourceArgs, SourceOptions},
        runner::{Context, FrameLoop},
        AppError,
    },
    image::Image,
};

const INPUT_WINDOW: &str = "Live Camera Input";

// played when no video file is given on the command line
const DEFAULT_VIDEO: &str = "video.avi";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: SourceArgs = argh::from_env();
    let mut options = SourceOptions::try_from(args)?;
    if options.video_file.is_none() {
        options.video_file = Some(PathBuf::from(DEFAULT_VIDEO));
    }

    let Some(mut frame_loop) = FrameLoop::open("capture_video", &options)? else {
        return Ok(());
    };
    if let Some(fps) = frame_loop.source_fps() {
        log::info!("source frame rate: {fps:.1} fps");
    }

    frame_loop.run(
        &mut |frame: &Image<u8, 3>, ctx: &mut Context<'_>| -> Result<(), AppError> {
            ctx.display.show(INPUT_WINDOW, frame)
        },
    )?;
    frame_loop.close()?;

    Ok(())
}
