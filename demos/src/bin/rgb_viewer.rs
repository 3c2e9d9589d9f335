use ipgallery::{
    app::{
        args::{SourceArgs, SourceOptions},
        runner::{Context, FrameLoop},
        AppError,
    },
    image::Image,
};

const INPUT_WINDOW: &str = "Live Camera Input";
const RED_WINDOW: &str = "Red Colour Channel";
const GREEN_WINDOW: &str = "Green Colour Channel";
const BLUE_WINDOW: &str = "Blue Colour Channel";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: SourceArgs = argh::from_env();
    let options = SourceOptions::try_from(args)?;

    let Some(mut frame_loop) = FrameLoop::open("rgb_viewer", &options)? else {
        return Ok(());
    };

    frame_loop.run(
        &mut |frame: &Image<u8, 3>, ctx: &mut Context<'_>| -> Result<(), AppError> {
            ctx.display.show(INPUT_WINDOW, frame)?;
            ctx.display.show(RED_WINDOW, &frame.channel(0)?)?;
            ctx.display.show(GREEN_WINDOW, &frame.channel(1)?)?;
            ctx.display.show(BLUE_WINDOW, &frame.channel(2)?)?;
            Ok(())
        },
    )?;
    frame_loop.close()?;

    Ok(())
}
