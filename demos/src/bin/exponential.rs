use ipgallery::{
    app::{
        args::{SourceArgs, SourceOptions},
        runner::{Context, FrameLoop},
        AppError,
    },
    image::Image,
    imgproc::{color, point},
};

const INPUT_WINDOW: &str = "Live Camera Input";
const OUTPUT_WINDOW: &str = "Exponential Transform";

const CONSTANT: &str = "constant, C";
const ALPHA: &str = "alpha (*0.001)";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: SourceArgs = argh::from_env();
    let options = SourceOptions::try_from(args)?;

    let Some(mut frame_loop) = FrameLoop::open("exponential", &options)? else {
        return Ok(());
    };
    frame_loop.add_trackbar(CONSTANT, 10, 100);
    frame_loop.add_trackbar(ALPHA, 10, 50);

    frame_loop.run(
        &mut |frame: &Image<u8, 3>, ctx: &mut Context<'_>| -> Result<(), AppError> {
            let mut gray = Image::from_size_val(frame.size(), 0u8)?;
            color::gray_from_rgb_u8(frame, &mut gray)?;

            let constant = ctx.trackbars.value(CONSTANT) as f32;
            let alpha = ctx.trackbars.value(ALPHA) as f32 * 0.001;

            let mut exp_img = Image::from_size_val(gray.size(), 0u8)?;
            point::exponential_transform(&gray, &mut exp_img, constant, alpha)?;

            ctx.display.show(INPUT_WINDOW, &gray)?;
            ctx.display.show(OUTPUT_WINDOW, &exp_img)?;
            Ok(())
        },
    )?;
    frame_loop.close()?;

    Ok(())
}
