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
const OUTPUT_WINDOW: &str = "Logarithmic Transform";

const CONSTANT: &str = "constant, C";
const SIGMA: &str = "sigma (*0.01)";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: SourceArgs = argh::from_env();
    let options = SourceOptions::try_from(args)?;

    let Some(mut frame_loop) = FrameLoop::open("logarithmic", &options)? else {
        return Ok(());
    };
    frame_loop.add_trackbar(CONSTANT, 10, 100);
    frame_loop.add_trackbar(SIGMA, 1, 10);

    frame_loop.run(
        &mut |frame: &Image<u8, 3>, ctx: &mut Context<'_>| -> Result<(), AppError> {
            let mut gray = Image::from_size_val(frame.size(), 0u8)?;
            color::gray_from_rgb_u8(frame, &mut gray)?;

            let constant = ctx.trackbars.value(CONSTANT) as f32;
            let sigma = ctx.trackbars.value(SIGMA) as f32 * 0.01;

            let mut log_img = Image::from_size_val(gray.size(), 0u8)?;
            point::logarithmic_transform(&gray, &mut log_img, constant, sigma)?;

            ctx.display.show(INPUT_WINDOW, &gray)?;
            ctx.display.show(OUTPUT_WINDOW, &log_img)?;
            Ok(())
        },
    )?;
    frame_loop.close()?;

    Ok(())
}
