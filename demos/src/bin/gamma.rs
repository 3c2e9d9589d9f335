use ipgallery::{
    app::{
        args::{SourceArgs, SourceOptions},
        runner::{Context, FrameLoop},
        AppError,
    },
    image::Image,
    imgproc::point,
};

const INPUT_WINDOW: &str = "Live Camera Input";
const OUTPUT_WINDOW: &str = "Gamma Corrected (Power-Law Transform)";

const GAMMA: &str = "gamma, (* 0.01)";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: SourceArgs = argh::from_env();
    let options = SourceOptions::try_from(args)?;

    let Some(mut frame_loop) = FrameLoop::open("gamma", &options)? else {
        return Ok(());
    };
    // 100 leaves the image unchanged
    frame_loop.add_trackbar(GAMMA, 100, 500);

    frame_loop.run(
        &mut |frame: &Image<u8, 3>, ctx: &mut Context<'_>| -> Result<(), AppError> {
            let gamma = ctx.trackbars.value(GAMMA) as f32 * 0.01;

            let mut gamma_img = Image::from_size_val(frame.size(), 0u8)?;
            point::power_law_transform(frame, &mut gamma_img, gamma)?;

            ctx.display.show(INPUT_WINDOW, frame)?;
            ctx.display.show(OUTPUT_WINDOW, &gamma_img)?;
            Ok(())
        },
    )?;
    frame_loop.close()?;

    Ok(())
}
