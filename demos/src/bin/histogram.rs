use ipgallery::{
    app::{
        args::{SourceArgs, SourceOptions},
        runner::{Context, FrameLoop},
        AppError,
    },
    image::Image,
    imgproc::{color, histogram},
};

const INPUT_WINDOW: &str = "Live Camera Input (as Greyscale)";
const BARS_WINDOW: &str = "Histogram (bar graph)";
const CURVE_WINDOW: &str = "Histogram (line graph)";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: SourceArgs = argh::from_env();
    let options = SourceOptions::try_from(args)?;

    let Some(mut frame_loop) = FrameLoop::open("histogram", &options)? else {
        return Ok(());
    };

    let mut hist = vec![0; 256];
    frame_loop.run(
        &mut |frame: &Image<u8, 3>, ctx: &mut Context<'_>| -> Result<(), AppError> {
            let mut gray = Image::from_size_val(frame.size(), 0u8)?;
            color::gray_from_rgb_u8(frame, &mut gray)?;

            // counts accumulate into the buffer
            hist.fill(0);
            histogram::compute_histogram(&gray, &mut hist, 256)?;

            ctx.display.show(INPUT_WINDOW, &gray)?;
            ctx.display
                .show(BARS_WINDOW, &histogram::draw_histogram_bars(&hist)?)?;
            ctx.display
                .show(CURVE_WINDOW, &histogram::draw_histogram_curve(&hist)?)?;
            Ok(())
        },
    )?;
    frame_loop.close()?;

    Ok(())
}
