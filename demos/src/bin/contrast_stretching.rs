use ipgallery::{
    app::{
        args::{SourceArgs, SourceOptions},
        runner::{Context, FrameLoop},
        AppError,
    },
    image::Image,
    imgproc::{color, histogram, normalize},
};

const INPUT_WINDOW: &str = "Live Camera Input";
const INPUT_HISTOGRAM_WINDOW: &str = "Input Histogram";
const OUTPUT_WINDOW: &str = "Processed Output";
const OUTPUT_HISTOGRAM_WINDOW: &str = "Output Histogram";

fn histogram_bars(gray: &Image<u8, 1>) -> Result<Image<u8, 3>, AppError> {
    let mut hist = vec![0; 256];
    histogram::compute_histogram(gray, &mut hist, 256)?;
    Ok(histogram::draw_histogram_bars(&hist)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: SourceArgs = argh::from_env();
    let options = SourceOptions::try_from(args)?;

    let Some(mut frame_loop) = FrameLoop::open("contrast_stretching", &options)? else {
        return Ok(());
    };

    frame_loop.run(
        &mut |frame: &Image<u8, 3>, ctx: &mut Context<'_>| -> Result<(), AppError> {
            let mut gray = Image::from_size_val(frame.size(), 0u8)?;
            color::gray_from_rgb_u8(frame, &mut gray)?;

            // linear stretch of [min, max] to [0, 255]
            let mut output = Image::from_size_val(gray.size(), 0u8)?;
            normalize::normalize_min_max_u8(&gray, &mut output)?;

            ctx.display.show(INPUT_WINDOW, &gray)?;
            ctx.display.show(INPUT_HISTOGRAM_WINDOW, &histogram_bars(&gray)?)?;
            ctx.display.show(OUTPUT_WINDOW, &output)?;
            ctx.display.show(OUTPUT_HISTOGRAM_WINDOW, &histogram_bars(&output)?)?;
            Ok(())
        },
    )?;
    frame_loop.close()?;

    Ok(())
}
