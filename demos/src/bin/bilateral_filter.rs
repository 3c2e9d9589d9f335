use ipgallery::{
    app::{
        args::{SourceArgs, SourceOptions},
        runner::{Context, FrameLoop},
        AppError,
    },
    image::Image,
    imgproc::filter::{self, kernels::odd_kernel_size},
};

const INPUT_WINDOW: &str = "Live Camera Input";
const GAUSSIAN_WINDOW: &str = "Gaussian Smoothing";
const BILATERAL_WINDOW: &str = "Bilaterial Filtering";

const NEIGHBOURHOOD: &str = "neighbourhood, N";
const SIGMA: &str = "sigma";
const SIGMA_S: &str = "sigma S";
const SIGMA_R: &str = "sigma R";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: SourceArgs = argh::from_env();
    let options = SourceOptions::try_from(args)?;

    let Some(mut frame_loop) = FrameLoop::open("bilateral_filter", &options)? else {
        return Ok(());
    };
    frame_loop.add_trackbar(NEIGHBOURHOOD, 3, 40);
    frame_loop.add_trackbar(SIGMA, 1, 10);
    frame_loop.add_trackbar(SIGMA_S, 10, 25);
    frame_loop.add_trackbar(SIGMA_R, 10, 25);

    frame_loop.run(
        &mut |frame: &Image<u8, 3>, ctx: &mut Context<'_>| -> Result<(), AppError> {
            let neighbourhood = odd_kernel_size(ctx.trackbars.value(NEIGHBOURHOOD) as usize);
            let sigma = ctx.trackbars.value(SIGMA) as f32;
            let sigma_s = ctx.trackbars.value(SIGMA_S) as f32;
            let sigma_r = ctx.trackbars.value(SIGMA_R) as f32;

            let mut smoothed = Image::from_size_val(frame.size(), 0u8)?;
            filter::gaussian_blur(
                frame,
                &mut smoothed,
                (neighbourhood, neighbourhood),
                (sigma, sigma),
            )?;

            // the diameter follows from the spatial sigma
            let mut filtered = Image::from_size_val(frame.size(), 0u8)?;
            filter::bilateral_filter(frame, &mut filtered, -1, sigma_r, sigma_s)?;

            ctx.display.show(INPUT_WINDOW, frame)?;
            ctx.display.show(GAUSSIAN_WINDOW, &smoothed)?;
            ctx.display.show(BILATERAL_WINDOW, &filtered)?;
            Ok(())
        },
    )?;
    frame_loop.close()?;

    Ok(())
}
