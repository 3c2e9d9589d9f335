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
const MEDIAN_WINDOW: &str = "Median Filtering";

const NEIGHBOURHOOD: &str = "neighbourhood, N";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: SourceArgs = argh::from_env();
    let options = SourceOptions::try_from(args)?;

    let Some(mut frame_loop) = FrameLoop::open("median_filter", &options)? else {
        return Ok(());
    };
    frame_loop.add_trackbar(NEIGHBOURHOOD, 3, 40);

    frame_loop.run(
        &mut |frame: &Image<u8, 3>, ctx: &mut Context<'_>| -> Result<(), AppError> {
            let neighbourhood = odd_kernel_size(ctx.trackbars.value(NEIGHBOURHOOD) as usize);

            let mut median_img = Image::from_size_val(frame.size(), 0u8)?;
            filter::median_blur(frame, &mut median_img, neighbourhood)?;

            ctx.display.show(INPUT_WINDOW, frame)?;
            ctx.display.show(MEDIAN_WINDOW, &median_img)?;
            Ok(())
        },
    )?;
    frame_loop.close()?;

    Ok(())
}
