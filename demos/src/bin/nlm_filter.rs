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
const MEAN_WINDOW: &str = "Mean Filtering";
const NLM_WINDOW: &str = "Non-Local Means Filtering";

const NEIGHBOURHOOD: &str = "neighbourhood, N";
const SEARCH_AREA: &str = "search area, W";
const STRENGTH: &str = "strength, h";

// strength applied to the colour components
const COLOUR_STRENGTH: f32 = 10.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: SourceArgs = argh::from_env();
    let options = SourceOptions::try_from(args)?;

    let Some(mut frame_loop) = FrameLoop::open("nlm_filter", &options)? else {
        return Ok(());
    };
    frame_loop.add_trackbar(NEIGHBOURHOOD, 7, 25);
    frame_loop.add_trackbar(SEARCH_AREA, 21, 50);
    frame_loop.add_trackbar(STRENGTH, 10, 25);

    frame_loop.run(
        &mut |frame: &Image<u8, 3>, ctx: &mut Context<'_>| -> Result<(), AppError> {
            let neighbourhood = odd_kernel_size(ctx.trackbars.value(NEIGHBOURHOOD) as usize);
            let search_area = ctx.trackbars.value(SEARCH_AREA) as usize;
            let strength = ctx.trackbars.value(STRENGTH) as f32;

            let mut mean_img = Image::from_size_val(frame.size(), 0u8)?;
            filter::box_blur(frame, &mut mean_img, (neighbourhood, neighbourhood))?;

            let mut nlm_img = Image::from_size_val(frame.size(), 0u8)?;
            filter::non_local_means_colored(
                frame,
                &mut nlm_img,
                strength,
                COLOUR_STRENGTH,
                neighbourhood,
                search_area,
            )?;

            ctx.display.show(INPUT_WINDOW, frame)?;
            ctx.display.show(MEAN_WINDOW, &mean_img)?;
            ctx.display.show(NLM_WINDOW, &nlm_img)?;
            Ok(())
        },
    )?;
    frame_loop.close()?;

    Ok(())
}
