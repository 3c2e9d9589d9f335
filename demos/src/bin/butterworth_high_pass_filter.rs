use ipgallery::{
    app::{
        args::{SourceArgs, SourceOptions},
        runner::{Context, FrameLoop},
        AppError,
    },
    image::{Image, ImageSize},
    imgproc::{
        color,
        fourier::{self, Spectrum},
        frequency::{self, ButterworthCache, PassBand},
        normalize,
    },
};

const INPUT_WINDOW: &str = "Live Camera Input";
const SPECTRUM_WINDOW: &str = "Fourier Magnitude Spectrum";
const FILTERED_WINDOW: &str = "Filtered Image";
const FILTER_WINDOW: &str = "Butterworth Filter";

const RADIUS: &str = "radius";
const ORDER: &str = "order";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: SourceArgs = argh::from_env();
    let options = SourceOptions::try_from(args)?;

    let Some(mut frame_loop) = FrameLoop::open("butterworth_high_pass_filter", &options)? else {
        return Ok(());
    };
    frame_loop.add_trackbar(RADIUS, 5, 400);
    frame_loop.add_trackbar(ORDER, 1, 10);

    // the filter is only rebuilt when the trackbars or the frame size change
    let mut hp_filter = ButterworthCache::new(PassBand::HighPass);

    frame_loop.run(
        &mut |frame: &Image<u8, 3>, ctx: &mut Context<'_>| -> Result<(), AppError> {
            let mut gray = Image::from_size_val(frame.size(), 0u8)?;
            color::gray_from_rgb_u8(frame, &mut gray)?;

            // stretch to the full intensity range before filtering
            let mut stretched = Image::from_size_val(gray.size(), 0u8)?;
            normalize::normalize_min_max_u8(&gray, &mut stretched)?;
            let gray = stretched;

            // transforms are fastest for sizes that factor into 2, 3 and 5
            let padded_size = ImageSize {
                width: fourier::optimal_dft_size(gray.width()),
                height: fourier::optimal_dft_size(gray.height()),
            };
            let padded = fourier::pad_constant(&gray, padded_size, 0)?.cast::<f32>()?;

            let mut dft = Spectrum::forward(&padded)?;
            dft.fftshift();

            let radius = ctx.trackbars.value(RADIUS) as u32;
            let order = ctx.trackbars.value(ORDER) as u32;
            let mask = hp_filter.get(padded_size, radius, order)?;
            dft.apply_mask(mask)?;

            let magnitude = normalize::normalize_to_u8(&dft.log_magnitude()?)?;

            dft.ifftshift();
            let filtered = normalize::normalize_to_u8(&dft.inverse().real_part()?)?;

            ctx.display.show(INPUT_WINDOW, &gray)?;
            ctx.display.show(SPECTRUM_WINDOW, &magnitude)?;
            ctx.display.show(FILTERED_WINDOW, &filtered)?;
            ctx.display.show(FILTER_WINDOW, &frequency::filter_to_u8(mask)?)?;
            Ok(())
        },
    )?;
    frame_loop.close()?;

    log::debug!("butterworth filter built {} times", hp_filter.rebuilds());
    Ok(())
}
