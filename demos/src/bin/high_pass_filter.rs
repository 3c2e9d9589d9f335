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
        frequency, normalize,
    },
};

const INPUT_WINDOW: &str = "Live Camera Input";
const SPECTRUM_WINDOW: &str = "Fourier Magnitude Spectrum";
const FILTERED_WINDOW: &str = "Filtered Image";

const RADIUS: &str = "radius";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: SourceArgs = argh::from_env();
    let options = SourceOptions::try_from(args)?;

    let Some(mut frame_loop) = FrameLoop::open("high_pass_filter", &options)? else {
        return Ok(());
    };
    frame_loop.add_trackbar(RADIUS, 25, 200);

    frame_loop.run(
        &mut |frame: &Image<u8, 3>, ctx: &mut Context<'_>| -> Result<(), AppError> {
            let mut gray = Image::from_size_val(frame.size(), 0u8)?;
            color::gray_from_rgb_u8(frame, &mut gray)?;

            let padded_size = ImageSize {
                width: fourier::optimal_dft_size(gray.width()),
                height: fourier::optimal_dft_size(gray.height()),
            };
            let padded = fourier::pad_constant(&gray, padded_size, 0)?.cast::<f32>()?;

            let mut dft = Spectrum::forward(&padded)?;
            dft.fftshift();

            // zero out a disk of low frequencies around the centre
            let radius = ctx.trackbars.value(RADIUS) as u32;
            dft.apply_mask(&frequency::ideal_high_pass(padded_size, radius)?)?;
            let magnitude = normalize::normalize_to_u8(&dft.log_magnitude()?)?;

            dft.ifftshift();
            let filtered = normalize::normalize_to_u8(&dft.inverse().real_part()?)?;

            ctx.display.show(INPUT_WINDOW, &gray)?;
            ctx.display.show(SPECTRUM_WINDOW, &magnitude)?;
            ctx.display.show(FILTERED_WINDOW, &filtered)?;
            Ok(())
        },
    )?;
    frame_loop.close()?;

    Ok(())
}
