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
        normalize,
    },
};

const INPUT_WINDOW: &str = "Live Camera Input";
const SPECTRUM_WINDOW: &str = "Fourier Magnitude Spectrum";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: SourceArgs = argh::from_env();
    let options = SourceOptions::try_from(args)?;

    let Some(mut frame_loop) = FrameLoop::open("fourier", &options)? else {
        return Ok(());
    };

    frame_loop.run(
        &mut |frame: &Image<u8, 3>, ctx: &mut Context<'_>| -> Result<(), AppError> {
            let mut gray = Image::from_size_val(frame.size(), 0u8)?;
            color::gray_from_rgb_u8(frame, &mut gray)?;

            let padded_size = ImageSize {
                width: fourier::optimal_dft_size(gray.width()),
                height: fourier::optimal_dft_size(gray.height()),
            };
            let padded = fourier::pad_constant(&gray, padded_size, 0)?.cast::<f32>()?;

            // zero frequency at the centre
            let mut dft = Spectrum::forward(&padded)?;
            dft.fftshift();
            let magnitude = normalize::normalize_to_u8(&dft.log_magnitude()?)?;

            ctx.display.show(INPUT_WINDOW, &gray)?;
            ctx.display.show(SPECTRUM_WINDOW, &magnitude)?;
            Ok(())
        },
    )?;
    frame_loop.close()?;

    Ok(())
}
