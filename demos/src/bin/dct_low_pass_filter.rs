use ipgallery::{
    app::{
        args::{SourceArgs, SourceOptions},
        runner::{Context, FrameLoop},
        AppError,
    },
    image::{Image, ImageSize},
    imgproc::{color, dct, fourier, normalize},
};

const INPUT_WINDOW: &str = "Live Camera Input";
const SPECTRUM_WINDOW: &str = "DCT Co-efficients Spectrum";
const FILTERED_WINDOW: &str = "Filtered Image";

const RADIUS: &str = "radius";

fn padded_size(size: ImageSize) -> ImageSize {
    ImageSize {
        width: dct::optimal_dct_size(size.width),
        height: dct::optimal_dct_size(size.height),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: SourceArgs = argh::from_env();
    let options = SourceOptions::try_from(args)?;

    let Some(mut frame_loop) = FrameLoop::open("dct_low_pass_filter", &options)? else {
        return Ok(());
    };

    // the radius can cover the whole padded coefficient plane
    let Some(size) = frame_loop.frame_size()? else {
        return Ok(());
    };
    let padded = padded_size(size);
    frame_loop.add_trackbar(RADIUS, 25, 2 * padded.width.max(padded.height) as i32);

    frame_loop.run(
        &mut |frame: &Image<u8, 3>, ctx: &mut Context<'_>| -> Result<(), AppError> {
            let mut gray = Image::from_size_val(frame.size(), 0u8)?;
            color::gray_from_rgb_u8(frame, &mut gray)?;

            let dct_size = padded_size(gray.size());
            let padded = fourier::pad_constant(&gray, dct_size, 0)?.cast::<f32>()?;
            let mut coeffs = dct::dct_2d(&padded)?;

            let radius = ctx.trackbars.value(RADIUS) as u32;
            let lp_filter = dct::dct_low_pass_mask(dct_size, radius)?;
            coeffs
                .as_slice_mut()
                .iter_mut()
                .zip(lp_filter.as_slice())
                .for_each(|(c, m)| *c *= m);

            let filtered = normalize::normalize_to_u8(&dct::idct_2d(&coeffs)?)?;
            let spectrum = normalize::normalize_to_u8(&dct::log_abs(&coeffs))?;

            ctx.display.show(INPUT_WINDOW, &gray)?;
            ctx.display.show(SPECTRUM_WINDOW, &spectrum)?;
            ctx.display.show(FILTERED_WINDOW, &filtered)?;
            Ok(())
        },
    )?;
    frame_loop.close()?;

    Ok(())
}
