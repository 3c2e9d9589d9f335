use ipgallery::{
    app::{
        args::{SourceArgs, SourceOptions},
        runner::{Context, FrameLoop},
        AppError,
    },
    image::Image,
    imgproc::core,
    io::jpeg,
};

const INPUT_WINDOW: &str = "Live Camera Input";
const NOISE_WINDOW: &str = "JPEG compression noise";
const JPEG_WINDOW: &str = "JPEG compressed version";

const JPEG_QUALITY: &str = "JPEG quality";
const AMPLIFICATION: &str = "amplification";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: SourceArgs = argh::from_env();
    let options = SourceOptions::try_from(args)?;

    let Some(mut frame_loop) = FrameLoop::open("jpeg_compression_noise", &options)? else {
        return Ok(());
    };
    frame_loop.add_trackbar(JPEG_QUALITY, 90, 100);
    frame_loop.add_trackbar(AMPLIFICATION, 0, 255);

    frame_loop.run(
        &mut |frame: &Image<u8, 3>, ctx: &mut Context<'_>| -> Result<(), AppError> {
            let quality = ctx.trackbars.value(JPEG_QUALITY) as u8;

            // round trip through an in-memory JPEG
            let buffer = jpeg::encode_image_jpeg_rgb8(frame, quality)?;
            let mut jpeg_img = Image::from_size_val(frame.size(), 0u8)?;
            jpeg::decode_image_jpeg_rgb8(&buffer, &mut jpeg_img)?;
            log::debug!("quality {quality}: {} bytes", buffer.len());

            let mut diff = Image::from_size_val(frame.size(), 0u8)?;
            core::abs_diff(&jpeg_img, frame, &mut diff)?;

            let amplification = ctx.trackbars.value(AMPLIFICATION) as f32;
            let mut amplified = Image::from_size_val(frame.size(), 0u8)?;
            core::scale_saturate(&diff, &mut amplified, amplification)?;

            ctx.display.show(INPUT_WINDOW, frame)?;
            ctx.display.show(NOISE_WINDOW, &amplified)?;
            ctx.display.show(JPEG_WINDOW, &jpeg_img)?;
            Ok(())
        },
    )?;
    frame_loop.close()?;

    Ok(())
}
