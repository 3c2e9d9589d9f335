use ipgallery::{
    app::{
        args::{SourceArgs, SourceOptions},
        runner::{Context, Demo, FrameLoop, Pacing},
        AppError,
    },
    image::Image,
    imgproc::{color, core, threshold},
};

const INPUT_WINDOW: &str = "Live Camera Input";
const DIFFERENCE_WINDOW: &str = "Difference Image";

const CONTRAST: &str = "contrast";
const FPS: &str = "fps";
const THRESHOLD: &str = "threshold";

/// Absolute difference between consecutive frames, optionally in grayscale.
#[derive(Default)]
struct FrameDifference {
    use_grayscale: bool,
    prev_rgb: Option<Image<u8, 3>>,
    prev_gray: Option<Image<u8, 1>>,
}

// the first frame, or a frame of a new size, is compared with itself
fn previous_or<const C: usize>(prev: Option<Image<u8, C>>, frame: &Image<u8, C>) -> Image<u8, C> {
    match prev {
        Some(prev) if prev.size() == frame.size() => prev,
        _ => frame.clone(),
    }
}

fn brightened_difference<const C: usize>(
    prev: &Image<u8, C>,
    frame: &Image<u8, C>,
    contrast: i32,
) -> Result<Image<u8, C>, AppError> {
    let mut diff = Image::from_size_val(frame.size(), 0)?;
    core::abs_diff(prev, frame, &mut diff)?;

    let mut brightened = Image::from_size_val(frame.size(), 0)?;
    core::scale_saturate(&diff, &mut brightened, contrast as f32)?;
    Ok(brightened)
}

impl FrameDifference {
    // the stored frame follows the new mode so the next difference stays valid
    fn toggle_grayscale(&mut self) -> Result<(), AppError> {
        self.use_grayscale = !self.use_grayscale;
        if self.use_grayscale {
            if let Some(rgb) = self.prev_rgb.take() {
                let mut gray = Image::from_size_val(rgb.size(), 0)?;
                color::gray_from_rgb_u8(&rgb, &mut gray)?;
                self.prev_gray = Some(gray);
            }
        } else if let Some(gray) = self.prev_gray.take() {
            let mut rgb = Image::from_size_val(gray.size(), 0)?;
            color::rgb_from_gray(&gray, &mut rgb)?;
            self.prev_rgb = Some(rgb);
        }
        Ok(())
    }
}

impl Demo for FrameDifference {
    fn process(&mut self, frame: &Image<u8, 3>, ctx: &mut Context<'_>) -> Result<(), AppError> {
        let contrast = ctx.trackbars.value(CONTRAST);
        let thresh = ctx.trackbars.value(THRESHOLD);

        if !self.use_grayscale {
            let prev = previous_or(self.prev_rgb.take(), frame);
            let brightened = brightened_difference(&prev, frame, contrast)?;
            ctx.display.show(INPUT_WINDOW, frame)?;
            ctx.display.show(DIFFERENCE_WINDOW, &brightened)?;
            self.prev_rgb = Some(frame.clone());
            return Ok(());
        }

        let mut gray = Image::from_size_val(frame.size(), 0)?;
        color::gray_from_rgb_u8(frame, &mut gray)?;

        let prev = previous_or(self.prev_gray.take(), &gray);
        let brightened = brightened_difference(&prev, &gray, contrast)?;
        ctx.display.show(INPUT_WINDOW, &gray)?;

        // pixels above the threshold become white, the rest black
        if thresh > 0 {
            let mut thresholded = Image::from_size_val(gray.size(), 0)?;
            threshold::threshold_binary(&brightened, &mut thresholded, thresh.min(255) as u8, 255)?;
            ctx.display.show(DIFFERENCE_WINDOW, &thresholded)?;
        } else {
            ctx.display.show(DIFFERENCE_WINDOW, &brightened)?;
        }

        self.prev_gray = Some(gray);
        Ok(())
    }

    fn on_key(&mut self, key: char, _ctx: &mut Context<'_>) -> Result<(), AppError> {
        if key == 'g' {
            self.toggle_grayscale()?;
            log::info!("grayscale: {}", self.use_grayscale);
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: SourceArgs = argh::from_env();
    let options = SourceOptions::try_from(args)?;

    let Some(frame_loop) = FrameLoop::open("abs_difference", &options)? else {
        return Ok(());
    };
    let mut frame_loop = frame_loop.with_pacing(Pacing::Trackbar(FPS));
    frame_loop.add_trackbar(CONTRAST, 1, 30);
    frame_loop.add_trackbar(FPS, 25, 25);
    frame_loop.add_trackbar(THRESHOLD, 0, 255);

    println!("USAGE: press 'g' to toggle grayscale, 'x' to exit");
    frame_loop.run(&mut FrameDifference::default())?;
    frame_loop.close()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_converts_the_previous_frame() -> Result<(), AppError> {
        let mut demo = FrameDifference {
            prev_rgb: Some(Image::<u8, 3>::from_size_val([4, 2].into(), 100)?),
            ..Default::default()
        };

        demo.toggle_grayscale()?;
        assert!(demo.use_grayscale);
        assert!(demo.prev_rgb.is_none());
        let gray = demo.prev_gray.as_ref().map(|g| g.as_slice().to_vec());
        assert_eq!(gray, Some(vec![100; 8]));

        demo.toggle_grayscale()?;
        assert!(!demo.use_grayscale);
        assert!(demo.prev_gray.is_none());
        let rgb = demo.prev_rgb.as_ref().map(|c| c.as_slice().to_vec());
        assert_eq!(rgb, Some(vec![100; 24]));
        Ok(())
    }
}
