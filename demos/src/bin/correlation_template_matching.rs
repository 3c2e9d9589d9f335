use std::path::PathBuf;

use argh::FromArgs;
use ipgallery::{
    app::{
        args::{parse_roi, SourceOptions},
        runner::{Context, Demo, FrameLoop},
        AppError,
    },
    image::{Image, ImageSize},
    imgproc::{core, draw, template},
};

const INPUT_WINDOW: &str = "Live Camera Input";
const CORRELATION_WINDOW: &str = "Correlation Output";
const SELECTION_WINDOW: &str = "selected";

#[derive(FromArgs)]
/// Find a template cut from the video in every following frame
struct Args {
    /// specify optional video file
    #[argh(positional)]
    video_file: Option<PathBuf>,

    /// specify camera to use
    #[argh(option, short = 'c', default = "0")]
    camera_to_use: u32,

    /// rescale image by this factor
    #[argh(option, short = 'r', default = "1.0")]
    rescale: f64,

    /// the template region as x0,y0,x1,y1 in the first frame
    #[argh(option, from_str_fn(parse_roi))]
    roi: Option<((usize, usize), (usize, usize))>,
}

struct TemplateMatching {
    roi: Option<((usize, usize), (usize, usize))>,
    template: Option<Image<u8, 3>>,
}

impl TemplateMatching {
    fn select(&mut self, frame: &Image<u8, 3>, ctx: &mut Context<'_>) -> Result<(), AppError> {
        let Some(((x0, y0), (x1, y1))) = self.roi else {
            return Ok(());
        };
        if x1 > frame.width() || y1 > frame.height() || x0 >= x1 || y0 >= y1 {
            log::warn!("region {x0},{y0},{x1},{y1} is not inside the {} frame", frame.size());
            self.roi = None;
            return Ok(());
        }

        let size = ImageSize {
            width: x1 - x0,
            height: y1 - y0,
        };
        let mut crop = Image::from_size_val(size, 0u8)?;
        core::crop_image(frame, &mut crop, x0, y0)?;
        ctx.display.show(SELECTION_WINDOW, &crop)?;
        self.template = Some(crop);
        Ok(())
    }
}

impl Demo for TemplateMatching {
    fn process(&mut self, frame: &Image<u8, 3>, ctx: &mut Context<'_>) -> Result<(), AppError> {
        if self.template.is_none() {
            self.select(frame, ctx)?;
        }

        let mut output = frame.clone();
        if let Some(crop) = &self.template {
            let correlation_size = template::match_size(frame.size(), crop.size())?;
            let mut correlation = Image::from_size_val(correlation_size, 0.0)?;
            template::match_template_ccoeff_normed(frame, crop, &mut correlation)?;

            let ((x, y), score) = template::best_match(&correlation)?;
            log::debug!("best match at ({x}, {y}) with score {score:.3}");

            let top_left = (x as i64, y as i64);
            let bottom_right = ((x + crop.width()) as i64, (y + crop.height()) as i64);
            draw::draw_rect(&mut output, top_left, bottom_right, [255, 0, 0], 2);

            // negative correlations show as black
            let correlation = correlation.map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8);
            ctx.display.show(CORRELATION_WINDOW, &correlation)?;
        }

        ctx.display.show(INPUT_WINDOW, &output)?;
        Ok(())
    }

    fn on_key(&mut self, key: char, _ctx: &mut Context<'_>) -> Result<(), AppError> {
        // cut the template again from the next frame
        if key == 's' {
            self.template = None;
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();
    let options = SourceOptions::new(args.video_file, args.camera_to_use, args.rescale, Vec::new())?;

    let Some(mut frame_loop) = FrameLoop::open("correlation_template_matching", &options)? else {
        return Ok(());
    };

    match args.roi {
        Some(_) => println!("USAGE: press 's' to select the region again from the current frame"),
        None => println!("USAGE: pass --roi x0,y0,x1,y1 to select an image region"),
    }

    let mut demo = TemplateMatching {
        roi: args.roi,
        template: None,
    };
    frame_loop.run(&mut demo)?;
    frame_loop.close()?;

    Ok(())
}
