use ipgallery::{
    app::{
        args::{SourceArgs, SourceOptions},
        runner::{Context, Demo, FrameLoop},
        AppError,
    },
    image::Image,
    imgproc::color,
};

const INPUT_WINDOW: &str = "Live Camera Input";
const HUE_WINDOW: &str = "Hue Channel";
const SATURATION_WINDOW: &str = "Saturation Channel";
const VALUE_WINDOW: &str = "Value Channel";

#[derive(Default)]
struct HsvViewer {
    colour_map_hue: bool,
}

impl Demo for HsvViewer {
    fn process(&mut self, frame: &Image<u8, 3>, ctx: &mut Context<'_>) -> Result<(), AppError> {
        let mut hsv = Image::from_size_val(frame.size(), 0u8)?;
        color::hsv_from_rgb(frame, &mut hsv)?;

        ctx.display.show(INPUT_WINDOW, frame)?;
        ctx.display.show(SATURATION_WINDOW, &hsv.channel(1)?)?;
        ctx.display.show(VALUE_WINDOW, &hsv.channel(2)?)?;

        if self.colour_map_hue {
            // full saturation and value leave only the hue visible
            for px in hsv.as_slice_mut().chunks_exact_mut(3) {
                px[1] = 255;
                px[2] = 255;
            }
            let mut hue = Image::from_size_val(frame.size(), 0u8)?;
            color::rgb_from_hsv(&hsv, &mut hue)?;
            ctx.display.show(HUE_WINDOW, &hue)?;
        } else {
            ctx.display.show(HUE_WINDOW, &hsv.channel(0)?)?;
        }
        Ok(())
    }

    fn on_key(&mut self, key: char, _ctx: &mut Context<'_>) -> Result<(), AppError> {
        if key == 'c' {
            self.colour_map_hue = !self.colour_map_hue;
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: SourceArgs = argh::from_env();
    let options = SourceOptions::try_from(args)?;

    let Some(mut frame_loop) = FrameLoop::open("hsv_viewer", &options)? else {
        return Ok(());
    };

    println!("USAGE: press 'c' to toggle Hue channel colour mapping");
    frame_loop.run(&mut HsvViewer::default())?;
    frame_loop.close()?;

    Ok(())
}
