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
const Y_WINDOW: &str = "Y Channel";
const CR_WINDOW: &str = "Cr Channel";
const CB_WINDOW: &str = "Cb Channel";

#[derive(Default)]
struct YCrCbViewer {
    chroma_subsampling: bool,
}

impl Demo for YCrCbViewer {
    fn process(&mut self, frame: &Image<u8, 3>, ctx: &mut Context<'_>) -> Result<(), AppError> {
        let mut ycrcb = Image::from_size_val(frame.size(), 0u8)?;
        color::ycrcb_from_rgb(frame, &mut ycrcb)?;

        let (mut cr, mut cb) = (ycrcb.channel(1)?, ycrcb.channel(2)?);
        if self.chroma_subsampling {
            // half resolution in both directions
            cr = color::chroma_subsample(&cr)?;
            cb = color::chroma_subsample(&cb)?;
        }

        ctx.display.show(INPUT_WINDOW, frame)?;
        ctx.display.show(Y_WINDOW, &ycrcb.channel(0)?)?;
        ctx.display.show(CR_WINDOW, &cr)?;
        ctx.display.show(CB_WINDOW, &cb)?;
        Ok(())
    }

    fn on_key(&mut self, key: char, _ctx: &mut Context<'_>) -> Result<(), AppError> {
        if key == 's' {
            self.chroma_subsampling = !self.chroma_subsampling;
            log::info!("chroma subsampling: {}", self.chroma_subsampling);
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: SourceArgs = argh::from_env();
    let options = SourceOptions::try_from(args)?;

    let Some(mut frame_loop) = FrameLoop::open("ycrcb_viewer", &options)? else {
        return Ok(());
    };

    println!("USAGE: press 's' to subsample the chroma");
    frame_loop.run(&mut YCrCbViewer::default())?;
    frame_loop.close()?;

    Ok(())
}
