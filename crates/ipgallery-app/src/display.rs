use std::path::PathBuf;

use ipgallery_image::Image;

use crate::AppError;

/// Where the recording stream is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DisplayMode {
    /// Spawn a rerun viewer and stream to it.
    #[default]
    Spawn,
    /// Save the recording to an `.rrd` file.
    Save(PathBuf),
    /// Keep the recording in memory. Nothing is shown.
    Buffered,
}

/// Convert a window title into an entity path, e.g. `Live Camera Input`
/// becomes `live_camera_input`.
pub fn entity_path(window: &str) -> String {
    let path = window
        .trim()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '/' | '-' | '_' => c,
            'A'..='Z' => c.to_ascii_lowercase(),
            _ => '_',
        })
        .collect::<String>();
    if path.is_empty() {
        "window".to_string()
    } else {
        path
    }
}

/// Named image windows backed by a rerun recording stream.
pub struct Display {
    rec: rerun::RecordingStream,
}

impl Display {
    /// Open a recording stream for the application `app_id`.
    pub fn new(app_id: &str, mode: &DisplayMode) -> Result<Self, AppError> {
        let builder = rerun::RecordingStreamBuilder::new(app_id);
        let rec = match mode {
            DisplayMode::Spawn => builder.spawn()?,
            DisplayMode::Save(path) => builder.save(path)?,
            DisplayMode::Buffered => builder.buffered()?,
        };
        Ok(Self { rec })
    }

    /// Display mode taken from the `IPGALLERY_RRD` environment variable:
    /// save to that file when set, spawn a viewer otherwise.
    pub fn mode_from_env() -> DisplayMode {
        match std::env::var_os("IPGALLERY_RRD") {
            Some(path) if !path.is_empty() => DisplayMode::Save(PathBuf::from(path)),
            _ => DisplayMode::Spawn,
        }
    }

    /// Set the frame number following logs are attached to.
    pub fn set_frame(&self, frame: u64) {
        self.rec.set_time_sequence("frame", frame as i64);
    }

    /// Show an 8-bit image with one (gray), three (RGB) or four (RGBA) channels.
    pub fn show<const C: usize>(&self, window: &str, image: &Image<u8, C>) -> Result<(), AppError> {
        let color_model = match C {
            1 => rerun::ColorModel::L,
            3 => rerun::ColorModel::RGB,
            4 => rerun::ColorModel::RGBA,
            _ => {
                return Err(AppError::InvalidArgument(format!(
                    "cannot display images with {C} channels"
                )))
            }
        };

        self.rec.log(
            entity_path(window),
            &rerun::Image::from_elements(
                image.as_slice(),
                [image.width() as u32, image.height() as u32],
                color_model,
            ),
        )?;
        Ok(())
    }

    /// Show a line of text, such as trackbar positions, under a window.
    pub fn show_text(&self, window: &str, text: &str) -> Result<(), AppError> {
        self.rec.log(
            format!("{}/info", entity_path(window)),
            &rerun::TextLog::new(text.to_string()),
        )?;
        Ok(())
    }

    /// Flush pending data to the sink.
    pub fn flush(&self) {
        self.rec.flush_blocking();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_paths() {
        assert_eq!(entity_path("Live Camera Input"), "live_camera_input");
        assert_eq!(entity_path("Fourier Magnitude (log)"), "fourier_magnitude__log_");
        assert_eq!(entity_path("  "), "window");
    }

    #[test]
    fn show_to_buffered_stream() -> Result<(), AppError> {
        let display = Display::new("ipgallery_test", &DisplayMode::Buffered)?;
        display.set_frame(3);

        let gray = Image::<u8, 1>::from_size_val([4, 3].into(), 10)?;
        let rgb = Image::<u8, 3>::from_size_val([4, 3].into(), 20)?;
        display.show("gray", &gray)?;
        display.show("rgb", &rgb)?;
        display.show_text("rgb", "radius=5/100")?;

        let two = Image::<u8, 2>::from_size_val([4, 3].into(), 0)?;
        assert!(display.show("two", &two).is_err());
        Ok(())
    }
}
