use std::path::PathBuf;

use argh::FromArgs;

/// Parse a `name=value` trackbar assignment.
///
/// # Example
///
/// ```
/// use ipgallery_app::args::parse_assignment;
///
/// assert_eq!(parse_assignment("radius=25"), Ok(("radius".to_string(), 25)));
/// assert!(parse_assignment("radius").is_err());
/// ```
pub fn parse_assignment(value: &str) -> Result<(String, i32), String> {
    let (name, v) = value
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got `{value}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing trackbar name in `{value}`"));
    }
    let v = v
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid value in `{value}`: {e}"))?;
    Ok((name.to_string(), v))
}

/// Parse an `x,y` pixel location.
pub fn parse_point(value: &str) -> Result<(usize, usize), String> {
    let parts = parse_list::<2>(value)?;
    Ok((parts[0], parts[1]))
}

/// Parse an `x0,y0,x1,y1` rectangle, returned with ordered corners.
pub fn parse_roi(value: &str) -> Result<((usize, usize), (usize, usize)), String> {
    let [x0, y0, x1, y1] = parse_list::<4>(value)?;
    Ok(((x0.min(x1), y0.min(y1)), (x0.max(x1), y0.max(y1))))
}

fn parse_list<const N: usize>(value: &str) -> Result<[usize; N], String> {
    let parsed = value
        .split(',')
        .map(|p| p.trim().parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid coordinates `{value}`: {e}"))?;
    parsed
        .try_into()
        .map_err(|_| format!("expected {N} comma separated values, got `{value}`"))
}

/// Perform the example operation on incoming camera/video image
#[derive(FromArgs, Debug)]
pub struct SourceArgs {
    /// specify optional video file (or still image, or directory of images)
    #[argh(positional)]
    pub video_file: Option<PathBuf>,

    /// specify camera to use
    #[argh(option, short = 'c', default = "0")]
    pub camera_to_use: u32,

    /// rescale image by this factor
    #[argh(option, short = 'r', default = "1.0")]
    pub rescale: f64,

    /// initial trackbar value as name=value, may be repeated
    #[argh(option, from_str_fn(parse_assignment))]
    pub set: Vec<(String, i32)>,
}

/// Where frames come from and how they are prepared.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceOptions {
    /// Optional video file, still image or image directory.
    pub video_file: Option<PathBuf>,
    /// Camera id used when no file is given or it fails to open.
    pub camera_id: u32,
    /// Scale factor applied to every frame.
    pub rescale: f64,
    /// Initial trackbar values.
    pub initial: Vec<(String, i32)>,
}

impl SourceOptions {
    /// Validate raw option values.
    pub fn new(
        video_file: Option<PathBuf>,
        camera_id: u32,
        rescale: f64,
        initial: Vec<(String, i32)>,
    ) -> Result<Self, crate::AppError> {
        if !(rescale.is_finite() && rescale > 0.0) {
            return Err(crate::AppError::InvalidArgument(format!(
                "rescale must be a positive number, got {rescale}"
            )));
        }
        Ok(Self {
            video_file,
            camera_id,
            rescale,
            initial,
        })
    }
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            video_file: None,
            camera_id: 0,
            rescale: 1.0,
            initial: Vec::new(),
        }
    }
}

impl TryFrom<SourceArgs> for SourceOptions {
    type Error = crate::AppError;

    fn try_from(args: SourceArgs) -> Result<Self, Self::Error> {
        SourceOptions::new(args.video_file, args.camera_to_use, args.rescale, args.set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_source_args() -> Result<(), crate::AppError> {
        let args = SourceArgs::from_args(
            &["demo"],
            &["clip.avi", "-c", "1", "--rescale", "0.5", "--set", "radius=12"],
        )
        .map_err(|e| crate::AppError::InvalidArgument(e.output))?;

        let options = SourceOptions::try_from(args)?;
        assert_eq!(options.video_file, Some(PathBuf::from("clip.avi")));
        assert_eq!(options.camera_id, 1);
        assert_eq!(options.rescale, 0.5);
        assert_eq!(options.initial, vec![("radius".to_string(), 12)]);
        Ok(())
    }

    #[test]
    fn defaults_and_validation() -> Result<(), crate::AppError> {
        let args = SourceArgs::from_args(&["demo"], &[])
            .map_err(|e| crate::AppError::InvalidArgument(e.output))?;
        assert_eq!(SourceOptions::try_from(args)?, SourceOptions::default());

        assert!(SourceOptions::new(None, 0, 0.0, vec![]).is_err());
        assert!(SourceOptions::new(None, 0, f64::NAN, vec![]).is_err());
        Ok(())
    }

    #[test]
    fn parse_coordinates() {
        assert_eq!(parse_point("3, 4"), Ok((3, 4)));
        assert!(parse_point("3").is_err());
        assert_eq!(parse_roi("10,20,2,5"), Ok(((2, 5), (10, 20))));
        assert!(parse_roi("1,2,3,x").is_err());
        assert_eq!(parse_assignment(" order = 3 "), Ok(("order".to_string(), 3)));
        assert!(parse_assignment("=3").is_err());
    }
}
