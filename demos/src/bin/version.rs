#[cfg(feature = "gstreamer")]
fn print_video_io() -> Result<(), Box<dyn std::error::Error>> {
    use ipgallery::io::gstreamer;

    println!("... {}", gstreamer::gstreamer_version()?);
    for (role, elements) in [
        ("camera", &["v4l2src"][..]),
        ("stream", &["filesrc", "decodebin"][..]),
        ("video writer", &["jpegenc", "avimux", "filesink"][..]),
    ] {
        let available = elements
            .iter()
            .map(|e| gstreamer::has_element(e))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .all(|found| found);
        let available = if available { "yes" } else { "no" };
        println!("... {role} backend ({}): {available}", elements.join(", "));
    }
    Ok(())
}

#[cfg(not(feature = "gstreamer"))]
fn print_video_io() -> Result<(), Box<dyn std::error::Error>> {
    println!("... built without the gstreamer feature: still images and image directories only");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let features = ipgallery::enabled_features();

    println!();
    println!("We are using ipgallery: {}", ipgallery::VERSION);
    println!(
        ".. enabled features: {}",
        if features.is_empty() {
            "none".to_string()
        } else {
            features.join(", ")
        }
    );
    println!(
        ".. and this is {} on {} ({} bit)",
        std::env::consts::ARCH,
        std::env::consts::OS,
        usize::BITS
    );
    println!(
        ".. worker threads available: {}",
        std::thread::available_parallelism().map_or(1, |n| n.get())
    );
    println!();

    println!("Check Video I/O (OS identifier: {})", std::env::consts::OS);
    print_video_io()?;
    println!();

    Ok(())
}
