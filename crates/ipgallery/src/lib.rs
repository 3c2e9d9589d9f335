#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use ipgallery_app as app;

#[doc(inline)]
pub use ipgallery_image as image;

#[doc(inline)]
pub use ipgallery_imgproc as imgproc;

#[doc(inline)]
pub use ipgallery_io as io;

/// Version of the gallery crates.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Optional cargo features this build was compiled with.
pub fn enabled_features() -> Vec<&'static str> {
    let mut features = Vec::new();
    if cfg!(feature = "gstreamer") {
        features.push("gstreamer");
    }
    features
}

#[cfg(test)]
mod tests {
    #[test]
    fn version_matches_manifest() {
        assert_eq!(super::VERSION, env!("CARGO_PKG_VERSION"));
        assert!(!super::VERSION.is_empty());
        assert_eq!(
            super::enabled_features().contains(&"gstreamer"),
            cfg!(feature = "gstreamer")
        );
    }
}
