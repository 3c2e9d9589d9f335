use crate::AppError;

/// A named integer slider in `[0, max]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trackbar {
    name: String,
    value: i32,
    max: i32,
}

impl Trackbar {
    /// Create a trackbar, clamping the initial value into range.
    pub fn new(name: &str, value: i32, max: i32) -> Self {
        let max = max.max(0);
        Self {
            name: name.to_string(),
            value: value.clamp(0, max),
            max,
        }
    }

    /// The trackbar name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current position.
    pub fn value(&self) -> i32 {
        self.value
    }

    /// The upper end of the range.
    pub fn max(&self) -> i32 {
        self.max
    }
}

/// The trackbars of a demo, with a flag raised whenever one moves.
///
/// # Example
///
/// ```
/// use ipgallery_app::trackbar::Trackbars;
///
/// let mut trackbars = Trackbars::new();
/// trackbars.add("radius", 5, 100);
/// assert!(trackbars.take_changed());
/// assert!(!trackbars.take_changed());
///
/// trackbars.set("radius", 500).unwrap();
/// assert_eq!(trackbars.get("radius"), Some(100));
/// assert!(trackbars.take_changed());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Trackbars {
    bars: Vec<Trackbar>,
    changed: bool,
}

impl Trackbars {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trackbar, or replace one with the same name.
    pub fn add(&mut self, name: &str, value: i32, max: i32) {
        let bar = Trackbar::new(name, value, max);
        match self.bars.iter_mut().find(|b| b.name == name) {
            Some(existing) => *existing = bar,
            None => self.bars.push(bar),
        }
        self.changed = true;
    }

    /// The position of a trackbar.
    pub fn get(&self, name: &str) -> Option<i32> {
        self.bars.iter().find(|b| b.name == name).map(|b| b.value)
    }

    /// The position of a trackbar, or 0 when it does not exist.
    pub fn value(&self, name: &str) -> i32 {
        self.get(name).unwrap_or(0)
    }

    /// Move a trackbar, clamping to its range.
    ///
    /// Returns the clamped position.
    pub fn set(&mut self, name: &str, value: i32) -> Result<i32, AppError> {
        let bar = self
            .bars
            .iter_mut()
            .find(|b| b.name == name)
            .ok_or_else(|| AppError::UnknownTrackbar(name.to_string()))?;

        let value = value.clamp(0, bar.max);
        if bar.value != value {
            bar.value = value;
            self.changed = true;
            log::info!("{name} = {value}");
        }
        Ok(value)
    }

    /// Returns true if any trackbar moved since the previous call.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Iterate over the trackbars in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Trackbar> {
        self.bars.iter()
    }

    /// A one line summary such as `radius=5/100 order=1/10`.
    pub fn status(&self) -> String {
        self.bars
            .iter()
            .map(|b| format!("{}={}/{}", b.name, b.value, b.max))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_on_creation() {
        let bar = Trackbar::new("order", 20, 10);
        assert_eq!(bar.value(), 10);
        assert_eq!(Trackbar::new("order", -3, 10).value(), 0);
        assert_eq!(Trackbar::new("odd", 4, -1).max(), 0);
    }

    #[test]
    fn set_and_changes() -> Result<(), AppError> {
        let mut bars = Trackbars::new();
        bars.add("radius", 5, 100);
        bars.add("order", 1, 10);
        bars.take_changed();

        // same value is not a change
        assert_eq!(bars.set("order", 1)?, 1);
        assert!(!bars.take_changed());

        assert_eq!(bars.set("order", -4)?, 0);
        assert!(bars.take_changed());
        assert_eq!(bars.value("order"), 0);
        assert_eq!(bars.value("missing"), 0);

        assert!(matches!(
            bars.set("missing", 1),
            Err(AppError::UnknownTrackbar(_))
        ));
        assert_eq!(bars.status(), "radius=5/100 order=0/10");
        Ok(())
    }

    #[test]
    fn add_replaces() {
        let mut bars = Trackbars::new();
        bars.add("k", 3, 15);
        bars.add("k", 7, 31);
        assert_eq!(bars.iter().count(), 1);
        assert_eq!(bars.get("k"), Some(7));
    }
}
