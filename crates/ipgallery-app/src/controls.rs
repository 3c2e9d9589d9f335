use std::io::BufRead;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc, Arc,
};
use std::time::{Duration, Instant};

use crate::{args::parse_assignment, trackbar::Trackbars, AppError};

/// The key that ends every demo loop.
pub const EXIT_KEY: char = 'x';

/// A runtime command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key press.
    Key(char),
    /// Move a trackbar.
    Set {
        /// The trackbar name.
        name: String,
        /// The requested position.
        value: i32,
    },
    /// Ctrl-C was received.
    Cancel,
}

/// Parse one line of input into an event.
///
/// A single character is a key press and `name=value` moves a trackbar.
/// Empty lines are ignored.
///
/// # Example
///
/// ```
/// use ipgallery_app::controls::{parse_line, Event};
///
/// assert_eq!(parse_line("x"), Ok(Some(Event::Key('x'))));
/// assert_eq!(
///     parse_line("radius=20"),
///     Ok(Some(Event::Set { name: "radius".to_string(), value: 20 }))
/// );
/// assert_eq!(parse_line("  "), Ok(None));
/// ```
pub fn parse_line(line: &str) -> Result<Option<Event>, String> {
    let line = line.trim();
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Ok(None),
        (Some(c), None) => Ok(Some(Event::Key(c))),
        _ => {
            let (name, value) = parse_assignment(line)?;
            Ok(Some(Event::Set { name, value }))
        }
    }
}

/// Keyboard and trackbar input for a demo.
///
/// Events are read on a background thread from stdin, one per line.
/// Ctrl-C raises the cancel flag.
pub struct Controls {
    events: mpsc::Receiver<Event>,
    cancel: Arc<AtomicBool>,
}

impl Controls {
    /// Start reading stdin and install the Ctrl-C handler.
    ///
    /// Must be called at most once per process.
    pub fn new() -> Result<Self, AppError> {
        let (tx, events) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));

        ctrlc::set_handler({
            let cancel = cancel.clone();
            let tx = tx.clone();
            move || {
                println!("Received Ctrl-C signal. Sending cancel signal !!");
                cancel.store(true, Ordering::SeqCst);
                let _ = tx.send(Event::Cancel);
            }
        })?;

        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                match parse_line(&line) {
                    Ok(Some(event)) => {
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => log::warn!("ignoring input: {err}"),
                }
            }
            log::debug!("stdin closed");
        });

        Ok(Self { events, cancel })
    }

    /// Controls fed from a channel instead of stdin, without a signal handler.
    pub fn detached() -> (Self, mpsc::Sender<Event>) {
        let (tx, events) = mpsc::channel();
        let controls = Self {
            events,
            cancel: Arc::new(AtomicBool::new(false)),
        };
        (controls, tx)
    }

    /// Returns true once Ctrl-C was received.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    fn apply(&self, event: Event, trackbars: &mut Trackbars) -> Option<char> {
        match event {
            Event::Key(key) => Some(key),
            Event::Set { name, value } => {
                if let Err(err) = trackbars.set(&name, value) {
                    log::warn!("{err}");
                }
                None
            }
            Event::Cancel => {
                self.cancel.store(true, Ordering::SeqCst);
                Some(EXIT_KEY)
            }
        }
    }

    /// Apply pending trackbar commands and return the first pending key
    /// without blocking.
    pub fn poll(&self, trackbars: &mut Trackbars) -> Option<char> {
        while let Ok(event) = self.events.try_recv() {
            if let Some(key) = self.apply(event, trackbars) {
                return Some(key);
            }
        }
        None
    }

    /// Wait up to `timeout` for a key press, applying trackbar commands
    /// that arrive meanwhile. `None` waits until a key arrives.
    pub fn wait_key(&self, timeout: Option<Duration>, trackbars: &mut Trackbars) -> Option<char> {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            if self.is_cancelled() {
                return Some(EXIT_KEY);
            }

            let event = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match self.events.recv_timeout(remaining) {
                        Ok(event) => event,
                        Err(mpsc::RecvTimeoutError::Timeout) => return None,
                        Err(mpsc::RecvTimeoutError::Disconnected) => {
                            std::thread::sleep(remaining);
                            return None;
                        }
                    }
                }
                None => match self.events.recv() {
                    Ok(event) => event,
                    // no input left, nothing can press a key
                    Err(_) => return Some(EXIT_KEY),
                },
            };

            if let Some(key) = self.apply(event, trackbars) {
                return Some(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lines() {
        assert_eq!(parse_line(" c "), Ok(Some(Event::Key('c'))));
        assert_eq!(
            parse_line("order=2"),
            Ok(Some(Event::Set {
                name: "order".to_string(),
                value: 2
            }))
        );
        assert!(parse_line("hello").is_err());
    }

    #[test]
    fn wait_key_applies_trackbars() -> Result<(), AppError> {
        let (controls, tx) = Controls::detached();
        let mut bars = Trackbars::new();
        bars.add("radius", 5, 100);

        tx.send(Event::Set {
            name: "radius".to_string(),
            value: 42,
        })
        .map_err(|e| AppError::InvalidArgument(e.to_string()))?;
        tx.send(Event::Key('g'))
            .map_err(|e| AppError::InvalidArgument(e.to_string()))?;

        assert_eq!(controls.wait_key(Some(Duration::from_millis(50)), &mut bars), Some('g'));
        assert_eq!(bars.value("radius"), 42);
        assert_eq!(controls.poll(&mut bars), None);
        Ok(())
    }

    #[test]
    fn wait_key_times_out() {
        let (controls, _tx) = Controls::detached();
        let mut bars = Trackbars::new();
        let start = Instant::now();
        assert_eq!(controls.wait_key(Some(Duration::from_millis(20)), &mut bars), None);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn cancel_event_exits() {
        let (controls, tx) = Controls::detached();
        let mut bars = Trackbars::new();
        let _ = tx.send(Event::Cancel);
        assert_eq!(controls.poll(&mut bars), Some(EXIT_KEY));
        assert!(controls.is_cancelled());
        assert_eq!(controls.wait_key(None, &mut bars), Some(EXIT_KEY));
    }
}
