//! Media overlay
//!
//! Project link areas open a video on top of the world. The overlay is an
//! outer surface, so the world only talks to it through [`MediaOverlay`].
//! At most one session is open at a time: opening a new url closes the
//! previous session first.

use std::cell::RefCell;
use std::rc::Rc;

/// Something that can show a video over the world
pub trait MediaOverlay {
    /// Open `url`, closing any session already open
    fn open(&mut self, url: &str);

    /// Close the open session, if any
    fn close(&mut self);

    /// Whether a session is open
    fn is_open(&self) -> bool;
}

/// What happened to an overlay, in order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaEvent {
    Opened(String),
    Closed(String),
}

/// Overlay that plays nothing and records every open and close
///
/// Clones share the same log, so a caller can keep a handle after giving
/// the overlay to a world.
#[derive(Clone, Debug, Default)]
pub struct RecordingOverlay {
    current: Rc<RefCell<Option<String>>>,
    events: Rc<RefCell<Vec<MediaEvent>>>,
}

impl RecordingOverlay {
    /// Create an overlay with an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Url of the open session
    pub fn current(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    /// Every event so far
    pub fn events(&self) -> Vec<MediaEvent> {
        self.events.borrow().clone()
    }
}

impl MediaOverlay for RecordingOverlay {
    fn open(&mut self, url: &str) {
        self.close();
        log::info!("Opening media '{}'", url);
        *self.current.borrow_mut() = Some(url.to_string());
        self.events.borrow_mut().push(MediaEvent::Opened(url.to_string()));
    }

    fn close(&mut self) {
        if let Some(url) = self.current.borrow_mut().take() {
            log::debug!("Closing media '{}'", url);
            self.events.borrow_mut().push(MediaEvent::Closed(url));
        }
    }

    fn is_open(&self) -> bool {
        self.current.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_close() {
        let mut overlay = RecordingOverlay::new();
        assert!(!overlay.is_open());

        overlay.open("videos/a.mp4");
        assert!(overlay.is_open());
        assert_eq!(overlay.current().as_deref(), Some("videos/a.mp4"));

        overlay.close();
        assert!(!overlay.is_open());
    }

    #[test]
    fn test_open_replaces_previous_session() {
        let mut overlay = RecordingOverlay::new();
        overlay.open("a.mp4");
        overlay.open("b.mp4");

        assert_eq!(
            overlay.events(),
            vec![
                MediaEvent::Opened("a.mp4".to_string()),
                MediaEvent::Closed("a.mp4".to_string()),
                MediaEvent::Opened("b.mp4".to_string()),
            ]
        );
    }

    #[test]
    fn test_close_when_closed_is_noop() {
        let mut overlay = RecordingOverlay::new();
        overlay.close();
        assert!(overlay.events().is_empty());
    }

    #[test]
    fn test_clones_share_log() {
        let handle = RecordingOverlay::new();
        let mut overlay = handle.clone();
        overlay.open("a.mp4");
        assert!(handle.is_open());
    }
}
