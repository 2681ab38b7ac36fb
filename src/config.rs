//! Render configuration.

use std::time::Duration;

use crate::types::Rgba;

/// Default poll timeout between frames (~60 fps).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Default alpha of the modal backdrop.
pub const DEFAULT_BACKDROP_ALPHA: u8 = 160;

/// Knobs for the frame loop and compositor.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// How long the frame loop waits for terminal events.
    pub frame_interval: Duration,
    /// Use the alternate screen.
    pub alt_screen: bool,
    /// Enable mouse reporting.
    pub mouse_capture: bool,
    /// Overlay blended over the screen behind a modal float.
    pub modal_backdrop: Rgba,
    pub scrollbar_track: Rgba,
    pub scrollbar_thumb: Rgba,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frame_interval: DEFAULT_FRAME_INTERVAL,
            alt_screen: true,
            mouse_capture: false,
            modal_backdrop: Rgba::new(0, 0, 0, DEFAULT_BACKDROP_ALPHA),
            scrollbar_track: Rgba::rgb(60, 60, 60),
            scrollbar_thumb: Rgba::rgb(150, 150, 150),
        }
    }
}

impl RenderConfig {
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn with_alt_screen(mut self, on: bool) -> Self {
        self.alt_screen = on;
        self
    }

    pub fn with_mouse_capture(mut self, on: bool) -> Self {
        self.mouse_capture = on;
        self
    }

    pub fn with_modal_backdrop(mut self, color: Rgba) -> Self {
        self.modal_backdrop = color;
        self
    }

    pub fn with_scrollbar(mut self, track: Rgba, thumb: Rgba) -> Self {
        self.scrollbar_track = track;
        self.scrollbar_thumb = thumb;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = RenderConfig::default();
        assert_eq!(cfg.frame_interval, Duration::from_millis(16));
        assert!(cfg.alt_screen);
        assert!(!cfg.mouse_capture);
        assert_eq!(cfg.modal_backdrop.a, 160);
    }

    #[test]
    fn test_builders() {
        let cfg = RenderConfig::default()
            .with_mouse_capture(true)
            .with_alt_screen(false)
            .with_modal_backdrop(Rgba::TRANSPARENT);
        assert!(cfg.mouse_capture);
        assert!(!cfg.alt_screen);
        assert!(cfg.modal_backdrop.is_transparent());
    }
}
