//! Visualizer implementations for the candidate overlay.
//!
//! Pixel rendering happens outside appgrd.  [`ChannelVisualizer`] streams
//! [`VisualizerEvent`]s to whoever renders them and keeps the last frame
//! so hit-tests can be answered on the switcher's thread without a round
//! trip.

use crate::command::Point;
use crate::traits::{OverlayFrame, Visualizer, VisualizerEvent};
use log::debug;
use std::sync::mpsc;

/// What counts as "inside the overlay" for mouse filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HitRegion {
    /// The panel rectangle.
    #[default]
    Panel,
    /// The whole area the panel is centred in (a full-screen overlay).
    Area,
}

/// A [`Visualizer`] that forwards frames over a channel.
pub struct ChannelVisualizer {
    tx: mpsc::Sender<VisualizerEvent>,
    region: HitRegion,
    current: Option<OverlayFrame>,
}

impl ChannelVisualizer {
    pub fn new(tx: mpsc::Sender<VisualizerEvent>) -> Self {
        Self::with_region(tx, HitRegion::default())
    }

    pub fn with_region(tx: mpsc::Sender<VisualizerEvent>, region: HitRegion) -> Self {
        Self {
            tx,
            region,
            current: None,
        }
    }

    /// The frame on screen, if any.
    pub fn current(&self) -> Option<&OverlayFrame> {
        self.current.as_ref()
    }

    fn send(&self, event: VisualizerEvent) {
        if self.tx.send(event).is_err() {
            debug!("visualizer receiver gone");
        }
    }
}

impl Visualizer for ChannelVisualizer {
    fn show(&mut self, frame: OverlayFrame) {
        self.current = Some(frame.clone());
        self.send(VisualizerEvent::Show(frame));
    }

    fn hide(&mut self) {
        self.current = None;
        self.send(VisualizerEvent::Hide);
    }

    fn hit_test(&self, p: Point) -> bool {
        match (&self.current, self.region) {
            (None, _) => false,
            (Some(frame), HitRegion::Panel) => frame.panel_rect().contains(p),
            (Some(frame), HitRegion::Area) => frame.area.contains(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{AppHandle, Rect};
    use crate::grid;

    fn frame() -> OverlayFrame {
        let area = Rect::new(0.0, 0.0, 1920.0, 1080.0);
        OverlayFrame {
            candidates: vec![AppHandle::new("a"), AppHandle::new("b"), AppHandle::new("c")],
            selected: 1,
            layout: grid::plan(3, area.width, area.height),
            area,
        }
    }

    #[test]
    fn show_and_hide_are_forwarded() {
        let (tx, rx) = mpsc::channel();
        let mut v = ChannelVisualizer::new(tx);
        v.show(frame());
        assert_eq!(v.current(), Some(&frame()));
        v.hide();
        assert!(v.current().is_none());
        let events: Vec<VisualizerEvent> = rx.try_iter().collect();
        assert_eq!(events, vec![VisualizerEvent::Show(frame()), VisualizerEvent::Hide]);
    }

    #[test]
    fn hit_test_uses_panel_of_last_frame() {
        let (tx, _rx) = mpsc::channel();
        let mut v = ChannelVisualizer::new(tx);
        let centre = Point::new(960.0, 540.0);
        assert!(!v.hit_test(centre));
        v.show(frame());
        assert!(v.hit_test(centre));
        assert!(!v.hit_test(Point::new(5.0, 5.0)));
        v.hide();
        assert!(!v.hit_test(centre));
    }

    #[test]
    fn area_region_covers_the_screen() {
        let (tx, _rx) = mpsc::channel();
        let mut v = ChannelVisualizer::with_region(tx, HitRegion::Area);
        v.show(frame());
        assert!(v.hit_test(Point::new(5.0, 5.0)));
        assert!(!v.hit_test(Point::new(1920.0, 5.0)));
    }

    #[test]
    fn dropped_receiver_is_harmless() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut v = ChannelVisualizer::new(tx);
        v.show(frame());
        v.hide();
    }
}
