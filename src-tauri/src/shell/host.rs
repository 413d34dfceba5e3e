use url::Url;

use crate::config::{ScreenCorner, WindowConfig};
use crate::shell::overlay::{OverlayId, OverlayRequest};
use crate::shell::picker::PickerId;

pub const MAIN_LABEL: &str = "main";

/// Logical-pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Places a `width` x `height` box in `corner`, inset by `margin`.
    pub fn corner(&self, corner: ScreenCorner, width: f64, height: f64, margin: f64) -> Rect {
        let left = self.x + margin;
        let top = self.y + margin;
        let right = self.x + self.width - margin - width;
        let bottom = self.y + self.height - margin - height;
        let (x, y) = match corner {
            ScreenCorner::TopLeft => (left, top),
            ScreenCorner::TopRight => (right, top),
            ScreenCorner::BottomLeft => (left, bottom),
            ScreenCorner::BottomRight => (right, bottom),
        };
        Rect {
            x: x.max(self.x),
            y: y.max(self.y),
            width,
            height,
        }
    }
}

/// Native side effects the shell asks for.
///
/// Implementations must not call back into the shell synchronously; the Tauri
/// host queues every call onto the event loop.
pub trait ShellHost {
    fn create_main_window(&mut self, config: &WindowConfig, url: &Url);
    fn show_main(&mut self);
    fn hide_main(&mut self);
    fn focus_main(&mut self);
    fn minimize_main(&mut self);
    fn unminimize_main(&mut self);
    fn set_main_maximized(&mut self, maximized: bool);
    fn set_main_fullscreen(&mut self, fullscreen: bool);
    fn navigate_main(&mut self, url: &Url);

    fn open_overlay(&mut self, id: OverlayId, request: &OverlayRequest, bounds: Rect);
    fn close_overlay(&mut self, id: OverlayId);
    fn open_picker(&mut self, id: PickerId);
    fn close_picker(&mut self, id: PickerId);

    /// Hands `url` to the system's default handler.
    fn open_external(&mut self, url: &Url);
    /// Area of the primary display that overlays are placed in.
    fn work_area(&self) -> Option<Rect>;
    fn exit(&mut self, code: i32);
}
