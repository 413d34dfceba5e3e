use std::sync::{Arc, Mutex};

use url::Url;

use crate::config::{ShellConfig, WindowConfig};
use crate::events::ShellEvent;
use crate::shell::host::{Rect, ShellHost};
use crate::shell::overlay::{OverlayId, OverlayRequest};
use crate::shell::picker::PickerId;
use crate::shell::ApplicationShell;

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    CreateMain(String),
    ShowMain,
    HideMain,
    FocusMain,
    MinimizeMain,
    UnminimizeMain,
    SetMaximized(bool),
    SetFullscreen(bool),
    NavigateMain(String),
    OpenOverlay(OverlayId, OverlayRequest, Rect),
    CloseOverlay(OverlayId),
    OpenPicker(PickerId),
    ClosePicker(PickerId),
    OpenExternal(String),
    Exit(i32),
}

#[derive(Debug, Default)]
pub struct RecordingHost {
    pub calls: Vec<HostCall>,
    pub area: Option<Rect>,
}

impl RecordingHost {
    pub fn count(&self, call: &HostCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn created_mains(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HostCall::CreateMain(_)))
            .count()
    }

    pub fn opened_overlays(&self) -> Vec<(OverlayId, OverlayRequest)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HostCall::OpenOverlay(id, request, _) => Some((*id, request.clone())),
                _ => None,
            })
            .collect()
    }
}

impl ShellHost for RecordingHost {
    fn create_main_window(&mut self, _config: &WindowConfig, url: &Url) {
        self.calls.push(HostCall::CreateMain(url.to_string()));
    }
    fn show_main(&mut self) {
        self.calls.push(HostCall::ShowMain);
    }
    fn hide_main(&mut self) {
        self.calls.push(HostCall::HideMain);
    }
    fn focus_main(&mut self) {
        self.calls.push(HostCall::FocusMain);
    }
    fn minimize_main(&mut self) {
        self.calls.push(HostCall::MinimizeMain);
    }
    fn unminimize_main(&mut self) {
        self.calls.push(HostCall::UnminimizeMain);
    }
    fn set_main_maximized(&mut self, maximized: bool) {
        self.calls.push(HostCall::SetMaximized(maximized));
    }
    fn set_main_fullscreen(&mut self, fullscreen: bool) {
        self.calls.push(HostCall::SetFullscreen(fullscreen));
    }
    fn navigate_main(&mut self, url: &Url) {
        self.calls.push(HostCall::NavigateMain(url.to_string()));
    }
    fn open_overlay(&mut self, id: OverlayId, request: &OverlayRequest, bounds: Rect) {
        self.calls
            .push(HostCall::OpenOverlay(id, request.clone(), bounds));
    }
    fn close_overlay(&mut self, id: OverlayId) {
        self.calls.push(HostCall::CloseOverlay(id));
    }
    fn open_picker(&mut self, id: PickerId) {
        self.calls.push(HostCall::OpenPicker(id));
    }
    fn close_picker(&mut self, id: PickerId) {
        self.calls.push(HostCall::ClosePicker(id));
    }
    fn open_external(&mut self, url: &Url) {
        self.calls.push(HostCall::OpenExternal(url.to_string()));
    }
    fn work_area(&self) -> Option<Rect> {
        self.area
    }
    fn exit(&mut self, code: i32) {
        self.calls.push(HostCall::Exit(code));
    }
}

pub type Recorded = Arc<Mutex<Vec<ShellEvent>>>;

/// A shell over a [`RecordingHost`] with every event captured in order.
pub fn shell() -> (ApplicationShell<RecordingHost>, Recorded) {
    let mut config = ShellConfig::default();
    config.origin.url = "https://app.example.com/".to_string();
    let mut shell = ApplicationShell::new(RecordingHost::default(), config)
        .expect("default config is valid");
    let events: Recorded = Arc::default();
    let sink = events.clone();
    shell
        .bus_mut()
        .subscribe_all(move |event| sink.lock().unwrap().push(event.clone()));
    (shell, events)
}

/// A shell whose main window has loaded and is on screen.
pub fn ready_shell() -> (ApplicationShell<RecordingHost>, Recorded) {
    let (mut shell, events) = shell();
    shell.create_main_window();
    shell.on_ready_to_show();
    (shell, events)
}

pub fn count(events: &Recorded, name: &str) -> usize {
    events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.name() == name)
        .count()
}
