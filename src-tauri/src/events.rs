use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

pub const WINDOW_SHOWN: &str = "window-shown";
pub const WINDOW_MAXIMIZED_CHANGE: &str = "window-maximized-change";
pub const UPDATE_AVAILABLE: &str = "update-available";
pub const UPDATE_PROGRESS: &str = "update-progress";
pub const UPDATE_DOWNLOADED: &str = "update-downloaded";
pub const UPDATE_ERROR: &str = "update-error";
pub const OVERLAY_ACTION: &str = "overlay-action";

/// Every name a [`ShellEvent`] can carry.
pub const ALL: [&str; 7] = [
    WINDOW_SHOWN,
    WINDOW_MAXIMIZED_CHANGE,
    UPDATE_AVAILABLE,
    UPDATE_PROGRESS,
    UPDATE_DOWNLOADED,
    UPDATE_ERROR,
    OVERLAY_ACTION,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInfo {
    pub version: String,
    pub release_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgress {
    pub percent: f64,
    pub transferred: u64,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallAction {
    AnswerCall,
    DeclineCall,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    WindowShown,
    WindowMaximizedChange(bool),
    UpdateAvailable(UpdateInfo),
    UpdateProgress(UpdateProgress),
    UpdateDownloaded { version: String },
    UpdateError { message: String },
    OverlayAction(CallAction),
}

impl ShellEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ShellEvent::WindowShown => WINDOW_SHOWN,
            ShellEvent::WindowMaximizedChange(_) => WINDOW_MAXIMIZED_CHANGE,
            ShellEvent::UpdateAvailable(_) => UPDATE_AVAILABLE,
            ShellEvent::UpdateProgress(_) => UPDATE_PROGRESS,
            ShellEvent::UpdateDownloaded { .. } => UPDATE_DOWNLOADED,
            ShellEvent::UpdateError { .. } => UPDATE_ERROR,
            ShellEvent::OverlayAction(_) => OVERLAY_ACTION,
        }
    }

    /// JSON payload as the page receives it.
    pub fn payload(&self) -> Value {
        match self {
            ShellEvent::WindowShown => Value::Null,
            ShellEvent::WindowMaximizedChange(maximized) => Value::Bool(*maximized),
            ShellEvent::UpdateAvailable(info) => serde_json::to_value(info).unwrap_or_default(),
            ShellEvent::UpdateProgress(progress) => {
                serde_json::to_value(progress).unwrap_or_default()
            }
            ShellEvent::UpdateDownloaded { version } => serde_json::json!({ "version": version }),
            ShellEvent::UpdateError { message } => serde_json::json!({ "message": message }),
            ShellEvent::OverlayAction(action) => serde_json::json!({ "action": action }),
        }
    }
}

pub type Handler = Box<dyn Fn(&ShellEvent) + Send>;

// Handlers per event name, run in subscription order on the publishing thread.
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<&'static str, Vec<Handler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, name: &'static str, handler: F)
    where
        F: Fn(&ShellEvent) + Send + 'static,
    {
        self.handlers.entry(name).or_default().push(Box::new(handler));
    }

    /// Subscribes `handler` to every event name.
    pub fn subscribe_all<F>(&mut self, handler: F)
    where
        F: Fn(&ShellEvent) + Send + Sync + 'static,
    {
        let handler = std::sync::Arc::new(handler);
        for name in ALL {
            let handler = handler.clone();
            self.subscribe(name, move |event| handler(event));
        }
    }

    pub fn publish(&self, event: ShellEvent) {
        match self.handlers.get(event.name()) {
            Some(handlers) => {
                for handler in handlers {
                    handler(&event);
                }
            }
            None => log::debug!("No subscribers for {}", event.name()),
        }
    }
}
