pub mod host;
pub mod navigation;
pub mod overlay;
pub mod picker;
pub mod update;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

use log::{debug, info, warn};
use tokio::sync::oneshot;
use url::Url;

use crate::config::ShellConfig;
use crate::error::ShellError;
use crate::events::{EventBus, ShellEvent};
use crate::tray::TrayAction;

use host::{Rect, ShellHost, MAIN_LABEL};
use navigation::TrustedOrigin;
use overlay::{Followup, LiveOverlay, OverlayAction, OverlayId, OverlayRequest, OverlaySlot};
use picker::{PickerId, PickerSession, PickerSlot};
use update::UpdateCoordinator;
use window::{VisibilityState, WindowHandle};

/// What to do with a native close request on the main window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Veto the close; the window was hidden instead.
    Hide,
    /// Let the window close; the process is exiting.
    Destroy,
}

/// Owns the main window, the live overlay, the open picker session and the
/// update lifecycle. Callers hold it behind one lock.
pub struct ApplicationShell<H: ShellHost> {
    host: H,
    bus: EventBus,
    config: ShellConfig,
    origin: TrustedOrigin,
    main: Option<WindowHandle>,
    ready: bool,
    quitting: bool,
    overlay: OverlaySlot,
    picker: PickerSlot,
    updates: UpdateCoordinator,
}

impl<H: ShellHost> ApplicationShell<H> {
    pub fn new(host: H, config: ShellConfig) -> Result<Self, ShellError> {
        let origin = TrustedOrigin::parse(&config.origin.url)?;
        Ok(Self {
            host,
            bus: EventBus::new(),
            config,
            origin,
            main: None,
            ready: false,
            quitting: false,
            overlay: OverlaySlot::default(),
            picker: PickerSlot::default(),
            updates: UpdateCoordinator::default(),
        })
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn origin(&self) -> &TrustedOrigin {
        &self.origin
    }

    pub fn main_window(&self) -> Option<&WindowHandle> {
        self.main.as_ref()
    }

    pub fn visibility(&self) -> VisibilityState {
        self.main
            .as_ref()
            .map_or_else(VisibilityState::missing, WindowHandle::visibility)
    }

    // ---- main window lifecycle ----

    /// Builds the main window, or re-activates it if it already exists.
    /// Returns true when a new native window was requested.
    pub fn create_main_window(&mut self) -> bool {
        if self.main.is_some() {
            self.activate_existing();
            return false;
        }
        self.host
            .create_main_window(&self.config.window, self.origin.url());
        self.main = Some(WindowHandle::hidden(MAIN_LABEL));
        info!("Main window created for {}", self.origin.url());
        true
    }

    /// First page load finished. Returns true only the first time.
    pub fn on_ready_to_show(&mut self) -> bool {
        if self.ready {
            return false;
        }
        let Some(main) = self.main.as_mut() else {
            debug!("Ready-to-show without a main window");
            return false;
        };
        self.ready = true;
        main.reveal();
        self.host.show_main();
        true
    }

    /// Another launch was attempted; bring the running window forward.
    pub fn activate_existing(&mut self) -> bool {
        let Some(main) = self.main.as_mut() else {
            debug!("Second instance with no main window");
            return false;
        };
        if main.minimized {
            self.host.unminimize_main();
        }
        main.reveal();
        self.host.show_main();
        self.host.focus_main();
        self.bus.publish(ShellEvent::WindowShown);
        true
    }

    /// Shows the main window, restoring it if minimized, and optionally focuses it.
    fn present(&mut self, focus: bool) -> bool {
        let Some(main) = self.main.as_mut() else {
            debug!("No main window to show");
            return false;
        };
        if main.minimized {
            self.host.unminimize_main();
        }
        let revealed = main.reveal();
        self.host.show_main();
        if focus {
            self.host.focus_main();
        }
        if revealed {
            self.bus.publish(ShellEvent::WindowShown);
        }
        revealed
    }

    pub fn show(&mut self) -> bool {
        self.present(false)
    }

    pub fn open(&mut self) -> bool {
        self.present(true)
    }

    pub fn restore(&mut self) -> bool {
        self.present(true)
    }

    pub fn hide(&mut self) {
        let Some(main) = self.main.as_mut() else {
            return;
        };
        main.conceal();
        self.host.hide_main();
    }

    pub fn minimize(&mut self) {
        let Some(main) = self.main.as_mut() else {
            return;
        };
        main.minimize();
        self.host.minimize_main();
    }

    /// Tray icon click: hide when on screen, otherwise show and focus.
    pub fn toggle_visibility(&mut self) {
        let Some(shown) = self.main.as_ref().map(WindowHandle::is_shown) else {
            debug!("Tray toggle with no main window");
            return;
        };
        if shown {
            self.hide();
        } else {
            self.present(true);
        }
    }

    pub fn on_focus_changed(&mut self, focused: bool) {
        if let Some(main) = self.main.as_mut() {
            main.set_focused(focused);
        }
    }

    pub fn is_maximized(&self) -> bool {
        self.main.as_ref().is_some_and(|m| m.maximized)
    }

    pub fn toggle_maximize(&mut self) {
        let Some(main) = self.main.as_mut() else {
            return;
        };
        main.maximized = !main.maximized;
        let maximized = main.maximized;
        self.host.set_main_maximized(maximized);
        self.bus.publish(ShellEvent::WindowMaximizedChange(maximized));
    }

    pub fn toggle_fullscreen(&mut self) {
        let Some(main) = self.main.as_mut() else {
            return;
        };
        main.fullscreen = !main.fullscreen;
        let fullscreen = main.fullscreen;
        self.host.set_main_fullscreen(fullscreen);
    }

    /// Reconciles minimize/maximize changes the OS made on its own.
    pub fn on_native_state(&mut self, minimized: bool, maximized: bool) {
        let Some(main) = self.main.as_mut() else {
            return;
        };
        if minimized && !main.minimized {
            main.minimize();
        } else if !minimized && main.minimized && main.reveal() {
            self.bus.publish(ShellEvent::WindowShown);
        }
        if maximized != main.maximized {
            main.maximized = maximized;
            self.bus.publish(ShellEvent::WindowMaximizedChange(maximized));
        }
    }

    pub fn on_close_requested(&mut self) -> CloseOutcome {
        if self.quitting {
            self.host.exit(0);
            return CloseOutcome::Destroy;
        }
        self.hide();
        CloseOutcome::Hide
    }

    pub fn on_main_destroyed(&mut self) {
        self.main = None;
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    /// Marks the exit as intentional so close requests stop hiding.
    pub fn begin_quit(&mut self) {
        self.quitting = true;
    }

    pub fn quit(&mut self) {
        info!("Quit requested");
        self.begin_quit();
        self.host.exit(0);
    }

    pub fn tray(&mut self, action: TrayAction) {
        match action {
            TrayAction::Open => {
                self.open();
            }
            TrayAction::ToggleFullscreen => {
                if self.main.is_some() {
                    self.toggle_fullscreen();
                    self.present(true);
                }
            }
            TrayAction::Quit => self.quit(),
        }
    }

    /// Returns whether the main window may follow `url`. Anything outside the
    /// trusted origin is opened externally instead.
    pub fn handle_navigation(&mut self, url: &Url) -> bool {
        if self.origin.permits(url) {
            return true;
        }
        info!("Opening {} externally", url);
        self.host.open_external(url);
        false
    }

    /// A popup request from the page. No second webview is ever created:
    /// foreign URLs open externally and trusted ones load in the main window.
    pub fn handle_new_window(&mut self, url: &Url) {
        if self.main.is_none() {
            debug!("Popup for {} with no main window", url);
            return;
        }
        if self.handle_navigation(url) {
            self.host.navigate_main(url);
        }
    }

    // ---- overlays ----

    pub fn show_overlay(&mut self, request: OverlayRequest) -> bool {
        if !self.visibility().allows_overlay() {
            debug!("Main window is focused, skipping overlay");
            return false;
        }
        let (previous, id) = self.overlay.replace(request.clone());
        if let Some(previous) = previous {
            self.host.close_overlay(previous.id);
        }
        let bounds = self.overlay_bounds();
        self.host.open_overlay(id, &request, bounds);
        true
    }

    fn overlay_bounds(&self) -> Rect {
        let overlay = &self.config.overlay;
        let area = self.host.work_area().unwrap_or(Rect {
            x: 0.0,
            y: 0.0,
            width: overlay.width + 2.0 * overlay.margin,
            height: overlay.height + 2.0 * overlay.margin,
        });
        area.corner(overlay.corner, overlay.width, overlay.height, overlay.margin)
    }

    pub fn overlay_action(&mut self, id: OverlayId, action: OverlayAction) {
        let Some(live) = self.overlay.take(id) else {
            debug!("Action {:?} for stale overlay {:?}", action, id);
            return;
        };
        self.host.close_overlay(id);
        match live.request.kind.followup(action) {
            Followup::Nothing => {}
            Followup::FocusMain => {
                self.present(true);
            }
            Followup::Relay(call_action) => {
                self.present(true);
                self.bus.publish(ShellEvent::OverlayAction(call_action));
            }
        }
    }

    /// The overlay window went away on its own.
    pub fn overlay_closed(&mut self, id: OverlayId) {
        self.overlay.take(id);
    }

    pub fn live_overlay(&self) -> Option<&LiveOverlay> {
        self.overlay.live()
    }

    // ---- screen picker ----

    pub fn open_picker(&mut self) -> oneshot::Receiver<Option<String>> {
        let (superseded, id, rx) = self.picker.begin();
        if let Some(superseded) = superseded {
            self.host.close_picker(superseded.id);
        }
        self.host.open_picker(id);
        rx
    }

    pub fn picker_select(&mut self, id: PickerId, source_id: String) {
        if let Some(session) = self.picker.finish(id, Some(source_id)) {
            self.host.close_picker(session.id);
        }
    }

    pub fn picker_cancel(&mut self, id: PickerId) {
        if let Some(session) = self.picker.finish(id, None) {
            self.host.close_picker(session.id);
        }
    }

    /// The picker window went away without an explicit answer.
    pub fn picker_closed(&mut self, id: PickerId) {
        self.picker.finish(id, None);
    }

    pub fn picker_session(&self) -> Option<&PickerSession> {
        self.picker.open()
    }

    // ---- updates ----

    pub fn downloaded_update(&self) -> Option<&str> {
        self.updates.downloaded_version()
    }

    pub fn begin_update_check(&mut self) -> Result<(), ShellError> {
        self.updates.begin_check()
    }

    pub fn update_not_available(&mut self) {
        if let Err(e) = self.updates.no_update() {
            warn!("{}", e);
        }
    }

    pub fn update_available(&mut self, version: String, release_notes: Option<String>) -> bool {
        let event = self.updates.available(version, release_notes);
        self.relay(event)
    }

    pub fn update_progress(&mut self, transferred: u64, total: Option<u64>) -> bool {
        let event = self.updates.progress(transferred, total);
        self.relay(event)
    }

    pub fn update_downloaded(&mut self) -> bool {
        let event = self.updates.downloaded();
        self.relay(event)
    }

    pub fn update_failed(&mut self, message: impl Into<String>) -> bool {
        let event = self.updates.fail(message);
        self.relay(event)
    }

    fn relay(&mut self, event: Result<ShellEvent, ShellError>) -> bool {
        match event {
            Ok(event) => {
                self.bus.publish(event);
                true
            }
            Err(e) => {
                warn!("Dropping update event: {}", e);
                false
            }
        }
    }
}
