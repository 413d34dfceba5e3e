use serde::Serialize;

/// Last known state of a native window the shell owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowHandle {
    pub label: String,
    pub visible: bool,
    pub minimized: bool,
    pub maximized: bool,
    pub focused: bool,
    pub fullscreen: bool,
    pub skip_taskbar: bool,
}

impl WindowHandle {
    /// A freshly built window that has not been shown yet.
    pub fn hidden(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            visible: false,
            minimized: false,
            maximized: false,
            focused: false,
            fullscreen: false,
            skip_taskbar: false,
        }
    }

    /// Overlays are shown without focus and kept off the taskbar.
    pub fn overlay(label: impl Into<String>) -> Self {
        Self {
            visible: true,
            skip_taskbar: true,
            ..Self::hidden(label)
        }
    }

    /// On screen: visible and not minimized.
    pub fn is_shown(&self) -> bool {
        self.visible && !self.minimized
    }

    /// Applies a show/restore. Returns true when the window was not shown before.
    pub fn reveal(&mut self) -> bool {
        let was_shown = self.is_shown();
        self.visible = true;
        self.minimized = false;
        !was_shown
    }

    pub fn conceal(&mut self) {
        self.visible = false;
        self.focused = false;
    }

    pub fn minimize(&mut self) {
        self.minimized = true;
        self.focused = false;
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused && self.is_shown();
    }

    pub fn visibility(&self) -> VisibilityState {
        VisibilityState {
            exists: true,
            visible: self.visible,
            minimized: self.minimized,
            focused: self.focused,
        }
    }
}

/// Snapshot of the main window used to gate overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibilityState {
    pub exists: bool,
    pub visible: bool,
    pub minimized: bool,
    pub focused: bool,
}

impl VisibilityState {
    pub fn missing() -> Self {
        Self::default()
    }

    /// Overlays never appear over a session the user is looking at.
    pub fn allows_overlay(&self) -> bool {
        !self.exists || !self.visible || self.minimized || !self.focused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_reports_only_real_transitions() {
        let mut handle = WindowHandle::hidden("main");
        assert!(handle.reveal());
        assert!(!handle.reveal());

        handle.minimize();
        assert!(!handle.is_shown());
        assert!(handle.reveal());

        handle.conceal();
        assert!(handle.reveal());
    }

    #[test]
    fn focus_is_dropped_while_not_shown() {
        let mut handle = WindowHandle::hidden("main");
        handle.set_focused(true);
        assert!(!handle.focused);

        handle.reveal();
        handle.set_focused(true);
        assert!(handle.focused);

        handle.minimize();
        assert!(!handle.focused);
    }

    #[test]
    fn overlay_gate_follows_foreground_focus() {
        let mut handle = WindowHandle::hidden("main");
        assert!(handle.visibility().allows_overlay());

        handle.reveal();
        assert!(handle.visibility().allows_overlay());

        handle.set_focused(true);
        assert!(!handle.visibility().allows_overlay());

        handle.minimize();
        assert!(handle.visibility().allows_overlay());

        assert!(VisibilityState::missing().allows_overlay());
    }

    #[test]
    fn overlay_handles_skip_taskbar_without_focus() {
        let handle = WindowHandle::overlay("overlay-1");
        assert!(handle.visible);
        assert!(handle.skip_taskbar);
        assert!(!handle.focused);
    }
}
