use tauri::menu::{Menu, MenuItem, PredefinedMenuItem};
use tauri::tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent};

use crate::with_shell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayAction {
    Open,
    ToggleFullscreen,
    Quit,
}

impl TrayAction {
    pub fn id(self) -> &'static str {
        match self {
            TrayAction::Open => "open",
            TrayAction::ToggleFullscreen => "fullscreen",
            TrayAction::Quit => "quit",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "open" => Some(TrayAction::Open),
            "fullscreen" => Some(TrayAction::ToggleFullscreen),
            "quit" => Some(TrayAction::Quit),
            _ => None,
        }
    }
}

pub fn setup(app: &tauri::App, product: &str) -> Result<(), Box<dyn std::error::Error>> {
    let open = MenuItem::with_id(
        app,
        TrayAction::Open.id(),
        format!("Open {}", product),
        true,
        None::<&str>,
    )?;
    let fullscreen = MenuItem::with_id(
        app,
        TrayAction::ToggleFullscreen.id(),
        "Toggle Fullscreen",
        true,
        Some("F11"),
    )?;
    let quit = MenuItem::with_id(app, TrayAction::Quit.id(), "Quit", true, None::<&str>)?;
    let sep = PredefinedMenuItem::separator(app)?;

    let menu = Menu::with_items(app, &[&open, &fullscreen, &sep, &quit])?;

    let mut builder = TrayIconBuilder::with_id("main")
        .menu(&menu)
        .tooltip(product)
        .show_menu_on_left_click(false)
        .on_menu_event(|app_handle, event| {
            let Some(action) = TrayAction::from_id(event.id().as_ref()) else {
                return;
            };
            with_shell(app_handle, |shell| shell.tray(action));
        })
        .on_tray_icon_event(|tray, event| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                with_shell(tray.app_handle(), |shell| shell.toggle_visibility());
            }
        });

    if let Some(icon) = app.default_window_icon() {
        builder = builder.icon(icon.clone());
    }
    builder.build(app)?;

    Ok(())
}
