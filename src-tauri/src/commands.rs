use std::sync::MutexGuard;

use log::debug;

use crate::capture::{self, ScreenSource};
use crate::error::ShellError;
use crate::notify;
use crate::shell::overlay::{OverlayAction, OverlayId, OverlayRequest};
use crate::shell::picker::PickerId;
use crate::updater::{self, CheckResult};
use crate::{Shell, SharedShell};

fn lock<'a>(
    state: &'a tauri::State<'_, SharedShell>,
) -> Result<MutexGuard<'a, Shell>, ShellError> {
    state
        .lock()
        .map_err(|e| ShellError::Window(format!("Lock error: {}", e)))
}

#[tauri::command]
pub fn window_minimize(state: tauri::State<'_, SharedShell>) -> Result<(), ShellError> {
    lock(&state)?.minimize();
    Ok(())
}

#[tauri::command]
pub fn window_maximize(state: tauri::State<'_, SharedShell>) -> Result<(), ShellError> {
    lock(&state)?.toggle_maximize();
    Ok(())
}

/// Hides the window unless the app is already quitting.
#[tauri::command]
pub fn window_close(state: tauri::State<'_, SharedShell>) -> Result<(), ShellError> {
    lock(&state)?.on_close_requested();
    Ok(())
}

#[tauri::command]
pub fn window_is_maximized(state: tauri::State<'_, SharedShell>) -> Result<bool, ShellError> {
    Ok(lock(&state)?.is_maximized())
}

#[tauri::command]
pub fn show_notification(
    app: tauri::AppHandle,
    state: tauri::State<'_, SharedShell>,
    title: Option<String>,
    body: Option<String>,
) -> Result<bool, ShellError> {
    let title = match title.filter(|t| !t.is_empty()) {
        Some(title) => title,
        None => lock(&state)?.config().window.title.clone(),
    };
    Ok(notify::show(&app, &title, body.as_deref().unwrap_or_default()))
}

/// Returns whether an overlay was actually opened.
#[tauri::command]
pub fn show_overlay_notification(
    state: tauri::State<'_, SharedShell>,
    request: OverlayRequest,
) -> Result<bool, ShellError> {
    Ok(lock(&state)?.show_overlay(request))
}

/// Called by an overlay page to fetch the request it should display.
#[tauri::command]
pub fn get_overlay_payload(
    window: tauri::WebviewWindow,
    state: tauri::State<'_, SharedShell>,
) -> Result<Option<OverlayRequest>, ShellError> {
    let Some(id) = OverlayId::from_label(window.label()) else {
        return Ok(None);
    };
    let shell = lock(&state)?;
    Ok(shell
        .live_overlay()
        .filter(|live| live.id == id)
        .map(|live| live.request.clone()))
}

fn overlay_action(
    window: &tauri::WebviewWindow,
    state: &tauri::State<'_, SharedShell>,
    action: OverlayAction,
) -> Result<(), ShellError> {
    match OverlayId::from_label(window.label()) {
        Some(id) => lock(state)?.overlay_action(id, action),
        None => debug!("Overlay action {:?} from {}", action, window.label()),
    }
    Ok(())
}

#[tauri::command]
pub fn overlay_clicked(
    window: tauri::WebviewWindow,
    state: tauri::State<'_, SharedShell>,
) -> Result<(), ShellError> {
    overlay_action(&window, &state, OverlayAction::Clicked)
}

#[tauri::command]
pub fn overlay_answer_call(
    window: tauri::WebviewWindow,
    state: tauri::State<'_, SharedShell>,
) -> Result<(), ShellError> {
    overlay_action(&window, &state, OverlayAction::AnswerCall)
}

#[tauri::command]
pub fn overlay_decline_call(
    window: tauri::WebviewWindow,
    state: tauri::State<'_, SharedShell>,
) -> Result<(), ShellError> {
    overlay_action(&window, &state, OverlayAction::DeclineCall)
}

#[tauri::command]
pub fn overlay_dismiss(
    window: tauri::WebviewWindow,
    state: tauri::State<'_, SharedShell>,
) -> Result<(), ShellError> {
    overlay_action(&window, &state, OverlayAction::Dismiss)
}

#[tauri::command]
pub async fn get_screen_sources() -> Result<Vec<ScreenSource>, ShellError> {
    Ok(capture::list_sources().await)
}

/// Opens the source picker and waits for the user. `None` on cancel or close.
#[tauri::command]
pub async fn open_screen_picker(
    state: tauri::State<'_, SharedShell>,
) -> Result<Option<String>, ShellError> {
    let pending = {
        let mut shell = lock(&state)?;
        shell.open_picker()
    };
    Ok(pending.await.unwrap_or(None))
}

#[tauri::command]
pub fn screen_picker_select(
    window: tauri::WebviewWindow,
    state: tauri::State<'_, SharedShell>,
    source_id: String,
) -> Result<(), ShellError> {
    if capture::parse_source_id(&source_id).is_none() {
        return Err(ShellError::Capture(format!("Unknown source id: {}", source_id)));
    }
    if let Some(id) = PickerId::from_label(window.label()) {
        lock(&state)?.picker_select(id, source_id);
    }
    Ok(())
}

#[tauri::command]
pub fn screen_picker_cancel(
    window: tauri::WebviewWindow,
    state: tauri::State<'_, SharedShell>,
) -> Result<(), ShellError> {
    if let Some(id) = PickerId::from_label(window.label()) {
        lock(&state)?.picker_cancel(id);
    }
    Ok(())
}

#[tauri::command]
pub async fn check_for_updates(app: tauri::AppHandle) -> Result<CheckResult, ShellError> {
    Ok(updater::check(&app).await)
}

#[tauri::command]
pub async fn install_update(app: tauri::AppHandle) -> Result<(), ShellError> {
    updater::install(&app)
}

#[tauri::command]
pub fn get_app_version(app: tauri::AppHandle) -> String {
    app.package_info().version.to_string()
}
