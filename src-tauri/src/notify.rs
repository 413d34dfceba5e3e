use log::{debug, warn};
use tauri::plugin::PermissionState;
use tauri::AppHandle;
use tauri_plugin_notification::NotificationExt;

/// Shows a native notification. False when the platform can't or won't.
pub fn show(app: &AppHandle, title: &str, body: &str) -> bool {
    match app.notification().permission_state() {
        Ok(PermissionState::Granted) => {}
        Ok(state) => {
            debug!("Notifications not permitted: {:?}", state);
            return false;
        }
        Err(e) => {
            warn!("Notification permission check failed: {}", e);
            return false;
        }
    }

    match app
        .notification()
        .builder()
        .title(title)
        .body(body)
        .show()
    {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to show notification: {}", e);
            false
        }
    }
}
