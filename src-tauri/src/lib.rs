pub mod capture;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod native;
pub mod notify;
pub mod shell;
pub mod tray;
pub mod updater;

use std::str::FromStr;
use std::sync::Mutex;

use log::{error, info};
use tauri::ipc::CapabilityBuilder;
use tauri::{AppHandle, Emitter, Manager, RunEvent, WindowEvent};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, Shortcut, ShortcutState};

use native::TauriHost;
use shell::host::MAIN_LABEL;
use shell::navigation::TrustedOrigin;
use shell::overlay::OverlayId;
use shell::picker::PickerId;
use shell::{ApplicationShell, CloseOutcome};

pub type Shell = ApplicationShell<TauriHost>;
pub type SharedShell = Mutex<Shell>;

/// Runs `f` against the managed shell. `None` if it is not managed yet or the
/// lock is poisoned.
pub(crate) fn with_shell<T>(app: &AppHandle, f: impl FnOnce(&mut Shell) -> T) -> Option<T> {
    let state = app.try_state::<SharedShell>()?;
    let result = match state.lock() {
        Ok(mut shell) => Some(f(&mut shell)),
        Err(e) => {
            error!("Shell lock poisoned: {}", e);
            None
        }
    };
    result
}

pub fn run() {
    env_logger::init();

    let config = config::load_or_default().expect("Failed to load config");

    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, _args, _cwd| {
            info!("Second launch, re-activating main window");
            with_shell(app, |shell| shell.create_main_window());
        }))
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_notification::init())
        .plugin(tauri_plugin_updater::Builder::new().build())
        .plugin(tauri_plugin_global_shortcut::Builder::new().build())
        .manage(updater::PendingUpdate::default())
        .setup(move |app| {
            let handle = app.handle().clone();
            let host = TauriHost::new(handle.clone(), config.picker.clone());
            let mut shell = ApplicationShell::new(host, config.clone())?;
            app.add_capability(remote_capability(shell.origin()))?;
            forward_events(&mut shell, handle);
            shell.create_main_window();
            app.manage(Mutex::new(shell));

            tray::setup(app, &config.window.title)?;
            register_fullscreen_shortcut(app, config.shortcuts.fullscreen.as_deref());

            Ok(())
        })
        .on_window_event(handle_window_event)
        .invoke_handler(tauri::generate_handler![
            commands::window_minimize,
            commands::window_maximize,
            commands::window_close,
            commands::window_is_maximized,
            commands::show_notification,
            commands::show_overlay_notification,
            commands::get_overlay_payload,
            commands::overlay_clicked,
            commands::overlay_answer_call,
            commands::overlay_decline_call,
            commands::overlay_dismiss,
            commands::get_screen_sources,
            commands::open_screen_picker,
            commands::screen_picker_select,
            commands::screen_picker_cancel,
            commands::check_for_updates,
            commands::install_update,
            commands::get_app_version,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(handle_run_event);
}

/// IPC grant for the hosted page, scoped to whatever origin is configured.
fn remote_capability(origin: &TrustedOrigin) -> CapabilityBuilder {
    CapabilityBuilder::new("remote-origin")
        .remote(origin.remote_pattern())
        .window(MAIN_LABEL)
        .permission("core:default")
}

/// Relays every shell event to the main window's page.
fn forward_events(shell: &mut Shell, app: AppHandle) {
    shell.bus_mut().subscribe_all(move |event| {
        if let Err(e) = app.emit_to(MAIN_LABEL, event.name(), event.payload()) {
            error!("Failed to emit {}: {}", event.name(), e);
        }
    });
}

fn register_fullscreen_shortcut(app: &tauri::App, accelerator: Option<&str>) {
    let Some(accelerator) = accelerator else {
        return;
    };
    let shortcut = match Shortcut::from_str(accelerator) {
        Ok(shortcut) => shortcut,
        Err(e) => {
            error!("Invalid fullscreen shortcut '{}': {}", accelerator, e);
            return;
        }
    };
    let registered = app
        .global_shortcut()
        .on_shortcut(shortcut, |app, _shortcut, event| {
            if event.state == ShortcutState::Pressed {
                with_shell(app, |shell| shell.toggle_fullscreen());
            }
        });
    if let Err(e) = registered {
        error!("Failed to register fullscreen shortcut: {}", e);
    }
}

/// First finished page load in the main window.
pub(crate) fn on_main_page_loaded(app: &AppHandle) {
    let startup_check = with_shell(app, |shell| {
        shell.on_ready_to_show() && shell.config().updates.check_on_startup
    })
    .unwrap_or(false);

    if startup_check && !cfg!(debug_assertions) {
        let app = app.clone();
        tauri::async_runtime::spawn(async move {
            updater::check(&app).await;
        });
    }
}

fn handle_window_event(window: &tauri::Window, event: &WindowEvent) {
    let label = window.label();
    let app = window.app_handle();
    match event {
        WindowEvent::CloseRequested { api, .. } if label == MAIN_LABEL => {
            if with_shell(app, |shell| shell.on_close_requested()) == Some(CloseOutcome::Hide) {
                api.prevent_close();
            }
        }
        WindowEvent::Focused(focused) if label == MAIN_LABEL => {
            with_shell(app, |shell| shell.on_focus_changed(*focused));
        }
        WindowEvent::Resized(_) if label == MAIN_LABEL => {
            let minimized = window.is_minimized().unwrap_or(false);
            let maximized = window.is_maximized().unwrap_or(false);
            with_shell(app, |shell| shell.on_native_state(minimized, maximized));
        }
        WindowEvent::Destroyed => {
            with_shell(app, |shell| {
                if label == MAIN_LABEL {
                    shell.on_main_destroyed();
                } else if let Some(id) = OverlayId::from_label(label) {
                    shell.overlay_closed(id);
                } else if let Some(id) = PickerId::from_label(label) {
                    shell.picker_closed(id);
                }
            });
        }
        _ => {}
    }
}

fn handle_run_event(app: &AppHandle, event: RunEvent) {
    match event {
        RunEvent::ExitRequested { .. } => {
            with_shell(app, |shell| shell.begin_quit());
        }
        RunEvent::Exit => updater::install_on_exit(app),
        #[cfg(target_os = "macos")]
        RunEvent::Reopen { .. } => {
            with_shell(app, |shell| shell.open());
        }
        _ => {}
    }
}
