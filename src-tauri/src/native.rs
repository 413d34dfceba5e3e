use log::{debug, error};
use tauri::webview::{NewWindowResponse, PageLoadEvent};
use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindowBuilder};
use tauri_plugin_opener::OpenerExt;
use tokio::sync::mpsc;
use url::Url;

use crate::config::{PickerConfig, WindowConfig};
use crate::shell::host::{Rect, ShellHost, MAIN_LABEL};
use crate::shell::overlay::{OverlayId, OverlayRequest};
use crate::shell::picker::PickerId;
use crate::with_shell;

/// Page-side API, injected before the remote app's own scripts run.
const BRIDGE_SCRIPT: &str = include_str!("bridge.js");

type Task = Box<dyn FnOnce() + Send>;

/// Window ops run in order on the main thread, never while the shell lock is
/// held, so window events they cause arrive in their own callbacks.
pub struct TauriHost {
    app: AppHandle,
    picker: PickerConfig,
    tasks: mpsc::UnboundedSender<Task>,
}

impl TauriHost {
    /// Must be called with the async runtime running (inside `setup`).
    pub fn new(app: AppHandle, picker: PickerConfig) -> Self {
        let (tasks, mut queue) = mpsc::unbounded_channel::<Task>();
        let main_thread = app.clone();
        // run_on_main_thread executes inline when called from the main
        // thread, so tasks are always posted from here instead.
        tauri::async_runtime::spawn(async move {
            while let Some(task) = queue.recv().await {
                if let Err(e) = main_thread.run_on_main_thread(task) {
                    error!("Failed to run window task: {}", e);
                }
            }
        });
        Self { app, picker, tasks }
    }

    fn on_main<F>(&self, what: &'static str, f: F)
    where
        F: FnOnce(&tauri::WebviewWindow) -> tauri::Result<()> + Send + 'static,
    {
        self.on_window(MAIN_LABEL.to_string(), what, f);
    }

    fn on_window<F>(&self, label: String, what: &'static str, f: F)
    where
        F: FnOnce(&tauri::WebviewWindow) -> tauri::Result<()> + Send + 'static,
    {
        let app = self.app.clone();
        self.dispatch(what, move || match app.get_webview_window(&label) {
            Some(window) => {
                if let Err(e) = f(&window) {
                    error!("{} failed on {}: {}", what, label, e);
                }
            }
            None => debug!("{}: window {} is gone", what, label),
        });
    }

    fn dispatch<F>(&self, what: &'static str, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.tasks.send(Box::new(f)).is_err() {
            error!("Failed to queue {}: window task loop stopped", what);
        }
    }
}

impl ShellHost for TauriHost {
    fn create_main_window(&mut self, config: &WindowConfig, url: &Url) {
        let app = self.app.clone();
        let config = config.clone();
        let url = url.clone();
        self.dispatch("create main window", move || {
            if let Err(e) = build_main_window(&app, &config, url) {
                error!("Failed to create main window: {}", e);
            }
        });
    }

    fn show_main(&mut self) {
        self.on_main("show", |w| w.show());
    }

    fn hide_main(&mut self) {
        self.on_main("hide", |w| w.hide());
    }

    fn focus_main(&mut self) {
        self.on_main("focus", |w| w.set_focus());
    }

    fn minimize_main(&mut self) {
        self.on_main("minimize", |w| w.minimize());
    }

    fn unminimize_main(&mut self) {
        self.on_main("unminimize", |w| w.unminimize());
    }

    fn set_main_maximized(&mut self, maximized: bool) {
        self.on_main("maximize", move |w| {
            if maximized {
                w.maximize()
            } else {
                w.unmaximize()
            }
        });
    }

    fn set_main_fullscreen(&mut self, fullscreen: bool) {
        self.on_main("fullscreen", move |w| w.set_fullscreen(fullscreen));
    }

    fn navigate_main(&mut self, url: &Url) {
        let url = url.clone();
        self.on_main("navigate", move |w| w.navigate(url));
    }

    fn open_overlay(&mut self, id: OverlayId, request: &OverlayRequest, bounds: Rect) {
        debug!("Opening {:?} overlay {:?}", request.kind, id);
        let app = self.app.clone();
        self.dispatch("open overlay", move || {
            if let Err(e) = build_overlay_window(&app, id, bounds) {
                error!("Failed to open overlay {:?}: {}", id, e);
            }
        });
    }

    fn close_overlay(&mut self, id: OverlayId) {
        self.on_window(id.label(), "close overlay", |w| w.destroy());
    }

    fn open_picker(&mut self, id: PickerId) {
        let app = self.app.clone();
        let size = self.picker.clone();
        self.dispatch("open picker", move || {
            if let Err(e) = build_picker_window(&app, id, &size) {
                error!("Failed to open picker {:?}: {}", id, e);
                // Nobody can answer a picker that never opened.
                with_shell(&app, |shell| shell.picker_closed(id));
            }
        });
    }

    fn close_picker(&mut self, id: PickerId) {
        self.on_window(id.label(), "close picker", |w| w.destroy());
    }

    fn open_external(&mut self, url: &Url) {
        if let Err(e) = self.app.opener().open_url(url.as_str(), None::<&str>) {
            error!("Failed to open {} externally: {}", url, e);
        }
    }

    fn work_area(&self) -> Option<Rect> {
        let monitor = self.app.primary_monitor().ok().flatten()?;
        let scale = monitor.scale_factor();
        let position = monitor.position().to_logical::<f64>(scale);
        let size = monitor.size().to_logical::<f64>(scale);
        Some(Rect {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        })
    }

    fn exit(&mut self, code: i32) {
        self.app.exit(code);
    }
}

fn build_main_window(app: &AppHandle, config: &WindowConfig, url: Url) -> tauri::Result<()> {
    let nav_app = app.clone();
    let popup_app = app.clone();
    let load_app = app.clone();
    WebviewWindowBuilder::new(app, MAIN_LABEL, WebviewUrl::External(url))
        .title(&config.title)
        .inner_size(config.width, config.height)
        .min_inner_size(config.min_width, config.min_height)
        .decorations(!config.custom_title_bar)
        .visible(false)
        .initialization_script(BRIDGE_SCRIPT)
        .on_navigation(move |url| {
            with_shell(&nav_app, |shell| shell.handle_navigation(url)).unwrap_or(false)
        })
        .on_new_window(move |url, _features| {
            with_shell(&popup_app, |shell| shell.handle_new_window(&url));
            NewWindowResponse::Deny
        })
        .on_page_load(move |_window, payload| {
            if !matches!(payload.event(), PageLoadEvent::Finished) {
                return;
            }
            crate::on_main_page_loaded(&load_app);
        })
        .build()?;
    Ok(())
}

/// The overlay page pulls its request with `get_overlay_payload` once loaded.
fn build_overlay_window(app: &AppHandle, id: OverlayId, bounds: Rect) -> tauri::Result<()> {
    WebviewWindowBuilder::new(app, id.label(), WebviewUrl::App("overlay.html".into()))
        .title("")
        .inner_size(bounds.width, bounds.height)
        .position(bounds.x, bounds.y)
        .decorations(false)
        .resizable(false)
        .always_on_top(true)
        .skip_taskbar(true)
        .focused(false)
        .visible(true)
        .build()?;
    Ok(())
}

fn build_picker_window(app: &AppHandle, id: PickerId, size: &PickerConfig) -> tauri::Result<()> {
    let mut builder =
        WebviewWindowBuilder::new(app, id.label(), WebviewUrl::App("picker.html".into()))
            .title("Choose what to share")
            .inner_size(size.width, size.height)
            .resizable(false)
            .always_on_top(true)
            .center();
    if let Some(main) = app.get_webview_window(MAIN_LABEL) {
        builder = builder.parent(&main)?;
    }
    builder.build()?;
    Ok(())
}
