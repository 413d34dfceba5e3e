use std::sync::Mutex;

use log::{error, info};
use serde::Serialize;
use tauri::{AppHandle, Manager};
use tauri_plugin_updater::{Update, UpdaterExt};

use crate::error::ShellError;
use crate::events::UpdateInfo;
use crate::shell::host::ShellHost;
use crate::shell::ApplicationShell;
use crate::{notify, with_shell};

/// A found update and, once its download lands, the bytes to install.
pub struct PendingDownload<U> {
    update: Mutex<Option<U>>,
    bytes: Mutex<Option<Vec<u8>>>,
}

pub type PendingUpdate = PendingDownload<Update>;

impl<U> Default for PendingDownload<U> {
    fn default() -> Self {
        Self {
            update: Mutex::new(None),
            bytes: Mutex::new(None),
        }
    }
}

impl<U> PendingDownload<U> {
    fn set_update(&self, update: Option<U>) {
        if let Ok(mut slot) = self.update.lock() {
            *slot = update;
        }
        if let Ok(mut bytes) = self.bytes.lock() {
            *bytes = None;
        }
    }

    fn set_bytes(&self, downloaded: Vec<u8>) {
        if let Ok(mut bytes) = self.bytes.lock() {
            *bytes = Some(downloaded);
        }
    }

    /// The update and its bytes, if a download has completed.
    fn take_ready(&self) -> Option<(U, Vec<u8>)> {
        let mut bytes = self.bytes.lock().ok()?;
        let mut update = self.update.lock().ok()?;
        if bytes.is_none() || update.is_none() {
            return None;
        }
        Some((update.take()?, bytes.take()?))
    }

    fn restore(&self, update: U, downloaded: Vec<u8>) {
        if let Ok(mut slot) = self.update.lock() {
            *slot = Some(update);
        }
        self.set_bytes(downloaded);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_info: Option<UpdateInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    fn found(info: Option<UpdateInfo>) -> Self {
        Self {
            success: true,
            update_info: info,
            error: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            update_info: None,
            error: Some(message),
        }
    }
}

/// Starts a check, discarding anything an earlier check left behind.
fn start_check<U, H: ShellHost>(
    shell: &mut ApplicationShell<H>,
    pending: &PendingDownload<U>,
) -> Result<(), CheckResult> {
    shell
        .begin_update_check()
        .map_err(|e| CheckResult::failed(e.to_string()))?;
    pending.set_update(None);
    Ok(())
}

/// Moves the shell out of `Checking` and builds the page's answer.
fn settle_check<H: ShellHost>(
    shell: &mut ApplicationShell<H>,
    outcome: Result<Option<UpdateInfo>, ShellError>,
) -> CheckResult {
    match outcome {
        Ok(Some(info)) => {
            info!("Update {} available", info.version);
            if !shell.update_available(info.version.clone(), info.release_notes.clone()) {
                return CheckResult::failed(format!("Update {} arrived out of order", info.version));
            }
            CheckResult::found(Some(info))
        }
        Ok(None) => {
            info!("No update available");
            shell.update_not_available();
            CheckResult::found(None)
        }
        Err(e) => {
            let message = e.to_string();
            error!("{}", message);
            shell.update_failed(message.clone());
            CheckResult::failed(message)
        }
    }
}

/// Installs the downloaded update. The quit flag is raised only after the
/// installer succeeds; on failure the download is kept for another attempt.
fn install_pending<U, H: ShellHost>(
    pending: &PendingDownload<U>,
    shell: &Mutex<ApplicationShell<H>>,
    install: impl FnOnce(&U, &[u8]) -> Result<(), ShellError>,
) -> Result<(), ShellError> {
    let (update, bytes) = pending
        .take_ready()
        .ok_or_else(|| ShellError::Update("No downloaded update to install".into()))?;
    if let Err(e) = install(&update, &bytes) {
        error!("{}", e);
        pending.restore(update, bytes);
        return Err(e);
    }
    shell
        .lock()
        .map_err(|e| ShellError::Window(format!("Lock error: {}", e)))?
        .begin_quit();
    Ok(())
}

async fn find_update(app: &AppHandle) -> Result<Option<Update>, ShellError> {
    let updater = app
        .updater()
        .map_err(|e| ShellError::Update(format!("Updater unavailable: {}", e)))?;
    updater
        .check()
        .await
        .map_err(|e| ShellError::Update(format!("Check failed: {}", e)))
}

pub async fn check(app: &AppHandle) -> CheckResult {
    let pending = app.state::<PendingUpdate>();
    match with_shell(app, |shell| start_check(shell, &*pending)) {
        Some(Ok(())) => {}
        Some(Err(rejected)) => return rejected,
        None => return CheckResult::failed("Shell not ready".to_string()),
    }

    let (outcome, found) = match find_update(app).await {
        Ok(Some(update)) => {
            let info = UpdateInfo {
                version: update.version.clone(),
                release_notes: update.body.clone(),
            };
            (Ok(Some(info)), Some(update))
        }
        Ok(None) => (Ok(None), None),
        Err(e) => (Err(e), None),
    };

    let result = with_shell(app, |shell| settle_check(shell, outcome))
        .unwrap_or_else(|| CheckResult::failed("Shell not ready".to_string()));
    if let (true, Some(update)) = (result.update_info.is_some(), found) {
        pending.set_update(Some(update.clone()));
        spawn_download(app.clone(), update);
    }
    result
}

fn spawn_download(app: AppHandle, update: Update) {
    tauri::async_runtime::spawn(async move {
        let progress_app = app.clone();
        let mut transferred: u64 = 0;
        let result = update
            .download(
                move |chunk_length, content_length| {
                    transferred = transferred.saturating_add(chunk_length as u64);
                    with_shell(&progress_app, |shell| {
                        shell.update_progress(transferred, content_length)
                    });
                },
                || {},
            )
            .await;

        match result {
            Ok(bytes) => {
                app.state::<PendingUpdate>().set_bytes(bytes);
                with_shell(&app, |shell| shell.update_downloaded());
                info!("Update {} downloaded", update.version);
                let title = with_shell(&app, |shell| shell.config().window.title.clone())
                    .unwrap_or_default();
                notify::show(
                    &app,
                    &format!("{} update ready", title),
                    &format!("Version {} installs when you restart.", update.version),
                );
            }
            Err(e) => {
                error!("Update download failed: {}", e);
                with_shell(&app, |shell| shell.update_failed(format!("Download failed: {}", e)));
            }
        }
    });
}

/// Installs the downloaded update and restarts.
pub fn install(app: &AppHandle) -> Result<(), ShellError> {
    let shell = app
        .try_state::<crate::SharedShell>()
        .ok_or_else(|| ShellError::Window("Shell not ready".into()))?;
    install_pending(&*app.state::<PendingUpdate>(), &*shell, |update, bytes| {
        info!("Installing update {}", update.version);
        update
            .install(bytes)
            .map_err(|e| ShellError::Update(format!("Install failed: {}", e)))
    })?;
    app.restart()
}

/// Installs an update that finished downloading but was never applied.
pub fn install_on_exit(app: &AppHandle) {
    let Some(pending) = app.try_state::<PendingUpdate>() else {
        return;
    };
    let Some((update, bytes)) = pending.take_ready() else {
        return;
    };
    info!("Installing update {} on exit", update.version);
    if let Err(e) = update.install(bytes) {
        error!("Install on exit failed: {}", e);
    }
}
