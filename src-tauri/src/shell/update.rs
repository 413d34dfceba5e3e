use serde::Serialize;

use crate::error::ShellError;
use crate::events::{ShellEvent, UpdateInfo, UpdateProgress};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum UpdateState {
    Idle,
    Checking,
    Available { version: String },
    Downloading { percent: f64 },
    Downloaded { version: String },
    Error { message: String },
}

impl UpdateState {
    fn name(&self) -> &'static str {
        match self {
            UpdateState::Idle => "idle",
            UpdateState::Checking => "checking",
            UpdateState::Available { .. } => "available",
            UpdateState::Downloading { .. } => "downloading",
            UpdateState::Downloaded { .. } => "downloaded",
            UpdateState::Error { .. } => "error",
        }
    }
}

/// Forward-only update lifecycle. Each accepted transition yields the event
/// to relay to the page.
#[derive(Debug)]
pub struct UpdateCoordinator {
    state: UpdateState,
    pending_version: Option<String>,
}

impl Default for UpdateCoordinator {
    fn default() -> Self {
        Self {
            state: UpdateState::Idle,
            pending_version: None,
        }
    }
}

impl UpdateCoordinator {
    pub fn state(&self) -> &UpdateState {
        &self.state
    }

    pub fn downloaded_version(&self) -> Option<&str> {
        match &self.state {
            UpdateState::Downloaded { version } => Some(version),
            _ => None,
        }
    }

    fn reject(&self, to: &'static str) -> ShellError {
        ShellError::InvalidTransition {
            from: self.state.name(),
            to,
        }
    }

    /// Starts a check. Refused while one is running or a found update is
    /// still downloading (`Available` covers the gap before the first chunk).
    pub fn begin_check(&mut self) -> Result<(), ShellError> {
        match self.state {
            UpdateState::Checking
            | UpdateState::Available { .. }
            | UpdateState::Downloading { .. } => Err(self.reject("checking")),
            _ => {
                self.state = UpdateState::Checking;
                Ok(())
            }
        }
    }

    pub fn no_update(&mut self) -> Result<(), ShellError> {
        match self.state {
            UpdateState::Checking => {
                self.state = UpdateState::Idle;
                Ok(())
            }
            _ => Err(self.reject("idle")),
        }
    }

    pub fn available(
        &mut self,
        version: String,
        release_notes: Option<String>,
    ) -> Result<ShellEvent, ShellError> {
        match self.state {
            UpdateState::Checking => {
                self.state = UpdateState::Available {
                    version: version.clone(),
                };
                self.pending_version = Some(version.clone());
                Ok(ShellEvent::UpdateAvailable(UpdateInfo {
                    version,
                    release_notes,
                }))
            }
            _ => Err(self.reject("available")),
        }
    }

    /// Records download progress. A lower percent than already seen in this
    /// download is held at the previous value.
    pub fn progress(&mut self, transferred: u64, total: Option<u64>) -> Result<ShellEvent, ShellError> {
        let reported = match total {
            Some(total) if total > 0 => (transferred as f64 / total as f64 * 100.0).clamp(0.0, 100.0),
            _ => 0.0,
        };
        let percent = match self.state {
            UpdateState::Available { .. } => reported,
            UpdateState::Downloading { percent } => reported.max(percent),
            _ => return Err(self.reject("downloading")),
        };
        self.state = UpdateState::Downloading { percent };
        Ok(ShellEvent::UpdateProgress(UpdateProgress {
            percent,
            transferred,
            total,
        }))
    }

    pub fn downloaded(&mut self) -> Result<ShellEvent, ShellError> {
        match self.state {
            UpdateState::Available { .. } | UpdateState::Downloading { .. } => {
                let version = self.pending_version.clone().unwrap_or_default();
                self.state = UpdateState::Downloaded {
                    version: version.clone(),
                };
                Ok(ShellEvent::UpdateDownloaded { version })
            }
            _ => Err(self.reject("downloaded")),
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<ShellEvent, ShellError> {
        if matches!(self.state, UpdateState::Downloaded { .. }) {
            return Err(self.reject("error"));
        }
        let message = message.into();
        self.state = UpdateState::Error {
            message: message.clone(),
        };
        self.pending_version = None;
        Ok(ShellEvent::UpdateError { message })
    }
}
