use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Window error: {0}")]
    Window(String),
    #[error("Update error: {0}")]
    Update(String),
    #[error("Capture error: {0}")]
    Capture(String),
    #[error("Invalid update transition from {from} to {to}")]
    InvalidTransition { from: &'static str, to: &'static str },
    #[error("Tauri error: {0}")]
    Tauri(#[from] tauri::Error),
    #[error("JSON error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Serialize for ShellError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
