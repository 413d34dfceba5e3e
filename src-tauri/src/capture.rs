use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, RgbaImage};
use log::{error, warn};
use serde::Serialize;
use xcap::{Monitor, Window};

use crate::error::ShellError;

const THUMBNAIL_WIDTH: u32 = 320;
const THUMBNAIL_HEIGHT: u32 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Screen,
    Window,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSource {
    pub id: String,
    pub name: String,
    /// PNG data URL.
    pub thumbnail: Option<String>,
    pub app_icon: Option<String>,
    #[serde(rename = "type")]
    pub kind: SourceKind,
}

pub fn source_id(kind: SourceKind, raw: u32) -> String {
    match kind {
        SourceKind::Screen => format!("screen:{}", raw),
        SourceKind::Window => format!("window:{}", raw),
    }
}

pub fn parse_source_id(id: &str) -> Option<(SourceKind, u32)> {
    let (kind, raw) = id.split_once(':')?;
    let kind = match kind {
        "screen" => SourceKind::Screen,
        "window" => SourceKind::Window,
        _ => return None,
    };
    Some((kind, raw.parse().ok()?))
}

/// Scales `image` down to fit the thumbnail box and encodes it as a data URL.
pub fn thumbnail(image: RgbaImage) -> Option<String> {
    let scaled = DynamicImage::ImageRgba8(image).thumbnail(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT);
    let mut buffer = Cursor::new(Vec::new());
    if let Err(e) = scaled.write_to(&mut buffer, image::ImageFormat::Png) {
        warn!("Failed to encode thumbnail: {}", e);
        return None;
    }
    Some(format!(
        "data:image/png;base64,{}",
        STANDARD.encode(buffer.get_ref())
    ))
}

fn screens() -> Result<Vec<ScreenSource>, ShellError> {
    let monitors =
        Monitor::all().map_err(|e| ShellError::Capture(format!("Failed to get monitors: {}", e)))?;

    Ok(monitors
        .iter()
        .enumerate()
        .filter_map(|(idx, monitor)| {
            let raw = monitor.id().ok()?;
            Some(ScreenSource {
                id: source_id(SourceKind::Screen, raw),
                name: monitor
                    .name()
                    .unwrap_or_else(|_| format!("Screen {}", idx + 1)),
                thumbnail: monitor.capture_image().ok().and_then(thumbnail),
                app_icon: None,
                kind: SourceKind::Screen,
            })
        })
        .collect())
}

fn windows() -> Result<Vec<ScreenSource>, ShellError> {
    let windows =
        Window::all().map_err(|e| ShellError::Capture(format!("Failed to get windows: {}", e)))?;

    Ok(windows
        .iter()
        .filter(|w| !w.is_minimized().unwrap_or(true))
        .filter_map(|w| {
            let raw = w.id().ok()?;
            let title = w.title().unwrap_or_default();
            if title.is_empty() {
                return None;
            }
            Some(ScreenSource {
                id: source_id(SourceKind::Window, raw),
                name: title,
                thumbnail: w.capture_image().ok().and_then(thumbnail),
                app_icon: None,
                kind: SourceKind::Window,
            })
        })
        .collect())
}

/// Screens first, then windows. Blocking.
pub fn enumerate() -> Result<Vec<ScreenSource>, ShellError> {
    let mut sources = screens()?;
    match windows() {
        Ok(windows) => sources.extend(windows),
        Err(e) => warn!("{}", e),
    }
    Ok(sources)
}

/// Enumerates sources off the async runtime. Failures yield an empty list.
pub async fn list_sources() -> Vec<ScreenSource> {
    match tauri::async_runtime::spawn_blocking(enumerate).await {
        Ok(Ok(sources)) => sources,
        Ok(Err(e)) => {
            error!("{}", e);
            Vec::new()
        }
        Err(e) => {
            error!("Source enumeration task failed: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_ids_parse_back() {
        assert_eq!(source_id(SourceKind::Screen, 3), "screen:3");
        assert_eq!(
            parse_source_id("window:1234"),
            Some((SourceKind::Window, 1234))
        );
        assert_eq!(parse_source_id("tab:1"), None);
        assert_eq!(parse_source_id("screen"), None);
        assert_eq!(parse_source_id("screen:-1"), None);
    }

    #[test]
    fn thumbnail_fits_box_and_keeps_aspect() {
        let url = thumbnail(RgbaImage::new(1280, 1024)).unwrap();
        let encoded = url.strip_prefix("data:image/png;base64,").unwrap();
        let decoded = image::load_from_memory(&STANDARD.decode(encoded).unwrap()).unwrap();

        assert!(decoded.width() <= THUMBNAIL_WIDTH);
        assert_eq!(decoded.height(), THUMBNAIL_HEIGHT);
        assert_eq!(decoded.width(), 225);
    }

    #[test]
    fn source_serializes_with_page_field_names() {
        let source = ScreenSource {
            id: "screen:1".into(),
            name: "Built-in Display".into(),
            thumbnail: None,
            app_icon: None,
            kind: SourceKind::Screen,
        };
        assert_eq!(
            serde_json::to_value(&source).unwrap(),
            serde_json::json!({
                "id": "screen:1",
                "name": "Built-in Display",
                "thumbnail": null,
                "appIcon": null,
                "type": "screen"
            })
        );
    }
}
