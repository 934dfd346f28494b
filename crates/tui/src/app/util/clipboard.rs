use crate::app::state::files::SelectedFile;
use arboard::{Clipboard, Error as ClipboardError};
use base64::Engine;
use serde_json::Value;
use std::env;
use std::fs;
use std::process::Command;

pub const CLIPBOARD_IMAGE_NAME: &str = "clipboard.png";

#[derive(Debug, thiserror::Error)]
pub enum ClipboardImageError {
    #[error("no image on the clipboard")]
    NotAvailable,
    #[error("clipboard image is too large ({bytes} bytes, limit {max_bytes})")]
    TooLarge { bytes: usize, max_bytes: usize },
    #[error("clipboard error: {0}")]
    Clipboard(String),
    #[error("image encode error: {0}")]
    Encode(String),
}

#[derive(Debug, thiserror::Error)]
#[error("could not copy to clipboard: {0}")]
pub struct ClipboardCopyError(String);

const WINDOWS_CLIPBOARD_IMAGE_SCRIPT: &str = r#"
$img = Get-Clipboard -Format Image
if ($null -eq $img) { exit 3 }
$ms = New-Object System.IO.MemoryStream
$img.Save($ms, [System.Drawing.Imaging.ImageFormat]::Png)
@{ base64 = [Convert]::ToBase64String($ms.ToArray()) } | ConvertTo-Json -Compress
"#;

fn encode_png_rgba(width: usize, height: usize, rgba: &[u8]) -> Result<Vec<u8>, ClipboardImageError> {
    let width = u32::try_from(width)
        .map_err(|_| ClipboardImageError::Encode("image width is too large".to_string()))?;
    let height = u32::try_from(height)
        .map_err(|_| ClipboardImageError::Encode("image height is too large".to_string()))?;
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|error| ClipboardImageError::Encode(format!("PNG header: {error}")))?;
        writer
            .write_image_data(rgba)
            .map_err(|error| ClipboardImageError::Encode(format!("PNG data: {error}")))?;
    }
    Ok(bytes)
}

fn check_size(bytes: Vec<u8>, max_bytes: usize) -> Result<Vec<u8>, ClipboardImageError> {
    if bytes.len() > max_bytes {
        return Err(ClipboardImageError::TooLarge {
            bytes: bytes.len(),
            max_bytes,
        });
    }
    Ok(bytes)
}

fn is_wsl_environment() -> bool {
    if env::var_os("WSL_DISTRO_NAME").is_some() || env::var_os("WSL_INTEROP").is_some() {
        return true;
    }
    fs::read_to_string("/proc/sys/kernel/osrelease")
        .map(|value| value.to_ascii_lowercase().contains("microsoft"))
        .unwrap_or(false)
}

fn decode_powershell_payload(output: &str, max_bytes: usize) -> Result<Vec<u8>, ClipboardImageError> {
    let value: Value = serde_json::from_str(output.trim()).map_err(|error| {
        ClipboardImageError::Clipboard(format!("unreadable PowerShell payload: {error}"))
    })?;
    let encoded = value.get("base64").and_then(Value::as_str).ok_or_else(|| {
        ClipboardImageError::Clipboard("PowerShell payload has no image data".to_string())
    })?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|error| ClipboardImageError::Clipboard(format!("bad base64 payload: {error}")))?;
    check_size(bytes, max_bytes)
}

fn read_windows_clipboard_png(max_bytes: usize) -> Result<Vec<u8>, ClipboardImageError> {
    let output = Command::new("powershell.exe")
        .args([
            "-NoProfile",
            "-NonInteractive",
            "-ExecutionPolicy",
            "Bypass",
            "-Command",
            WINDOWS_CLIPBOARD_IMAGE_SCRIPT,
        ])
        .output()
        .map_err(|error| ClipboardImageError::Clipboard(format!("powershell.exe: {error}")))?;
    if output.status.code() == Some(3) {
        return Err(ClipboardImageError::NotAvailable);
    }
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ClipboardImageError::Clipboard(format!(
            "powershell.exe exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    decode_powershell_payload(&String::from_utf8_lossy(&output.stdout), max_bytes)
}

fn read_native_clipboard_png(max_bytes: usize) -> Result<Vec<u8>, ClipboardImageError> {
    let mut clipboard =
        Clipboard::new().map_err(|error| ClipboardImageError::Clipboard(error.to_string()))?;
    let image = match clipboard.get_image() {
        Ok(image) => image,
        Err(ClipboardError::ContentNotAvailable) => return Err(ClipboardImageError::NotAvailable),
        Err(error) => return Err(ClipboardImageError::Clipboard(error.to_string())),
    };
    let encoded = encode_png_rgba(image.width, image.height, image.bytes.as_ref())?;
    check_size(encoded, max_bytes)
}

/// Captures the clipboard image as an in-memory PNG ready for the image slot.
pub fn read_clipboard_image(max_bytes: usize) -> Result<SelectedFile, ClipboardImageError> {
    let png = match read_native_clipboard_png(max_bytes) {
        Ok(png) => png,
        Err(native_error) if is_wsl_environment() => match read_windows_clipboard_png(max_bytes) {
            Ok(png) => png,
            Err(ClipboardImageError::NotAvailable) => return Err(ClipboardImageError::NotAvailable),
            Err(windows_error) => {
                tracing::warn!(%windows_error, "WSL clipboard fallback failed");
                return Err(native_error);
            }
        },
        Err(native_error) => return Err(native_error),
    };
    Ok(SelectedFile::from_memory(CLIPBOARD_IMAGE_NAME, "image/png", png))
}

pub fn copy_text(text: &str) -> Result<(), ClipboardCopyError> {
    let mut clipboard = Clipboard::new().map_err(|error| ClipboardCopyError(error.to_string()))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|error| ClipboardCopyError(error.to_string()))
}
