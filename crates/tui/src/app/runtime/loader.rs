use crate::app::error::GenerationError;
use crate::app::state::files::{FileSource, SelectedFile};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::borrow::Cow;
use std::fs;

const UTF8_BOM: &[u8] = &[0xef, 0xbb, 0xbf];

fn read_bytes(file: &SelectedFile) -> Result<Cow<'_, [u8]>, GenerationError> {
    match &file.source {
        FileSource::Memory(bytes) => Ok(Cow::Borrowed(bytes.as_ref())),
        FileSource::Path(path) => fs::read(path).map(Cow::Owned).map_err(|source| {
            tracing::warn!(name = %file.name, error = %source, "file read failed");
            GenerationError::Conversion {
                name: file.name.clone(),
                source,
            }
        }),
    }
}

/// Decodes the file as UTF-8 text. Invalid sequences become U+FFFD.
pub fn read_as_text(file: &SelectedFile) -> Result<String, GenerationError> {
    let bytes = read_bytes(file)?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);
    Ok(String::from_utf8_lossy(body).into_owned())
}

/// Standard base64 of the raw bytes, without any `data:` prefix.
pub fn read_as_data_payload(file: &SelectedFile) -> Result<String, GenerationError> {
    let bytes = read_bytes(file)?;
    Ok(BASE64.encode(bytes.as_ref()))
}
