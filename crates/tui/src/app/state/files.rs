use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Requirements,
    SequenceDiagram,
    ConfigImage,
}

impl SlotKind {
    pub const ALL: [SlotKind; 3] = [
        SlotKind::Requirements,
        SlotKind::SequenceDiagram,
        SlotKind::ConfigImage,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SlotKind::Requirements => "1. Requirements",
            SlotKind::SequenceDiagram => "2. Sequence diagram",
            SlotKind::ConfigImage => "3. Configuration diagram (image)",
        }
    }

    /// Advisory filter, shown next to the slot and checked on selection.
    pub fn accepted_extensions(self) -> &'static [&'static str] {
        match self {
            SlotKind::Requirements => &["txt", "md"],
            SlotKind::SequenceDiagram => &["txt", "md", "puml"],
            SlotKind::ConfigImage => &["png", "jpg", "jpeg", "webp"],
        }
    }

    pub fn accepted_hint(self) -> String {
        self.accepted_extensions()
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn is_image(self) -> bool {
        matches!(self, SlotKind::ConfigImage)
    }

    fn fallback_mime(self) -> &'static str {
        if self.is_image() {
            "application/octet-stream"
        } else {
            "text/plain"
        }
    }
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
}

pub fn mime_for_name(name: &str) -> Option<&'static str> {
    match extension_of(name)?.as_str() {
        "txt" | "puml" | "plantuml" => Some("text/plain"),
        "md" | "markdown" => Some("text/markdown"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Where a selected file's bytes come from when the loader asks for them.
#[derive(Clone)]
pub enum FileSource {
    Path(PathBuf),
    Memory(Arc<[u8]>),
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            FileSource::Memory(bytes) => write!(f, "Memory({} bytes)", bytes.len()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub source: FileSource,
}

#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    #[error("no such file: {0}")]
    NotFound(String),
    #[error("not a regular file: {0}")]
    NotAFile(String),
    #[error("cannot inspect {path}: {source}")]
    Metadata {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SelectedFile {
    pub fn from_path(path: &Path, kind: SlotKind) -> Result<Self, SelectError> {
        let display = path.display().to_string();
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(SelectError::NotFound(display));
            }
            Err(source) => {
                return Err(SelectError::Metadata {
                    path: display,
                    source,
                })
            }
        };
        if !metadata.is_file() {
            return Err(SelectError::NotAFile(display));
        }
        let name = path
            .file_name()
            .map(|value| value.to_string_lossy().into_owned())
            .unwrap_or(display);
        let mime_type = mime_for_name(&name)
            .unwrap_or_else(|| kind.fallback_mime())
            .to_string();
        Ok(Self {
            name,
            mime_type,
            size: metadata.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    pub fn from_memory(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: bytes.len() as u64,
            source: FileSource::Memory(Arc::from(bytes)),
        }
    }

    pub fn matches_accepted(&self, kind: SlotKind) -> bool {
        extension_of(&self.name)
            .map(|ext| kind.accepted_extensions().contains(&ext.as_str()))
            .unwrap_or(false)
    }

    pub fn parent_dir(&self) -> Option<PathBuf> {
        match &self.source {
            FileSource::Path(path) => path.parent().map(Path::to_path_buf),
            FileSource::Memory(_) => None,
        }
    }
}

pub fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let value = bytes as f64;
    if value >= KIB * KIB {
        format!("{:.1} MiB", value / (KIB * KIB))
    } else if value >= KIB {
        format!("{:.1} KiB", value / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// The three input slots. Only the input surface writes to this.
#[derive(Clone, Debug, Default)]
pub struct UploadedFiles {
    pub requirements: Option<SelectedFile>,
    pub sequence_diagram: Option<SelectedFile>,
    pub config_image: Option<SelectedFile>,
}

/// A snapshot with every slot populated, taken at submit time.
#[derive(Clone, Debug)]
pub struct GenerationInputs {
    pub requirements: SelectedFile,
    pub sequence_diagram: SelectedFile,
    pub config_image: SelectedFile,
}

impl UploadedFiles {
    pub fn get(&self, kind: SlotKind) -> Option<&SelectedFile> {
        match kind {
            SlotKind::Requirements => self.requirements.as_ref(),
            SlotKind::SequenceDiagram => self.sequence_diagram.as_ref(),
            SlotKind::ConfigImage => self.config_image.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: SlotKind) -> &mut Option<SelectedFile> {
        match kind {
            SlotKind::Requirements => &mut self.requirements,
            SlotKind::SequenceDiagram => &mut self.sequence_diagram,
            SlotKind::ConfigImage => &mut self.config_image,
        }
    }

    /// Replaces the slot wholesale, returning the previous selection.
    pub fn set(&mut self, kind: SlotKind, file: SelectedFile) -> Option<SelectedFile> {
        self.slot_mut(kind).replace(file)
    }

    pub fn clear(&mut self, kind: SlotKind) -> Option<SelectedFile> {
        self.slot_mut(kind).take()
    }

    pub fn all_present(&self) -> bool {
        SlotKind::ALL.iter().all(|kind| self.get(*kind).is_some())
    }

    pub fn populated_count(&self) -> usize {
        SlotKind::ALL
            .iter()
            .filter(|kind| self.get(**kind).is_some())
            .count()
    }

    pub fn snapshot(&self) -> Option<GenerationInputs> {
        Some(GenerationInputs {
            requirements: self.requirements.clone()?,
            sequence_diagram: self.sequence_diagram.clone()?,
            config_image: self.config_image.clone()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{format_size, mime_for_name, SelectError, SelectedFile, SlotKind, UploadedFiles};
    use std::fs;

    #[test]
    fn mime_is_derived_from_extension_case_insensitively() {
        assert_eq!(mime_for_name("diagram.PNG"), Some("image/png"));
        assert_eq!(mime_for_name("photo.jpeg"), Some("image/jpeg"));
        assert_eq!(mime_for_name("flow.puml"), Some("text/plain"));
        assert_eq!(mime_for_name("README.md"), Some("text/markdown"));
        assert_eq!(mime_for_name("archive.zip"), None);
        assert_eq!(mime_for_name("noext"), None);
    }

    #[test]
    fn from_path_reads_name_size_and_mime() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("requirements.md");
        fs::write(&path, "# Req\n").expect("write");

        let file = SelectedFile::from_path(&path, SlotKind::Requirements).expect("select");
        assert_eq!(file.name, "requirements.md");
        assert_eq!(file.mime_type, "text/markdown");
        assert_eq!(file.size, 6);
        assert!(file.matches_accepted(SlotKind::Requirements));
        assert_eq!(file.parent_dir().as_deref(), Some(dir.path()));
    }

    #[test]
    fn unknown_extension_uses_slot_fallback_and_is_flagged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("diagram.bmp");
        fs::write(&path, [0_u8, 1, 2]).expect("write");

        let image = SelectedFile::from_path(&path, SlotKind::ConfigImage).expect("select");
        assert_eq!(image.mime_type, "application/octet-stream");
        assert!(!image.matches_accepted(SlotKind::ConfigImage));

        let text = SelectedFile::from_path(&path, SlotKind::Requirements).expect("select");
        assert_eq!(text.mime_type, "text/plain");
    }

    #[test]
    fn from_path_rejects_missing_and_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = SelectedFile::from_path(&dir.path().join("nope.txt"), SlotKind::Requirements);
        assert!(matches!(missing, Err(SelectError::NotFound(_))));
        let directory = SelectedFile::from_path(dir.path(), SlotKind::Requirements);
        assert!(matches!(directory, Err(SelectError::NotAFile(_))));
    }

    #[test]
    fn slots_replace_wholesale_and_snapshot_requires_all_three() {
        let mut files = UploadedFiles::default();
        assert!(files.snapshot().is_none());

        files.set(
            SlotKind::Requirements,
            SelectedFile::from_memory("a.txt", "text/plain", b"a".to_vec()),
        );
        let previous = files.set(
            SlotKind::Requirements,
            SelectedFile::from_memory("b.txt", "text/plain", b"bb".to_vec()),
        );
        assert_eq!(previous.map(|file| file.name), Some("a.txt".to_string()));
        files.set(
            SlotKind::SequenceDiagram,
            SelectedFile::from_memory("seq.puml", "text/plain", b"@startuml".to_vec()),
        );
        assert_eq!(files.populated_count(), 2);
        assert!(!files.all_present());

        files.set(
            SlotKind::ConfigImage,
            SelectedFile::from_memory("clipboard.png", "image/png", vec![1, 2, 3]),
        );
        let snapshot = files.snapshot().expect("snapshot");
        assert_eq!(snapshot.requirements.name, "b.txt");
        assert_eq!(snapshot.config_image.size, 3);

        files.clear(SlotKind::SequenceDiagram);
        assert!(!files.all_present());
        assert!(files.get(SlotKind::SequenceDiagram).is_none());
    }

    #[test]
    fn accepted_hint_lists_dotted_extensions() {
        assert_eq!(SlotKind::SequenceDiagram.accepted_hint(), ".txt, .md, .puml");
    }

    #[test]
    fn sizes_are_humanized() {
        assert_eq!(format_size(12), "12 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MiB");
    }
}
