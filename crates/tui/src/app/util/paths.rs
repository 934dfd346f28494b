use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use url::Url;

pub fn expand_home(value: &str) -> PathBuf {
    if value == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(rest) = value.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(value)
}

/// Turns what a terminal delivers for a dropped file (a shell-quoted path,
/// sometimes a `file://` URI) into a path. URIs naming a remote host yield
/// `None`.
pub fn parse_dropped_path(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let unquoted = match shell_words::split(trimmed) {
        Ok(parts) if parts.len() == 1 => parts.into_iter().next().unwrap_or_default(),
        Ok(_) => trimmed.to_string(),
        Err(error) => {
            tracing::debug!(%error, "dropped path is not shell-quoted; using it verbatim");
            trimmed.to_string()
        }
    };
    if unquoted.starts_with("file:") {
        let url = match Url::parse(&unquoted) {
            Ok(url) => url,
            Err(error) => {
                tracing::debug!(%error, "dropped file URI does not parse");
                return None;
            }
        };
        return match url.to_file_path() {
            Ok(path) => Some(path),
            Err(()) => {
                tracing::debug!(host = ?url.host_str(), "dropped file URI is not local");
                None
            }
        };
    }
    if unquoted.is_empty() {
        return None;
    }
    Some(expand_home(&unquoted))
}

fn common_prefix(names: &[String]) -> String {
    let Some(first) = names.first() else {
        return String::new();
    };
    let mut prefix: Vec<char> = first.chars().collect();
    for name in &names[1..] {
        let shared = prefix
            .iter()
            .zip(name.chars())
            .take_while(|(left, right)| **left == *right)
            .count();
        prefix.truncate(shared);
    }
    prefix.into_iter().collect()
}

/// Completes the last path segment against the filesystem. Returns the new
/// input text when at least one character could be added.
pub fn complete_path(input: &str) -> Option<String> {
    let split_at = input.rfind(|ch: char| ch == '/' || ch == '\\').map(|idx| idx + 1).unwrap_or(0);
    let (dir_part, stem) = input.split_at(split_at);
    let dir = if dir_part.is_empty() {
        PathBuf::from(".")
    } else {
        expand_home(dir_part)
    };
    let mut matches: Vec<String> = fs::read_dir(&dir)
        .ok()?
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(stem) {
                return None;
            }
            if stem.is_empty() && name.starts_with('.') {
                return None;
            }
            let is_dir = entry.file_type().map(|kind| kind.is_dir()).unwrap_or(false);
            Some(if is_dir {
                format!("{name}{MAIN_SEPARATOR}")
            } else {
                name
            })
        })
        .collect();
    if matches.is_empty() {
        return None;
    }
    matches.sort();
    let completed = if matches.len() == 1 {
        matches.remove(0)
    } else {
        common_prefix(&matches)
    };
    if completed.chars().count() <= stem.chars().count() {
        return None;
    }
    Some(format!("{dir_part}{completed}"))
}

pub fn display_dir(path: &Path) -> String {
    let mut value = path.display().to_string();
    if !value.ends_with(MAIN_SEPARATOR) {
        value.push(MAIN_SEPARATOR);
    }
    value
}
