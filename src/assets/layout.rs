use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Subdirectory holding the slide images.
pub const IMAGES_DIR: &str = "imagenes";

/// Image extensions accepted inside [`IMAGES_DIR`] (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// One execution folder: `<root>/<name>` with its expected inputs and output location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionFolder {
    /// Folder name (the last path component), byte-exact.
    pub name: OsString,
    /// Folder path.
    pub root: PathBuf,
}

impl ExecutionFolder {
    /// Describe the folder at `root`. Performs no IO.
    pub fn new(root: impl Into<PathBuf>) -> SlidecastResult<Self> {
        let root = root.into();
        let name = root
            .file_name()
            .filter(|n| !n.is_empty())
            .map(OsStr::to_os_string)
            .ok_or_else(|| {
                SlidecastError::missing_input(format!(
                    "cannot derive a folder name from '{}'",
                    root.display()
                ))
            })?;
        Ok(Self { name, root })
    }

    /// Folder name for messages and batch keys.
    pub fn display_name(&self) -> String {
        self.name.to_string_lossy().into_owned()
    }

    /// `<root>/imagenes`.
    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    /// `<root>/<name>.wav`.
    pub fn narration_path(&self) -> PathBuf {
        self.root.join(affixed("", &self.name, ".wav"))
    }

    /// `<root>/music_<name>.mp3`.
    pub fn background_path(&self) -> PathBuf {
        self.root.join(affixed("music_", &self.name, ".mp3"))
    }

    /// `<root>/video_<name>.<extension>`.
    pub fn output_path(&self, extension: &str) -> PathBuf {
        self.root
            .join(affixed("video_", &self.name, &format!(".{extension}")))
    }

    /// Image files in [`IMAGES_DIR`], sorted by file name.
    ///
    /// Errors with [`SlidecastError::MissingInput`] when the directory is absent. An existing but
    /// empty directory yields an empty list.
    pub fn list_images(&self) -> SlidecastResult<Vec<PathBuf>> {
        let dir = self.images_dir();
        if !dir.is_dir() {
            return Err(SlidecastError::missing_input(format!(
                "images folder does not exist: {}",
                dir.display()
            )));
        }

        let mut images = Vec::new();
        for entry in std::fs::read_dir(&dir)
            .with_context(|| format!("failed to list images in '{}'", dir.display()))?
        {
            let entry =
                entry.with_context(|| format!("failed to read entry in '{}'", dir.display()))?;
            let path = entry.path();
            if has_image_extension(&path) {
                images.push(path);
            }
        }
        images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(images)
    }
}

/// `<prefix><name><suffix>` without passing `name` through UTF-8.
fn affixed(prefix: &str, name: &OsStr, suffix: &str) -> OsString {
    let mut out = OsString::with_capacity(prefix.len() + name.len() + suffix.len());
    out.push(prefix);
    out.push(name);
    out.push(suffix);
    out
}

/// `true` when `path` has one of [`IMAGE_EXTENSIONS`], ignoring ASCII case.
pub fn has_image_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

/// Names of the immediate subdirectories of `parent`, sorted.
///
/// Names are returned byte-exact so joining them back onto `parent` always finds the folder. A
/// missing parent yields an empty list.
pub fn list_subfolders(parent: &Path) -> SlidecastResult<Vec<OsString>> {
    if !parent.exists() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for entry in std::fs::read_dir(parent)
        .with_context(|| format!("failed to list '{}'", parent.display()))?
    {
        let entry =
            entry.with_context(|| format!("failed to read entry in '{}'", parent.display()))?;
        if entry.path().is_dir() {
            out.push(entry.file_name());
        }
    }
    out.sort();
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/layout.rs"]
mod tests;
