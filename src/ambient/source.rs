//! Where clip files come from.

use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

use crate::ambient::category::Category;

/// Lists the audio files filed under each category.
pub trait ClipSource {
    fn list_clip_paths(&self, category: Category) -> Vec<PathBuf>;
}

impl<F> ClipSource for F
where
    F: Fn(Category) -> Vec<PathBuf>,
{
    fn list_clip_paths(&self, category: Category) -> Vec<PathBuf> {
        self(category)
    }
}

/// Clips stored as `<root>/<Category>/**/<file>`, e.g. `Background/Low/drone.ogg`.
#[derive(Debug, Clone)]
pub struct DirectoryClipSource {
    root: PathBuf,
}

impl DirectoryClipSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ClipSource for DirectoryClipSource {
    /// Regular files below the category directory, sorted by name. A missing directory yields
    /// nothing.
    fn list_clip_paths(&self, category: Category) -> Vec<PathBuf> {
        let dir = self.root.join(category.name());
        if !dir.is_dir() {
            warn!("No clip directory for {category} at {}", dir.display());
            return Vec::new();
        }

        WalkDir::new(&dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) if entry.file_type().is_file() => Some(entry.into_path()),
                Ok(_) => None,
                Err(err) => {
                    warn!("Skipping unreadable entry under {}: {err}", dir.display());
                    None
                }
            })
            .collect()
    }
}
