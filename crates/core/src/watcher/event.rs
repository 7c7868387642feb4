//! Normalized file events.

use std::path::{Path, PathBuf};

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind};

use super::filter::FilePattern;

/// Kind of change that produced a [`FileEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A new file appeared in the watched folder.
    Created,
}

/// A created file, ready for the transfer pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// Leaf file name, used as the object key.
    pub name: String,
    /// Absolute path of the file.
    pub full_path: PathBuf,
    /// Change kind.
    pub kind: ChangeKind,
}

impl FileEvent {
    /// Create a `Created` event for `full_path`.
    ///
    /// Returns `None` when the path has no UTF-8 leaf name.
    #[must_use]
    pub fn created(full_path: impl Into<PathBuf>) -> Option<Self> {
        let full_path = full_path.into();
        let name = leaf_name(&full_path)?.to_string();
        Some(Self {
            name,
            full_path,
            kind: ChangeKind::Created,
        })
    }

    /// Normalize a raw notification from a watch on `folder`.
    ///
    /// A file counts as created when it is created in place or renamed into
    /// `folder`. Every arriving path whose leaf name matches `filter` yields
    /// one event.
    #[must_use]
    pub fn from_notify(event: &Event, filter: &FilePattern, folder: &Path) -> Vec<Self> {
        let arrived: &[PathBuf] = match event.kind {
            EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                event.paths.as_slice()
            }
            // paths are [from, to]
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => match event.paths.last() {
                Some(to) if to.parent() == Some(folder) => std::slice::from_ref(to),
                _ => &[],
            },
            _ => &[],
        };

        arrived
            .iter()
            .filter(|path| leaf_name(path).is_some_and(|name| filter.matches(name)))
            .filter_map(|path| Self::created(path.clone()))
            .collect()
    }
}

fn leaf_name(path: &Path) -> Option<&str> {
    path.file_name()?.to_str()
}
