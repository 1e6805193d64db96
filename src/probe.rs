//! Filesystem probing for staleness checks.

use camino::{Utf8Path, Utf8PathBuf};
use std::{fs, io, time::SystemTime};

/// Reports the modification time of a path.
///
/// An error means the file cannot be used as a timestamp source. The planner
/// treats it as "not built yet" for declared targets and as fatal for plain
/// dependencies, so implementations need not distinguish `NotFound` from other
/// I/O failures.
#[cfg_attr(test, mockall::automock)]
pub trait FileSystemProbe {
    /// Return the modification time of `path`.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] when the path does not exist or cannot be
    /// queried.
    fn probe(&self, path: &Utf8Path) -> io::Result<SystemTime>;
}

/// Probe backed by [`std::fs::metadata`], resolving names against a base
/// directory.
#[derive(Debug, Clone, Default)]
pub struct StdFileSystem {
    root: Option<Utf8PathBuf>,
}

impl StdFileSystem {
    /// Probe paths relative to the process working directory.
    #[must_use]
    pub const fn new() -> Self {
        Self { root: None }
    }

    /// Probe paths relative to `root`.
    #[must_use]
    pub fn rooted(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        self.root
            .as_ref()
            .map_or_else(|| path.to_path_buf(), |root| root.join(path))
    }
}

impl FileSystemProbe for StdFileSystem {
    fn probe(&self, path: &Utf8Path) -> io::Result<SystemTime> {
        fs::metadata(self.resolve(path))?.modified()
    }
}
