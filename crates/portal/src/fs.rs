//! File system abstraction layer
//!
//! All config file access goes through the [`FileSystem`] port so the config store can be
//! exercised against mocks as well as the real disk.

pub mod real;

use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Port for file system operations
///
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem: Send + Sync {
    /// Read a file and return its contents as a string
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError`] if the file is missing, unreadable or not UTF-8.
    fn read_file(&self, path: &Path) -> Result<String, FileSystemError>;

    /// Write data to a file, replacing any existing content
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError`] if the file or its parent directory cannot be written.
    fn write_file(&self, path: &Path, data: &[u8]) -> Result<(), FileSystemError>;

    /// Create a file that must not exist yet and write `data` to it
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError::AlreadyExists`] if something already occupies `path`, or an
    /// IO error if the location is unwritable.
    fn create_new_file(&self, path: &Path, data: &[u8]) -> Result<(), FileSystemError>;

    /// Remove a file
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError`] if the file cannot be removed.
    fn remove_file(&self, path: &Path) -> Result<(), FileSystemError>;

    /// Check if a path exists
    fn path_exists(&self, path: &Path) -> bool;

    /// Expand `~` to the home directory
    fn expand_path(&self, path: &Path) -> PathBuf;

    /// The process' working directory
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError`] if the working directory is gone or inaccessible.
    fn current_dir(&self) -> Result<PathBuf, FileSystemError>;

    /// The per-user configuration directory for portal-cli
    ///
    /// # Errors
    ///
    /// Returns [`FileSystemError::HomeDirNotFound`] when no home directory can be determined.
    fn config_dir(&self) -> Result<PathBuf, FileSystemError>;
}

/// Errors that can occur during file system operations
#[derive(Error, Debug)]
pub enum FileSystemError {
    #[error("IO error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'{}' already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Home directory not found")]
    HomeDirNotFound,
}

impl FileSystemError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
impl MockFileSystem {
    pub(crate) fn mock_read_file<P, S>(&mut self, path: P, content: S)
    where
        PathBuf: From<P>,
        S: ToString,
    {
        let path_buf = PathBuf::from(path);
        let content_string = content.to_string();
        self.expect_read_file()
            .with(mockall::predicate::eq(path_buf))
            .returning(move |_| Ok(content_string.clone()));
    }

    pub(crate) fn mock_path_exists<P>(&mut self, path: P, exists: bool)
    where
        PathBuf: From<P>,
    {
        self.expect_path_exists()
            .with(mockall::predicate::eq(PathBuf::from(path)))
            .returning(move |_| exists);
    }

    pub(crate) fn mock_write_file_denied<P>(&mut self, path: P)
    where
        PathBuf: From<P>,
    {
        self.expect_write_file()
            .with(
                mockall::predicate::eq(PathBuf::from(path)),
                mockall::predicate::always(),
            )
            .returning(|path, _| {
                Err(FileSystemError::io(
                    path,
                    io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
                ))
            });
    }
}
