use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use etcetera::{AppStrategy, AppStrategyArgs, choose_app_strategy};

use super::{FileSystem, FileSystemError};

/// Real file system implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_file(&self, path: &Path) -> Result<String, FileSystemError> {
        fs::read_to_string(path).map_err(|e| FileSystemError::io(path, e))
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> Result<(), FileSystemError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| FileSystemError::io(parent, e))?;
        }
        fs::write(path, data).map_err(|e| FileSystemError::io(path, e))
    }

    fn create_new_file(&self, path: &Path, data: &[u8]) -> Result<(), FileSystemError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| FileSystemError::io(parent, e))?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => FileSystemError::AlreadyExists(path.to_path_buf()),
                _ => FileSystemError::io(path, e),
            })?;

        file.write_all(data).map_err(|e| FileSystemError::io(path, e))
    }

    fn remove_file(&self, path: &Path) -> Result<(), FileSystemError> {
        fs::remove_file(path).map_err(|e| FileSystemError::io(path, e))
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn expand_path(&self, path: &Path) -> PathBuf {
        let binding = path.to_string_lossy();
        let expanded = shellexpand::tilde(&binding);

        PathBuf::from(expanded.as_ref())
    }

    fn current_dir(&self) -> Result<PathBuf, FileSystemError> {
        std::env::current_dir().map_err(|e| FileSystemError::io(Path::new("."), e))
    }

    fn config_dir(&self) -> Result<PathBuf, FileSystemError> {
        choose_app_strategy(AppStrategyArgs {
            top_level_domain: "com".to_string(),
            author: "portal".to_string(),
            app_name: "portal-cli".to_string(),
        })
        .map(|xdg| xdg.config_dir())
        .map_err(|_| FileSystemError::HomeDirNotFound)
    }
}
