//! Directory listing used by the path walker.

use std::path::Path;

use walkdir::WalkDir;

/// The two listing operations the path walker needs.
///
/// Implementations never fail: a missing or unreadable directory lists as
/// empty. Names are returned raw (with extension), in a stable order.
pub trait FileSystem: Send + Sync {
    /// Names of the immediate subdirectories of `path`.
    fn list_subdirectories(&self, path: &Path) -> Vec<String>;

    /// Names of the immediate files of `path` whose extension is `extension`.
    fn list_files(&self, path: &Path, extension: &str) -> Vec<String>;
}

/// [`FileSystem`] backed by the real filesystem.
///
/// Hidden entries (leading `.`) are skipped, symlinks are followed and
/// names that are not valid UTF-8 are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsFileSystem;

impl OsFileSystem {
    pub fn new() -> Self {
        Self
    }

    fn entries(path: &Path) -> impl Iterator<Item = walkdir::DirEntry> {
        let shown = path.display().to_string();
        WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::debug!(path = %shown, error = %err, "skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| !name.starts_with('.'))
            })
    }
}

impl FileSystem for OsFileSystem {
    fn list_subdirectories(&self, path: &Path) -> Vec<String> {
        Self::entries(path)
            .filter(|entry| entry.file_type().is_dir())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_owned))
            .collect()
    }

    fn list_files(&self, path: &Path, extension: &str) -> Vec<String> {
        Self::entries(path)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext == extension)
            })
            .filter_map(|entry| entry.file_name().to_str().map(str::to_owned))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_lists_directories_and_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Models")).unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join("Config.php"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join("Kernel.php"), "").unwrap();

        let fs = OsFileSystem::new();

        assert_eq!(fs.list_subdirectories(dir.path()), vec!["Models"]);
        assert_eq!(fs.list_files(dir.path(), "php"), vec!["Config.php", "Kernel.php"]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let fs = OsFileSystem::new();

        assert!(fs.list_subdirectories(&missing).is_empty());
        assert!(fs.list_files(&missing, "php").is_empty());
    }
}
