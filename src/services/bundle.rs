//! Read-only access to the packaged front-end bundle.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::{AssetPath, resolve_within};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found")]
    NotFound,
    #[error("failed to read asset")]
    Io(#[source] std::io::Error),
}

/// Packaged asset source; implementations never serve bytes from outside their root.
pub trait AssetBundle: Send + Sync {
    fn open(&self, path: &AssetPath) -> Result<Vec<u8>, AssetError>;

    fn contains(&self, path: &AssetPath) -> bool;

    /// Every file in the bundle, as `/`-separated relative paths.
    fn paths(&self) -> Vec<AssetPath>;
}

/// Bundle backed by a directory on disk (e.g. `frontend/dist`).
#[derive(Clone, Debug)]
pub struct DirBundle {
    root: PathBuf,
}

impl DirBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, path: &AssetPath) -> Result<PathBuf, AssetError> {
        match resolve_within(&self.root, path) {
            Ok(Some(found)) if found.is_file() => Ok(found),
            Ok(_) => Err(AssetError::NotFound),
            Err(e) => Err(AssetError::Io(e)),
        }
    }

    fn collect(dir: &Path, prefix: &str, out: &mut Vec<AssetPath>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("Cannot read bundle dir {dir:?}: {err}");
                return;
            }
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let name = entry.file_name().to_string_lossy().to_string();
            let relative = format!("{prefix}{name}");
            let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
            if is_dir {
                Self::collect(&entry.path(), &format!("{relative}/"), out);
            } else if let Ok(path) = AssetPath::try_from_str(&relative) {
                out.push(path);
            }
        }
    }
}

impl AssetBundle for DirBundle {
    fn open(&self, path: &AssetPath) -> Result<Vec<u8>, AssetError> {
        let file = self.locate(path)?;
        fs::read(file).map_err(AssetError::Io)
    }

    fn contains(&self, path: &AssetPath) -> bool {
        self.locate(path).is_ok()
    }

    fn paths(&self) -> Vec<AssetPath> {
        let mut out = Vec::new();
        Self::collect(&self.root, "", &mut out);
        out.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        out
    }
}

/// In-memory bundle.
#[derive(Clone, Debug, Default)]
pub struct MemoryBundle {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file; paths that fail [`AssetPath`] validation are ignored.
    pub fn with_file(mut self, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        match AssetPath::try_from_str(path) {
            Ok(path) => {
                self.files.insert(path.as_str().to_string(), contents.into());
            }
            Err(_) => log::warn!("Ignoring invalid bundle path: {path}"),
        }
        self
    }
}

impl AssetBundle for MemoryBundle {
    fn open(&self, path: &AssetPath) -> Result<Vec<u8>, AssetError> {
        self.files
            .get(path.as_str())
            .cloned()
            .ok_or(AssetError::NotFound)
    }

    fn contains(&self, path: &AssetPath) -> bool {
        self.files.contains_key(path.as_str())
    }

    fn paths(&self) -> Vec<AssetPath> {
        self.files
            .keys()
            .filter_map(|key| AssetPath::try_from_str(key).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn asset(path: &str) -> AssetPath {
        AssetPath::try_from_str(path).unwrap()
    }

    #[test]
    fn dir_bundle_reads_and_lists_files() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("img/icons")).unwrap();
        fs::write(dir.path().join("index.html"), "<html>").unwrap();
        fs::write(dir.path().join("app.js"), "js").unwrap();
        fs::write(dir.path().join("img/icons/a.svg"), "<svg/>").unwrap();

        let bundle = DirBundle::new(dir.path());
        assert_eq!(bundle.open(&asset("app.js")).unwrap(), b"js");
        assert!(bundle.contains(&asset("img/icons/a.svg")));
        assert!(!bundle.contains(&asset("img")));
        assert!(matches!(
            bundle.open(&asset("missing.js")),
            Err(AssetError::NotFound)
        ));

        let names: Vec<String> = bundle
            .paths()
            .iter()
            .map(|p| p.as_str().to_string())
            .collect();
        assert_eq!(names, vec!["app.js", "img/icons/a.svg", "index.html"]);
    }

    #[test]
    fn dir_bundle_stays_inside_root() {
        let outer = tempdir().unwrap();
        fs::write(outer.path().join("secret.txt"), "secret").unwrap();
        let root = outer.path().join("dist");
        fs::create_dir(&root).unwrap();

        let bundle = DirBundle::new(&root);
        let escaped = AssetPath::try_from_str("/secret.txt").unwrap();
        assert!(matches!(bundle.open(&escaped), Err(AssetError::NotFound)));
    }

    #[test]
    fn memory_bundle_normalizes_paths() {
        let bundle = MemoryBundle::new()
            .with_file("/app.js", "js")
            .with_file("../evil", "x");

        assert_eq!(bundle.open(&asset("app.js")).unwrap(), b"js");
        assert_eq!(bundle.paths().len(), 1);
    }
}
