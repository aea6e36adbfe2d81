//! Strongly-typed domain structures for asset lookup.
use std::fmt;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Operator-supplied branding directory (may hold `custom.css` and `img/`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BrandingDir(PathBuf);

impl BrandingDir {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    /// Returns `None` for an empty setting, meaning no override directory.
    pub fn from_setting(value: &str) -> Option<Self> {
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(PathBuf::from(value)))
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn stylesheet(&self) -> PathBuf {
        self.0.join(CUSTOM_CSS)
    }
}

/// Name of the operator stylesheet inside the branding directory.
pub const CUSTOM_CSS: &str = "custom.css";

/// Prefix of image paths that may be overridden by the branding directory.
pub const IMG_PREFIX: &str = "img/";

/// Path of an asset relative to a root (bundle or branding directory).
///
/// Construction rejects anything that could leave the root, so joining an
/// `AssetPath` onto a root never yields a parent of that root.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct AssetPath(String);

impl AssetPath {
    pub fn try_from_str(input: &str) -> Result<Self, TypeConstraintError> {
        let trimmed = input.trim_start_matches('/');
        if trimmed.is_empty() || trimmed.contains('\0') {
            return Err(TypeConstraintError::InvalidPath);
        }

        let mut normalized = Vec::new();
        for component in Path::new(trimmed).components() {
            match component {
                Component::Normal(part) => match part.to_str() {
                    Some(part) => normalized.push(part),
                    None => return Err(TypeConstraintError::InvalidPath),
                },
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(TypeConstraintError::InvalidPath);
                }
            }
        }

        if normalized.is_empty() {
            return Err(TypeConstraintError::InvalidPath);
        }

        Ok(Self(normalized.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Remainder after `prefix`, if the path starts with it.
    pub fn strip_prefix(&self, prefix: &str) -> Option<AssetPath> {
        self.0
            .strip_prefix(prefix)
            .and_then(|rest| AssetPath::try_from_str(rest).ok())
    }

    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.0).extension().and_then(|ext| ext.to_str())
    }

    pub fn is_script(&self) -> bool {
        self.extension() == Some("js")
    }

    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Join `relative` under `root` and confirm the real location stays inside `root`.
///
/// Returns `Ok(None)` when the target does not exist (including a file used
/// as a directory) or escapes the root through a symlink.
pub fn resolve_within(root: &Path, relative: &AssetPath) -> std::io::Result<Option<PathBuf>> {
    let root = match root.canonicalize() {
        Ok(root) => root,
        Err(e) if is_absent(&e) => return Ok(None),
        Err(e) => return Err(e),
    };

    let candidate = match root.join(relative.to_path_buf()).canonicalize() {
        Ok(path) => path,
        Err(e) if is_absent(&e) => return Ok(None),
        Err(e) => return Err(e),
    };

    if !candidate.starts_with(&root) {
        log::warn!("Rejected asset path escaping its root: {relative}");
        return Ok(None);
    }

    Ok(Some(candidate))
}

fn is_absent(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
    )
}

#[derive(Debug, Error)]
pub enum TypeConstraintError {
    #[error("invalid asset path")]
    InvalidPath,
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use tempfile::tempdir;

    #[test]
    fn asset_path_trims_leading_slashes() {
        let path = AssetPath::try_from_str("//etc/passwd").unwrap();
        assert_eq!(path.as_str(), "etc/passwd");
    }

    #[test]
    fn asset_path_rejects_parent_segments() {
        assert!(AssetPath::try_from_str("../secret").is_err());
        assert!(AssetPath::try_from_str("img/../../secret").is_err());
        assert!(AssetPath::try_from_str("img/..").is_err());
    }

    #[test]
    fn asset_path_rejects_empty_and_nul() {
        assert!(AssetPath::try_from_str("").is_err());
        assert!(AssetPath::try_from_str("/").is_err());
        assert!(AssetPath::try_from_str("./").is_err());
        assert!(AssetPath::try_from_str("a\0b").is_err());
    }

    #[test]
    fn asset_path_drops_current_dir_segments() {
        let path = AssetPath::try_from_str("./img/./logo.png").unwrap();
        assert_eq!(path.as_str(), "img/logo.png");
        assert_eq!(path.extension(), Some("png"));
    }

    #[test]
    fn strip_prefix_yields_remainder() {
        let path = AssetPath::try_from_str("img/icons/a.svg").unwrap();
        let rest = path.strip_prefix(IMG_PREFIX).unwrap();
        assert_eq!(rest.as_str(), "icons/a.svg");
        assert!(path.strip_prefix("css/").is_none());
    }

    #[test]
    fn script_detection_uses_extension() {
        assert!(AssetPath::try_from_str("app.js").unwrap().is_script());
        assert!(!AssetPath::try_from_str("app.json").unwrap().is_script());
        assert!(!AssetPath::try_from_str("js").unwrap().is_script());
    }

    #[test]
    fn branding_dir_from_empty_setting_is_none() {
        assert!(BrandingDir::from_setting("").is_none());
        assert!(BrandingDir::from_setting("  ").is_none());
        let dir = BrandingDir::from_setting("/srv/branding").unwrap();
        assert_eq!(dir.stylesheet(), PathBuf::from("/srv/branding/custom.css"));
    }

    #[test]
    fn resolve_within_finds_contained_file() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("img")).unwrap();
        fs::write(dir.path().join("img/logo.png"), b"png").unwrap();

        let path = AssetPath::try_from_str("img/logo.png").unwrap();
        let resolved = resolve_within(dir.path(), &path).unwrap().unwrap();
        assert!(resolved.ends_with("img/logo.png"));

        let missing = AssetPath::try_from_str("img/none.png").unwrap();
        assert!(resolve_within(dir.path(), &missing).unwrap().is_none());
    }

    #[test]
    fn resolve_within_treats_file_as_dir_as_missing() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("img")).unwrap();
        fs::write(dir.path().join("img/logo.png"), b"png").unwrap();

        let path = AssetPath::try_from_str("img/logo.png/x").unwrap();
        assert!(resolve_within(dir.path(), &path).unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn resolve_within_rejects_symlink_escape() {
        let outside = tempdir().unwrap();
        fs::write(outside.path().join("secret.txt"), b"secret").unwrap();
        let root = tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret.txt"), root.path().join("link"))
            .unwrap();

        let path = AssetPath::try_from_str("link").unwrap();
        assert!(resolve_within(root.path(), &path).unwrap().is_none());
    }
}
