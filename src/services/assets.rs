use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::{AssetPath, BrandingDir, CUSTOM_CSS, IMG_PREFIX, resolve_within};
use crate::services::bundle::{AssetBundle, AssetError};
use crate::services::{ServiceError, ServiceResult};

/// Where the bytes for a static request come from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AssetSource {
    /// File inside the branding directory.
    Override(PathBuf),
    /// Entry of the packaged bundle.
    Bundle(AssetPath),
    NotFound,
}

/// Resolves static paths against the branding directory first, then the bundle.
#[derive(Clone)]
pub struct AssetResolver {
    bundle: Arc<dyn AssetBundle>,
}

impl AssetResolver {
    pub fn new(bundle: Arc<dyn AssetBundle>) -> Self {
        Self { bundle }
    }

    /// Blocking: checks the filesystem.
    pub fn resolve(
        &self,
        path: &AssetPath,
        branding: Option<&BrandingDir>,
    ) -> ServiceResult<AssetSource> {
        if let Some(branding) = branding {
            if path.strip_prefix(IMG_PREFIX).is_some() {
                let found =
                    resolve_within(branding.as_path(), path).map_err(ServiceError::Override)?;
                if let Some(found) = found.filter(|p| p.is_file()) {
                    return Ok(AssetSource::Override(found));
                }
            } else if path.as_str() == CUSTOM_CSS {
                let found =
                    resolve_within(branding.as_path(), path).map_err(ServiceError::Override)?;
                return Ok(match found.filter(|p| p.is_file()) {
                    Some(found) => AssetSource::Override(found),
                    None => AssetSource::NotFound,
                });
            }
        }

        if self.bundle.contains(path) {
            Ok(AssetSource::Bundle(path.clone()))
        } else {
            Ok(AssetSource::NotFound)
        }
    }

    /// Blocking: raw bytes of a bundle entry.
    pub fn read_bundle(&self, path: &AssetPath) -> ServiceResult<Option<Vec<u8>>> {
        match self.bundle.open(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(AssetError::NotFound) => Ok(None),
            Err(AssetError::Io(e)) => Err(ServiceError::Bundle(e)),
        }
    }
}
