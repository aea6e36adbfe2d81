//! Configuration model loaded from external sources.

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Deserialize;
use validator::Validate;

use crate::domain::BrandingDir;
use crate::models::auth::{AuthMethod, AuthProvider, CaptchaSettings, JsonAuth, NoAuth, ProxyAuth};

#[derive(Clone, Debug, Deserialize, Validate)]
/// Server configuration read at startup.
pub struct ServerConfig {
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(range(min = 1))]
    pub port: u16,
    /// Directory holding the packaged front-end (`index.html` at its root).
    #[validate(length(min = 1))]
    pub bundle_dir: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub signup: bool,
    #[serde(default)]
    pub branding: BrandingConfig,
    #[serde(default)]
    #[validate(nested)]
    pub auth: AuthConfig,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BrandingConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub disable_external: bool,
    /// Override directory; empty disables overrides.
    #[serde(default)]
    pub files: String,
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct AuthConfig {
    #[serde(default)]
    pub method: AuthMethod,
    #[validate(nested)]
    pub recaptcha: Option<RecaptchaConfig>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct RecaptchaConfig {
    #[validate(url)]
    pub host: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub secret: String,
}

impl ServerConfig {
    pub fn settings(&self) -> Settings {
        Settings {
            name: self.branding.name.clone(),
            disable_external: self.branding.disable_external,
            branding: BrandingDir::from_setting(&self.branding.files),
            base_url: self.base_url.clone(),
            version: crate::VERSION.to_string(),
            signup: self.signup,
        }
    }

    pub fn auth_provider(&self) -> Arc<dyn AuthProvider> {
        match self.auth.method {
            AuthMethod::Json => Arc::new(JsonAuth {
                recaptcha: self.auth.recaptcha.as_ref().map(|r| CaptchaSettings {
                    host: r.host.clone(),
                    key: r.key.clone(),
                    secret: r.secret.clone(),
                }),
            }),
            AuthMethod::NoAuth => Arc::new(NoAuth),
            AuthMethod::Proxy => Arc::new(ProxyAuth),
        }
    }

    /// Prefix all routes are mounted under, without a trailing slash.
    pub fn mount_path(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }
}

/// Read-only view of the settings a request is served with.
#[derive(Clone, Debug, Default)]
pub struct Settings {
    pub name: String,
    pub disable_external: bool,
    pub branding: Option<BrandingDir>,
    pub base_url: String,
    pub version: String,
    pub signup: bool,
}

/// Holder of the current settings snapshot; swaps are atomic.
pub struct SettingsStore {
    current: ArcSwap<Settings>,
}

impl SettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            current: ArcSwap::from_pointee(settings),
        }
    }

    pub fn snapshot(&self) -> Arc<Settings> {
        self.current.load_full()
    }

    pub fn replace(&self, settings: Settings) {
        self.current.store(Arc::new(settings));
    }
}
