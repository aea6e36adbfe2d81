//! Auth provider capabilities consumed when building runtime configuration.

use serde::{Deserialize, Serialize};

/// How users authenticate against the application.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// Username and password.
    #[default]
    Json,
    /// No credentials at all.
    NoAuth,
    /// Identity taken from a trusted reverse-proxy header.
    Proxy,
}

impl AuthMethod {
    pub fn is_credential_based(self) -> bool {
        matches!(self, AuthMethod::Json)
    }
}

/// Captcha parameters of a credential-based provider.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CaptchaSettings {
    pub host: String,
    pub key: String,
    pub secret: String,
}

/// Capability surface of the active auth provider.
pub trait AuthProvider: Send + Sync {
    fn method(&self) -> AuthMethod;

    /// Captcha configuration, for providers that support one.
    fn captcha(&self) -> Option<CaptchaSettings> {
        None
    }
}

#[derive(Clone, Debug, Default)]
pub struct JsonAuth {
    pub recaptcha: Option<CaptchaSettings>,
}

impl AuthProvider for JsonAuth {
    fn method(&self) -> AuthMethod {
        AuthMethod::Json
    }

    fn captcha(&self) -> Option<CaptchaSettings> {
        self.recaptcha.clone()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoAuth;

impl AuthProvider for NoAuth {
    fn method(&self) -> AuthMethod {
        AuthMethod::NoAuth
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ProxyAuth;

impl AuthProvider for ProxyAuth {
    fn method(&self) -> AuthMethod {
        AuthMethod::Proxy
    }
}
