use serde::Serialize;

/// Runtime configuration exposed to the front-end.
#[derive(Clone, Debug, Serialize)]
pub struct RuntimeConfigDto {
    pub name: String,
    #[serde(rename = "disableExternal")]
    pub disable_external: bool,
    #[serde(rename = "baseURL")]
    pub base_url: String,
    #[serde(rename = "staticURL")]
    pub static_url: String,
    pub version: String,
    #[serde(rename = "signupEnabled")]
    pub signup_enabled: bool,
    #[serde(rename = "noAuth")]
    pub no_auth: bool,
    #[serde(rename = "cssOverridePresent")]
    pub css_override_present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha: Option<CaptchaDto>,
}

/// Public captcha parameters; the secret never leaves the server.
#[derive(Clone, Debug, Serialize)]
pub struct CaptchaDto {
    pub enabled: bool,
    pub host: String,
    pub key: String,
}

/// A built runtime configuration together with its JSON rendering.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub data: RuntimeConfigDto,
    pub serialized_json: String,
}
