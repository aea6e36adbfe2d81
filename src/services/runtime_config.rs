use std::io::ErrorKind;

use crate::dto::{CaptchaDto, RuntimeConfig, RuntimeConfigDto};
use crate::models::auth::{AuthMethod, AuthProvider};
use crate::models::config::Settings;

/// Build the runtime configuration for one request.
///
/// Never fails: a stylesheet that cannot be inspected reads as absent and a
/// payload that cannot be serialized renders as an empty string.
pub fn build_runtime_config(settings: &Settings, auth: &dyn AuthProvider) -> RuntimeConfig {
    let base_url = settings.base_url.trim_end_matches('/').to_string();
    let static_url = format!("{base_url}/static")
        .trim_start_matches('/')
        .to_string();

    let method = auth.method();
    let captcha = if method.is_credential_based() {
        auth.captcha().map(|c| CaptchaDto {
            enabled: !c.key.is_empty() && !c.secret.is_empty(),
            host: c.host,
            key: c.key,
        })
    } else {
        None
    };

    let data = RuntimeConfigDto {
        name: settings.name.clone(),
        disable_external: settings.disable_external,
        base_url,
        static_url,
        version: settings.version.clone(),
        signup_enabled: settings.signup,
        no_auth: method == AuthMethod::NoAuth,
        css_override_present: custom_css_present(settings),
        captcha,
    };

    let serialized_json = serde_json::to_string_pretty(&data).unwrap_or_else(|e| {
        log::error!("Failed to serialize runtime config: {e}");
        String::new()
    });

    RuntimeConfig {
        data,
        serialized_json,
    }
}

fn custom_css_present(settings: &Settings) -> bool {
    let Some(branding) = settings.branding.as_ref() else {
        return false;
    };

    match std::fs::metadata(branding.stylesheet()) {
        Ok(meta) => meta.is_file(),
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => {
            log::warn!("Couldn't load custom styles: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::domain::BrandingDir;
    use crate::models::auth::{CaptchaSettings, JsonAuth, NoAuth, ProxyAuth};
    use tempfile::tempdir;

    fn settings(base_url: &str) -> Settings {
        Settings {
            name: "Deck".into(),
            disable_external: true,
            branding: None,
            base_url: base_url.into(),
            version: "1.2.3".into(),
            signup: false,
        }
    }

    fn captcha_auth(key: &str, secret: &str) -> JsonAuth {
        JsonAuth {
            recaptcha: Some(CaptchaSettings {
                host: "https://www.google.com".into(),
                key: key.into(),
                secret: secret.into(),
            }),
        }
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        for input in ["/files/", "/files//", "/files"] {
            let config = build_runtime_config(&settings(input), &NoAuth);
            assert_eq!(config.data.base_url, "/files");
            assert_eq!(config.data.static_url, "files/static");
        }
    }

    #[test]
    fn root_base_url_yields_bare_static_url() {
        for input in ["", "/"] {
            let config = build_runtime_config(&settings(input), &NoAuth);
            assert_eq!(config.data.base_url, "");
            assert_eq!(config.data.static_url, "static");
        }
    }

    #[test]
    fn captcha_absent_unless_credential_based() {
        let config = build_runtime_config(&settings(""), &NoAuth);
        assert!(config.data.captcha.is_none());
        assert!(config.data.no_auth);

        let config = build_runtime_config(&settings(""), &ProxyAuth);
        assert!(config.data.captcha.is_none());
        assert!(!config.data.no_auth);

        let config = build_runtime_config(&settings(""), &captcha_auth("site", "secret"));
        assert!(config.data.captcha.is_some());
        assert!(!config.data.no_auth);
    }

    #[test]
    fn captcha_enabled_needs_key_and_secret() {
        let json = settings("");

        let config = build_runtime_config(&json, &captcha_auth("site", "secret"));
        let captcha = config.data.captcha.unwrap();
        assert!(captcha.enabled);
        assert_eq!(captcha.key, "site");
        assert_eq!(captcha.host, "https://www.google.com");

        let config = build_runtime_config(&json, &captcha_auth("site", ""));
        assert!(!config.data.captcha.unwrap().enabled);

        let config = build_runtime_config(&json, &JsonAuth::default());
        assert!(config.data.captcha.is_none());
    }

    #[test]
    fn css_flag_follows_override_directory() {
        let dir = tempdir().unwrap();
        let mut current = settings("");
        current.branding = Some(BrandingDir::new(dir.path().to_path_buf()));

        assert!(!build_runtime_config(&current, &NoAuth).data.css_override_present);

        fs::write(dir.path().join("custom.css"), "body{}").unwrap();
        assert!(build_runtime_config(&current, &NoAuth).data.css_override_present);

        fs::remove_file(dir.path().join("custom.css")).unwrap();
        assert!(!build_runtime_config(&current, &NoAuth).data.css_override_present);
    }

    #[test]
    fn css_flag_false_for_missing_directory() {
        let mut current = settings("");
        current.branding = Some(BrandingDir::new("/nonexistent/branding".into()));
        assert!(!build_runtime_config(&current, &NoAuth).data.css_override_present);
    }

    #[test]
    fn serialized_json_uses_stable_names() {
        let config = build_runtime_config(
            &settings("/fb/"),
            &captcha_auth("site", "secret"),
        );
        let value: serde_json::Value = serde_json::from_str(&config.serialized_json).unwrap();

        assert_eq!(value["name"], "Deck");
        assert_eq!(value["baseURL"], "/fb");
        assert_eq!(value["staticURL"], "fb/static");
        assert_eq!(value["version"], "1.2.3");
        assert_eq!(value["disableExternal"], true);
        assert_eq!(value["signupEnabled"], false);
        assert_eq!(value["noAuth"], false);
        assert_eq!(value["cssOverridePresent"], false);
        assert_eq!(value["captcha"]["enabled"], true);
        assert!(value["captcha"].get("secret").is_none());
        assert!(value.get("serializedJSON").is_none());
        assert!(!config.serialized_json.contains("secret\""));
    }
}
