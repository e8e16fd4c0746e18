use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[allow(unused)]
pub struct Firebase {
    pub api_key: String,
    pub project_id: String,
    pub auth_domain: String,
    /// Identity Toolkit base URL, overridable for the local emulator.
    pub auth_endpoint: String,
    /// Secure Token service, used to trade a stored refresh token for a session.
    pub token_endpoint: String,
    pub firestore_endpoint: String,
    /// OAuth client id of the Google sign-in button. Empty disables it.
    pub google_client_id: String,
}

impl Firebase {
    pub fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            self.firestore_endpoint, self.project_id
        )
    }
}

impl Default for Firebase {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            project_id: "bandhannova-main".into(),
            auth_domain: "bandhannova-main.firebaseapp.com".into(),
            auth_endpoint: "https://identitytoolkit.googleapis.com/v1".into(),
            token_endpoint: "https://securetoken.googleapis.com/v1".into(),
            firestore_endpoint: "https://firestore.googleapis.com/v1".into(),
            google_client_id: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[allow(unused)]
pub struct Site {
    pub name: String,
    pub home_path: String,
    pub auth_path: String,
}

impl Default for Site {
    fn default() -> Self {
        Self {
            name: "BandhanNova".into(),
            home_path: "/".into(),
            auth_path: "/auth".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[allow(unused)]
pub struct Timing {
    pub notification_ms: u64,
    pub notification_exit_ms: u64,
    pub auth_redirect_ms: u64,
    pub form_switch_ms: u64,
    pub activity_interval_secs: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            notification_ms: 5000,
            notification_exit_ms: 300,
            auth_redirect_ms: 1500,
            form_switch_ms: 2000,
            activity_interval_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[allow(unused)]
pub struct Settings {
    pub firebase: Firebase,
    pub site: Site,
    pub timing: Timing,
}

impl Settings {
    /// Defaults, then `config.toml` (optional), then `SITE__SECTION__KEY` variables.
    pub fn new() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let firebase = Firebase::default();
        let site = Site::default();
        let timing = Timing::default();
        let config = Config::builder()
            .set_default("firebase.api_key", firebase.api_key)?
            .set_default("firebase.project_id", firebase.project_id)?
            .set_default("firebase.auth_domain", firebase.auth_domain)?
            .set_default("firebase.auth_endpoint", firebase.auth_endpoint)?
            .set_default("firebase.token_endpoint", firebase.token_endpoint)?
            .set_default("firebase.firestore_endpoint", firebase.firestore_endpoint)?
            .set_default("firebase.google_client_id", firebase.google_client_id)?
            .set_default("site.name", site.name)?
            .set_default("site.home_path", site.home_path)?
            .set_default("site.auth_path", site.auth_path)?
            .set_default("timing.notification_ms", timing.notification_ms)?
            .set_default("timing.notification_exit_ms", timing.notification_exit_ms)?
            .set_default("timing.auth_redirect_ms", timing.auth_redirect_ms)?
            .set_default("timing.form_switch_ms", timing.form_switch_ms)?
            .set_default("timing.activity_interval_secs", timing.activity_interval_secs)?
            .add_source(
                File::with_name("config.toml")
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("SITE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::set_var;

    #[test]
    fn test_settings() {
        set_var("SITE__FIREBASE__PROJECT_ID", "test-project");
        set_var("SITE__TIMING__AUTH_REDIRECT_MS", "900");
        let settings = Settings::new().unwrap_or_default();
        println!("Settings = {:?}", settings);
        assert_eq!(settings.firebase.project_id, "test-project");
        assert_eq!(
            settings.firebase.documents_url(),
            "https://firestore.googleapis.com/v1/projects/test-project/databases/(default)/documents"
        );
        assert_eq!(settings.timing.auth_redirect_ms, 900);
        assert_eq!(settings.timing.notification_ms, 5000);
        assert_eq!(settings.site.home_path, "/");
    }
}
