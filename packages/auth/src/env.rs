//! Everything the workflow controller needs from its surroundings.

use std::rc::Rc;
use std::time::Duration;

use api::{IdentityProvider, Settings};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use store::DataStore;

use crate::timer::AuthForm;

/// Wall-clock time and sleeping on the UI event loop.
#[async_trait(?Send)]
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
    async fn sleep(&self, duration: Duration);
}

/// Page-level navigation performed when a timer fires.
pub trait Navigator {
    fn redirect(&self, path: &str);
    fn switch_form(&self, form: AuthForm);
}

/// The injected services.
#[derive(Clone)]
pub struct AuthEnv {
    pub identity: Rc<dyn IdentityProvider>,
    pub store: Rc<dyn DataStore>,
    pub clock: Rc<dyn Clock>,
    pub navigator: Rc<dyn Navigator>,
}

/// Paths, names and delays used by the workflows.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowSettings {
    pub site_name: String,
    pub home_path: String,
    pub auth_path: String,
    pub notification_duration: Duration,
    pub notification_exit: Duration,
    pub auth_redirect_delay: Duration,
    pub form_switch_delay: Duration,
    pub activity_interval: Duration,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl FlowSettings {
    pub fn from_settings(settings: &Settings) -> Self {
        let timing = &settings.timing;
        Self {
            site_name: settings.site.name.clone(),
            home_path: settings.site.home_path.clone(),
            auth_path: settings.site.auth_path.clone(),
            notification_duration: Duration::from_millis(timing.notification_ms),
            notification_exit: Duration::from_millis(timing.notification_exit_ms),
            auth_redirect_delay: Duration::from_millis(timing.auth_redirect_ms),
            form_switch_delay: Duration::from_millis(timing.form_switch_ms),
            activity_interval: Duration::from_secs(timing.activity_interval_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delays() {
        let settings = FlowSettings::default();
        assert_eq!(settings.home_path, "/");
        assert_eq!(settings.auth_path, "/auth");
        assert_eq!(settings.notification_duration, Duration::from_millis(5000));
        assert_eq!(settings.notification_exit, Duration::from_millis(300));
        assert_eq!(settings.auth_redirect_delay, Duration::from_millis(1500));
        assert_eq!(settings.form_switch_delay, Duration::from_millis(2000));
        assert_eq!(settings.activity_interval, Duration::from_secs(300));
    }
}
