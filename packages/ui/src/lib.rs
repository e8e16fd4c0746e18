//! This crate contains all shared UI for the workspace.

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_brands_icons::FaGoogle;
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

mod host;
pub use host::{BrowserClock, GoogleRedirect, PageNavigator};

mod provider;
pub use provider::{use_auth, AuthContext, AuthProvider};

mod forms;
pub use forms::{AuthPanel, FormField, GoogleButton, LoginForm, ResetForm, SignupForm};

mod notification;
pub use notification::NotificationToast;

mod contact;
pub use contact::ContactForm;

mod profile;
pub use profile::{PreferencesForm, ProfileForm};

mod user_menu;
pub use user_menu::UserMenu;
