//! # Auth crate: the site's authentication workflows
//!
//! Form validation, the workflow controller that drives the identity
//! provider and data store, and the single-slot notification presenter.
//! Nothing here touches the DOM; the UI crate renders the state exposed by
//! [`AuthController`] and feeds timers back into it.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`validation`] | Per-form validators, live field validation |
//! | [`controller`] | [`AuthController`] and the workflow phases |
//! | [`notification`] | [`NotificationPresenter`] |
//! | [`messages`] | User-facing text per workflow and provider error kind |
//! | [`timer`] | Cancellable one-shot timers |
//! | [`env`] | [`Clock`], [`Navigator`] and the injected [`AuthEnv`] |
//! | [`session`] | [`AuthState`] for the navigation bar |

pub mod controller;
pub mod env;
pub mod error;
pub mod messages;
pub mod notification;
pub mod session;
pub mod timer;
pub mod validation;

#[cfg(test)]
mod fakes;

pub use controller::{AuthController, Workflow, WorkflowOutcome, WorkflowPhase, WorkflowStatus};
pub use env::{AuthEnv, Clock, FlowSettings, Navigator};
pub use error::AuthError;
pub use notification::{Notification, NotificationKind, NotificationPresenter, NotificationState};
pub use session::AuthState;
pub use timer::{AuthForm, TimerAction, TimerKind, TimerTicket, Timers};
pub use validation::{
    validate_field, ContactInput, Credentials, Field, FieldValidationState, PasswordResetInput,
    ProfileInput, SignupInput, ValidationReport,
};
