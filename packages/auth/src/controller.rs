//! # Auth workflow controller
//!
//! Every user-triggered workflow runs the same sequence:
//!
//! ```text
//! Idle -> Validating -> Submitting -> Succeeded | Failed -> Idle
//!             |
//!             +-- invalid input --> Idle   (no provider call)
//! ```
//!
//! A workflow that is already past `Idle` ignores new submissions, so a double
//! click cannot send the same request twice. The phase always returns to
//! `Idle` when the workflow finishes, whichever way it exits.
//!
//! ## Side effects after a successful provider call
//!
//! | Workflow | Then | Notification | Timer |
//! |----------|------|--------------|-------|
//! | login | persistence mode, login stamp (best effort) | success | redirect home |
//! | signup | display name, user record (must succeed), verification mail | success | to login |
//! | reset | none | success | to login |
//! | social | new: user record (must succeed); returning: login stamp | success | redirect home |
//! | sign-out | none | success | redirect home |
//! | contact | contact submission | success | none |
//! | profile | profile update | success | none |
//! | preferences | preferences update | success | none |
//!
//! Timers come back in the [`WorkflowOutcome`]. The host runs each one through
//! [`AuthController::drive`], which sleeps on the injected [`Clock`](crate::Clock) and
//! skips tickets that were superseded in the meantime.

use std::cell::RefCell;
use std::collections::HashMap;

use api::{AuthUser, Persistence, ProviderError};
use store::{collections, profile, ContactSubmission, Preferences, UserRecord};

use crate::env::{AuthEnv, FlowSettings};
use crate::error::AuthError;
use crate::messages;
use crate::notification::{NotificationKind, NotificationPresenter};
use crate::session::AuthState;
use crate::timer::{AuthForm, TimerAction, TimerTicket, Timers};
use crate::validation::{
    validate_contact, validate_login, validate_profile, validate_reset, validate_signup,
    ContactInput, Credentials, PasswordResetInput, ProfileInput, SignupInput, ValidationReport,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Workflow {
    Login,
    Signup,
    Reset,
    Social,
    SignOut,
    Contact,
    Profile,
    Preferences,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WorkflowPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug)]
pub enum WorkflowStatus {
    /// Another run of the same workflow was still in flight.
    Ignored,
    /// Validation failed before anything was sent.
    Rejected(ValidationReport),
    Succeeded,
    Failed(AuthError),
}

#[derive(Debug)]
pub struct WorkflowOutcome {
    pub status: WorkflowStatus,
    /// Timers armed by this run, for the host to drive.
    pub timers: Vec<TimerTicket>,
}

impl WorkflowOutcome {
    fn ignored() -> Self {
        Self {
            status: WorkflowStatus::Ignored,
            timers: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, WorkflowStatus::Succeeded)
    }

    pub fn report(&self) -> Option<&ValidationReport> {
        match &self.status {
            WorkflowStatus::Rejected(report) => Some(report),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AuthError> {
        match &self.status {
            WorkflowStatus::Failed(e) => Some(e),
            _ => None,
        }
    }
}

type PhaseListener = Box<dyn Fn(Workflow, WorkflowPhase)>;

/// One in-flight workflow run. Dropping it returns the workflow to `Idle`.
struct Run<'a> {
    controller: &'a AuthController,
    workflow: Workflow,
    timers: Vec<TimerTicket>,
}

impl Run<'_> {
    fn enter(&self, phase: WorkflowPhase) {
        self.controller.set_phase(self.workflow, phase);
    }

    fn notify(&mut self, message: impl Into<String>, kind: NotificationKind) {
        let ticket = self.controller.notifications.notify(message, kind);
        self.timers.push(ticket);
    }

    fn arm(&mut self, delay: std::time::Duration, action: TimerAction) {
        let ticket = self.controller.timers.arm(delay, action);
        self.timers.push(ticket);
    }

    /// Stop before any external call. Only a form-level notice is shown;
    /// field errors are for the form to render.
    fn rejected(mut self, report: ValidationReport) -> WorkflowOutcome {
        tracing::debug!("{:?} input rejected: {}", self.workflow, report);
        if let Some(notice) = report.notice.clone() {
            self.notify(notice, NotificationKind::Error);
        }
        self.finish(WorkflowStatus::Rejected(report))
    }

    fn succeeded(mut self, message: impl Into<String>) -> WorkflowOutcome {
        self.enter(WorkflowPhase::Succeeded);
        self.notify(message, NotificationKind::Success);
        self.finish(WorkflowStatus::Succeeded)
    }

    fn failed(mut self, message: impl Into<String>, error: AuthError) -> WorkflowOutcome {
        tracing::error!("{:?} failed: {}", self.workflow, error);
        self.enter(WorkflowPhase::Failed);
        self.notify(message, NotificationKind::Error);
        self.finish(WorkflowStatus::Failed(error))
    }

    fn finish(mut self, status: WorkflowStatus) -> WorkflowOutcome {
        WorkflowOutcome {
            status,
            timers: std::mem::take(&mut self.timers),
        }
    }
}

impl Drop for Run<'_> {
    fn drop(&mut self) {
        self.controller.set_phase(self.workflow, WorkflowPhase::Idle);
    }
}

pub struct AuthController {
    env: AuthEnv,
    settings: FlowSettings,
    timers: Timers,
    notifications: NotificationPresenter,
    phases: RefCell<HashMap<Workflow, WorkflowPhase>>,
    phase_listener: RefCell<Option<PhaseListener>>,
}

impl AuthController {
    pub fn new(env: AuthEnv, settings: FlowSettings) -> Self {
        let timers = Timers::new();
        let notifications = NotificationPresenter::new(
            env.clock.clone(),
            timers.clone(),
            settings.notification_duration,
            settings.notification_exit,
        );
        Self {
            env,
            settings,
            timers,
            notifications,
            phases: RefCell::new(HashMap::new()),
            phase_listener: RefCell::new(None),
        }
    }

    pub fn notifications(&self) -> &NotificationPresenter {
        &self.notifications
    }

    pub fn settings(&self) -> &FlowSettings {
        &self.settings
    }

    pub fn phase(&self, workflow: Workflow) -> WorkflowPhase {
        self.phases
            .borrow()
            .get(&workflow)
            .copied()
            .unwrap_or_default()
    }

    /// Whether the submit control for `workflow` should show as busy.
    pub fn is_busy(&self, workflow: Workflow) -> bool {
        self.phase(workflow) == WorkflowPhase::Submitting
    }

    pub fn set_phase_listener(&self, listener: impl Fn(Workflow, WorkflowPhase) + 'static) {
        *self.phase_listener.borrow_mut() = Some(Box::new(listener));
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.env.identity.current_user()
    }

    pub fn auth_state(&self) -> AuthState {
        AuthState::resolved(self.current_user())
    }

    /// Resolve the session at startup, resuming one kept from an earlier
    /// page load when the provider still holds it.
    pub async fn restore_session(&self) -> AuthState {
        match self.env.identity.restore_session().await {
            Ok(user) => AuthState::resolved(user),
            Err(e) => {
                tracing::warn!("Could not restore the previous session: {}", e);
                self.auth_state()
            }
        }
    }

    fn set_phase(&self, workflow: Workflow, phase: WorkflowPhase) {
        self.phases.borrow_mut().insert(workflow, phase);
        if let Some(listener) = self.phase_listener.borrow().as_ref() {
            listener(workflow, phase);
        }
    }

    /// Claim `workflow`, or `None` when a run of it is already in flight.
    fn begin(&self, workflow: Workflow) -> Option<Run<'_>> {
        if self.phase(workflow) != WorkflowPhase::Idle {
            tracing::debug!("{:?} already in progress, ignoring submission", workflow);
            return None;
        }
        self.set_phase(workflow, WorkflowPhase::Validating);
        Some(Run {
            controller: self,
            workflow,
            timers: Vec::new(),
        })
    }

    /// Stamp a successful sign-in on the user's record. The user is already
    /// authenticated, so a failure here is only logged.
    async fn stamp_login(&self, uid: &str) {
        if let Err(e) = profile::record_login(self.env.store.as_ref(), uid).await {
            tracing::warn!("Could not record login for {}: {}", uid, e);
        }
    }

    pub async fn login(&self, input: &Credentials) -> WorkflowOutcome {
        let Some(mut run) = self.begin(Workflow::Login) else {
            return WorkflowOutcome::ignored();
        };
        let report = validate_login(input);
        if !report.is_valid() {
            return run.rejected(report);
        }

        run.enter(WorkflowPhase::Submitting);
        let user = match self
            .env
            .identity
            .sign_in(input.email.trim(), &input.password)
            .await
        {
            Ok(user) => user,
            Err(e) => return run.failed(messages::login_error(&e.kind), e.into()),
        };

        let mode = Persistence::remembering(input.remember_session);
        if let Err(e) = self.env.identity.set_session_persistence(mode).await {
            tracing::warn!("Could not set session persistence to {:?}: {}", mode, e);
        }
        self.stamp_login(&user.uid).await;

        tracing::info!("User {} logged in", user.uid);
        run.arm(
            self.settings.auth_redirect_delay,
            TimerAction::Redirect(self.settings.home_path.clone()),
        );
        run.succeeded(messages::LOGIN_SUCCESS)
    }

    pub async fn signup(&self, input: &SignupInput) -> WorkflowOutcome {
        let Some(mut run) = self.begin(Workflow::Signup) else {
            return WorkflowOutcome::ignored();
        };
        let report = validate_signup(input);
        if !report.is_valid() {
            return run.rejected(report);
        }

        run.enter(WorkflowPhase::Submitting);
        let email = input.email.trim();
        let user = match self.env.identity.sign_up(email, &input.password).await {
            Ok(user) => user,
            Err(e) => return run.failed(messages::signup_error(&e.kind), e.into()),
        };

        let first_name = input.first_name.trim();
        let last_name = input.last_name.trim();
        let display_name = format!("{first_name} {last_name}");
        if let Err(e) = self.env.identity.update_display_name(&display_name).await {
            tracing::warn!("Could not set display name for {}: {}", user.uid, e);
        }

        let record = UserRecord::for_email_signup(first_name, last_name, email)
            .with_email_verified(user.email_verified);
        if let Err(e) =
            profile::create_user_profile(self.env.store.as_ref(), &user.uid, &record).await
        {
            return run.failed(messages::PROFILE_NOT_SAVED, AuthError::SecondaryWrite(e));
        }

        if let Err(e) = self.env.identity.send_email_verification().await {
            tracing::warn!("Could not send verification email to {}: {}", email, e);
        }

        tracing::info!("User {} signed up", user.uid);
        run.arm(
            self.settings.form_switch_delay,
            TimerAction::SwitchForm(AuthForm::Login),
        );
        run.succeeded(messages::SIGNUP_SUCCESS)
    }

    pub async fn reset_password(&self, input: &PasswordResetInput) -> WorkflowOutcome {
        let Some(mut run) = self.begin(Workflow::Reset) else {
            return WorkflowOutcome::ignored();
        };
        let report = validate_reset(input);
        if !report.is_valid() {
            return run.rejected(report);
        }

        run.enter(WorkflowPhase::Submitting);
        if let Err(e) = self.env.identity.send_password_reset(input.email.trim()).await {
            return run.failed(messages::reset_error(&e.kind), e.into());
        }

        tracing::info!("Password reset requested");
        run.arm(
            self.settings.form_switch_delay,
            TimerAction::SwitchForm(AuthForm::Login),
        );
        run.succeeded(messages::RESET_SUCCESS)
    }

    /// Popup-based Google sign-in. New identities get a user record; returning
    /// ones get a login stamp.
    pub async fn social_sign_in(&self) -> WorkflowOutcome {
        let Some(mut run) = self.begin(Workflow::Social) else {
            return WorkflowOutcome::ignored();
        };
        run.enter(WorkflowPhase::Submitting);
        let signed_in = match self.env.identity.federated_sign_in().await {
            Ok(signed_in) => signed_in,
            Err(e) => return run.failed(messages::social_error(&e.kind), e.into()),
        };
        let user = signed_in.user;

        let message = if signed_in.is_new_user {
            let record = UserRecord::for_federated_signup(
                user.display_name.as_deref(),
                user.email.as_deref().unwrap_or_default(),
            )
            .with_email_verified(user.email_verified)
            .with_photo_url(user.photo_url.as_deref());
            if let Err(e) =
                profile::create_user_profile(self.env.store.as_ref(), &user.uid, &record).await
            {
                return run.failed(messages::PROFILE_NOT_SAVED, AuthError::SecondaryWrite(e));
            }
            tracing::info!("User {} signed up with Google", user.uid);
            messages::social_new_user(&self.settings.site_name)
        } else {
            self.stamp_login(&user.uid).await;
            tracing::info!("User {} logged in with Google", user.uid);
            messages::SOCIAL_RETURNING.to_string()
        };

        run.arm(
            self.settings.auth_redirect_delay,
            TimerAction::Redirect(self.settings.home_path.clone()),
        );
        run.succeeded(message)
    }

    pub async fn sign_out(&self) -> WorkflowOutcome {
        let Some(mut run) = self.begin(Workflow::SignOut) else {
            return WorkflowOutcome::ignored();
        };
        run.enter(WorkflowPhase::Submitting);
        if let Err(e) = self.env.identity.sign_out().await {
            return run.failed(messages::SIGN_OUT_FAILED, e.into());
        }

        tracing::info!("User signed out");
        run.arm(
            self.settings.auth_redirect_delay,
            TimerAction::Redirect(self.settings.home_path.clone()),
        );
        run.succeeded(messages::SIGN_OUT_SUCCESS)
    }

    /// Report a Google sign-in that failed before the provider was reached,
    /// e.g. a denied consent screen.
    pub fn social_sign_in_failed(&self, error: &ProviderError) -> TimerTicket {
        tracing::error!("{:?} failed: {}", Workflow::Social, error);
        self.notifications
            .notify(messages::social_error(&error.kind), NotificationKind::Error)
    }

    /// Landing page contact form. Works without a signed-in user.
    pub async fn submit_contact(&self, input: &ContactInput) -> WorkflowOutcome {
        let Some(run) = self.begin(Workflow::Contact) else {
            return WorkflowOutcome::ignored();
        };
        let report = validate_contact(input);
        if !report.is_valid() {
            return run.rejected(report);
        }

        run.enter(WorkflowPhase::Submitting);
        let submission = ContactSubmission::new(
            input.name.trim(),
            input.email.trim(),
            input.phone.trim(),
            input.service.trim(),
            input.message.trim(),
        );
        let written = match submission.creation_patch() {
            Ok(patch) => self.env.store.add(collections::CONTACTS, patch).await,
            Err(e) => Err(e),
        };
        match written {
            Ok(id) => {
                tracing::info!("Contact submission {} stored", id);
                run.succeeded(messages::CONTACT_SUCCESS)
            }
            Err(e) => run.failed(messages::CONTACT_FAILED, e.into()),
        }
    }

    /// Save the signed-in user's profile edits.
    pub async fn save_profile(&self, input: &ProfileInput) -> WorkflowOutcome {
        let Some(run) = self.begin(Workflow::Profile) else {
            return WorkflowOutcome::ignored();
        };
        let report = validate_profile(input);
        if !report.is_valid() {
            return run.rejected(report);
        }

        run.enter(WorkflowPhase::Submitting);
        let Some(user) = self.current_user() else {
            return run.failed(messages::PROFILE_UPDATE_FAILED, AuthError::NotSignedIn);
        };
        let update = input.to_update();
        match profile::update_user_profile(self.env.store.as_ref(), &user.uid, &update).await {
            Ok(()) => {
                tracing::info!("Profile of {} updated", user.uid);
                run.succeeded(messages::PROFILE_UPDATED)
            }
            Err(e) => run.failed(messages::PROFILE_UPDATE_FAILED, e.into()),
        }
    }

    /// Replace the signed-in user's preferences.
    pub async fn save_preferences(&self, preferences: &Preferences) -> WorkflowOutcome {
        let Some(run) = self.begin(Workflow::Preferences) else {
            return WorkflowOutcome::ignored();
        };
        run.enter(WorkflowPhase::Submitting);
        let Some(user) = self.current_user() else {
            return run.failed(messages::PREFERENCES_UPDATE_FAILED, AuthError::NotSignedIn);
        };
        let store = self.env.store.as_ref();
        match profile::update_user_preferences(store, &user.uid, preferences).await {
            Ok(()) => {
                tracing::info!("Preferences of {} updated", user.uid);
                run.succeeded(messages::PREFERENCES_UPDATED)
            }
            Err(e) => run.failed(messages::PREFERENCES_UPDATE_FAILED, e.into()),
        }
    }

    /// The signed-in user's stored record, for prefilling the profile form.
    pub async fn profile(&self) -> Option<UserRecord> {
        let user = self.current_user()?;
        match profile::get_user_profile(self.env.store.as_ref(), &user.uid).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Could not load profile of {}: {}", user.uid, e);
                None
            }
        }
    }

    /// Best-effort activity stamp for the signed-in user, if any.
    pub async fn record_activity(&self) {
        if let Some(user) = self.current_user() {
            profile::touch_user_activity(self.env.store.as_ref(), &user.uid).await;
        }
    }

    /// Show a notification outside any workflow.
    pub fn show_message(
        &self,
        message: impl Into<String>,
        kind: NotificationKind,
        duration: std::time::Duration,
    ) -> TimerTicket {
        self.notifications.show(message, kind, duration)
    }

    /// Dismiss the current notification, e.g. from its close button.
    pub fn hide_message(&self) -> Option<TimerTicket> {
        self.notifications.hide()
    }

    /// Act on a timer whose delay has elapsed. Stale tickets do nothing.
    /// Returns the follow-up timer, if the action arms one.
    pub fn run_timer(&self, ticket: &TimerTicket) -> Option<TimerTicket> {
        if !self.timers.is_current(ticket) {
            tracing::debug!("Skipping superseded {:?} timer", ticket.kind());
            return None;
        }
        match &ticket.action {
            TimerAction::HideNotification => self.notifications.hide(),
            TimerAction::RemoveNotification => {
                self.notifications.remove();
                None
            }
            TimerAction::Redirect(path) => {
                self.env.navigator.redirect(path);
                None
            }
            TimerAction::SwitchForm(form) => {
                self.env.navigator.switch_form(*form);
                None
            }
        }
    }

    /// Sleep through `ticket` and any timers it chains into.
    pub async fn drive(&self, ticket: TimerTicket) {
        let mut next = Some(ticket);
        while let Some(ticket) = next {
            self.env.clock.sleep(ticket.delay).await;
            next = self.run_timer(&ticket);
        }
    }
}
