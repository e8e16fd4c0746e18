//! Authentication context for the UI.

use std::collections::HashMap;
use std::rc::Rc;

use api::firebase::{FirebaseAuth, Firestore};
use api::Settings;
use auth::{
    AuthController, AuthEnv, AuthForm, AuthState, Clock, FlowSettings, NotificationState,
    TimerTicket, Workflow, WorkflowOutcome, WorkflowPhase,
};
use dioxus::prelude::*;

use crate::host::{BrowserClock, GoogleRedirect, PageNavigator};

/// Shared handle on the controller and the signals mirroring its state.
#[derive(Clone)]
pub struct AuthContext {
    pub controller: Rc<AuthController>,
    pub google: Rc<GoogleRedirect>,
    pub state: Signal<AuthState>,
    pub notification: Signal<NotificationState>,
    pub phases: Signal<HashMap<Workflow, WorkflowPhase>>,
    pub active_form: Signal<AuthForm>,
}

impl PartialEq for AuthContext {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.controller, &other.controller)
    }
}

impl AuthContext {
    /// Whether `workflow`'s submit control should be disabled.
    pub fn is_busy(&self, workflow: Workflow) -> bool {
        self.phases.read().get(&workflow) == Some(&WorkflowPhase::Submitting)
    }

    pub fn drive(&self, ticket: TimerTicket) {
        let controller = self.controller.clone();
        spawn(async move { controller.drive(ticket).await });
    }

    /// Start the timers a workflow armed and refresh the session state.
    pub fn settle(&self, outcome: &WorkflowOutcome) {
        for ticket in &outcome.timers {
            self.drive(ticket.clone());
        }
        let mut state = self.state;
        state.set(self.controller.auth_state());
    }

    /// Start Google sign-in. The workflow itself runs when Google sends the
    /// browser back.
    pub fn start_google_sign_in(&self) {
        if let Err(e) = self.google.start() {
            self.drive(self.controller.social_sign_in_failed(&e));
        }
    }

    pub fn dismiss_notification(&self) {
        if let Some(ticket) = self.controller.hide_message() {
            self.drive(ticket);
        }
    }
}

/// Get the authentication context provided by [`AuthProvider`].
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>()
}

fn build_controller(active_form: Signal<AuthForm>) -> (AuthController, GoogleRedirect) {
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Falling back to default settings: {}", e);
        Settings::default()
    });
    let firebase = Rc::new(FirebaseAuth::new(&settings.firebase));
    let firestore = Rc::new(Firestore::new(&settings.firebase, firebase.clone()));
    let google = GoogleRedirect::new(
        firebase.clone(),
        settings.firebase.google_client_id.clone(),
        settings.site.auth_path.clone(),
    );
    let env = AuthEnv {
        identity: firebase,
        store: firestore,
        clock: Rc::new(BrowserClock),
        navigator: Rc::new(PageNavigator { active_form }),
    };
    let controller = AuthController::new(env, FlowSettings::from_settings(&settings));
    (controller, google)
}

/// Provider component that owns the auth controller.
/// Wrap your app with this component to enable authentication.
#[component]
pub fn AuthProvider(children: Element) -> Element {
    let active_form = use_signal(|| AuthForm::Login);
    let state = use_signal(AuthState::default);
    let notification = use_signal(NotificationState::default);
    let phases = use_signal(HashMap::new);

    let (controller, google) = use_hook(|| {
        let (controller, google) = build_controller(active_form);
        let controller = Rc::new(controller);
        controller.notifications().set_listener(move |current| {
            let mut notification = notification;
            notification.set(current.clone());
        });
        controller.set_phase_listener(move |workflow, phase| {
            let mut phases = phases;
            phases.write().insert(workflow, phase);
        });
        (controller, Rc::new(google))
    });

    let ctx = use_context_provider(|| AuthContext {
        controller: controller.clone(),
        google: google.clone(),
        state,
        notification,
        phases,
        active_form,
    });

    // Resume the stored session, then finish a Google sign-in if the
    // browser just came back from Google
    use_effect({
        let ctx = ctx.clone();
        move || {
            let ctx = ctx.clone();
            spawn(async move {
                let mut state = ctx.state;
                state.set(ctx.controller.restore_session().await);
                match ctx.google.take_credential() {
                    Ok(true) => {
                        let outcome = ctx.controller.social_sign_in().await;
                        ctx.settle(&outcome);
                    }
                    Ok(false) => {}
                    Err(e) => ctx.drive(ctx.controller.social_sign_in_failed(&e)),
                }
            });
        }
    });

    // Activity heartbeat while signed in
    use_effect({
        let controller = controller.clone();
        move || {
            let controller = controller.clone();
            spawn(async move {
                let interval = controller.settings().activity_interval;
                loop {
                    BrowserClock.sleep(interval).await;
                    if state.peek().is_signed_in() {
                        controller.record_activity().await;
                    }
                }
            });
        }
    });

    rsx! {
        {children}
    }
}
