//! # Notification presenter: one transient message at a time
//!
//! The presenter owns a single slot. Its lifecycle:
//!
//! ```text
//! Idle --show--> Showing --hide / auto-hide--> Hiding --exit window--> Idle
//!                   ^                              |
//!                   +-----------show---------------+
//! ```
//!
//! [`show`](NotificationPresenter::show) replaces whatever is in the slot at
//! once; there is no queue. Each show gets a fresh generation and re-arms the
//! auto-hide timer, so a hide timer left over from an earlier message is stale
//! and does nothing when it fires.
//!
//! The presenter never sleeps itself. It returns [`TimerTicket`]s that the
//! host runs through [`crate::AuthController::run_timer`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::env::Clock;
use crate::timer::{TimerAction, TimerKind, TimerTicket, Timers};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Error,
    Warning,
}

impl NotificationKind {
    /// Parse a kind by name. Unknown names fall back to `Info`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "success" => Self::Success,
            "error" => Self::Error,
            "warning" => Self::Warning,
            _ => Self::Info,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }

    /// Font Awesome icon class.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Success => "fa-check-circle",
            Self::Error => "fa-exclamation-circle",
            Self::Warning => "fa-exclamation-triangle",
            Self::Info => "fa-info-circle",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub expires_at: DateTime<Utc>,
    pub generation: u64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum NotificationState {
    #[default]
    Idle,
    Showing(Notification),
    /// Playing the exit animation before removal.
    Hiding(Notification),
}

impl NotificationState {
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            Self::Idle => None,
            Self::Showing(n) | Self::Hiding(n) => Some(n),
        }
    }

    pub fn is_showing(&self) -> bool {
        matches!(self, Self::Showing(_))
    }
}

type Listener = Box<dyn Fn(&NotificationState)>;

pub struct NotificationPresenter {
    state: RefCell<NotificationState>,
    generation: Cell<u64>,
    timers: Timers,
    clock: Rc<dyn Clock>,
    default_duration: Duration,
    exit_window: Duration,
    listener: RefCell<Option<Listener>>,
}

impl NotificationPresenter {
    pub fn new(
        clock: Rc<dyn Clock>,
        timers: Timers,
        default_duration: Duration,
        exit_window: Duration,
    ) -> Self {
        Self {
            state: RefCell::new(NotificationState::Idle),
            generation: Cell::new(0),
            timers,
            clock,
            default_duration,
            exit_window,
            listener: RefCell::new(None),
        }
    }

    /// Called with the new state after every change.
    pub fn set_listener(&self, listener: impl Fn(&NotificationState) + 'static) {
        *self.listener.borrow_mut() = Some(Box::new(listener));
    }

    pub fn state(&self) -> NotificationState {
        self.state.borrow().clone()
    }

    /// Show `message` for the default duration.
    pub fn notify(&self, message: impl Into<String>, kind: NotificationKind) -> TimerTicket {
        self.show(message, kind, self.default_duration)
    }

    /// Show `message` now, replacing the current notification.
    pub fn show(
        &self,
        message: impl Into<String>,
        kind: NotificationKind,
        duration: Duration,
    ) -> TimerTicket {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        let expires_at = chrono::Duration::from_std(duration)
            .ok()
            .and_then(|delta| self.clock.now().checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.timers.cancel(TimerKind::NotificationRemove);
        self.set_state(NotificationState::Showing(Notification {
            message: message.into(),
            kind,
            expires_at,
            generation,
        }));
        self.timers.arm(duration, TimerAction::HideNotification)
    }

    /// Start the exit animation. A no-op unless a notification is showing.
    pub fn hide(&self) -> Option<TimerTicket> {
        let current = self.state();
        let NotificationState::Showing(notification) = current else {
            return None;
        };
        self.timers.cancel(TimerKind::NotificationHide);
        self.set_state(NotificationState::Hiding(notification));
        Some(
            self.timers
                .arm(self.exit_window, TimerAction::RemoveNotification),
        )
    }

    /// Finish the exit animation.
    pub fn remove(&self) {
        if matches!(self.state(), NotificationState::Hiding(_)) {
            self.set_state(NotificationState::Idle);
        }
    }

    fn set_state(&self, state: NotificationState) {
        *self.state.borrow_mut() = state.clone();
        if let Some(listener) = self.listener.borrow().as_ref() {
            listener(&state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::ManualClock;

    fn presenter() -> (NotificationPresenter, Timers) {
        let timers = Timers::new();
        let presenter = NotificationPresenter::new(
            Rc::new(ManualClock::default()),
            timers.clone(),
            Duration::from_millis(5000),
            Duration::from_millis(300),
        );
        (presenter, timers)
    }

    #[test]
    fn test_new_show_replaces_current_immediately() {
        let (presenter, timers) = presenter();

        let first = presenter.show("a", NotificationKind::Error, Duration::from_millis(100));
        let second = presenter.show("b", NotificationKind::Success, Duration::from_millis(100));

        let state = presenter.state();
        assert!(state.is_showing());
        let shown = state.notification().unwrap();
        assert_eq!(shown.message, "b");
        assert_eq!(shown.kind, NotificationKind::Success);
        assert_eq!(shown.generation, 2);

        // The first message's auto-hide is stale.
        assert!(!timers.is_current(&first));
        assert!(timers.is_current(&second));
    }

    #[test]
    fn test_expiry_follows_duration() {
        let (presenter, _) = presenter();
        let clock_now = ManualClock::default().now();
        presenter.notify("hello", NotificationKind::Info);
        let state = presenter.state();
        assert_eq!(
            state.notification().unwrap().expires_at,
            clock_now + chrono::Duration::milliseconds(5000)
        );
    }

    #[test]
    fn test_hide_is_idempotent() {
        let (presenter, timers) = presenter();
        assert!(presenter.hide().is_none());

        let hide_ticket = presenter.notify("x", NotificationKind::Warning);
        let remove_ticket = presenter.hide().unwrap();
        assert_eq!(remove_ticket.action, TimerAction::RemoveNotification);
        assert_eq!(remove_ticket.delay, Duration::from_millis(300));
        assert!(!timers.is_current(&hide_ticket));
        assert!(matches!(presenter.state(), NotificationState::Hiding(_)));

        assert!(presenter.hide().is_none());

        presenter.remove();
        assert_eq!(presenter.state(), NotificationState::Idle);
        assert!(presenter.hide().is_none());
    }

    #[test]
    fn test_show_during_exit_cancels_removal() {
        let (presenter, timers) = presenter();
        presenter.notify("old", NotificationKind::Info);
        let remove_ticket = presenter.hide().unwrap();

        presenter.notify("new", NotificationKind::Info);
        assert!(!timers.is_current(&remove_ticket));
        assert!(presenter.state().is_showing());
    }

    #[test]
    fn test_listener_sees_every_change() {
        let (presenter, _) = presenter();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        presenter.set_listener(move |state| sink.borrow_mut().push(state.clone()));

        presenter.notify("x", NotificationKind::Info);
        presenter.hide();
        presenter.remove();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].is_showing());
        assert!(matches!(seen[1], NotificationState::Hiding(_)));
        assert_eq!(seen[2], NotificationState::Idle);
    }

    #[test]
    fn test_kind_mapping_is_total() {
        assert_eq!(NotificationKind::from_name("success").icon(), "fa-check-circle");
        assert_eq!(NotificationKind::from_name("error").icon(), "fa-exclamation-circle");
        assert_eq!(NotificationKind::from_name("warning").icon(), "fa-exclamation-triangle");
        assert_eq!(NotificationKind::from_name("info").icon(), "fa-info-circle");
        assert_eq!(NotificationKind::from_name("shout"), NotificationKind::Info);
        assert_eq!(NotificationKind::Warning.name(), "warning");
    }
}
