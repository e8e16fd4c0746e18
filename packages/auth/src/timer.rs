//! Cancellable one-shot timers.
//!
//! Arming a timer hands back a [`TimerTicket`] and bumps the generation of
//! its [`TimerKind`]; any ticket armed earlier for the same kind is stale from
//! then on. The host sleeps for [`TimerTicket::delay`] and then asks whether
//! the ticket is still current before acting on it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

/// The forms on the authentication page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthForm {
    Login,
    Signup,
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    NotificationHide,
    NotificationRemove,
    Redirect,
    FormSwitch,
}

/// What to do when a timer fires.
#[derive(Clone, Debug, PartialEq)]
pub enum TimerAction {
    HideNotification,
    RemoveNotification,
    Redirect(String),
    SwitchForm(AuthForm),
}

impl TimerAction {
    pub fn kind(&self) -> TimerKind {
        match self {
            Self::HideNotification => TimerKind::NotificationHide,
            Self::RemoveNotification => TimerKind::NotificationRemove,
            Self::Redirect(_) => TimerKind::Redirect,
            Self::SwitchForm(_) => TimerKind::FormSwitch,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimerTicket {
    pub generation: u64,
    pub delay: Duration,
    pub action: TimerAction,
}

impl TimerTicket {
    pub fn kind(&self) -> TimerKind {
        self.action.kind()
    }
}

/// Generation counters per timer kind, shared by everything that arms timers.
#[derive(Clone, Debug, Default)]
pub struct Timers {
    generations: Rc<RefCell<HashMap<TimerKind, u64>>>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer, superseding any pending one of the same kind.
    pub fn arm(&self, delay: Duration, action: TimerAction) -> TimerTicket {
        let mut generations = self.generations.borrow_mut();
        let generation = generations.entry(action.kind()).or_insert(0);
        *generation += 1;
        TimerTicket {
            generation: *generation,
            delay,
            action,
        }
    }

    pub fn cancel(&self, kind: TimerKind) {
        *self.generations.borrow_mut().entry(kind).or_insert(0) += 1;
    }

    pub fn is_current(&self, ticket: &TimerTicket) -> bool {
        self.generations.borrow().get(&ticket.kind()) == Some(&ticket.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rearming_supersedes_previous_ticket() {
        let timers = Timers::new();
        let first = timers.arm(Duration::from_millis(1500), TimerAction::Redirect("/".into()));
        assert!(timers.is_current(&first));

        let second = timers.arm(Duration::from_millis(1500), TimerAction::Redirect("/auth".into()));
        assert!(!timers.is_current(&first));
        assert!(timers.is_current(&second));
    }

    #[test]
    fn test_kinds_are_independent() {
        let timers = Timers::new();
        let redirect = timers.arm(Duration::from_millis(1500), TimerAction::Redirect("/".into()));
        let hide = timers.arm(Duration::from_millis(5000), TimerAction::HideNotification);

        assert!(timers.is_current(&redirect));
        assert!(timers.is_current(&hide));
        assert_eq!(hide.kind(), TimerKind::NotificationHide);
    }

    #[test]
    fn test_cancel() {
        let timers = Timers::new();
        let ticket = timers.arm(
            Duration::from_millis(2000),
            TimerAction::SwitchForm(AuthForm::Login),
        );
        timers.cancel(TimerKind::FormSwitch);
        assert!(!timers.is_current(&ticket));

        // Cancelling a kind that was never armed is harmless.
        timers.cancel(TimerKind::Redirect);
    }

    #[test]
    fn test_clones_share_generations() {
        let timers = Timers::new();
        let shared = timers.clone();
        let ticket = timers.arm(Duration::ZERO, TimerAction::HideNotification);
        shared.cancel(TimerKind::NotificationHide);
        assert!(!timers.is_current(&ticket));
    }
}
