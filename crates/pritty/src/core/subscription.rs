//! Cancellation handles for host observers and timers.

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;
use std::time::Duration;

use super::host::Scheduler;

/// A live observer, listener or timer registered with the host.
///
/// Cancelling is idempotent. Dropping a subscription cancels it.
#[must_use = "dropping a Subscription cancels it"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to release.
    pub fn inert() -> Self {
        Self { cancel: None }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// How an [`ExpiringWatch`] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The probe succeeded on some notification.
    Fired,
    /// The deadline passed first.
    Expired,
    Cancelled,
}

enum WatchState {
    Armed {
        observer: Option<Subscription>,
        deadline: Option<Subscription>,
    },
    Settled(WatchOutcome),
}

/// A self-disconnecting observer with a deadline.
///
/// On every notification from the observed source, `probe` runs; the first
/// time it returns `true` the watch settles as [`WatchOutcome::Fired`] and
/// releases both the observer and the deadline timer, so `probe` never
/// succeeds twice. If the deadline passes first, the observer is released
/// silently. Dropping the last handle cancels the watch.
#[derive(Clone)]
pub struct ExpiringWatch {
    state: Rc<RefCell<WatchState>>,
}

impl ExpiringWatch {
    pub fn start<S: Scheduler + ?Sized>(
        scheduler: &S,
        timeout: Duration,
        subscribe: impl FnOnce(Box<dyn Fn()>) -> Subscription,
        probe: impl Fn() -> bool + 'static,
    ) -> Self {
        let state = Rc::new(RefCell::new(WatchState::Armed {
            observer: None,
            deadline: None,
        }));

        let on_notify = {
            let state = Rc::downgrade(&state);
            move || {
                let Some(state) = state.upgrade() else { return };
                if !matches!(*state.borrow(), WatchState::Armed { .. }) {
                    return;
                }
                if probe() {
                    settle(&state, WatchOutcome::Fired);
                }
            }
        };
        let observer = subscribe(Box::new(on_notify));

        let deadline = {
            let state = Rc::downgrade(&state);
            scheduler.delay(
                timeout,
                Box::new(move || {
                    if let Some(state) = state.upgrade() {
                        settle(&state, WatchOutcome::Expired);
                    }
                }),
            )
        };

        // Either subscription may already have settled the watch while starting.
        if let WatchState::Armed {
            observer: slot_observer,
            deadline: slot_deadline,
        } = &mut *state.borrow_mut()
        {
            *slot_observer = Some(observer);
            *slot_deadline = Some(deadline);
        }

        Self { state }
    }

    pub fn outcome(&self) -> Option<WatchOutcome> {
        match *self.state.borrow() {
            WatchState::Armed { .. } => None,
            WatchState::Settled(outcome) => Some(outcome),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.outcome().is_none()
    }

    pub fn cancel(&self) {
        settle(&self.state, WatchOutcome::Cancelled);
    }
}

impl fmt::Debug for ExpiringWatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiringWatch")
            .field("outcome", &self.outcome())
            .finish()
    }
}

/// Settles an armed watch. Subscriptions are released after the borrow ends
/// so cancel callbacks may freely touch the host.
fn settle(state: &RefCell<WatchState>, outcome: WatchOutcome) {
    let previous = {
        let mut current = state.borrow_mut();
        if !matches!(*current, WatchState::Armed { .. }) {
            return;
        }
        mem::replace(&mut *current, WatchState::Settled(outcome))
    };
    drop(previous);
}
