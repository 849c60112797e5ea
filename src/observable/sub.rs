#[cfg(not(feature = "strong-subscriptions"))]
use std::rc::Weak;
use std::rc::Rc;

use crate::{caller::CallerData, subscription::SubscriptionInner, Subscription};

use super::Callback;

#[cfg(not(feature = "strong-subscriptions"))]
type Handle = Weak<SubscriptionInner>;
#[cfg(feature = "strong-subscriptions")]
type Handle = Rc<SubscriptionInner>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SubState {
    Subscribed,
    Unsubscribed,
    /// The subscription handle was dropped while the record was still live.
    Broken,
}

/// Subscriber record owned by an observable.
pub(super) struct Sub<A> {
    pub(super) id: u64,
    pub(super) on_event: Callback<A>,
    /// Subscriptions made while the observable is emitting start inactive.
    pub(super) active: bool,
    pub(super) caller: CallerData,
    have_unsubscribed: bool,
    handle: Handle,
}

impl<A> Sub<A> {
    pub(super) fn new(
        id: u64,
        on_event: Callback<A>,
        active: bool,
        subscription: &Subscription,
        caller: CallerData,
    ) -> Self {
        #[cfg(not(feature = "strong-subscriptions"))]
        let handle = subscription.downgrade();
        #[cfg(feature = "strong-subscriptions")]
        let handle = subscription.inner();

        Self {
            id,
            on_event,
            active,
            caller,
            have_unsubscribed: false,
            handle,
        }
    }

    pub(super) fn have_unsubscribed(&self) -> bool {
        self.have_unsubscribed
    }

    pub(super) fn unsubscribe(&mut self) {
        self.active = false;
        self.have_unsubscribed = true;
    }

    pub(super) fn handle(&self) -> Option<Rc<SubscriptionInner>> {
        #[cfg(not(feature = "strong-subscriptions"))]
        return self.handle.upgrade();
        #[cfg(feature = "strong-subscriptions")]
        return Some(Rc::clone(&self.handle));
    }

    pub(super) fn state(&self) -> SubState {
        if self.have_unsubscribed {
            return SubState::Unsubscribed;
        }

        match self.handle() {
            Some(it) if it.is_subscribed() => SubState::Subscribed,
            Some(_) => SubState::Unsubscribed,
            None => SubState::Broken,
        }
    }
}
