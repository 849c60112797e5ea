use std::{
    cell::{Cell, RefCell},
    fmt,
    panic::{catch_unwind, AssertUnwindSafe},
    rc::{Rc, Weak},
};

pub mod tracker;

/// Handle that represents an active listener.
///
/// Clones share the same state: unsubscribing through any clone
/// unsubscribes all of them.
#[derive(Clone)]
#[must_use = "dropping a subscription without tracking it is reported as a leak"]
pub struct Subscription {
    inner: Rc<SubscriptionInner>,
}

pub(crate) struct SubscriptionInner {
    subscribed: Cell<bool>,
    on_unsubscribe: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl SubscriptionInner {
    pub(crate) fn is_subscribed(&self) -> bool {
        self.subscribed.get()
    }

    pub(crate) fn unsubscribe(&self) -> bool {
        if !self.subscribed.replace(false) {
            return false;
        }

        let action = self.on_unsubscribe.borrow_mut().take();

        if let Some(action) = action {
            action();
        }

        true
    }
}

impl Subscription {
    pub fn new(on_unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            inner: Rc::new(SubscriptionInner {
                subscribed: Cell::new(true),
                on_unsubscribe: RefCell::new(Some(Box::new(on_unsubscribe))),
            }),
        }
    }

    /// An already unsubscribed subscription.
    pub fn empty() -> Self {
        Self {
            inner: Rc::new(SubscriptionInner {
                subscribed: Cell::new(false),
                on_unsubscribe: RefCell::new(None),
            }),
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.inner.is_subscribed()
    }

    /// Runs the disposer. Returns `true` only for the call that actually
    /// transitioned this subscription to the unsubscribed state.
    pub fn unsubscribe(&self) -> bool {
        self.inner.unsubscribe()
    }

    /// Unsubscribes `self`, then runs `action`.
    pub fn and_then(&self, action: impl FnOnce() + 'static) -> Subscription {
        let this = self.clone();

        Subscription::new(move || {
            unsubscribe_isolated(&this);
            action();
        })
    }

    pub fn join(&self, other: &Subscription) -> Subscription {
        Subscription::join_all([self.clone(), other.clone()])
    }

    /// Combines many subscriptions into one. Every part is unsubscribed even
    /// if an earlier one panics.
    pub fn join_all(subscriptions: impl IntoIterator<Item = Subscription>) -> Subscription {
        let subscriptions = subscriptions.into_iter().collect::<Vec<_>>();

        Subscription::new(move || {
            for it in &subscriptions {
                unsubscribe_isolated(it);
            }
        })
    }

    /// Ties this subscription to the returned guard's scope.
    pub fn guard(self) -> SubscriptionGuard {
        SubscriptionGuard(self)
    }

    pub(crate) fn downgrade(&self) -> Weak<SubscriptionInner> {
        Rc::downgrade(&self.inner)
    }

    #[cfg(feature = "strong-subscriptions")]
    pub(crate) fn inner(&self) -> Rc<SubscriptionInner> {
        Rc::clone(&self.inner)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("is_subscribed", &self.is_subscribed())
            .finish()
    }
}

/// Unsubscribes the wrapped subscription when dropped.
#[derive(Debug)]
pub struct SubscriptionGuard(Subscription);

impl SubscriptionGuard {
    pub fn subscription(&self) -> &Subscription {
        &self.0
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.0.unsubscribe();
    }
}

pub(crate) fn unsubscribe_isolated(subscription: &Subscription) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(|| subscription.unsubscribe())) {
        let message = payload
            .downcast_ref::<&str>()
            .map(|it| (*it).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_default();

        tracing::error!(%message, "disposer panicked while unsubscribing");
    }
}
