use std::cell::RefCell;

use crate::{caller::CallerData, subscription::unsubscribe_isolated, Subscription};

/// Owner of subscription lifetimes.
///
/// Every subscription is registered with a tracker, which is expected to
/// unsubscribe it once the object the subscription acts upon is destroyed.
pub trait DisposableTracker {
    fn track(&self, subscription: Subscription, caller: CallerData);
}

/// Tracker that ignores everything. The caller is responsible for keeping
/// the subscription alive and for unsubscribing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpDisposableTracker;

impl DisposableTracker for NoOpDisposableTracker {
    fn track(&self, _: Subscription, _: CallerData) {}
}

/// Holds on to tracked subscriptions and unsubscribes all of them on
/// [`dispose`](Disposables::dispose) or when dropped.
#[derive(Debug, Default)]
pub struct Disposables {
    tracked: RefCell<Vec<(Subscription, CallerData)>>,
}

impl Disposables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracked.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.borrow().is_empty()
    }

    /// Unsubscribes everything tracked so far, returning how many
    /// subscriptions were still active.
    pub fn dispose(&self) -> usize {
        let tracked = self.tracked.take();
        let mut count = 0;

        for (subscription, caller) in &tracked {
            if subscription.is_subscribed() {
                tracing::trace!(%caller, "disposing subscription");
                count += 1;
            }

            unsubscribe_isolated(subscription);
        }

        count
    }
}

impl DisposableTracker for Disposables {
    fn track(&self, subscription: Subscription, caller: CallerData) {
        let mut tracked = self.tracked.borrow_mut();

        tracked.retain(|(it, _)| it.is_subscribed());
        tracked.push((subscription, caller));
    }
}

impl Drop for Disposables {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod test {
    use crate::prelude::*;

    #[test]
    fn smoke() {
        let tracker = Disposables::new();
        let subject = Subject::<i32>::new();
        let sub = subject.subscribe(&tracker, |_| {});

        assert_eq!(tracker.len(), 1);
        assert_eq!(subject.subscribers(), 1);
        assert_eq!(tracker.dispose(), 1);
        assert!(!sub.is_subscribed());
        assert_eq!(subject.subscribers(), 0);
        assert!(tracker.is_empty());
    }

    #[test]
    fn drop_disposes() {
        let subject = Subject::<i32>::new();
        let sub = {
            let tracker = Disposables::new();

            subject.subscribe(&tracker, |_| {})
        };

        assert!(!sub.is_subscribed());
        assert_eq!(subject.subscribers(), 0);
    }
}
