//! The push based event core.
//!
//! All references point backwards: a transformation holds its sources (and its
//! upstream [`Subscription`]) strongly, while sources only reach a
//! transformation through a weak [`Observer`]. A transformation listens to its
//! sources only while somebody listens to it.
//!
//! Emission is re-entrant safe:
//!
//! - a subscriber added while an event is being delivered does not receive
//!   that event;
//! - a value submitted while an event is being delivered is queued and
//!   delivered to every subscriber once the current event has reached all of
//!   them.

use std::{
    cell::{Cell, RefCell},
    fmt,
    panic::{catch_unwind, AssertUnwindSafe},
    rc::{Rc, Weak},
};

use smallvec::SmallVec;

use crate::{
    caller::CallerData,
    error::RxError,
    subscription::{tracker::DisposableTracker, unsubscribe_isolated},
    Subscription,
};

mod sub;

use sub::{Sub, SubState};

pub(crate) type Callback<A> = Rc<dyn Fn(&A)>;
type SubscribeFn<A> = Box<dyn Fn(Observer<A>) -> Subscription>;

pub struct Observable<A> {
    inner: Rc<ObservableInner<A>>,
}

struct ObservableInner<A> {
    state: RefCell<State<A>>,
    source: Option<SourceProps<A>>,
}

struct State<A> {
    subscriptions: Vec<Sub<A>>,
    pending_submits: SmallVec<[A; 2]>,
    // Are we currently iterating through subscriptions?
    iterating: bool,
    pending_activations: usize,
    pending_removals: usize,
    next_id: u64,
}

impl<A> State<A> {
    fn subscribers(&self) -> usize {
        self.subscriptions
            .len()
            .saturating_sub(self.pending_activations + self.pending_removals)
    }

    fn has_listeners(&self) -> bool {
        self.subscriptions.iter().any(|it| !it.have_unsubscribed())
    }
}

/// Present when the observable is a transformation of other observables.
struct SourceProps<A> {
    subscribe_fn: SubscribeFn<A>,
    subscription: RefCell<Option<Subscription>>,
    subscribing: Cell<bool>,
}

/// The push side of a transformation, handed to its subscribe function.
///
/// Holds the observable weakly, so that sources never keep their
/// transformations alive.
pub struct Observer<A> {
    target: Weak<ObservableInner<A>>,
}

impl<A: 'static> Observer<A> {
    pub fn push(&self, value: A) {
        if let Some(inner) = self.target.upgrade() {
            Observable { inner }.submit(value);
        }
    }

    pub fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }
}

impl<A> Clone for Observer<A> {
    fn clone(&self) -> Self {
        Self {
            target: Weak::clone(&self.target),
        }
    }
}

impl<A> Clone for Observable<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A> fmt::Debug for Observable<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();

        f.debug_struct("Observable")
            .field("subscribers", &state.subscribers())
            .field("iterating", &state.iterating)
            .field("transformation", &self.inner.source.is_some())
            .finish()
    }
}

impl<A: 'static> Observable<A> {
    /// Creates a transformation. `subscribe_fn` is invoked whenever the
    /// first subscriber arrives and the subscription it returns is released
    /// when the last one leaves.
    pub fn new(subscribe_fn: impl Fn(Observer<A>) -> Subscription + 'static) -> Self {
        Self::with_source(Some(SourceProps {
            subscribe_fn: Box::new(subscribe_fn),
            subscription: RefCell::new(None),
            subscribing: Cell::new(false),
        }))
    }

    /// An observable that never emits.
    pub fn empty() -> Self {
        Self::new(|_| Subscription::empty())
    }

    /// A plain observable without a source; values enter it through
    /// [`submit`](Observable::submit).
    pub(crate) fn source() -> Self {
        Self::with_source(None)
    }

    fn with_source(source: Option<SourceProps<A>>) -> Self {
        Self {
            inner: Rc::new(ObservableInner {
                state: RefCell::new(State {
                    subscriptions: Vec::new(),
                    pending_submits: SmallVec::new(),
                    iterating: false,
                    pending_activations: 0,
                    pending_removals: 0,
                    next_id: 0,
                }),
                source,
            }),
        }
    }

    /// Number of active subscribers, not counting subscribers that are
    /// pending activation or removal.
    pub fn subscribers(&self) -> usize {
        self.inner.state.borrow().subscribers()
    }

    /// Subscribes `on_event` to every subsequent event.
    ///
    /// The subscription is registered with `tracker`. When the observable
    /// finds the subscription handle dropped while still subscribed, the
    /// leak is reported together with the call site of this method.
    #[track_caller]
    pub fn subscribe(
        &self,
        tracker: &dyn DisposableTracker,
        on_event: impl Fn(&A) + 'static,
    ) -> Subscription {
        self.subscribe_at(tracker, Rc::new(on_event), CallerData::caller())
    }

    pub(crate) fn subscribe_at(
        &self,
        tracker: &dyn DisposableTracker,
        on_event: Callback<A>,
        caller: CallerData,
    ) -> Subscription {
        let subscription = {
            let mut state = self.inner.state.borrow_mut();
            let id = state.next_id;
            let inner = Rc::clone(&self.inner);
            let subscription = Subscription::new(move || Observable { inner }.unsubscribe_id(id));
            let active = !state.iterating;

            state.next_id += 1;
            state
                .subscriptions
                .push(Sub::new(id, on_event, active, &subscription, caller));

            if !active {
                state.pending_activations += 1;
            }

            subscription
        };

        tracker.track(subscription.clone(), caller);

        if let Some(source) = &self.inner.source {
            self.try_subscribe_to_source(source);
        }

        subscription
    }

    /// Delivers `value` to every active subscriber.
    pub(crate) fn submit(&self, value: A) {
        {
            let mut state = self.inner.state.borrow_mut();

            if state.iterating {
                state.pending_submits.push(value);

                return;
            }
        }

        let mut next = Some(value);

        while let Some(value) = next {
            self.inner.state.borrow_mut().iterating = true;

            let broken_subs_detected = self.deliver(&value);

            self.inner.state.borrow_mut().iterating = false;
            self.after_iteration(broken_subs_detected);

            next = {
                let mut state = self.inner.state.borrow_mut();

                if state.pending_submits.is_empty() {
                    None
                } else {
                    Some(state.pending_submits.remove(0))
                }
            };
        }
    }

    pub(crate) fn observer(&self) -> Observer<A> {
        Observer {
            target: Rc::downgrade(&self.inner),
        }
    }

    fn deliver(&self, value: &A) -> bool {
        let mut broken_subs_detected = false;
        let mut idx = 0;

        loop {
            let target = {
                let state = self.inner.state.borrow();
                let Some(sub) = state.subscriptions.get(idx) else {
                    break;
                };

                idx += 1;

                if !sub.active {
                    continue;
                }

                match sub.state() {
                    SubState::Subscribed => Some((sub.id, Rc::clone(&sub.on_event), sub.caller)),
                    SubState::Unsubscribed => None,
                    SubState::Broken => {
                        // Reported when the record is purged.
                        broken_subs_detected = true;

                        None
                    }
                }
            };

            let Some((id, on_event, caller)) = target else {
                continue;
            };

            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| on_event(value))) {
                let error = RxError::panicked(caller, payload.as_ref());

                tracing::error!(%error, "exception on event, unsubscribing");
                self.force_unsubscribe(id);
            }
        }

        broken_subs_detected
    }

    fn force_unsubscribe(&self, id: u64) {
        let handle = self
            .inner
            .state
            .borrow()
            .subscriptions
            .iter()
            .find(|it| it.id == id)
            .and_then(|it| it.handle());

        if let Some(handle) = handle {
            handle.unsubscribe();
        }

        self.unsubscribe_id(id);
    }

    fn unsubscribe_id(&self, id: u64) {
        let iterating = {
            let mut state = self.inner.state.borrow_mut();
            let state = &mut *state;
            let Some(sub) = state.subscriptions.iter_mut().find(|it| it.id == id) else {
                return;
            };

            if sub.have_unsubscribed() {
                return;
            }

            let was_pending = !sub.active;

            sub.unsubscribe();

            if was_pending {
                state.pending_activations -= 1;
            }

            state.pending_removals += 1;
            state.iterating
        };

        if !iterating {
            self.after_iteration(false);
        }
    }

    fn after_iteration(&self, broken_subs_detected: bool) {
        // Records are dropped outside of the borrow, their callbacks may own
        // values whose destructors reach back into this observable.
        let mut removed = Vec::new();
        let teardown = {
            let mut state = self.inner.state.borrow_mut();

            if state.pending_activations != 0 {
                for sub in state.subscriptions.iter_mut() {
                    if !sub.have_unsubscribed() {
                        sub.active = true;
                    }
                }

                state.pending_activations = 0;
            }

            if broken_subs_detected || state.pending_removals != 0 {
                let (kept, dropped): (Vec<_>, Vec<_>) = std::mem::take(&mut state.subscriptions)
                    .into_iter()
                    .partition(|it| it.state() == SubState::Subscribed);

                for sub in dropped.iter().filter(|it| it.state() == SubState::Broken) {
                    let error = RxError::LeakedSubscription { caller: sub.caller };

                    tracing::error!(%error, "You should always properly track your subscriptions");
                }

                state.subscriptions = kept;
                state.pending_removals = 0;
                removed = dropped;

                state.subscribers() == 0
            } else {
                false
            }
        };

        drop(removed);

        if teardown {
            if let Some(source) = &self.inner.source {
                Self::try_unsubscribe_from_source(source);
            }
        }
    }

    fn try_subscribe_to_source(&self, source: &SourceProps<A>) {
        if source.subscribing.get() || source.subscription.borrow().is_some() {
            return;
        }

        source.subscribing.set(true);

        let subscription = (source.subscribe_fn)(self.observer());

        source.subscribing.set(false);
        tracing::trace!("transformation subscribed to its source");

        if !self.inner.state.borrow().has_listeners() {
            // Everybody left while the source was replaying into us.
            unsubscribe_isolated(&subscription);
        } else {
            source.subscription.replace(Some(subscription));
        }
    }

    fn try_unsubscribe_from_source(source: &SourceProps<A>) {
        let subscription = source.subscription.borrow_mut().take();

        if let Some(it) = subscription {
            tracing::trace!("transformation unsubscribed from its source");
            unsubscribe_isolated(&it);
        }
    }
}

/// Invokes `on_event` outside of an emission, as when replaying to a new
/// subscriber. A panic is logged and unsubscribes `subscription`; returns
/// whether the callback completed.
pub(crate) fn emit_isolated<A>(
    on_event: &dyn Fn(&A),
    value: &A,
    subscription: &Subscription,
    caller: CallerData,
) -> bool {
    match catch_unwind(AssertUnwindSafe(|| on_event(value))) {
        Ok(()) => true,
        Err(payload) => {
            let error = RxError::panicked(caller, payload.as_ref());

            tracing::error!(%error, "exception on event, unsubscribing");
            subscription.unsubscribe();

            false
        }
    }
}

impl<A> Drop for ObservableInner<A> {
    fn drop(&mut self) {
        if let Some(it) = self
            .source
            .as_mut()
            .and_then(|source| source.subscription.get_mut().take())
        {
            unsubscribe_isolated(&it);
        }
    }
}
