//! Reactive values: observables that always hold a current value.
//!
//! An [`RxVal`] delivers its current value to every subscriber as soon as it
//! subscribes, then every change after that. Values equal to the current one
//! (by the value's comparer) are swallowed. Derived values subscribe to their
//! sources eagerly and stay subscribed for as long as they are alive.

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use crate::{
    caller::CallerData,
    observable::{emit_isolated, Callback},
    observable_ext::{forward, AsObservable},
    subscription::unsubscribe_isolated,
    DisposableTracker, NoOpDisposableTracker, Observable, Subscription,
};

mod ops;
mod rx_ref;
mod traverse;
mod zip;

pub use ops::extract;
pub use rx_ref::RxRef;
pub use traverse::{any_defined, any_of, any_that, traverse};
pub use zip::{zip2, zip3, zip4, zip5, zip6};

type EqFn<A> = Box<dyn Fn(&A, &A) -> bool>;

/// A read only reactive value.
pub struct RxVal<A> {
    inner: Rc<RxValInner<A>>,
}

struct RxValInner<A> {
    observable: Observable<A>,
    value: RefCell<A>,
    are_equal: EqFn<A>,
    source: RefCell<Option<Subscription>>,
}

impl<A: Clone + 'static> RxValInner<A> {
    fn set(&self, value: A) -> bool {
        if (self.are_equal)(&self.value.borrow(), &value) {
            return false;
        }

        self.value.replace(value.clone());
        self.observable.submit(value);

        true
    }
}

impl<A> Drop for RxValInner<A> {
    fn drop(&mut self) {
        if let Some(it) = self.source.get_mut().take() {
            unsubscribe_isolated(&it);
        }
    }
}

/// Write access to a derived value, handed to the subscribe function of
/// [`RxVal::from_source`]. Does not keep the value alive.
pub struct Setter<A> {
    target: Weak<RxValInner<A>>,
}

impl<A: Clone + 'static> Setter<A> {
    pub fn set(&self, value: A) {
        if let Some(inner) = self.target.upgrade() {
            inner.set(value);
        }
    }
}

impl<A> Clone for Setter<A> {
    fn clone(&self) -> Self {
        Self {
            target: Weak::clone(&self.target),
        }
    }
}

impl<A> Clone for RxVal<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A: fmt::Debug + 'static> fmt::Debug for RxVal<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RxVal")
            .field("value", &*self.inner.value.borrow())
            .field("subscribers", &self.inner.observable.subscribers())
            .finish()
    }
}

impl<A: Clone + 'static> RxVal<A> {
    pub(crate) fn with_eq(initial: A, are_equal: impl Fn(&A, &A) -> bool + 'static) -> Self {
        Self {
            inner: Rc::new(RxValInner {
                observable: Observable::source(),
                value: RefCell::new(initial),
                are_equal: Box::new(are_equal),
                source: RefCell::new(None),
            }),
        }
    }

    /// Creates a value driven by `subscribe`, which is invoked right away.
    /// The subscription it returns lives as long as the value does.
    pub fn from_source(initial: A, subscribe: impl FnOnce(Setter<A>) -> Subscription) -> Self
    where
        A: PartialEq,
    {
        let rx = Self::with_eq(initial, |a, b| a == b);
        let subscription = subscribe(Setter {
            target: Rc::downgrade(&rx.inner),
        });

        rx.inner.source.replace(Some(subscription));

        rx
    }

    pub fn constant(value: A) -> Self
    where
        A: PartialEq,
    {
        Self::from_source(value, |_| Subscription::empty())
    }

    pub fn value(&self) -> A {
        self.inner.value.borrow().clone()
    }

    pub fn subscribers(&self) -> usize {
        self.inner.observable.subscribers()
    }

    /// Subscribes to changes and immediately invokes `on_event` with the
    /// current value.
    #[track_caller]
    pub fn subscribe(
        &self,
        tracker: &dyn DisposableTracker,
        on_event: impl Fn(&A) + 'static,
    ) -> Subscription {
        let caller = CallerData::caller();
        let on_event = self.retaining(on_event);
        let subscription = self
            .inner
            .observable
            .subscribe_at(tracker, Rc::clone(&on_event), caller);
        let current = self.value();

        emit_isolated(&*on_event, &current, &subscription, caller);

        subscription
    }

    /// Subscribes to changes only.
    #[track_caller]
    pub fn subscribe_without_emit(
        &self,
        tracker: &dyn DisposableTracker,
        on_event: impl Fn(&A) + 'static,
    ) -> Subscription {
        self.inner
            .observable
            .subscribe_at(tracker, self.retaining(on_event), CallerData::caller())
    }

    /// An event source emitting `f` of the current value on subscription and
    /// of every subsequent value.
    pub fn to_event_source<B: 'static>(&self, f: impl Fn(&A) -> B + 'static) -> Observable<B> {
        let source = self.clone();
        let f = Rc::new(f);

        Observable::new(move |observer| {
            let f = Rc::clone(&f);

            source.subscribe(&NoOpDisposableTracker, move |it| observer.push(f(it)))
        })
    }

    pub(crate) fn set(&self, value: A) -> bool {
        self.inner.set(value)
    }

    fn retaining(&self, on_event: impl Fn(&A) + 'static) -> Callback<A> {
        let inner = Rc::clone(&self.inner);

        Rc::new(move |it: &A| {
            // Subscribers keep the value alive.
            let _ = &inner;

            on_event(it)
        })
    }
}

impl<A: Clone + 'static> AsObservable for RxVal<A> {
    type Item = A;

    /// A transformation whose first subscriber receives the current value.
    fn as_observable(&self) -> Observable<A> {
        let source = self.clone();

        Observable::new(move |observer| source.subscribe(&NoOpDisposableTracker, forward(observer)))
    }
}

#[cfg(test)]
mod test {
    use std::{cell::RefCell, rc::Rc};

    use tracing_test::traced_test;

    use crate::prelude::*;

    fn record<A: Clone + 'static>(rx: &RxVal<A>, tracker: &Disposables) -> Rc<RefCell<Vec<A>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let _ = rx.subscribe(tracker, {
            let events = events.clone();
            move |it: &A| events.borrow_mut().push(it.clone())
        });

        events
    }

    #[test]
    fn smoke() {
        let tracker = Disposables::new();
        let rx = RxRef::new(1);
        let events = record(&rx, &tracker);

        assert_eq!(*events.borrow(), [1]);

        rx.set(2);
        rx.set(2);
        rx.set(3);

        assert_eq!(*events.borrow(), [1, 2, 3]);
        assert_eq!(rx.value(), 3);
    }

    #[test]
    fn subscribe_without_emit() {
        let tracker = Disposables::new();
        let rx = RxRef::new("a");
        let events = Rc::new(RefCell::new(Vec::new()));
        let _sub = rx.subscribe_without_emit(&tracker, {
            let events = events.clone();
            move |v| events.borrow_mut().push(*v)
        });

        rx.set("b");

        assert_eq!(*events.borrow(), ["b"]);
    }

    #[test]
    fn constant() {
        let tracker = Disposables::new();
        let rx = RxVal::constant(7);

        assert_eq!(*record(&rx, &tracker).borrow(), [7]);
    }

    #[test]
    fn debug_shows_current_value() {
        let rx = RxVal::constant(3);

        assert_eq!(format!("{rx:?}"), "RxVal { value: 3, subscribers: 0 }");
    }

    #[test]
    fn to_rx_val_tracks_latest_event() {
        let subject = Subject::new();
        let rx = subject.to_rx_val(0);

        assert_eq!(subject.subscribers(), 1);

        subject.push(5);

        assert_eq!(rx.value(), 5);

        drop(rx);

        assert_eq!(subject.subscribers(), 0);
    }

    #[test]
    fn to_rx_val_map_applies_mapper() {
        let subject = Subject::new();
        let rx = subject.to_rx_val_map(String::new(), |v: &i32| v.to_string());

        subject.push(5);

        assert_eq!(rx.value(), "5");
    }

    #[test]
    fn to_event_source_emits_every_value() {
        let tracker = Disposables::new();
        let rx = RxRef::new(1);
        let events = Rc::new(RefCell::new(Vec::new()));
        let _sub = rx.to_event_source(|_| ()).subscribe(&tracker, {
            let events = events.clone();
            move |_| events.borrow_mut().push(())
        });

        rx.set(2);
        rx.set(3);

        assert_eq!(events.borrow().len(), 3);
    }

    #[test]
    fn as_observable_starts_with_current_value() {
        let tracker = Disposables::new();
        let rx = RxRef::new(1);
        let events = Rc::new(RefCell::new(Vec::new()));
        let _sub = rx.as_observable().changes_opt().subscribe(&tracker, {
            let events = events.clone();
            move |v| events.borrow_mut().push(*v)
        });

        rx.set(2);

        assert_eq!(*events.borrow(), [(None, 1), (Some(1), 2)]);
    }

    #[test]
    #[traced_test]
    fn panicking_initial_emission_unsubscribes() {
        let tracker = Disposables::new();
        let rx = RxRef::new(1);
        let sub = rx.subscribe(&tracker, |_| panic!("cannot handle value"));

        assert!(!sub.is_subscribed());
        assert_eq!(rx.subscribers(), 0);
        assert!(logs_contain("cannot handle value"));
    }

    mod properties {
        use std::{cell::RefCell, rc::Rc};

        use proptest::prelude::*;

        use crate::prelude::*;

        proptest! {
            #[test]
            fn subscribers_see_current_value_then_distinct_changes(
                values in proptest::collection::vec(0u8..4, 0..32),
            ) {
                let tracker = Disposables::new();
                let rx = RxRef::new(0u8);
                let events = Rc::new(RefCell::new(Vec::new()));
                let _sub = rx.subscribe(&tracker, {
                    let events = events.clone();
                    move |v| events.borrow_mut().push(*v)
                });
                let mut expected = vec![0u8];

                for v in values {
                    rx.set(v);

                    if expected.last() != Some(&v) {
                        expected.push(v);
                    }
                }

                prop_assert_eq!(&*events.borrow(), &expected);
            }
        }
    }
}
