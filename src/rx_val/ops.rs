use std::{cell::RefCell, rc::Rc};

use crate::{NoOpDisposableTracker, Subscription};

use super::RxVal;

impl<A: Clone + 'static> RxVal<A> {
    pub fn map<B>(&self, f: impl Fn(&A) -> B + 'static) -> RxVal<B>
    where
        B: Clone + PartialEq + 'static,
    {
        let initial = f(&self.value());

        RxVal::from_source(initial, |setter| {
            self.subscribe_without_emit(&NoOpDisposableTracker, move |it| setter.set(f(it)))
        })
    }

    /// Replaces values not matching `predicate` with `on_filtered()`.
    pub fn filter(
        &self,
        predicate: impl Fn(&A) -> bool + 'static,
        on_filtered: impl Fn() -> A + 'static,
    ) -> RxVal<A>
    where
        A: PartialEq,
    {
        self.map(move |it| if predicate(it) { it.clone() } else { on_filtered() })
    }

    /// Follows the value returned by `f` for the latest value of this one.
    /// Only the latest inner value is subscribed to.
    pub fn flat_map<B>(&self, f: impl Fn(&A) -> RxVal<B> + 'static) -> RxVal<B>
    where
        B: Clone + PartialEq + 'static,
    {
        let first = f(&self.value());

        RxVal::from_source(first.value(), |setter| {
            let current = Rc::new(RefCell::new(Subscription::empty()));
            let follow = {
                let current = Rc::clone(&current);

                move |rx: RxVal<B>| {
                    current.replace(Subscription::empty()).unsubscribe();

                    let setter = setter.clone();
                    // Adopts the current value of `rx` right away.
                    let subscription =
                        rx.subscribe(&NoOpDisposableTracker, move |it| setter.set(it.clone()));

                    current.replace(subscription).unsubscribe();
                }
            };

            follow(first);

            self.subscribe_without_emit(&NoOpDisposableTracker, move |it| follow(f(it)))
                .and_then(move || {
                    current.replace(Subscription::empty()).unsubscribe();
                })
        })
    }
}

/// The value of `rx` wrapped in `Some`, or a constant `None` when there is
/// no value to follow.
pub fn extract<A: Clone + PartialEq + 'static>(rx: Option<&RxVal<A>>) -> RxVal<Option<A>> {
    match rx {
        Some(rx) => rx.map(|it| Some(it.clone())),
        None => RxVal::constant(None),
    }
}

impl<A: Clone + 'static> RxVal<Option<A>> {
    pub fn opt_map<B>(&self, f: impl Fn(&A) -> B + 'static) -> RxVal<Option<B>>
    where
        B: Clone + PartialEq + 'static,
    {
        self.map(move |it| it.as_ref().map(&f))
    }

    /// Follows the value returned by `f` while this one is defined and is
    /// `None` otherwise.
    pub fn opt_flat_map<B>(&self, f: impl Fn(&A) -> RxVal<Option<B>> + 'static) -> RxVal<Option<B>>
    where
        B: Clone + PartialEq + 'static,
    {
        self.flat_map(move |it| match it {
            Some(it) => f(it),
            None => RxVal::constant(None),
        })
    }
}

#[cfg(test)]
mod test {
    use std::{cell::RefCell, rc::Rc};

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
        let parity = rx.map(|v| v % 2 == 0);
        let events = record(&parity, &tracker);

        rx.set(3);
        rx.set(4);
        rx.set(6);

        assert_eq!(*events.borrow(), [false, true]);
        assert!(parity.value());
    }

    #[test]
    fn derived_chain_survives_without_intermediate_handles() {
        let tracker = Disposables::new();
        let rx = RxRef::new(1);
        let events = record(&rx.map(|v| v * 2).map(|v| v + 1), &tracker);

        rx.set(2);

        assert_eq!(*events.borrow(), [3, 5]);

        tracker.dispose();

        assert_eq!(rx.subscribers(), 0);
    }

    #[test]
    fn filter_replaces_rejected_values() {
        let tracker = Disposables::new();
        let rx = RxRef::new(5);
        let events = record(&rx.filter(|v| *v > 0, || 0), &tracker);

        rx.set(-3);
        rx.set(-4);
        rx.set(2);

        assert_eq!(*events.borrow(), [5, 0, 2]);
    }

    #[test]
    fn flat_map_follows_latest_inner_value() {
        let tracker = Disposables::new();
        let inners = Rc::new([RxRef::new(10), RxRef::new(20)]);
        let selector = RxRef::new(0usize);
        let flat = selector.flat_map({
            let inners = inners.clone();
            move |idx| inners[*idx].rx_val()
        });
        let events = record(&flat, &tracker);

        assert_eq!(inners[0].subscribers(), 1);

        inners[0].set(11);
        selector.set(1);
        inners[0].set(12);
        inners[1].set(21);

        assert_eq!(*events.borrow(), [10, 11, 20, 21]);
        assert_eq!(inners[0].subscribers(), 0);
        assert_eq!(inners[1].subscribers(), 1);

        tracker.dispose();
        drop(flat);

        assert_eq!(inners[1].subscribers(), 0);
        assert_eq!(selector.subscribers(), 0);
    }

    #[test]
    fn extract_optional_value() {
        let rx = RxRef::new(1);
        let extracted = extract(Some(&*rx));

        rx.set(2);

        assert_eq!(extracted.value(), Some(2));
        assert_eq!(extract::<i32>(None).value(), None);
    }

    #[test]
    fn opt_map_and_opt_flat_map() {
        let tracker = Disposables::new();
        let rx = RxRef::new(None::<i32>);
        let inner = RxRef::new(Some("x"));
        let mapped = record(&rx.opt_map(|v| v * 10), &tracker);
        let flat = record(
            &rx.opt_flat_map({
                let inner = inner.rx_val();
                move |_| inner.clone()
            }),
            &tracker,
        );

        rx.set(Some(1));
        inner.set(None);
        rx.set(None);
        inner.set(Some("y"));

        assert_eq!(*mapped.borrow(), [None, Some(10), None]);
        assert_eq!(*flat.borrow(), [None, Some("x"), None]);
    }
}
