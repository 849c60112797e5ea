use crate::{NoOpDisposableTracker, Observable, Subscription};

use super::{forward, AsObservable};

/// Emits the events of every observable in `observables`.
pub fn join_all<O>(observables: impl IntoIterator<Item = O>) -> Observable<O::Item>
where
    O: AsObservable,
    O::Item: Clone,
{
    let sources = observables
        .into_iter()
        .map(|it| it.as_observable())
        .collect::<Vec<_>>();

    Observable::new(move |observer| {
        Subscription::join_all(
            sources
                .iter()
                .map(|it| it.subscribe(&NoOpDisposableTracker, forward(observer.clone())))
                .collect::<Vec<_>>(),
        )
    })
}

#[cfg(test)]
mod test {
    use std::{cell::RefCell, rc::Rc};

    use crate::prelude::*;

    #[test]
    fn smoke() {
        let tracker = Disposables::new();
        let a = Subject::new();
        let b = Subject::new();
        let c = Subject::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let _sub = join_all([a.as_observable(), b.as_observable(), c.as_observable()]).subscribe(&tracker, {
            let events = events.clone();
            move |v: &i32| events.borrow_mut().push(*v)
        });

        a.push(1);
        c.push(3);
        b.push(2);

        assert_eq!(*events.borrow(), [1, 3, 2]);

        tracker.dispose();

        assert_eq!(a.subscribers() + b.subscribers() + c.subscribers(), 0);
    }

    #[test]
    fn join_and_join_discard() {
        let tracker = Disposables::new();
        let a = Subject::<i32>::new();
        let b = Subject::<&'static str>::new();
        let joined = Rc::new(RefCell::new(Vec::new()));
        let ticks = Rc::new(RefCell::new(0));
        let _sub = a.join(&a.map(|v| v * 10)).subscribe(&tracker, {
            let joined = joined.clone();
            move |v| joined.borrow_mut().push(*v)
        });
        let _sub = a.join_discard(&b).subscribe(&tracker, {
            let ticks = ticks.clone();
            move |_| *ticks.borrow_mut() += 1
        });

        a.push(1);
        b.push("x");

        assert_eq!(*joined.borrow(), [1, 10]);
        assert_eq!(*ticks.borrow(), 2);
    }
}
