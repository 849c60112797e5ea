use std::{cell::Cell, rc::Rc};

use crate::{NoOpDisposableTracker, Observable};

pub(crate) fn map<A: 'static, B: 'static>(
    source: Observable<A>,
    f: impl Fn(&A) -> B + 'static,
) -> Observable<B> {
    let f = Rc::new(f);

    Observable::new(move |observer| {
        let f = Rc::clone(&f);

        source.subscribe(&NoOpDisposableTracker, move |it| observer.push(f(it)))
    })
}

pub(crate) fn filter<A: Clone + 'static>(
    source: Observable<A>,
    predicate: impl Fn(&A) -> bool + 'static,
) -> Observable<A> {
    collect(source, move |it| predicate(it).then(|| it.clone()))
}

pub(crate) fn collect<A: 'static, B: 'static>(
    source: Observable<A>,
    f: impl Fn(&A) -> Option<B> + 'static,
) -> Observable<B> {
    let f = Rc::new(f);

    Observable::new(move |observer| {
        let f = Rc::clone(&f);

        source.subscribe(&NoOpDisposableTracker, move |it| {
            if let Some(it) = f(it) {
                observer.push(it);
            }
        })
    })
}

pub(crate) fn skip<A: Clone + 'static>(source: Observable<A>, count: usize) -> Observable<A> {
    Observable::new(move |observer| {
        let skipped = Cell::new(0);

        source.subscribe(&NoOpDisposableTracker, move |it: &A| {
            if skipped.get() < count {
                skipped.set(skipped.get() + 1);
            } else {
                observer.push(it.clone());
            }
        })
    })
}
