use std::{cell::RefCell, rc::Rc};

use crate::{NoOpDisposableTracker, Observable, Observer};

/// Drives `on_value` with the previous and the current value, then
/// remembers the current one.
fn changes_base<A, B>(
    source: Observable<A>,
    on_value: impl Fn(&Observer<B>, Option<&A>, &A) + 'static,
) -> Observable<B>
where
    A: Clone + 'static,
    B: 'static,
{
    let on_value = Rc::new(on_value);

    Observable::new(move |observer| {
        let on_value = Rc::clone(&on_value);
        let last = RefCell::new(None::<A>);

        source.subscribe(&NoOpDisposableTracker, move |it: &A| {
            let previous = last.replace(Some(it.clone()));

            on_value(&observer, previous.as_ref(), it);
        })
    })
}

pub(crate) fn changes<A: Clone + 'static>(
    source: Observable<A>,
    are_equal: impl Fn(&A, &A) -> bool + 'static,
) -> Observable<(A, A)> {
    changes_base(source, move |observer, previous, current| {
        if let Some(previous) = previous {
            if !are_equal(previous, current) {
                observer.push((previous.clone(), current.clone()));
            }
        }
    })
}

pub(crate) fn changes_opt<A: Clone + 'static>(
    source: Observable<A>,
    are_equal: impl Fn(&A, &A) -> bool + 'static,
) -> Observable<(Option<A>, A)> {
    changes_base(source, move |observer, previous, current| {
        let changed = previous.map_or(true, |it| !are_equal(it, current));

        if changed {
            observer.push((previous.cloned(), current.clone()));
        }
    })
}

pub(crate) fn changed_values<A: Clone + 'static>(
    source: Observable<A>,
    are_equal: impl Fn(&A, &A) -> bool + 'static,
) -> Observable<A> {
    changes_base(source, move |observer, previous, current| {
        if previous.map_or(true, |it| !are_equal(it, current)) {
            observer.push(current.clone());
        }
    })
}
