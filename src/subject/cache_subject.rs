use std::{cell::RefCell, rc::Rc};

use crate::{
    caller::CallerData, observable::emit_isolated, observable_ext::AsObservable,
    subscription::tracker::NoOpDisposableTracker, DisposableTracker, Observable, Subscription,
};

use super::Push;

/// Caches values pushed while nobody listens and hands all of them to the
/// next subscriber, after which the cache is empty again.
pub struct CacheSubject<A> {
    observable: Observable<A>,
    cache: Rc<RefCell<Vec<A>>>,
}

impl<A: 'static> CacheSubject<A> {
    pub fn new() -> Self {
        Self {
            observable: Observable::source(),
            cache: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn push(&self, value: A) {
        if self.observable.subscribers() == 0 {
            self.cache.borrow_mut().push(value);
        } else {
            self.observable.submit(value);
        }
    }

    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn subscribers(&self) -> usize {
        self.observable.subscribers()
    }

    #[track_caller]
    pub fn subscribe(
        &self,
        tracker: &dyn DisposableTracker,
        on_event: impl Fn(&A) + 'static,
    ) -> Subscription {
        subscribe_flushing(
            &self.observable,
            &self.cache,
            tracker,
            Rc::new(on_event),
            CallerData::caller(),
        )
    }
}

fn subscribe_flushing<A: 'static>(
    observable: &Observable<A>,
    cache: &RefCell<Vec<A>>,
    tracker: &dyn DisposableTracker,
    on_event: Rc<dyn Fn(&A)>,
    caller: CallerData,
) -> Subscription {
    let subscription = observable.subscribe_at(tracker, on_event.clone(), caller);
    let mut cached = cache.take().into_iter();

    while let Some(event) = cached.next() {
        if !emit_isolated(&*on_event, &event, &subscription, caller) {
            // Whatever was not delivered waits for the next subscriber.
            let mut rest = cached.collect::<Vec<_>>();

            rest.append(&mut cache.borrow_mut());
            cache.replace(rest);
            break;
        }
    }

    subscription
}

impl<A: 'static> Default for CacheSubject<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static> Push for CacheSubject<A> {
    type Item = A;

    fn push(&self, value: A) {
        CacheSubject::push(self, value);
    }
}

impl<A: Clone + 'static> AsObservable for CacheSubject<A> {
    type Item = A;

    fn as_observable(&self) -> Observable<A> {
        let observable = self.observable.clone();
        let cache = Rc::clone(&self.cache);

        Observable::new(move |observer| {
            subscribe_flushing(
                &observable,
                &cache,
                &NoOpDisposableTracker,
                Rc::new(move |it: &A| observer.push(it.clone())),
                CallerData::caller(),
            )
        })
    }
}
