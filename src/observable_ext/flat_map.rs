use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    future::Future,
    rc::Rc,
};

use futures::{
    future::{abortable, AbortHandle},
    task::{LocalSpawn, LocalSpawnExt},
};

use crate::{NoOpDisposableTracker, Observable, Subscription};

use super::{forward, AsObservable};

pub(crate) fn flat_map_iter<A: 'static, B: 'static, I: IntoIterator<Item = B>>(
    source: Observable<A>,
    f: impl Fn(&A) -> I + 'static,
) -> Observable<B> {
    let f = Rc::new(f);

    Observable::new(move |observer| {
        let f = Rc::clone(&f);

        source.subscribe(&NoOpDisposableTracker, move |it| {
            for b in f(it) {
                observer.push(b);
            }
        })
    })
}

pub(crate) fn flat_map<A: 'static, O>(
    source: Observable<A>,
    f: impl Fn(&A) -> O + 'static,
) -> Observable<O::Item>
where
    O: AsObservable,
    O::Item: Clone,
{
    let f = Rc::new(f);

    Observable::new(move |observer| {
        let f = Rc::clone(&f);
        let inner = Rc::new(RefCell::new(Subscription::empty()));
        let outer = source.subscribe(&NoOpDisposableTracker, {
            let inner = Rc::clone(&inner);

            move |it| {
                inner.replace(Subscription::empty()).unsubscribe();

                let subscription = f(it)
                    .as_observable()
                    .subscribe(&NoOpDisposableTracker, forward(observer.clone()));

                inner.replace(subscription).unsubscribe();
            }
        });

        outer.and_then(move || {
            inner.replace(Subscription::empty()).unsubscribe();
        })
    })
}

pub(crate) fn flat_map_future<A, B, Fut, S>(
    source: Observable<A>,
    spawner: S,
    f: impl Fn(&A) -> Fut + 'static,
) -> Observable<B>
where
    A: 'static,
    B: 'static,
    Fut: Future<Output = B> + 'static,
    S: LocalSpawn + Clone + 'static,
{
    let f = Rc::new(f);

    Observable::new(move |observer| {
        let f = Rc::clone(&f);
        let spawner = spawner.clone();
        let running = Rc::new(RefCell::new(HashMap::<u64, AbortHandle>::new()));
        let next_id = Cell::new(0u64);
        let subscription = source.subscribe(&NoOpDisposableTracker, {
            let running = Rc::clone(&running);

            move |it| {
                let id = next_id.replace(next_id.get() + 1);
                let (future, handle) = abortable(f(it));
                let observer = observer.clone();
                let registry = Rc::downgrade(&running);

                running.borrow_mut().insert(id, handle);

                let spawned = spawner.spawn_local(async move {
                    if let Ok(value) = future.await {
                        if let Some(it) = registry.upgrade() {
                            it.borrow_mut().remove(&id);
                        }

                        observer.push(value);
                    }
                });

                if let Err(error) = spawned {
                    running.borrow_mut().remove(&id);
                    tracing::error!(%error, "could not spawn future");
                }
            }
        });

        subscription.and_then(move || {
            for (_, handle) in running.take() {
                handle.abort();
            }
        })
    })
}
