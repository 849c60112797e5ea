use std::{future::Future, rc::Rc, time::Duration};

use futures::task::LocalSpawn;

use crate::{
    caller::CallerData, error::RxError, time::TimeContext, DisposableTracker, NoOpDisposableTracker,
    Observable, RxVal, Subscription,
};

mod buffer;
mod changes;
mod flat_map;
mod join;
mod map;
mod timing;
mod to_future;
mod zip;

pub use join::join_all;
pub use to_future::{ToFuture, ToStream};
pub use zip::{zip2, zip3, zip4, zip5, zip6};

/// Anything that can be viewed as an [`Observable`].
pub trait AsObservable {
    type Item: 'static;

    fn as_observable(&self) -> Observable<Self::Item>;
}

impl<A: 'static> AsObservable for Observable<A> {
    type Item = A;

    fn as_observable(&self) -> Observable<A> {
        self.clone()
    }
}

impl<T: ?Sized> ObservableExt for T where T: AsObservable {}

/// Combinators over observables.
///
/// Every combinator returns a transformation which subscribes to its source
/// only while it has subscribers of its own.
pub trait ObservableExt: AsObservable {
    fn map<B: 'static>(&self, f: impl Fn(&Self::Item) -> B + 'static) -> Observable<B> {
        map::map(self.as_observable(), f)
    }

    fn filter(&self, predicate: impl Fn(&Self::Item) -> bool + 'static) -> Observable<Self::Item>
    where
        Self::Item: Clone,
    {
        map::filter(self.as_observable(), predicate)
    }

    /// Only emits the values for which `f` returns `Some`.
    fn collect<B: 'static>(&self, f: impl Fn(&Self::Item) -> Option<B> + 'static) -> Observable<B> {
        map::collect(self.as_observable(), f)
    }

    fn skip(&self, count: usize) -> Observable<Self::Item>
    where
        Self::Item: Clone,
    {
        map::skip(self.as_observable(), count)
    }

    /// Turns this observable into an event source that carries no data.
    fn discard_value(&self) -> Observable<()> {
        map::map(self.as_observable(), |_| ())
    }

    /// Emits every element of the iterator returned by `f`.
    fn flat_map_iter<B: 'static, I: IntoIterator<Item = B>>(
        &self,
        f: impl Fn(&Self::Item) -> I + 'static,
    ) -> Observable<B> {
        flat_map::flat_map_iter(self.as_observable(), f)
    }

    /// Emits the events of the observable returned by `f` for the latest
    /// value of this one. At most one inner subscription is live at a time.
    fn flat_map<O>(&self, f: impl Fn(&Self::Item) -> O + 'static) -> Observable<O::Item>
    where
        O: AsObservable,
        O::Item: Clone,
    {
        flat_map::flat_map(self.as_observable(), f)
    }

    /// Emits the outputs of the futures returned by `f`, spawned on
    /// `spawner`. Futures still running when the transformation loses its
    /// last subscriber are aborted.
    fn flat_map_future<B, Fut, S>(&self, spawner: S, f: impl Fn(&Self::Item) -> Fut + 'static) -> Observable<B>
    where
        B: 'static,
        Fut: Future<Output = B> + 'static,
        S: LocalSpawn + Clone + 'static,
    {
        flat_map::flat_map_future(self.as_observable(), spawner, f)
    }

    fn zip<O, R>(&self, other: &O, zipper: impl Fn(&Self::Item, &O::Item) -> R + 'static) -> Observable<R>
    where
        O: AsObservable,
        Self::Item: Clone,
        O::Item: Clone,
        R: 'static,
    {
        zip::zip2(self, other, zipper)
    }

    /// Emits the latest `size` values, oldest first, on every value.
    fn buffer(&self, size: usize) -> Result<Observable<Vec<Self::Item>>, RxError>
    where
        Self::Item: Clone,
    {
        buffer::buffer(self.as_observable(), size)
    }

    /// Emits `(value, timestamp)` windows spanning `duration`.
    fn time_buffer<C: TimeContext + Clone + 'static>(
        &self,
        duration: Duration,
        time_context: C,
    ) -> Observable<Vec<(Self::Item, Duration)>>
    where
        Self::Item: Clone,
    {
        buffer::time_buffer(self.as_observable(), duration, time_context)
    }

    /// Emits the last `count` timestamped values once all of them happened
    /// within `timeframe`.
    fn within_timeframe<C: TimeContext + Clone + 'static>(
        &self,
        count: usize,
        timeframe: Duration,
        time_context: C,
    ) -> Result<Observable<Vec<(Self::Item, Duration)>>, RxError>
    where
        Self::Item: Clone,
    {
        buffer::within_timeframe(self.as_observable(), count, timeframe, time_context)
    }

    /// Emits `(previous, current)` pairs whenever the value changes. The first
    /// value is not emitted.
    fn changes(&self) -> Observable<(Self::Item, Self::Item)>
    where
        Self::Item: Clone + PartialEq,
    {
        changes::changes(self.as_observable(), |a: &Self::Item, b: &Self::Item| a == b)
    }

    fn changes_by(
        &self,
        are_equal: impl Fn(&Self::Item, &Self::Item) -> bool + 'static,
    ) -> Observable<(Self::Item, Self::Item)>
    where
        Self::Item: Clone,
    {
        changes::changes(self.as_observable(), are_equal)
    }

    /// Like [`changes`](ObservableExt::changes), but also emits the first
    /// value, with `None` as the previous one.
    fn changes_opt(&self) -> Observable<(Option<Self::Item>, Self::Item)>
    where
        Self::Item: Clone + PartialEq,
    {
        changes::changes_opt(self.as_observable(), |a: &Self::Item, b: &Self::Item| a == b)
    }

    fn changes_opt_by(
        &self,
        are_equal: impl Fn(&Self::Item, &Self::Item) -> bool + 'static,
    ) -> Observable<(Option<Self::Item>, Self::Item)>
    where
        Self::Item: Clone,
    {
        changes::changes_opt(self.as_observable(), are_equal)
    }

    /// Emits the first value and then every value that differs from the
    /// previous one.
    fn changed_values(&self) -> Observable<Self::Item>
    where
        Self::Item: Clone + PartialEq,
    {
        changes::changed_values(self.as_observable(), |a: &Self::Item, b: &Self::Item| a == b)
    }

    fn changed_values_by(
        &self,
        are_equal: impl Fn(&Self::Item, &Self::Item) -> bool + 'static,
    ) -> Observable<Self::Item>
    where
        Self::Item: Clone,
    {
        changes::changed_values(self.as_observable(), are_equal)
    }

    /// Drops values arriving sooner than `duration` after the last emitted one.
    fn once_every<C: TimeContext + Clone + 'static>(
        &self,
        duration: Duration,
        time_context: C,
    ) -> Observable<Self::Item>
    where
        Self::Item: Clone,
    {
        timing::once_every(self.as_observable(), duration, time_context)
    }

    fn delayed<C: TimeContext + Clone + 'static>(&self, delay: Duration, time_context: C) -> Observable<Self::Item>
    where
        Self::Item: Clone,
    {
        timing::delayed(self.as_observable(), delay, time_context)
    }

    /// Emits events of both observables.
    fn join<O>(&self, other: &O) -> Observable<Self::Item>
    where
        O: AsObservable<Item = Self::Item> + ?Sized,
        Self::Item: Clone,
    {
        join::join_all([self.as_observable(), other.as_observable()])
    }

    /// Emits a unit whenever either observable emits.
    fn join_discard<O: AsObservable + ?Sized>(&self, other: &O) -> Observable<()> {
        join::join_all([self.discard_value(), other.discard_value()])
    }

    /// Reactive value holding the latest event, starting at `initial`.
    fn to_rx_val(&self, initial: Self::Item) -> RxVal<Self::Item>
    where
        Self::Item: Clone + PartialEq,
    {
        let source = self.as_observable();

        RxVal::from_source(initial, move |setter| {
            source.subscribe(&NoOpDisposableTracker, move |it| setter.set(it.clone()))
        })
    }

    /// Reactive value holding `f` of the latest event, starting at `initial`.
    fn to_rx_val_map<B>(&self, initial: B, f: impl Fn(&Self::Item) -> B + 'static) -> RxVal<B>
    where
        B: Clone + PartialEq + 'static,
    {
        let source = self.as_observable();

        RxVal::from_source(initial, move |setter| {
            source.subscribe(&NoOpDisposableTracker, move |it| setter.set(f(it)))
        })
    }

    /// Unsubscribes `subscription` and replaces it with a subscription of
    /// `on_event` to this observable. The caller owns the new subscription.
    #[track_caller]
    fn subscribe_last(&self, subscription: &mut Subscription, on_event: impl Fn(&Self::Item) + 'static) {
        subscription.unsubscribe();
        *subscription = self.as_observable().subscribe_at(
            &NoOpDisposableTracker,
            Rc::new(on_event),
            CallerData::caller(),
        );
    }

    /// Subscribes to a single event.
    #[track_caller]
    fn subscribe_once(
        &self,
        tracker: &dyn DisposableTracker,
        on_event: impl FnOnce(&Self::Item) + 'static,
    ) -> Subscription {
        to_future::subscribe_once(&self.as_observable(), tracker, on_event, CallerData::caller())
    }

    /// Resolves with the next event. Disposing `tracker` before that
    /// resolves the future with [`RxError::Canceled`].
    #[track_caller]
    fn to_future(&self, tracker: &dyn DisposableTracker) -> ToFuture<Self::Item>
    where
        Self::Item: Clone,
    {
        ToFuture::new(&self.as_observable(), tracker)
    }

    /// A stream of all subsequent events. Ends once `tracker` is disposed.
    #[track_caller]
    fn to_stream(&self, tracker: &dyn DisposableTracker) -> ToStream<Self::Item>
    where
        Self::Item: Clone,
    {
        ToStream::new(&self.as_observable(), tracker)
    }
}

pub(crate) fn forward<A: Clone + 'static>(observer: crate::Observer<A>) -> impl Fn(&A) + 'static {
    move |it| observer.push(it.clone())
}
