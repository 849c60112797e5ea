use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use crate::{
    caller::CallerData, error::RxError, observable::emit_isolated, observable_ext::AsObservable,
    subscription::tracker::NoOpDisposableTracker, DisposableTracker, Observable, Subscription,
};

use super::Push;

enum ReplayStrategy {
    BufferSize(usize),
    Unbounded,
}

/// Stores the values pushed into it and replays them to every new
/// subscriber before any subsequent value.
pub struct ReplaySubject<A> {
    observable: Observable<A>,
    replay_strategy: ReplayStrategy,
    buffer: Rc<RefCell<VecDeque<A>>>,
}

impl<A: Clone + 'static> ReplaySubject<A> {
    pub fn new() -> Self {
        Self {
            observable: Observable::source(),
            replay_strategy: ReplayStrategy::Unbounded,
            buffer: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    /// Only the latest `size` values are replayed.
    pub fn with_buffer_size(size: usize) -> Result<Self, RxError> {
        if size == 0 {
            return Err(RxError::ZeroReplaySize);
        }

        Ok(Self {
            replay_strategy: ReplayStrategy::BufferSize(size),
            ..Self::new()
        })
    }

    pub fn push(&self, value: A) {
        self.observable.submit(value.clone());

        let mut buffer = self.buffer.borrow_mut();

        if let ReplayStrategy::BufferSize(size) = self.replay_strategy {
            if buffer.len() == size {
                buffer.pop_front();
            }
        }

        buffer.push_back(value);
    }

    /// Forgets the replay log. Current subscribers are not affected.
    pub fn clear(&self) {
        self.buffer.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.buffer.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.borrow().is_empty()
    }

    pub fn subscribers(&self) -> usize {
        self.observable.subscribers()
    }

    /// Subscribes and synchronously replays the log to `on_event` only.
    #[track_caller]
    pub fn subscribe(
        &self,
        tracker: &dyn DisposableTracker,
        on_event: impl Fn(&A) + 'static,
    ) -> Subscription {
        subscribe_replaying(
            &self.observable,
            &self.buffer,
            tracker,
            Rc::new(on_event),
            CallerData::caller(),
        )
    }
}

fn subscribe_replaying<A: Clone + 'static>(
    observable: &Observable<A>,
    buffer: &RefCell<VecDeque<A>>,
    tracker: &dyn DisposableTracker,
    on_event: Rc<dyn Fn(&A)>,
    caller: CallerData,
) -> Subscription {
    let subscription = observable.subscribe_at(tracker, on_event.clone(), caller);
    // Replayed callbacks may push into this subject.
    let replay = buffer.borrow().iter().cloned().collect::<Vec<_>>();

    for event in &replay {
        if !emit_isolated(&*on_event, event, &subscription, caller) {
            break;
        }
    }

    subscription
}

impl<A: Clone + 'static> Default for ReplaySubject<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Clone + 'static> Push for ReplaySubject<A> {
    type Item = A;

    fn push(&self, value: A) {
        ReplaySubject::push(self, value);
    }
}

impl<A: Clone + 'static> AsObservable for ReplaySubject<A> {
    type Item = A;

    /// A transformation whose first subscriber receives the replay log.
    fn as_observable(&self) -> Observable<A> {
        let observable = self.observable.clone();
        let buffer = Rc::clone(&self.buffer);

        Observable::new(move |observer| {
            subscribe_replaying(
                &observable,
                &buffer,
                &NoOpDisposableTracker,
                Rc::new(move |it: &A| observer.push(it.clone())),
                CallerData::caller(),
            )
        })
    }
}
