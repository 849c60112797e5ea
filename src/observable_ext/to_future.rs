use std::{
    cell::{Cell, RefCell},
    future::Future,
    pin::Pin,
    rc::{Rc, Weak},
    task::{Context, Poll},
};

use futures::{
    channel::{mpsc, oneshot},
    Stream,
};
use pin_project_lite::pin_project;

use crate::{
    caller::CallerData, error::RxError, subscription::SubscriptionInner, DisposableTracker,
    Observable, Subscription, SubscriptionGuard,
};

pub(crate) fn subscribe_once<A: 'static>(
    source: &Observable<A>,
    tracker: &dyn DisposableTracker,
    on_event: impl FnOnce(&A) + 'static,
    caller: CallerData,
) -> Subscription {
    let handle = Rc::new(RefCell::new(Weak::<SubscriptionInner>::new()));
    let fired = Rc::new(Cell::new(false));
    let action = Cell::new(Some(on_event));
    let subscription = source.subscribe_at(
        tracker,
        Rc::new({
            let handle = Rc::clone(&handle);
            let fired = Rc::clone(&fired);

            move |it: &A| {
                let Some(action) = action.take() else {
                    return;
                };
                let subscription = handle.borrow().upgrade();

                fired.set(true);

                if let Some(inner) = subscription {
                    inner.unsubscribe();
                }

                action(it);
            }
        }),
        caller,
    );

    // Sources replaying on subscribe fire before the handle is known.
    if fired.get() {
        subscription.unsubscribe();
    } else {
        handle.replace(subscription.downgrade());
    }

    subscription
}

pin_project! {
    /// Future resolving with the next event of an observable.
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct ToFuture<A> {
        #[pin]
        receiver: oneshot::Receiver<A>,
        guard: SubscriptionGuard,
    }
}

impl<A: Clone + 'static> ToFuture<A> {
    #[track_caller]
    pub(crate) fn new(source: &Observable<A>, tracker: &dyn DisposableTracker) -> Self {
        let (sender, receiver) = oneshot::channel();
        let sender = Cell::new(Some(sender));
        let subscription = subscribe_once(
            source,
            tracker,
            move |it: &A| {
                if let Some(sender) = sender.take() {
                    let _ = sender.send(it.clone());
                }
            },
            CallerData::caller(),
        );

        Self {
            receiver,
            guard: subscription.guard(),
        }
    }
}

impl<A> Future for ToFuture<A> {
    type Output = Result<A, RxError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.project()
            .receiver
            .poll(cx)
            .map(|it| it.map_err(|_| RxError::Canceled))
    }
}

pin_project! {
    /// Stream of every subsequent event of an observable. Ends when the
    /// underlying subscription is disposed of.
    #[must_use = "streams do nothing unless polled"]
    pub struct ToStream<A> {
        #[pin]
        receiver: mpsc::UnboundedReceiver<A>,
        guard: SubscriptionGuard,
    }
}

impl<A: Clone + 'static> ToStream<A> {
    #[track_caller]
    pub(crate) fn new(source: &Observable<A>, tracker: &dyn DisposableTracker) -> Self {
        let (sender, receiver) = mpsc::unbounded();
        let subscription = source.subscribe_at(
            tracker,
            Rc::new(move |it: &A| {
                let _ = sender.unbounded_send(it.clone());
            }),
            CallerData::caller(),
        );

        Self {
            receiver,
            guard: subscription.guard(),
        }
    }

    pub fn subscription(&self) -> &Subscription {
        self.guard.subscription()
    }
}

impl<A> Stream for ToStream<A> {
    type Item = A;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().receiver.poll_next(cx)
    }
}
