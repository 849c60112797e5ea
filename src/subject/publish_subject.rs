use std::ops::Deref;

use crate::{observable_ext::AsObservable, Observable};

use super::Push;

/// An [`Observable`] which values can be pushed into. Does not remember
/// anything: subscribers only see values pushed after they subscribed.
pub struct Subject<A> {
    observable: Observable<A>,
}

impl<A: 'static> Subject<A> {
    pub fn new() -> Self {
        Self {
            observable: Observable::source(),
        }
    }

    pub fn push(&self, value: A) {
        self.observable.submit(value);
    }
}

impl<A: 'static> Default for Subject<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static> Push for Subject<A> {
    type Item = A;

    fn push(&self, value: A) {
        Subject::push(self, value);
    }
}

impl<A> Deref for Subject<A> {
    type Target = Observable<A>;

    fn deref(&self) -> &Self::Target {
        &self.observable
    }
}

impl<A: 'static> AsObservable for Subject<A> {
    type Item = A;

    fn as_observable(&self) -> Observable<A> {
        self.observable.clone()
    }
}
