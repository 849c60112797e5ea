use std::ops::Deref;

use crate::subject::Push;

use super::RxVal;

/// A reactive value that can be set from the outside.
pub struct RxRef<A> {
    rx: RxVal<A>,
}

impl<A: Clone + 'static> RxRef<A> {
    pub fn new(initial: A) -> Self
    where
        A: PartialEq,
    {
        Self::with_eq(initial, |a, b| a == b)
    }

    /// Uses `are_equal` instead of `PartialEq` to decide whether a new value
    /// is a change.
    pub fn with_eq(initial: A, are_equal: impl Fn(&A, &A) -> bool + 'static) -> Self {
        Self {
            rx: RxVal::with_eq(initial, are_equal),
        }
    }

    /// Stores and emits `value` unless it equals the current value. Returns
    /// whether anything changed.
    pub fn set(&self, value: A) -> bool {
        self.rx.set(value)
    }

    pub fn update(&self, f: impl FnOnce(&A) -> A) -> bool {
        let value = f(&self.rx.value());

        self.set(value)
    }

    /// A read only view of this value.
    pub fn rx_val(&self) -> RxVal<A> {
        self.rx.clone()
    }
}

impl<A> Clone for RxRef<A> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

impl<A: Default + PartialEq + Clone + 'static> Default for RxRef<A> {
    fn default() -> Self {
        Self::new(A::default())
    }
}

impl<A> Deref for RxRef<A> {
    type Target = RxVal<A>;

    fn deref(&self) -> &Self::Target {
        &self.rx
    }
}

impl<A: Clone + 'static> Push for RxRef<A> {
    type Item = A;

    fn push(&self, value: A) {
        self.set(value);
    }
}
