use std::rc::Rc;

use crate::{NoOpDisposableTracker, Subscription};

use super::RxVal;

/// Combines the current values of `vals` with `f`, recomputing whenever
/// any of them changes.
pub fn traverse<A, B>(
    vals: impl IntoIterator<Item = RxVal<A>>,
    f: impl Fn(&[A]) -> B + 'static,
) -> RxVal<B>
where
    A: Clone + 'static,
    B: Clone + PartialEq + 'static,
{
    let vals = vals.into_iter().collect::<Rc<[_]>>();
    let compute = Rc::new({
        let vals = Rc::clone(&vals);

        move || f(&vals.iter().map(RxVal::value).collect::<Vec<_>>())
    });

    RxVal::from_source(compute(), |setter| {
        Subscription::join_all(
            vals.iter()
                .map(|rx| {
                    let compute = Rc::clone(&compute);
                    let setter = setter.clone();

                    rx.subscribe_without_emit(&NoOpDisposableTracker, move |_| setter.set(compute()))
                })
                .collect::<Vec<_>>(),
        )
    })
}

/// The first value, in input order, that satisfies `predicate`.
pub fn any_that<A>(
    vals: impl IntoIterator<Item = RxVal<A>>,
    predicate: impl Fn(&A) -> bool + 'static,
) -> RxVal<Option<A>>
where
    A: Clone + PartialEq + 'static,
{
    traverse(vals, move |values| values.iter().find(|it| predicate(*it)).cloned())
}

/// Whether any of `vals` equals `search_for`.
pub fn any_of(vals: impl IntoIterator<Item = RxVal<bool>>, search_for: bool) -> RxVal<bool> {
    any_that(vals, move |it| *it == search_for).map(Option::is_some)
}

pub fn any_defined<A>(vals: impl IntoIterator<Item = RxVal<Option<A>>>) -> RxVal<Option<A>>
where
    A: Clone + PartialEq + 'static,
{
    traverse(vals, |values| values.iter().flatten().next().cloned())
}

#[cfg(test)]
mod test {
    use crate::prelude::*;

    #[test]
    fn smoke() {
        let refs = [RxRef::new(1), RxRef::new(2), RxRef::new(3)];
        let sum = traverse(refs.iter().map(RxRef::rx_val), |values| values.iter().sum::<i32>());

        assert_eq!(sum.value(), 6);

        refs[1].set(10);

        assert_eq!(sum.value(), 14);
    }

    #[test]
    fn any_that_prefers_lowest_index() {
        let refs = [RxRef::new(1), RxRef::new(2), RxRef::new(3)];
        let even = any_that(refs.iter().map(RxRef::rx_val), |v| v % 2 == 0);

        assert_eq!(even.value(), Some(2));

        refs[2].set(4);

        assert_eq!(even.value(), Some(2));

        refs[0].set(6);

        assert_eq!(even.value(), Some(6));

        refs[0].set(1);
        refs[1].set(1);

        assert_eq!(even.value(), Some(4));

        refs[2].set(1);

        assert_eq!(even.value(), None);
    }

    #[test]
    fn any_of_and_any_defined() {
        let flags = [RxRef::new(false), RxRef::new(false)];
        let any_true = any_of(flags.iter().map(RxRef::rx_val), true);
        let any_false = any_of(flags.iter().map(RxRef::rx_val), false);

        assert!(!any_true.value());
        assert!(any_false.value());

        flags[1].set(true);

        assert!(any_true.value());

        let opts = [RxRef::new(None), RxRef::new(Some('b'))];
        let defined = any_defined(opts.iter().map(RxRef::rx_val));

        assert_eq!(defined.value(), Some('b'));

        opts[0].set(Some('a'));

        assert_eq!(defined.value(), Some('a'));

        opts[0].set(None);
        opts[1].set(None);

        assert_eq!(defined.value(), None);
    }
}
