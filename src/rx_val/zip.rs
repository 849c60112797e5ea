use std::rc::Rc;

use paste::paste;

use crate::{NoOpDisposableTracker, Subscription};

use super::RxVal;

macro_rules! zip {
    ($name:ident; $($source:ident),+) => {
        paste! {
            /// A value computed by `zipper` from the current values of all
            /// sources, recomputed whenever any of them changes.
            #[allow(clippy::too_many_arguments)]
            pub fn $name<$($source),+, R, F>($([<$source:lower>]: &RxVal<$source>),+, zipper: F) -> RxVal<R>
            where
                $($source: Clone + 'static,)+
                R: Clone + PartialEq + 'static,
                F: Fn($(&$source),+) -> R + 'static,
            {
                let compute = Rc::new({
                    $(
                        let [<$source:lower>] = [<$source:lower>].clone();
                    )+

                    move || zipper($(&[<$source:lower>].value()),+)
                });

                RxVal::from_source(compute(), |setter| {
                    Subscription::join_all([$({
                        let compute = Rc::clone(&compute);
                        let setter = setter.clone();

                        [<$source:lower>].subscribe_without_emit(&NoOpDisposableTracker, move |_| {
                            setter.set(compute())
                        })
                    }),+])
                })
            }
        }
    };
}

zip!(zip2; A1, A2);
zip!(zip3; A1, A2, A3);
zip!(zip4; A1, A2, A3, A4);
zip!(zip5; A1, A2, A3, A4, A5);
zip!(zip6; A1, A2, A3, A4, A5, A6);

impl<A: Clone + 'static> RxVal<A> {
    pub fn zip<B, R>(&self, other: &RxVal<B>, zipper: impl Fn(&A, &B) -> R + 'static) -> RxVal<R>
    where
        B: Clone + 'static,
        R: Clone + PartialEq + 'static,
    {
        zip2(self, other, zipper)
    }
}
