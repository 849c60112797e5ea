use std::{cell::RefCell, rc::Rc};

use paste::paste;

use crate::{NoOpDisposableTracker, Observable, Subscription};

use super::AsObservable;

macro_rules! zip {
    ($name:ident; $($source:ident),+) => {
        paste! {
            /// Emits the zipped latest values of all sources whenever one of
            /// them emits, once every source has emitted at least once.
            #[allow(clippy::too_many_arguments)]
            pub fn $name<$($source),+, R, F>($([<$source:lower>]: &$source),+, zipper: F) -> Observable<R>
            where
                $(
                    $source: AsObservable + ?Sized,
                    $source::Item: Clone,
                )+
                R: 'static,
                F: Fn($(&$source::Item),+) -> R + 'static,
            {
                $(
                    let [<$source:lower>] = [<$source:lower>].as_observable();
                )+
                let zipper = Rc::new(zipper);

                Observable::new(move |observer| {
                    $(
                        let [<latest_ $source:lower>] = Rc::new(RefCell::new(None::<$source::Item>));
                    )+
                    let emit = Rc::new({
                        $(
                            let [<latest_ $source:lower>] = Rc::clone(&[<latest_ $source:lower>]);
                        )+
                        let zipper = Rc::clone(&zipper);

                        // Values are cloned out so that no borrow is held while
                        // the zipper or downstream subscribers run.
                        move || {
                            let values = ($([<latest_ $source:lower>].borrow().clone(),)+);

                            if let ($(Some([<value_ $source:lower>]),)+) = values {
                                observer.push(zipper($(&[<value_ $source:lower>]),+));
                            }
                        }
                    });

                    Subscription::join_all([$({
                        let latest = Rc::clone(&[<latest_ $source:lower>]);
                        let emit = Rc::clone(&emit);

                        [<$source:lower>].subscribe(&NoOpDisposableTracker, move |it| {
                            latest.replace(Some(it.clone()));
                            emit();
                        })
                    }),+])
                })
            }
        }
    };
}

zip!(zip2; S1, S2);
zip!(zip3; S1, S2, S3);
zip!(zip4; S1, S2, S3, S4);
zip!(zip5; S1, S2, S3, S4, S5);
zip!(zip6; S1, S2, S3, S4, S5, S6);
