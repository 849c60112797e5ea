//! Push based observables for single threaded, re-entrant event handling.
//!
//! Values are pushed into sources ([`subject::publish_subject::Subject`],
//! [`subject::replay_subject::ReplaySubject`], [`RxRef`]), combinators from
//! [`ObservableExt`](observable_ext::ObservableExt) build lazily subscribed
//! transformations on top of them, and subscribers attach through a
//! [`DisposableTracker`] which owns the lifetime of their subscriptions.

pub mod caller;
pub mod error;
pub mod observable;
pub mod observable_ext;
pub mod rx_val;
pub mod subject;
pub mod subscription;
pub mod time;

pub use caller::CallerData;
pub use error::RxError;
pub use observable::{Observable, Observer};
pub use rx_val::{RxRef, RxVal};
pub use subscription::{
    tracker::{DisposableTracker, Disposables, NoOpDisposableTracker},
    Subscription, SubscriptionGuard,
};

pub mod prelude {
    pub use crate::observable_ext::*;
    pub use crate::rx_val::{
        any_defined, any_of, any_that, extract, traverse, zip2 as rx_zip2, zip3 as rx_zip3,
        zip4 as rx_zip4, zip5 as rx_zip5, zip6 as rx_zip6, Setter,
    };
    pub use crate::subject::cache_subject::*;
    pub use crate::subject::publish_subject::*;
    pub use crate::subject::replay_subject::*;
    pub use crate::subject::*;
    pub use crate::time::*;
    pub use crate::{
        CallerData, DisposableTracker, Disposables, NoOpDisposableTracker, Observable, Observer,
        RxError, RxRef, RxVal, Subscription, SubscriptionGuard,
    };
}
