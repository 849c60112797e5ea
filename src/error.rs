use thiserror::Error;

use crate::caller::CallerData;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RxError {
    #[error("buffer size must be greater than zero")]
    ZeroBufferSize,

    #[error("replay buffer size must be greater than zero")]
    ZeroReplaySize,

    #[error("subscriber panicked while handling an event: {message} (subscribed from {caller})")]
    SubscriberPanicked { caller: CallerData, message: String },

    #[error("active subscription was dropped without unsubscribing (subscribed from {caller})")]
    LeakedSubscription { caller: CallerData },

    #[error("observable was torn down before emitting")]
    Canceled,
}

impl RxError {
    pub(crate) fn panicked(caller: CallerData, payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(it) = payload.downcast_ref::<&str>() {
            (*it).to_owned()
        } else if let Some(it) = payload.downcast_ref::<String>() {
            it.clone()
        } else {
            "<non-string panic payload>".to_owned()
        };

        RxError::SubscriberPanicked { caller, message }
    }
}
