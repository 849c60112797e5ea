use std::{cell::RefCell, collections::VecDeque, time::Duration};

use crate::{error::RxError, time::TimeContext, NoOpDisposableTracker, Observable};

use super::ObservableExt;

pub(crate) fn buffer<A: Clone + 'static>(
    source: Observable<A>,
    size: usize,
) -> Result<Observable<Vec<A>>, RxError> {
    if size == 0 {
        return Err(RxError::ZeroBufferSize);
    }

    Ok(Observable::new(move |observer| {
        let window = RefCell::new(VecDeque::with_capacity(size));

        source.subscribe(&NoOpDisposableTracker, move |it: &A| {
            let snapshot = {
                let mut window = window.borrow_mut();

                window.push_back(it.clone());

                if window.len() > size {
                    window.pop_front();
                }

                window.iter().cloned().collect::<Vec<_>>()
            };

            observer.push(snapshot);
        })
    }))
}

pub(crate) fn time_buffer<A, C>(
    source: Observable<A>,
    duration: Duration,
    time_context: C,
) -> Observable<Vec<(A, Duration)>>
where
    A: Clone + 'static,
    C: TimeContext + Clone + 'static,
{
    Observable::new(move |observer| {
        let window = RefCell::new(VecDeque::<(A, Duration)>::new());
        let time_context = time_context.clone();

        source.subscribe(&NoOpDisposableTracker, move |it: &A| {
            let snapshot = {
                let mut window = window.borrow_mut();
                let now = time_context.now();

                window.push_back((it.clone(), now));

                // Windows ending past the representable time never close.
                let spanned = window
                    .front()
                    .is_some_and(|(_, first)| ends_before(*first, duration, now, true));

                if spanned {
                    while matches!(window.front(), Some((_, t)) if ends_before(*t, duration, now, false)) {
                        window.pop_front();
                    }

                    Some(window.iter().cloned().collect::<Vec<_>>())
                } else {
                    None
                }
            };

            if let Some(snapshot) = snapshot {
                observer.push(snapshot);
            }
        })
    })
}

fn ends_before(start: Duration, duration: Duration, now: Duration, inclusive: bool) -> bool {
    match start.checked_add(duration) {
        Some(end) if inclusive => end <= now,
        Some(end) => end < now,
        None => false,
    }
}

pub(crate) fn within_timeframe<A, C>(
    source: Observable<A>,
    count: usize,
    timeframe: Duration,
    time_context: C,
) -> Result<Observable<Vec<(A, Duration)>>, RxError>
where
    A: Clone + 'static,
    C: TimeContext + Clone + 'static,
{
    let timestamped = source.map(move |it| (it.clone(), time_context.now()));

    Ok(buffer(timestamped, count)?.filter(move |events| {
        let Some((_, last)) = events.last() else {
            return false;
        };

        events.len() == count && events.iter().all(|(_, t)| last.saturating_sub(*t) <= timeframe)
    }))
}
