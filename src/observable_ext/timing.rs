use std::{cell::Cell, time::Duration};

use crate::{time::TimeContext, NoOpDisposableTracker, Observable};

pub(crate) fn once_every<A, C>(source: Observable<A>, duration: Duration, time_context: C) -> Observable<A>
where
    A: Clone + 'static,
    C: TimeContext + Clone + 'static,
{
    Observable::new(move |observer| {
        let time_context = time_context.clone();
        let last_emit = Cell::new(None::<Duration>);

        source.subscribe(&NoOpDisposableTracker, move |it: &A| {
            let now = time_context.now();

            // A window too large to represent never elapses.
            let throttled = last_emit
                .get()
                .is_some_and(|last| last.checked_add(duration).map_or(true, |next| next > now));

            if throttled {
                return;
            }

            last_emit.set(Some(now));
            observer.push(it.clone());
        })
    })
}

/// Values scheduled before the last subscriber leaves are still delivered
/// if the transformation is alive and subscribed to by then.
pub(crate) fn delayed<A, C>(source: Observable<A>, delay: Duration, time_context: C) -> Observable<A>
where
    A: Clone + 'static,
    C: TimeContext + Clone + 'static,
{
    Observable::new(move |observer| {
        let time_context = time_context.clone();

        source.subscribe(&NoOpDisposableTracker, move |it: &A| {
            let observer = observer.clone();
            let value = it.clone();

            time_context.after(delay, Box::new(move || observer.push(value)));
        })
    })
}

#[cfg(test)]
mod test {
    use std::{cell::RefCell, rc::Rc, time::Duration};

    use crate::prelude::*;

    #[test]
    fn smoke() {
        let tracker = Disposables::new();
        let ctx = ManualTimeContext::new();
        let subject = Subject::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let _sub = subject
            .once_every(Duration::from_millis(100), ctx.clone())
            .subscribe(&tracker, {
                let events = events.clone();
                move |v: &i32| events.borrow_mut().push(*v)
            });

        subject.push(1);
        ctx.advance(Duration::from_millis(50));
        subject.push(2);
        ctx.advance(Duration::from_millis(50));
        subject.push(3);
        subject.push(4);
        ctx.advance(Duration::from_millis(150));
        subject.push(5);

        assert_eq!(*events.borrow(), [1, 3, 5]);
    }

    #[test]
    fn delayed_emits_through_time_context() {
        let tracker = Disposables::new();
        let ctx = ManualTimeContext::new();
        let subject = Subject::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let _sub = subject
            .delayed(Duration::from_millis(30), ctx.clone())
            .subscribe(&tracker, {
                let events = events.clone();
                let ctx = ctx.clone();
                move |v: &i32| events.borrow_mut().push((*v, ctx.now()))
            });

        subject.push(1);
        ctx.advance(Duration::from_millis(10));
        subject.push(2);

        assert!(events.borrow().is_empty());
        assert_eq!(ctx.pending(), 2);

        ctx.advance(Duration::from_millis(100));

        assert_eq!(
            *events.borrow(),
            [(1, Duration::from_millis(30)), (2, Duration::from_millis(40))]
        );
    }

    #[test]
    fn unbounded_durations_never_elapse() {
        let tracker = Disposables::new();
        let ctx = ManualTimeContext::new();
        let subject = Subject::new();
        let throttled = Rc::new(RefCell::new(Vec::new()));
        let delayed = Rc::new(RefCell::new(Vec::new()));

        ctx.advance(Duration::from_millis(1));

        let _throttled = subject
            .once_every(Duration::MAX, ctx.clone())
            .subscribe(&tracker, {
                let throttled = throttled.clone();
                move |v: &i32| throttled.borrow_mut().push(*v)
            });
        let _delayed = subject
            .delayed(Duration::MAX, ctx.clone())
            .subscribe(&tracker, {
                let delayed = delayed.clone();
                move |v: &i32| delayed.borrow_mut().push(*v)
            });

        subject.push(1);
        ctx.advance(Duration::from_secs(60));
        subject.push(2);
        subject.push(3);

        assert_eq!(*throttled.borrow(), [1]);
        assert!(delayed.borrow().is_empty());
        assert_eq!(ctx.pending(), 3);
        assert_eq!(subject.subscribers(), 2);
    }

    #[test]
    fn delayed_value_is_dropped_with_transformation() {
        let ctx = ManualTimeContext::new();
        let subject = Subject::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let delayed = subject.delayed(Duration::from_millis(30), ctx.clone());
        let sub = delayed.subscribe(&NoOpDisposableTracker, {
            let events = events.clone();
            move |v: &i32| events.borrow_mut().push(*v)
        });

        subject.push(1);
        sub.unsubscribe();
        drop(delayed);
        ctx.advance(Duration::from_millis(100));

        assert!(events.borrow().is_empty());
        assert_eq!(subject.subscribers(), 0);
    }
}
