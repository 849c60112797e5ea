//! Time sources for the time based combinators.
//!
//! The core never blocks or spawns threads. Delayed actions are queued in the
//! context and run when the embedding application drives it, either by
//! advancing a [`ManualTimeContext`] or by polling a [`RealTimeContext`] from
//! its own update loop.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    time::{Duration, Instant},
};

pub trait TimeContext {
    /// Time passed since the context was created.
    fn now(&self) -> Duration;

    /// Runs `action` once `delay` has passed.
    fn after(&self, delay: Duration, action: Box<dyn FnOnce()>);
}

struct Timer {
    due: Duration,
    action: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct Timers {
    queue: RefCell<Vec<Timer>>,
}

impl Timers {
    fn schedule(&self, due: Duration, action: Box<dyn FnOnce()>) {
        let mut queue = self.queue.borrow_mut();
        // Timers due at the same time run in scheduling order.
        let idx = queue.partition_point(|it| it.due <= due);

        queue.insert(idx, Timer { due, action });
    }

    fn pop_due(&self, now: Duration) -> Option<Timer> {
        let mut queue = self.queue.borrow_mut();

        match queue.first() {
            Some(it) if it.due <= now => Some(queue.remove(0)),
            _ => None,
        }
    }

    fn len(&self) -> usize {
        self.queue.borrow().len()
    }
}

/// A virtual clock that only moves when [`advance`](ManualTimeContext::advance)
/// is called. Useful for driving the core from a frame loop with a fixed
/// timestep and for deterministic tests.
#[derive(Clone, Default)]
pub struct ManualTimeContext {
    inner: Rc<ManualInner>,
}

#[derive(Default)]
struct ManualInner {
    now: Cell<Duration>,
    timers: Timers,
}

impl ManualTimeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward, running every timer that becomes due, in
    /// order of their due time.
    pub fn advance(&self, by: Duration) {
        let target = self.inner.now.get().saturating_add(by);

        while let Some(timer) = self.inner.timers.pop_due(target) {
            self.inner.now.set(timer.due.max(self.inner.now.get()));
            (timer.action)();
        }

        self.inner.now.set(target);
    }

    pub fn pending(&self) -> usize {
        self.inner.timers.len()
    }
}

impl TimeContext for ManualTimeContext {
    fn now(&self) -> Duration {
        self.inner.now.get()
    }

    fn after(&self, delay: Duration, action: Box<dyn FnOnce()>) {
        self.inner.timers.schedule(self.now().saturating_add(delay), action);
    }
}

/// Wall clock based context. Due actions run from [`poll`](RealTimeContext::poll).
#[derive(Clone)]
pub struct RealTimeContext {
    inner: Rc<RealInner>,
}

struct RealInner {
    started: Instant,
    timers: Timers,
}

impl RealTimeContext {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RealInner {
                started: Instant::now(),
                timers: Timers::default(),
            }),
        }
    }

    /// Runs all actions that are due, returning how many ran.
    pub fn poll(&self) -> usize {
        let mut count = 0;

        while let Some(timer) = self.inner.timers.pop_due(self.now()) {
            (timer.action)();
            count += 1;
        }

        count
    }

    pub fn pending(&self) -> usize {
        self.inner.timers.len()
    }
}

impl Default for RealTimeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeContext for RealTimeContext {
    fn now(&self) -> Duration {
        self.inner.started.elapsed()
    }

    fn after(&self, delay: Duration, action: Box<dyn FnOnce()>) {
        self.inner.timers.schedule(self.now().saturating_add(delay), action);
    }
}
