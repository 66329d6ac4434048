//! Cancellable timers and the debounced quick-search trigger built on them.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    time::Duration,
};

use crate::search_const::{QUICK_SEARCH_DEBOUNCE_MS, QUICK_SEARCH_MIN_CHARS};

/// Cancels a scheduled task. Dropping the token without calling
/// [`CancelToken::cancel`] leaves the decision to the scheduler.
pub struct CancelToken {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl CancelToken {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> CancelToken;
}

/// Runs only the last of a burst of calls, `delay` after the burst ends.
pub struct Debouncer<S: Scheduler> {
    scheduler: S,
    delay: Duration,
    // (call number, token) of the task not yet run
    pending: Rc<RefCell<Option<(u64, CancelToken)>>>,
    calls: Cell<u64>,
}

impl<S: Scheduler> Debouncer<S> {
    pub fn new(scheduler: S, delay: Duration) -> Self {
        Self { scheduler, delay, pending: Rc::default(), calls: Cell::new(0) }
    }

    pub fn call(&self, task: impl FnOnce() + 'static) {
        self.cancel();
        let call = self.calls.get() + 1;
        self.calls.set(call);

        let pending = self.pending.clone();
        let token = self.scheduler.schedule(
            self.delay,
            Box::new(move || {
                let fired = pending.borrow_mut().take_if(|(current, _)| *current == call);
                drop(fired);
                task();
            }),
        );
        *self.pending.borrow_mut() = Some((call, token));
    }

    pub fn cancel(&self) {
        let previous = self.pending.borrow_mut().take();
        if let Some((_, token)) = previous {
            token.cancel();
        }
    }

    /// True between a call and the moment its task runs or is cancelled.
    pub fn is_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }
}

/// Debounced free-text search: waits for a pause in typing and ignores
/// queries shorter than the minimum length.
pub struct QuickSearchTrigger<S: Scheduler> {
    debouncer: Debouncer<S>,
    min_chars: usize,
}

impl<S: Scheduler> QuickSearchTrigger<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            debouncer: Debouncer::new(scheduler, Duration::from_millis(QUICK_SEARCH_DEBOUNCE_MS)),
            min_chars: QUICK_SEARCH_MIN_CHARS,
        }
    }

    /// Returns whether a search was scheduled. Input below the minimum length
    /// cancels whatever was pending.
    pub fn on_input(&self, text: &str, fire: impl FnOnce(String) + 'static) -> bool {
        let query = text.trim().to_string();
        if query.chars().count() < self.min_chars {
            self.debouncer.cancel();
            return false;
        }
        self.debouncer.call(move || fire(query));
        true
    }

    pub fn cancel(&self) {
        self.debouncer.cancel();
    }

    /// A search is scheduled but has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}
