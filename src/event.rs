//! Typed publish/subscribe event sources.
//!
//! An [`EventSource`] delivers values to every subscriber until it is
//! completed. Completion is terminal: it is delivered at most once and every
//! later publish is rejected. [`EventSource::publish_once`] combines both into
//! a single-fire latch.
//!
//! Handlers run on the publishing thread, outside the source's lock, so a
//! handler may subscribe, publish or complete without deadlocking.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type NextHandler<T> = Arc<dyn Fn(&T) + Send + Sync>;
type CompleteHandler = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber<T> {
    id: SubscriptionId,
    on_next: NextHandler<T>,
    on_complete: Option<CompleteHandler>,
}

struct Inner<T> {
    next_id: u64,
    subscribers: Vec<Subscriber<T>>,
    completed: bool,
}

pub struct EventSource<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> EventSource<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 0,
                subscribers: Vec::new(),
                completed: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to values only.
    pub fn subscribe<F>(&self, on_next: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.register(Arc::new(on_next), None)
    }

    /// Subscribe to values and to completion. Subscribing to a completed source
    /// runs `on_complete` immediately.
    pub fn subscribe_with<F, C>(&self, on_next: F, on_complete: C) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
        C: Fn() + Send + Sync + 'static,
    {
        self.register(Arc::new(on_next), Some(Arc::new(on_complete)))
    }

    fn register(
        &self,
        on_next: NextHandler<T>,
        on_complete: Option<CompleteHandler>,
    ) -> SubscriptionId {
        let mut inner = self.lock();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        if inner.completed {
            drop(inner);
            if let Some(on_complete) = on_complete {
                on_complete();
            }
            return id;
        }
        inner.subscribers.push(Subscriber {
            id,
            on_next,
            on_complete,
        });
        id
    }

    /// Returns `true` if the subscription was still registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|s| s.id != id);
        inner.subscribers.len() != before
    }

    /// Deliver `value` to every subscriber. Returns `false` once completed.
    pub fn publish(&self, value: &T) -> bool {
        let handlers: Vec<NextHandler<T>> = {
            let inner = self.lock();
            if inner.completed {
                return false;
            }
            inner.subscribers.iter().map(|s| s.on_next.clone()).collect()
        };
        for handler in handlers {
            handler(value);
        }
        true
    }

    /// Complete the source. Returns `true` only for the first call.
    pub fn complete(&self) -> bool {
        match self.close() {
            Some(subscribers) => {
                for s in subscribers {
                    if let Some(on_complete) = s.on_complete {
                        on_complete();
                    }
                }
                true
            }
            None => false,
        }
    }

    /// Publish a final value and complete, atomically with respect to other
    /// publishers. Returns `true` only for the call that fired.
    pub fn publish_once(&self, value: &T) -> bool {
        match self.close() {
            Some(subscribers) => {
                for s in &subscribers {
                    (s.on_next)(value);
                }
                for s in subscribers {
                    if let Some(on_complete) = s.on_complete {
                        on_complete();
                    }
                }
                true
            }
            None => false,
        }
    }

    fn close(&self) -> Option<Vec<Subscriber<T>>> {
        let mut inner = self.lock();
        if inner.completed {
            return None;
        }
        inner.completed = true;
        Some(std::mem::take(&mut inner.subscribers))
    }

    pub fn is_completed(&self) -> bool {
        self.lock().completed
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }
}

impl<T> Default for EventSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for EventSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("EventSource")
            .field("subscribers", &inner.subscribers.len())
            .field("completed", &inner.completed)
            .finish()
    }
}
