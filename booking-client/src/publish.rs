//! Latest-value publisher.
//!
//! [`Latest`] keeps the most recently published value. A new subscriber
//! receives that value first and then every later publish, in order, with
//! nothing dropped: each subscriber has its own unbounded queue, so a slow
//! reader delays only itself.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::Stream;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

struct Shared<T> {
    value: T,
    subscribers: Vec<UnboundedSender<T>>,
}

/// Holder of a current value that can be observed.
///
/// Clones publish to and read from the same value.
pub struct Latest<T> {
    shared: Arc<Mutex<Shared<T>>>,
}

impl<T> Clone for Latest<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone> Latest<T> {
    pub fn new(initial: T) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                value: initial,
                subscribers: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared<T>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The current value.
    pub fn get(&self) -> T {
        self.lock().value.clone()
    }

    /// Replace the current value and deliver it to every subscriber.
    ///
    /// Subscribers whose [`Subscription`] has been dropped are forgotten.
    pub fn publish(&self, value: T) {
        let mut shared = self.lock();
        shared
            .subscribers
            .retain(|tx| tx.send(value.clone()).is_ok());
        shared.value = value;
    }

    /// Attach a subscriber. It sees the current value immediately.
    pub fn subscribe(&self) -> Subscription<T> {
        let mut shared = self.lock();
        let (tx, rx) = mpsc::unbounded_channel();
        // The receiver is alive, so this cannot fail
        let _ = tx.send(shared.value.clone());
        shared.subscribers.push(tx);
        Subscription { rx }
    }

    /// Number of live subscribers as of the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }
}

impl<T: Clone + PartialEq> Latest<T> {
    /// Publish only if `value` differs from the current value.
    ///
    /// Returns whether anything was published.
    pub fn publish_if_changed(&self, value: T) -> bool {
        self.update(|_| value)
    }

    /// Derive the next value from the current one and publish it if it
    /// differs. Read and publish happen under one lock, so no other
    /// publish can slip in between.
    pub fn update(&self, next: impl FnOnce(&T) -> T) -> bool {
        let mut shared = self.lock();
        let value = next(&shared.value);
        if shared.value == value {
            return false;
        }
        shared
            .subscribers
            .retain(|tx| tx.send(value.clone()).is_ok());
        shared.value = value;
        true
    }
}

/// One subscriber's view of a [`Latest`].
pub struct Subscription<T> {
    rx: UnboundedReceiver<T>,
}

impl<T> Subscription<T> {
    /// Wait for the next value.
    ///
    /// Returns `None` once every [`Latest`] handle is gone and all queued
    /// values have been read.
    pub async fn next(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Take the next value if one is already queued.
    pub fn try_next(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Wait for the first value matching `pred`, skipping the others.
    pub async fn wait_for(&mut self, mut pred: impl FnMut(&T) -> bool) -> Option<T> {
        while let Some(value) = self.next().await {
            if pred(&value) {
                return Some(value);
            }
        }
        None
    }

    pub fn into_stream(self) -> impl Stream<Item = T> {
        futures::stream::unfold(self.rx, |mut rx| async move {
            rx.recv().await.map(|value| (value, rx))
        })
    }
}
