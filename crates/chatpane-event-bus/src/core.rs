//! Core Event Bus Implementation
//!
//! Provides a type-safe publish/subscribe channel:
//! - Subscription lifecycle management (subscribe/unsubscribe, drop guards)
//! - Filtering capabilities
//! - Per-handler failure isolation
//! - Delivery statistics

use std::{
    any::Any,
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc, Mutex, MutexGuard, Weak,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

/// Result returned by subscriber callbacks. Errors are logged, never propagated.
pub type HandlerResult = anyhow::Result<()>;

/// Unique identifier for event subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

impl SubscriptionId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Statistics for event bus monitoring
#[derive(Debug, Clone, Default)]
pub struct EventBusStats {
    /// Total number of events published
    pub events_published: usize,
    /// Total number of events delivered to subscribers
    pub events_delivered: usize,
    /// Deliveries where the subscriber returned an error or panicked
    pub handler_failures: usize,
    /// Current number of active subscriptions
    pub active_subscriptions: usize,
    /// Total number of subscriptions created
    pub total_subscriptions: usize,
}

type Callback<T> = Box<dyn Fn(&T) -> HandlerResult + Send + Sync>;
type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Subscriber callback with filtering support
struct Subscriber<T> {
    id: SubscriptionId,
    callback: Callback<T>,
    filter: Option<Filter<T>>,
    once: bool,
    active: AtomicBool,
}

impl<T> Subscriber<T> {
    fn should_notify(&self, event: &T) -> bool {
        match &self.filter {
            Some(filter) => filter(event),
            None => true,
        }
    }

    /// Returns false if the subscriber was removed or already fired once
    fn claim(&self) -> bool {
        if self.once {
            self.active.swap(false, Ordering::AcqRel)
        } else {
            self.active.load(Ordering::Acquire)
        }
    }

    fn notify(&self, event: &T) -> HandlerResult {
        (self.callback)(event)
    }
}

#[derive(Default)]
struct DeliveryReport {
    delivered: usize,
    failures: usize,
    finished: Vec<SubscriptionId>,
}

fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Invoke every subscriber in order. A failing subscriber never stops the others.
fn deliver<T>(subscribers: &[Arc<Subscriber<T>>], event: &T) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    for subscriber in subscribers {
        if !subscriber.should_notify(event) || !subscriber.claim() {
            continue;
        }
        report.delivered += 1;

        match catch_unwind(AssertUnwindSafe(|| subscriber.notify(event))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                report.failures += 1;
                log::error!("[EventBus] Subscriber {:?} failed: {:#}", subscriber.id, e);
            }
            Err(payload) => {
                report.failures += 1;
                log::error!(
                    "[EventBus] Subscriber {:?} panicked: {}",
                    subscriber.id,
                    panic_message(&payload)
                );
            }
        }

        if subscriber.once {
            report.finished.push(subscriber.id);
        }
    }

    report
}

/// Core event bus implementation
pub struct EventBus<T> {
    subscribers: Vec<Arc<Subscriber<T>>>,
    stats: EventBusStats,
}

impl<T: 'static> EventBus<T> {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            stats: EventBusStats::default(),
        }
    }

    fn add(&mut self, callback: Callback<T>, filter: Option<Filter<T>>, once: bool) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.subscribers.push(Arc::new(Subscriber {
            id,
            callback,
            filter,
            once,
            active: AtomicBool::new(true),
        }));
        self.stats.active_subscriptions += 1;
        self.stats.total_subscriptions += 1;

        log::trace!("[EventBus] New subscription: {:?}", id);
        id
    }

    /// Subscribe to every event.
    ///
    /// Subscribers are invoked in registration order. Returns a SubscriptionId
    /// that can be used to unsubscribe later.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) -> HandlerResult + Send + Sync + 'static,
    {
        self.add(Box::new(callback), None, false)
    }

    /// Subscribe to events with a filter predicate
    ///
    /// Only events matching the filter will be delivered to the callback.
    pub fn subscribe_with_filter<F, P>(&mut self, callback: F, filter: Option<P>) -> SubscriptionId
    where
        F: Fn(&T) -> HandlerResult + Send + Sync + 'static,
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.add(
            Box::new(callback),
            filter.map(|f| Box::new(f) as Filter<T>),
            false,
        )
    }

    /// Subscribe to a single event (one-shot subscription)
    ///
    /// The subscription is removed after the first delivered event.
    pub fn subscribe_once<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnOnce(&T) + Send + 'static,
    {
        let callback_cell = Mutex::new(Some(callback));
        self.add(
            Box::new(move |event: &T| {
                let callback = callback_cell
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .take();
                if let Some(cb) = callback {
                    cb(event);
                }
                Ok(())
            }),
            None,
            true,
        )
    }

    /// Unsubscribe using a subscription ID
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        if let Some(pos) = self.subscribers.iter().position(|s| s.id == id) {
            let subscriber = self.subscribers.remove(pos);
            subscriber.active.store(false, Ordering::Release);
            self.stats.active_subscriptions = self.stats.active_subscriptions.saturating_sub(1);
            log::trace!("[EventBus] Unsubscribed: {:?}", id);
            true
        } else {
            log::debug!("[EventBus] Subscription not found: {:?}", id);
            false
        }
    }

    fn snapshot(&self) -> Vec<Arc<Subscriber<T>>> {
        self.subscribers.clone()
    }

    fn record(&mut self, report: DeliveryReport) {
        self.stats.events_published += 1;
        self.stats.events_delivered += report.delivered;
        self.stats.handler_failures += report.failures;

        // Remove one-shot subscribers
        for id in report.finished {
            self.unsubscribe(id);
        }
    }

    /// Publish an event to all subscribers
    pub fn publish(&mut self, event: T) {
        let subscribers = self.snapshot();
        let report = deliver(&subscribers, &event);
        self.record(report);

        log::trace!(
            "[EventBus] Published event to {} subscribers",
            self.subscribers.len()
        );
    }

    /// Get current statistics
    pub fn stats(&self) -> EventBusStats {
        self.stats.clone()
    }

    /// Get the number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Clear all subscriptions
    pub fn clear(&mut self) {
        let count = self.subscribers.len();
        for subscriber in self.subscribers.drain(..) {
            subscriber.active.store(false, Ordering::Release);
        }
        self.stats.active_subscriptions = 0;
        log::info!("[EventBus] Cleared {} subscriptions", count);
    }
}

impl<T: 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Unsubscribes when dropped unless [`Subscription::detach`] was called
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: SubscriptionId,
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new<F>(id: SubscriptionId, unsubscribe: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            id,
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Keep the subscription alive for as long as the bus lives
    pub fn detach(mut self) {
        self.unsubscribe.take();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("attached", &self.unsubscribe.is_some())
            .finish()
    }
}

/// Thread-safe container for EventBus
///
/// The lock is released while subscribers run, so a subscriber may subscribe,
/// unsubscribe or publish without deadlocking.
pub struct EventBusContainer<T> {
    inner: Arc<Mutex<EventBus<T>>>,
}

impl<T> Clone for EventBusContainer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> EventBusContainer<T>
where
    T: 'static,
{
    /// Create a new event bus container
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EventBus::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EventBus<T>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Subscribe to events
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) -> HandlerResult + Send + Sync + 'static,
    {
        self.lock().subscribe(callback)
    }

    /// Subscribe with a filter predicate
    pub fn subscribe_with_filter<F, P>(&self, callback: F, filter: P) -> SubscriptionId
    where
        F: Fn(&T) -> HandlerResult + Send + Sync + 'static,
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.lock().subscribe_with_filter(callback, Some(filter))
    }

    /// Subscribe to a single event (one-shot)
    pub fn subscribe_once<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnOnce(&T) + Send + 'static,
    {
        self.lock().subscribe_once(callback)
    }

    /// Unsubscribe using a subscription ID
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().unsubscribe(id)
    }

    /// Wrap `id` in a guard that unsubscribes on drop.
    ///
    /// The guard holds a weak reference, so it never keeps the bus alive.
    pub fn guard(&self, id: SubscriptionId) -> Subscription {
        let weak: Weak<Mutex<EventBus<T>>> = Arc::downgrade(&self.inner);
        Subscription::new(id, move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .unsubscribe(id);
            }
        })
    }

    /// Publish an event to the subscribers registered at call time
    pub fn publish(&self, event: T) {
        let subscribers = self.lock().snapshot();
        let report = deliver(&subscribers, &event);
        self.lock().record(report);

        log::trace!(
            "[EventBus] Published event to {} subscribers",
            subscribers.len()
        );
    }

    /// Get current statistics
    pub fn stats(&self) -> EventBusStats {
        self.lock().stats()
    }

    /// Get subscriber count
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscriber_count()
    }

    /// Clear all subscriptions
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<T> Default for EventBusContainer<T>
where
    T: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
