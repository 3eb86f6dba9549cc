//! Delivery of publish records to registered consumers.
//!
//! The registry is a plain vector owned by the client. Every consumer sees
//! every record; topic filtering is up to the consumer (see [`TopicConsumer`]).
//! A consumer that fails, by returning an error or by panicking, is logged and
//! skipped for that record only. It stays registered.

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use bm_serial_protocol::PublishRecord;
use tracing::{trace, warn};

use crate::metrics::{CONSUMER_FAILURES, PUBLISH_DISPATCHED};

/// Error type consumers may return.
pub type ConsumerError = Box<dyn Error + Send + Sync>;

/// Result of one consumer invocation.
pub type ConsumerResult = std::result::Result<(), ConsumerError>;

/// Receives decoded publish records.
pub trait Consumer {
    /// Handle one record.
    fn on_publish(&self, record: &PublishRecord) -> ConsumerResult;
}

impl<F> Consumer for F
where
    F: Fn(&PublishRecord) -> ConsumerResult,
{
    fn on_publish(&self, record: &PublishRecord) -> ConsumerResult {
        self(record)
    }
}

/// Shared handle to a consumer.
///
/// Clones refer to the same consumer and compare equal; two handles built
/// from identical closures do not.
#[derive(Clone)]
pub struct ConsumerHandle {
    consumer: Rc<dyn Consumer>,
    label: Option<String>,
}

impl ConsumerHandle {
    /// Wrap a consumer.
    pub fn new<C: Consumer + 'static>(consumer: C) -> Self {
        ConsumerHandle {
            consumer: Rc::new(consumer),
            label: None,
        }
    }

    /// Wrap a closure. Gives the compiler the argument type so closures
    /// written inline need no annotations.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&PublishRecord) -> ConsumerResult + 'static,
    {
        Self::new(f)
    }

    /// Attach a label used in log messages.
    pub fn named(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label, if one was attached.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Whether two handles refer to the same consumer.
    pub fn same_consumer(&self, other: &ConsumerHandle) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.consumer), Rc::as_ptr(&other.consumer))
    }

    fn invoke(&self, record: &PublishRecord) -> ConsumerResult {
        self.consumer.on_publish(record)
    }
}

impl PartialEq for ConsumerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_consumer(other)
    }
}

impl Eq for ConsumerHandle {}

impl fmt::Debug for ConsumerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerHandle")
            .field("label", &self.label)
            .field("ptr", &Rc::as_ptr(&self.consumer).cast::<()>())
            .finish()
    }
}

/// Outcome of dispatching one record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Consumers that returned `Ok`.
    pub delivered: usize,
    /// Consumers that returned an error or panicked.
    pub failed: usize,
}

/// Ordered, duplicate-free consumer registry.
#[derive(Debug, Default)]
pub struct Dispatcher {
    consumers: Vec<ConsumerHandle>,
}

impl Dispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a consumer. Returns `false` if it was already registered.
    pub fn subscribe(&mut self, handle: &ConsumerHandle) -> bool {
        if self.contains(handle) {
            trace!(label = ?handle.label(), "consumer already registered");
            return false;
        }
        self.consumers.push(handle.clone());
        true
    }

    /// Whether `handle` is registered.
    pub fn contains(&self, handle: &ConsumerHandle) -> bool {
        self.consumers.iter().any(|c| c.same_consumer(handle))
    }

    /// Number of registered consumers.
    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    /// Whether no consumer is registered.
    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }

    /// Hand `record` to every consumer in registration order.
    pub fn dispatch(&self, record: &PublishRecord) -> DispatchReport {
        PUBLISH_DISPATCHED.increment(1);
        let mut report = DispatchReport::default();

        for (index, handle) in self.consumers.iter().enumerate() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| handle.invoke(record)));
            match outcome {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    report.failed += 1;
                    warn!(index, label = ?handle.label(), topic = %record.topic, error = %e, "consumer failed");
                }
                Err(payload) => {
                    report.failed += 1;
                    warn!(
                        index,
                        label = ?handle.label(),
                        topic = %record.topic,
                        panic = panic_message(payload.as_ref()),
                        "consumer panicked"
                    );
                }
            }
        }

        if report.failed > 0 {
            CONSUMER_FAILURES.increment(report.failed as u64);
        }
        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

/// Forwards only records published on one topic.
pub struct TopicConsumer<C> {
    topic: String,
    inner: C,
}

impl<C: Consumer> TopicConsumer<C> {
    /// Wrap `inner` so it only sees records on `topic`.
    pub fn new(topic: impl Into<String>, inner: C) -> Self {
        TopicConsumer {
            topic: topic.into(),
            inner,
        }
    }

    /// Topic this consumer listens to.
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl<F> TopicConsumer<F>
where
    F: Fn(&PublishRecord) -> ConsumerResult,
{
    /// Filter a closure by topic.
    pub fn from_fn(topic: impl Into<String>, f: F) -> Self {
        TopicConsumer {
            topic: topic.into(),
            inner: f,
        }
    }
}

impl<C: Consumer> Consumer for TopicConsumer<C> {
    fn on_publish(&self, record: &PublishRecord) -> ConsumerResult {
        if record.topic_matches(&self.topic) {
            self.inner.on_publish(record)
        } else {
            Ok(())
        }
    }
}
