use std::any::Any;

use mosaic_msgs::{Message, Quantity};

/// Delivery capability the mailboxes publish into.
///
/// The core only ever talks to this trait. Concrete transports (a ROS
/// publisher, a channel, stdout) live in adapter code outside this crate,
/// which keeps the mailboxes testable without any transport at all.
///
/// The sink borrows the value: the mailbox keeps the allocation and
/// recycles it for the next sample. A sink that needs to keep the message
/// past the call clones or serializes it.
pub trait TransportSink {
    fn send<M: Message>(&mut self, topic: &str, value: &M);
}

impl<S: TransportSink> TransportSink for &mut S {
    fn send<M: Message>(&mut self, topic: &str, value: &M) {
        (**self).send(topic, value);
    }
}

/// One value captured by a [`CollectingSink`].
#[derive(Debug)]
pub struct Delivered {
    pub topic: String,
    pub quantity: Quantity,
    value: Box<dyn Any + Send>,
}

impl Delivered {
    /// Downcast the captured value. Returns `None` if it is not an `M`.
    #[must_use]
    pub fn value<M: Message>(&self) -> Option<&M> {
        self.value.downcast_ref::<M>()
    }
}

/// Sink that keeps a clone of everything it is sent, in order.
///
/// Intended for tests and for adapters that batch deliveries.
#[derive(Debug, Default)]
pub struct CollectingSink {
    deliveries: Vec<Delivered>,
}

impl CollectingSink {
    #[must_use]
    pub fn deliveries(&self) -> &[Delivered] {
        &self.deliveries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }

    /// Number of deliveries of `quantity`.
    #[must_use]
    pub fn count(&self, quantity: Quantity) -> usize {
        self.deliveries
            .iter()
            .filter(|d| d.quantity == quantity)
            .count()
    }

    /// Drain everything captured so far.
    pub fn take_all(&mut self) -> Vec<Delivered> {
        std::mem::take(&mut self.deliveries)
    }
}

impl TransportSink for CollectingSink {
    fn send<M: Message>(&mut self, topic: &str, value: &M) {
        self.deliveries.push(Delivered {
            topic: topic.to_owned(),
            quantity: M::QUANTITY,
            value: Box::new(value.clone()),
        });
    }
}
