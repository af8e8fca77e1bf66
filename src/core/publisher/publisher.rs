// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A [`Publisher`] fans a value out to every current [`Subscription`] without
//! ever blocking on a slow one. Built on [`tokio::sync::broadcast`]: a
//! subscriber that falls behind sees [`broadcast::error::RecvError::Lagged`]
//! on its next receive rather than stalling the publisher, which is exactly
//! the "coalesce a burst into one change signal" behavior the replay engine
//! and pane observers need — catching up means re-reading the current
//! snapshot, not replaying every missed delta.

use tokio::sync::broadcast;

/// Default channel depth. Bursty publishers (PTY output at full throughput)
/// will lag some subscribers under load; that is expected and handled by
/// [`Subscription::recv`] rather than avoided by growing this without bound.
const CHANNEL_CAPACITY: usize = 64;

/// Delivers values of type `T` to every live [`Subscription`]. Cloning a
/// `Publisher` shares the same underlying channel — all clones publish to the
/// same subscriber set.
#[derive(Debug, Clone)]
pub struct Publisher<T> {
    sender: broadcast::Sender<T>,
}

impl<T: Clone> Default for Publisher<T> {
    fn default() -> Self { Self::new() }
}

impl<T: Clone> Publisher<T> {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _receiver) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Delivers `value` to every current subscriber. Never blocks: with no
    /// subscribers this is a no-op, and a subscriber that can't keep up simply
    /// drops the oldest buffered values rather than applying backpressure
    /// here.
    pub fn publish(&self, value: T) {
        // An error here only ever means "no receivers" — nothing to deliver to,
        // which is not a failure for a fire-and-forget publisher.
        let _unused = self.sender.send(value);
    }

    /// Returns a handle to the channel's current subscriber count.
    #[must_use]
    pub fn subscriber_count(&self) -> usize { self.sender.receiver_count() }

    /// Registers a new subscriber. Dropping the returned [`Subscription`]
    /// unregisters it — no explicit close call is needed.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<T> { Subscription { receiver: self.sender.subscribe() } }
}

/// A live registration with a [`Publisher`]. Dropping it removes the
/// subscription.
#[derive(Debug)]
pub struct Subscription<T> {
    receiver: broadcast::Receiver<T>,
}

impl<T: Clone> Subscription<T> {
    /// Waits for the next published value, silently skipping over any lag
    /// (values dropped because this subscriber fell behind) rather than
    /// surfacing it as an error — callers that need "what changed" should be
    /// re-reading current state on each notification anyway, so a lag is just
    /// a coalesced notification.
    ///
    /// Returns `None` once the publisher side is gone and nothing remains
    /// buffered.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            match self.receiver.recv().await {
                Ok(value) => return Some(value),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_value() {
        let publisher: Publisher<u32> = Publisher::new();
        let mut subscription = publisher.subscribe();
        publisher.publish(42);
        assert_eq!(subscription.recv().await, Some(42));
    }

    #[tokio::test]
    async fn multiple_subscribers_all_receive() {
        let publisher: Publisher<&'static str> = Publisher::new();
        let mut a = publisher.subscribe();
        let mut b = publisher.subscribe();
        publisher.publish("hello");
        assert_eq!(a.recv().await, Some("hello"));
        assert_eq!(b.recv().await, Some("hello"));
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_does_not_panic() {
        let publisher: Publisher<u32> = Publisher::new();
        publisher.publish(1);
    }

    #[tokio::test]
    async fn dropping_subscription_reduces_subscriber_count() {
        let publisher: Publisher<u32> = Publisher::new();
        let subscription = publisher.subscribe();
        assert_eq!(publisher.subscriber_count(), 1);
        drop(subscription);
        assert_eq!(publisher.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn lagging_subscriber_catches_up_without_closing() {
        let publisher: Publisher<u32> = Publisher::new();
        let mut subscription = publisher.subscribe();
        for value in 0..(CHANNEL_CAPACITY as u32 * 2) {
            publisher.publish(value);
        }
        // The channel overflowed; recv should skip the lag marker and return
        // whatever is still buffered rather than None.
        assert!(subscription.recv().await.is_some());
    }

    #[tokio::test]
    async fn recv_returns_none_after_publisher_dropped() {
        let publisher: Publisher<u32> = Publisher::new();
        let mut subscription = publisher.subscribe();
        drop(publisher);
        assert_eq!(subscription.recv().await, None);
    }
}
