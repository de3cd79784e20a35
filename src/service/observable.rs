/// Publish/subscribe value for state handed to a rendering layer
///
/// Wraps a `tokio::sync::watch` channel so the service can replace the
/// current value and any number of readers can follow it.

use tokio::sync::watch;

/// A value that can be replaced and observed
///
/// Every `publish` replaces the current value and wakes all subscribers.
/// Publishing never fails, even when nobody is subscribed.
pub struct Observable<T> {
    sender: watch::Sender<T>,
}

impl<T> Observable<T> {
    pub fn new(initial: T) -> Self {
        let (sender, _receiver) = watch::channel(initial);
        Self { sender }
    }

    /// Replace the current value
    pub fn publish(&self, value: T) {
        self.sender.send_replace(value);
    }

    /// Get a receiver that sees the current value and every later one
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }
}

impl<T: Clone> Observable<T> {
    /// Snapshot of the current value
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_see_published_values() {
        let observable = Observable::new(1);
        let mut receiver = observable.subscribe();
        assert_eq!(*receiver.borrow(), 1);

        observable.publish(2);
        receiver.changed().await.unwrap();
        assert_eq!(*receiver.borrow_and_update(), 2);
        assert_eq!(observable.get(), 2);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let observable = Observable::new(vec!["a"]);
        observable.publish(vec!["b", "c"]);
        assert_eq!(observable.get(), vec!["b", "c"]);
    }
}
