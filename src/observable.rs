//! Observable Values
//!
//! A single current value with publish-subscribe on change, built on
//! `tokio::sync::watch`. Writers never block; subscribers always observe the
//! latest value and may skip intermediate ones.

use tokio::sync::watch;

/// Holder of one current value that observers can subscribe to
#[derive(Debug)]
pub struct Observable<T> {
    tx: watch::Sender<T>,
}

impl<T> Observable<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Clone out the current value
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.tx.borrow().clone()
    }

    /// Inspect the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Replace the value and notify subscribers
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Mutate the value in place and notify subscribers
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }

    /// Mutate the value in place; subscribers are notified only when `f`
    /// returns `true`
    pub fn update_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }

    /// New receiver; the current value counts as already seen
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_update() {
        let value = Observable::new(1);
        assert_eq!(value.get(), 1);

        value.set(5);
        assert_eq!(value.get(), 5);

        value.update(|v| *v += 1);
        assert_eq!(value.get(), 6);
        assert!(value.with(|v| *v == 6));
    }

    #[tokio::test]
    async fn test_update_if_skips_unchanged() {
        let value = Observable::new(vec![1, 2]);
        let mut rx = value.subscribe();

        assert!(!value.update_if(|v| v.len() > 5));
        assert!(!rx.has_changed().unwrap());

        assert!(value.update_if(|v| {
            v.push(3);
            true
        }));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), vec![1, 2, 3]);
    }

    #[test]
    fn test_set_without_subscribers() {
        let value: Observable<Vec<u8>> = Observable::default();
        assert_eq!(value.subscriber_count(), 0);

        value.set(vec![1]);
        assert_eq!(value.get(), vec![1]);
    }

    #[tokio::test]
    async fn test_subscriber_sees_changes() {
        let value = Observable::new(String::from("a"));
        let mut rx = value.subscribe();
        assert_eq!(value.subscriber_count(), 1);
        assert!(!rx.has_changed().unwrap());

        value.set("b".to_string());
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "b");

        value.update(|s| s.push('c'));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "bc");
    }

    #[tokio::test]
    async fn test_subscriber_skips_to_latest() {
        let value = Observable::new(0);
        let mut rx = value.subscribe();

        value.set(1);
        value.set(2);
        value.set(3);

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 3);
        assert!(!rx.has_changed().unwrap());
    }
}
