//! Keyboard event surface.
//!
//! The host (window, terminal, script) publishes raw press/release events
//! here; motion sessions subscribe for as long as they are alive.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    Press,
    Release,
}

/// A raw keyboard event carrying a DOM-style key name (`"ArrowUp"`, `"w"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: String,
    pub action: KeyAction,
}

impl KeyEvent {
    pub fn press(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            action: KeyAction::Press,
        }
    }

    pub fn release(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            action: KeyAction::Release,
        }
    }
}

/// Broadcast source of keyboard events.
///
/// Each subscriber gets its own buffered receiver; dropping the receiver is
/// the unsubscribe.
#[derive(Debug, Clone)]
pub struct Keyboard {
    tx: broadcast::Sender<KeyEvent>,
}

impl Keyboard {
    /// Creates a keyboard whose subscribers buffer up to `capacity` events
    /// between drains.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event. Returns the number of subscribers that saw it.
    pub fn emit(&self, event: KeyEvent) -> usize {
        // No subscribers is not an error: keys pressed outside a session are dropped
        self.tx.send(event).unwrap_or(0)
    }

    pub fn press(&self, key: &str) -> usize {
        self.emit(KeyEvent::press(key))
    }

    pub fn release(&self, key: &str) -> usize {
        self.emit(KeyEvent::release(key))
    }

    /// Opens a new subscription.
    pub fn subscribe(&self) -> broadcast::Receiver<KeyEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_is_dropped() {
        let keyboard = Keyboard::default();
        assert_eq!(keyboard.press("w"), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let keyboard = Keyboard::default();
        let rx = keyboard.subscribe();
        assert_eq!(keyboard.subscriber_count(), 1);

        drop(rx);
        assert_eq!(keyboard.subscriber_count(), 0);
    }

    #[test]
    fn test_subscriber_receives_events_in_order() {
        let keyboard = Keyboard::default();
        let mut rx = keyboard.subscribe();

        keyboard.press("ArrowUp");
        keyboard.release("ArrowUp");

        assert_eq!(rx.try_recv().unwrap(), KeyEvent::press("ArrowUp"));
        assert_eq!(rx.try_recv().unwrap(), KeyEvent::release("ArrowUp"));
        assert!(rx.try_recv().is_err());
    }
}
