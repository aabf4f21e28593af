//! Element change notifications.
//!
//! Every element carries an [`EventBus`]. An event is first handed to the
//! element's own `on_event` hook and then fanned out to subscribers over
//! crossbeam channels. Subscribers that dropped their receiver are pruned on
//! the next publish.

use crate::graph::socket::SocketKind;
use crate::graph::value::ValueType;
use crossbeam_channel::{Receiver, Sender};

#[derive(Debug, Clone, PartialEq)]
pub enum ElementEvent {
    Renamed {
        from: String,
        to: String,
    },
    SocketRenamed {
        kind: SocketKind,
        index: u8,
        from: String,
        to: String,
    },
    SocketTypeChanged {
        kind: SocketKind,
        index: u8,
        from: ValueType,
        to: ValueType,
    },
    SocketAdded {
        kind: SocketKind,
        index: u8,
    },
    SocketRemoved {
        kind: SocketKind,
        index: u8,
    },
    Console {
        text: String,
    },
}

#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<ElementEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<ElementEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, event: &ElementEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_out_in_order() {
        let mut bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        bus.publish(&ElementEvent::Console { text: "one".into() });
        bus.publish(&ElementEvent::Console { text: "two".into() });

        for rx in [a, b] {
            let got: Vec<_> = rx.try_iter().collect();
            assert_eq!(
                got,
                vec![
                    ElementEvent::Console { text: "one".into() },
                    ElementEvent::Console { text: "two".into() },
                ]
            );
        }
    }

    #[test]
    fn test_dropped_subscriber_pruned() {
        let mut bus = EventBus::new();
        let keep = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(&ElementEvent::SocketAdded {
            kind: SocketKind::Input,
            index: 0,
        });
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(keep.len(), 1);
    }
}
