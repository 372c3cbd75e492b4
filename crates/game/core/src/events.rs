//! Synchronous listener lists.
//!
//! Every observable component (character, inventory, save service) owns an
//! [`EventListeners`] for its event type. Listeners run in registration order,
//! on the thread that raised the event, before the raising call returns.

use std::fmt;

/// Identifies a registered listener so it can be removed again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<E> = Box<dyn FnMut(&E) + Send>;

pub struct EventListeners<E> {
    listeners: Vec<(ListenerId, Listener<E>)>,
    next_id: u64,
}

impl<E> EventListeners<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&E) + Send + 'static) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &E) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<E> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn listeners_run_in_registration_order_until_removed() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = EventListeners::<u32>::new();

        let first = {
            let log = Arc::clone(&log);
            listeners.subscribe(move |event| log.lock().unwrap().push(("first", *event)))
        };
        {
            let log = Arc::clone(&log);
            listeners.subscribe(move |event| log.lock().unwrap().push(("second", *event)));
        }

        listeners.emit(&1);
        assert!(listeners.unsubscribe(first));
        assert!(!listeners.unsubscribe(first));
        listeners.emit(&2);

        assert_eq!(
            *log.lock().unwrap(),
            vec![("first", 1), ("second", 1), ("second", 2)]
        );
    }
}
