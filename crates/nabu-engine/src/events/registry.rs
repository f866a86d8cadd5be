use std::fmt;

use super::{Event, EventKind};

/// Handle returned by [`EventRegistry::register`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CallbackId(u32);

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "callback {}", self.0)
    }
}

type Callback = Box<dyn FnMut(&Event)>;

/// Listeners and queued events of one kind.
#[derive(Default)]
struct Channel {
    callbacks: Vec<(CallbackId, Callback)>,
    queued: Vec<Event>,
}

impl Channel {
    fn dispatch(&mut self, event: &Event) {
        for (_, callback) in &mut self.callbacks {
            callback(event);
        }
    }
}

/// Callback registry indexed by [`EventKind`].
///
/// Callbacks of one kind run in registration order.
pub struct EventRegistry {
    channels: [Channel; EventKind::COUNT],
    next_id: u32,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self {
            channels: Default::default(),
            next_id: 0,
        }
    }

    pub fn register(&mut self, kind: EventKind, callback: impl FnMut(&Event) + 'static) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        self.channels[kind.index()].callbacks.push((id, Box::new(callback)));
        log::trace!("{id} registered for {kind:?}");
        id
    }

    /// Returns false if `id` was not registered.
    pub fn unregister(&mut self, id: CallbackId) -> bool {
        for channel in &mut self.channels {
            if let Some(pos) = channel.callbacks.iter().position(|(cid, _)| *cid == id) {
                channel.callbacks.remove(pos);
                return true;
            }
        }
        false
    }

    /// Runs every callback of the event's kind now.
    pub fn notify(&mut self, event: &Event) {
        self.channels[event.kind().index()].dispatch(event);
    }

    /// Queues `event` until the next [`EventRegistry::tick`].
    ///
    /// Dropped when nothing listens for its kind.
    pub fn notify_delayed(&mut self, event: Event) {
        let channel = &mut self.channels[event.kind().index()];
        if !channel.callbacks.is_empty() {
            channel.queued.push(event);
        }
    }

    /// Delivers and clears all queued events.
    pub fn tick(&mut self) {
        for channel in &mut self.channels {
            let queued = std::mem::take(&mut channel.queued);
            for event in &queued {
                channel.dispatch(event);
            }
        }
    }

    pub fn callback_count(&self, kind: EventKind) -> usize {
        self.channels[kind.index()].callbacks.len()
    }

    pub fn queued_count(&self) -> usize {
        self.channels.iter().map(|c| c.queued.len()).sum()
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::input::{Key, KeyState};

    fn counter(registry: &mut EventRegistry, kind: EventKind) -> (CallbackId, Rc<Cell<u32>>) {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let id = registry.register(kind, move |_| h.set(h.get() + 1));
        (id, hits)
    }

    #[test]
    fn immediate_notification_reaches_only_its_kind() {
        let mut registry = EventRegistry::new();
        let (_, close) = counter(&mut registry, EventKind::WindowClose);
        let (_, resize) = counter(&mut registry, EventKind::WindowResize);

        registry.notify(&Event::WindowClose);
        assert_eq!((close.get(), resize.get()), (1, 0));
    }

    #[test]
    fn delayed_events_wait_for_tick() {
        let mut registry = EventRegistry::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        registry.register(EventKind::WindowResize, move |e| s.borrow_mut().push(e.clone()));

        registry.notify_delayed(Event::WindowResize { width: 1, height: 2 });
        registry.notify_delayed(Event::WindowResize { width: 3, height: 4 });
        assert!(seen.borrow().is_empty());
        assert_eq!(registry.queued_count(), 2);

        registry.tick();
        assert_eq!(
            *seen.borrow(),
            [
                Event::WindowResize { width: 1, height: 2 },
                Event::WindowResize { width: 3, height: 4 }
            ]
        );

        // Queue is cleared after delivery.
        registry.tick();
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn delayed_event_without_listener_is_dropped() {
        let mut registry = EventRegistry::new();
        registry.notify_delayed(Event::CriticalAssetsLoaded);
        assert_eq!(registry.queued_count(), 0);
    }

    #[test]
    fn unregistered_callback_stops_firing() {
        let mut registry = EventRegistry::new();
        let (id, hits) = counter(&mut registry, EventKind::KeyboardKey);
        let key = Event::KeyboardKey {
            key: Key::Escape,
            state: KeyState::Pressed,
            scancode: 1,
        };

        registry.notify(&key);
        assert!(registry.unregister(id));
        assert!(!registry.unregister(id));
        registry.notify(&key);

        assert_eq!(hits.get(), 1);
        assert_eq!(registry.callback_count(EventKind::KeyboardKey), 0);
    }

    #[test]
    fn ids_are_unique_across_kinds() {
        let mut registry = EventRegistry::new();
        let (a, _) = counter(&mut registry, EventKind::MousePos);
        let (b, _) = counter(&mut registry, EventKind::MouseScroll);
        assert_ne!(a, b);
    }
}
