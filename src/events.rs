use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Handler<E> = Rc<RefCell<dyn FnMut(&E)>>;

struct Slots<E> {
    next_id: u64,
    handlers: Vec<(u64, Handler<E>)>,
}

/// Single-threaded notification hub. Handlers stay registered for as long
/// as the `Subscription` returned by `subscribe` is alive.
pub struct EventHub<E> {
    slots: Rc<RefCell<Slots<E>>>,
}

impl<E: 'static> Default for EventHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> EventHub<E> {
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Slots {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&E) + 'static,
    {
        let mut slots = self.slots.borrow_mut();
        let id = slots.next_id;
        slots.next_id += 1;
        let handler: Handler<E> = Rc::new(RefCell::new(handler));
        slots.handlers.push((id, handler));

        let weak: Weak<RefCell<Slots<E>>> = Rc::downgrade(&self.slots);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(slots) = weak.upgrade() {
                    slots.borrow_mut().handlers.retain(|(h, _)| *h != id);
                }
            })),
        }
    }

    /// Delivers `event` to every live handler in subscription order.
    /// Handlers may subscribe or unsubscribe while being called.
    pub fn publish(&self, event: &E) {
        let handlers: Vec<Handler<E>> = self
            .slots
            .borrow()
            .handlers
            .iter()
            .map(|(_, h)| h.clone())
            .collect();

        for handler in handlers {
            // A handler that re-publishes into itself is skipped.
            if let Ok(mut f) = handler.try_borrow_mut() {
                f(event);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.slots.borrow().handlers.len()
    }
}

/// Releases its handler when dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}
