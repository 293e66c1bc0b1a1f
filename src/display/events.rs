//! Notifications a `Display` sends to whoever is
//! rendering or reporting its state.
//!
//! The bus is handed to each display at construction. Events
//! can be delivered right away (`publish`) or queued until the
//! end of the current input-handling cycle (`publish_later`,
//! drained by `flush`). Queued events are delivered in the order
//! they were queued.

use std::collections::VecDeque;
use std::sync::Arc;

use log::trace;
use parking_lot::{Mutex, RwLock};

use crate::data::axis::AxisType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    /// The cursor position along `axis` changed
    AxisPositionChanged { display : String, axis : AxisType },
    /// `axis` became the axis navigation acts on
    AxisActivated { display : String, axis : AxisType },
}

impl DisplayEvent {
    pub fn display(&self) -> &str {
        match self {
            DisplayEvent::AxisPositionChanged { display, .. }
            | DisplayEvent::AxisActivated { display, .. } => display,
        }
    }

    pub fn axis(&self) -> &AxisType {
        match self {
            DisplayEvent::AxisPositionChanged { axis, .. }
            | DisplayEvent::AxisActivated { axis, .. } => axis,
        }
    }
}

pub trait DisplayObserver : Send + Sync {
    fn on_event(&self, event : &DisplayEvent);
}

impl<F> DisplayObserver for F where F : Fn(&DisplayEvent) + Send + Sync {
    fn on_event(&self, event : &DisplayEvent) {
        self(event)
    }
}

#[derive(Default)]
pub struct EventBus {
    observers : RwLock<Vec<Arc<dyn DisplayObserver>>>,
    /// Events waiting for the next `flush`.
    queue : Mutex<VecDeque<DisplayEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer : Arc<dyn DisplayObserver>) {
        self.observers.write().push(observer);
    }

    /// Delivers `event` to every observer before returning.
    pub fn publish(&self, event : DisplayEvent) {
        // Observers may subscribe (or publish) from inside a callback
        let observers = self.observers.read().clone();
        trace!("Delivering {:?} to {} observers", event, observers.len());
        observers.iter().for_each(|observer| observer.on_event(&event));
    }

    /// Queues `event` for the next `flush`.
    pub fn publish_later(&self, event : DisplayEvent) {
        self.queue.lock().push_back(event);
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Delivers every queued event, oldest first. Events queued
    /// while flushing wait for the next flush.
    ///
    /// ## Returns
    ///
    /// The number of events delivered.
    pub fn flush(&self) -> usize {
        let batch : Vec<DisplayEvent> = self.queue.lock().drain(..).collect();
        let delivered = batch.len();
        batch.into_iter().for_each(|event| self.publish(event));
        delivered
    }
}
