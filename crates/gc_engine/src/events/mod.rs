//! Event system
//! Key principles:
//! - Key-value arguments (no order dependency)
//! - Handler returns bool (true = consumed, stops forwarding)
//! - Registration system (only notify interested handlers)
//! - Queuing support (immediate + deferred delivery)
//!
//! The input system queues key and mouse transitions here; the engine
//! dispatches the queue once per frame, before the Update pass.

use std::collections::HashMap;

use crate::input::{KeyCode, MouseButton};

/// Event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Key went down this frame
    KeyPressed,
    /// Key went up this frame
    KeyReleased,
    /// Mouse button went down this frame
    MouseButtonPressed,
    /// Mouse button went up this frame
    MouseButtonReleased,
    /// A controller was plugged in
    ControllerConnected,
    /// A controller was unplugged
    ControllerDisconnected,
    /// Application-defined event
    Custom(u32),
}

/// Variant for type-safe event arguments
#[derive(Debug, Clone, PartialEq)]
pub enum EventArg {
    /// Keyboard key
    Key(KeyCode),
    /// Mouse button
    MouseButton(MouseButton),
    /// Controller slot
    Controller(usize),
    /// Integer payload
    Int(i64),
    /// Float payload
    Float(f32),
    /// Text payload
    Text(String),
}

/// Event with type ID and key-value arguments
#[derive(Debug, Clone)]
pub struct Event {
    /// Type of event
    pub event_type: EventType,
    /// Timestamp when event was created (seconds)
    pub timestamp: f64,
    args: HashMap<&'static str, EventArg>,
}

impl Event {
    /// Create a new event with the given type and timestamp
    pub fn new(event_type: EventType, timestamp: f64) -> Self {
        Self {
            event_type,
            timestamp,
            args: HashMap::new(),
        }
    }

    /// Add an argument to the event (builder pattern)
    pub fn with_arg(mut self, key: &'static str, value: EventArg) -> Self {
        self.args.insert(key, value);
        self
    }

    /// Get an argument by key
    pub fn get_arg(&self, key: &str) -> Option<&EventArg> {
        self.args.get(key)
    }

    /// Get the `key` argument if present
    pub fn key(&self) -> Option<KeyCode> {
        match self.get_arg("key") {
            Some(EventArg::Key(key)) => Some(*key),
            _ => None,
        }
    }

    /// Get the `button` argument if present
    pub fn mouse_button(&self) -> Option<MouseButton> {
        match self.get_arg("button") {
            Some(EventArg::MouseButton(button)) => Some(*button),
            _ => None,
        }
    }
}

/// Event handler trait
/// Returns true if event was consumed (stops forwarding)
pub trait EventHandler {
    /// Handle an event, return true if consumed
    fn on_event(&mut self, event: &Event) -> bool;
}

impl<F: FnMut(&Event) -> bool> EventHandler for F {
    fn on_event(&mut self, event: &Event) -> bool {
        self(event)
    }
}

/// Event system with registration and queuing
pub struct EventSystem {
    immediate_queue: Vec<Event>,
    deferred_queue: Vec<(f64, Event)>,
    handlers: HashMap<EventType, Vec<Box<dyn EventHandler>>>,
    current_time: f64,
}

impl EventSystem {
    /// Create a new empty event system
    pub fn new() -> Self {
        Self {
            immediate_queue: Vec::new(),
            deferred_queue: Vec::new(),
            handlers: HashMap::new(),
            current_time: 0.0,
        }
    }

    /// Update current time (seconds since start)
    pub fn update_time(&mut self, time: f64) {
        self.current_time = time;
    }

    /// Current time as last set by [`Self::update_time`]
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Register a handler for a specific event type
    pub fn register_handler(&mut self, event_type: EventType, handler: Box<dyn EventHandler>) {
        self.handlers.entry(event_type).or_default().push(handler);
    }

    /// Register a closure for a specific event type
    pub fn subscribe<F>(&mut self, event_type: EventType, handler: F)
    where
        F: FnMut(&Event) -> bool + 'static,
    {
        self.register_handler(event_type, Box::new(handler));
    }

    /// Drop every handler registered for `event_type`
    pub fn unsubscribe(&mut self, event_type: EventType) {
        self.handlers.remove(&event_type);
    }

    /// Send event for immediate handling this frame
    pub fn send(&mut self, event: Event) {
        self.immediate_queue.push(event);
    }

    /// Post event for deferred delivery at specified time
    pub fn post(&mut self, delivery_time: f64, event: Event) {
        self.deferred_queue.push((delivery_time, event));
    }

    /// Types of the events waiting in the immediate queue
    pub fn pending_types(&self) -> Vec<EventType> {
        self.immediate_queue.iter().map(|event| event.event_type).collect()
    }

    /// Dispatch all pending events
    /// Processes immediate queue first, then due deferred events
    pub fn dispatch(&mut self) {
        let immediate = std::mem::take(&mut self.immediate_queue);
        for event in immediate {
            self.dispatch_event(&event);
        }

        let now = self.current_time;
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.deferred_queue)
            .into_iter()
            .partition(|(time, _)| *time <= now);
        self.deferred_queue = waiting;
        for (_, event) in due {
            self.dispatch_event(&event);
        }
    }

    /// Dispatch single event to registered handlers
    /// Stops on first handler that returns true (consumed)
    fn dispatch_event(&mut self, event: &Event) {
        if let Some(handlers) = self.handlers.get_mut(&event.event_type) {
            for handler in handlers.iter_mut() {
                if handler.on_event(event) {
                    break;
                }
            }
        }
    }

    /// Clear all queued events (useful for state transitions)
    pub fn clear(&mut self) {
        self.immediate_queue.clear();
        self.deferred_queue.clear();
    }
}

impl Default for EventSystem {
    fn default() -> Self {
        Self::new()
    }
}
