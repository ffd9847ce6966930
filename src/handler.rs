use crate::client::Sender;
use crate::error::Error;
use crate::payload::Payload;
use async_trait::async_trait;
use fnv::FnvHashMap;
use log::{debug, warn};

/// Event names raised by the client itself. Server events with these
/// names are dropped.
pub const RESERVED_EVENTS: [&str; 3] = ["connect", "disconnect", "error"];

/// Receives the events of a session, one at a time, in arrival order.
#[async_trait]
pub trait EventHandler: Send {
    /// The server accepted the namespace connect.
    async fn on_connect(&mut self, _sender: &Sender) {}

    /// The server emitted `event`.
    async fn on_event(&mut self, _event: &str, _payload: Payload, _sender: &Sender) {}

    /// A connected session ended.
    async fn on_disconnect(&mut self, _reason: &str, _sender: &Sender) {}

    async fn on_error(&mut self, _error: &Error, _sender: &Sender) {}
}

pub type Callback = Box<dyn FnMut(&Payload, &Sender) + Send + 'static>;

/// Handlers keyed by event name, called in registration order.
#[derive(Default)]
pub struct Callbacks {
    handlers: FnvHashMap<String, Vec<Callback>>,
}

impl Callbacks {
    pub fn on<F>(&mut self, event: &str, callback: F)
    where
        F: FnMut(&Payload, &Sender) + Send + 'static,
    {
        self.handlers
            .entry(event.to_owned())
            .or_default()
            .push(Box::new(callback));
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.get(event).map_or(0, Vec::len)
    }

    /// Runs every handler registered for `event` and returns how many ran.
    pub fn dispatch(&mut self, event: &str, payload: &Payload, sender: &Sender) -> usize {
        match self.handlers.get_mut(event) {
            Some(handlers) => {
                for handler in handlers.iter_mut() {
                    handler(payload, sender);
                }
                handlers.len()
            }
            None => {
                debug!("No handler for {:?}", event);
                0
            }
        }
    }
}

#[async_trait]
impl EventHandler for Callbacks {
    async fn on_connect(&mut self, sender: &Sender) {
        self.dispatch("connect", &Payload::default(), sender);
    }

    async fn on_event(&mut self, event: &str, payload: Payload, sender: &Sender) {
        if RESERVED_EVENTS.contains(&event) {
            warn!("Server emitted reserved event {:?}, dropping it", event);
            return;
        }
        self.dispatch(event, &payload, sender);
    }

    async fn on_disconnect(&mut self, reason: &str, sender: &Sender) {
        self.dispatch("disconnect", &Payload::from(reason), sender);
    }

    async fn on_error(&mut self, error: &Error, sender: &Sender) {
        self.dispatch("error", &Payload::from(error), sender);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording(
        log: &Arc<Mutex<Vec<String>>>,
        tag: &'static str,
    ) -> impl FnMut(&Payload, &Sender) + Send + 'static {
        let log = Arc::clone(log);
        move |payload, _| log.lock().unwrap().push(format!("{}:{}", tag, payload))
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut callbacks = Callbacks::default();
        callbacks.on("message", recording(&log, "first"));
        callbacks.on("message", recording(&log, "second"));
        callbacks.on("forecast", recording(&log, "other"));

        let sender = Sender::detached();
        let ran = callbacks.dispatch("message", &Payload::from("sunny"), &sender);

        assert_eq!(ran, 2);
        assert_eq!(*log.lock().unwrap(), vec!["first:sunny", "second:sunny"]);
        assert_eq!(callbacks.handler_count("forecast"), 1);
        assert_eq!(callbacks.handler_count("missing"), 0);
    }

    #[async_std::test]
    async fn test_reserved_names_are_not_dispatched_from_events() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut callbacks = Callbacks::default();
        callbacks.on("connect", recording(&log, "connect"));
        callbacks.on("message", recording(&log, "message"));

        let sender = Sender::detached();
        callbacks
            .on_event("connect", Payload::default(), &sender)
            .await;
        callbacks
            .on_event("message", Payload::from("rain"), &sender)
            .await;
        callbacks.on_connect(&sender).await;

        assert_eq!(*log.lock().unwrap(), vec!["message:rain", "connect:"]);
    }

    #[async_std::test]
    async fn test_lifecycle_payloads() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut callbacks = Callbacks::default();
        callbacks.on("disconnect", recording(&log, "disconnect"));
        callbacks.on("error", recording(&log, "error"));

        let sender = Sender::detached();
        callbacks.on_disconnect("transport close", &sender).await;
        callbacks.on_error(&Error::Closed, &sender).await;

        assert_eq!(
            *log.lock().unwrap(),
            vec!["disconnect:transport close", "error:connection closed"]
        );
    }
}
