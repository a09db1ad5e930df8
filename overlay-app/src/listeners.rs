//! Ownership of DOM event listeners.
//!
//! Every listener is registered once and removed when its [`Listeners`]
//! owner is dropped.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Event, EventTarget};

type Handler = Closure<dyn FnMut(Event)>;

/// Registered listeners, removed on drop.
pub(crate) struct Listeners {
    registered: Vec<(EventTarget, &'static str, Handler)>,
}

impl Listeners {
    pub(crate) fn new() -> Self {
        Self {
            registered: Vec::new(),
        }
    }

    /// Register a passive listener.
    pub(crate) fn add<F>(
        &mut self,
        target: &EventTarget,
        event: &'static str,
        handler: F,
    ) -> Result<(), JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Handler::new(handler);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        self.registered.push((target.clone(), event, closure));
        Ok(())
    }

    /// Register a listener that may call `preventDefault`.
    pub(crate) fn add_active<F>(
        &mut self,
        target: &EventTarget,
        event: &'static str,
        handler: F,
    ) -> Result<(), JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Handler::new(handler);
        let options = AddEventListenerOptions::new();
        options.set_passive(false);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        self.registered.push((target.clone(), event, closure));
        Ok(())
    }
}

impl Drop for Listeners {
    fn drop(&mut self) {
        for (target, event, closure) in self.registered.drain(..) {
            if target
                .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
                .is_err()
            {
                tracing::warn!("Failed to remove {} listener", event);
            }
        }
    }
}
