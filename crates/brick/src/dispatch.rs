//! Delegated event dispatch
//!
//! One listener per configured event type sits on the body. Every event that
//! reaches it resolves the nearest component above the target and runs each
//! of that component's bindings for the event type, in declaration order.

use brick_dom::{Event, ListenerOptions};
use tracing::{debug, info, trace, warn};

use crate::component::Context;
use crate::{ComponentError, Components, Result};

impl Components {
    /// Attach the delegated listeners to the body.
    ///
    /// Returns `false` without registering anything if they are already bound.
    pub fn bind_events(&mut self) -> Result<bool> {
        if !self.delegates.is_empty() {
            warn!("Delegated events are already bound");
            return Ok(false);
        }
        let body = self.document.body();
        if !body.is_valid() {
            return Err(ComponentError::MissingBody);
        }

        for (index, event_type) in self.config.delegated_events.iter().enumerate() {
            let options = if self.config.uses_capture(index) {
                ListenerOptions::capture()
            } else {
                ListenerOptions::bubble()
            };
            let listener = self.document.listeners_mut().add_listener(body, event_type, options);
            self.delegates.push((body, listener));
        }

        info!("Bound {} delegated event listeners on {}", self.delegates.len(), body);
        Ok(true)
    }

    /// Remove the delegated listeners; returns how many were removed
    pub fn unbind_events(&mut self) -> usize {
        let mut removed = 0;
        for (node, listener) in self.delegates.drain(..) {
            if self.document.listeners_mut().remove_listener(node, listener) {
                removed += 1;
            }
        }
        if removed > 0 {
            info!("Unbound {} delegated event listeners", removed);
        }
        removed
    }

    /// Whether the delegated listeners are attached
    pub fn is_bound(&self) -> bool {
        !self.delegates.is_empty()
    }

    /// Route `event` through the document's listeners as a browser would.
    ///
    /// Returns `false` if a handler prevented the default action.
    pub fn dispatch(&mut self, mut event: Event) -> bool {
        let route = self.document.route_event(&event);
        trace!("Dispatching {} to {} ({} listeners)", event.event_type, event.target, route.len());

        route.dispatch(&mut event, |entry, event| {
            if self.delegates.iter().any(|&(_, listener)| listener == entry.listener) {
                self.handle_event(event);
            }
        })
    }

    /// Run the bindings of the component owning `event.target`.
    ///
    /// Every call counts toward [`events_handled`](Self::events_handled),
    /// whether or not a component or binding matched.
    pub fn handle_event(&mut self, event: &mut Event) {
        self.events_handled += 1;

        let target = event.target;
        let Some(id) = self.closest_component(target) else {
            trace!("No component owns {} for {}", target, event.event_type);
            return;
        };
        let Some(class) = self.class_of(id).cloned() else {
            return;
        };

        for binding in class.bindings() {
            if binding.binding.event != event.event_type {
                continue;
            }

            let matched = match &binding.selector {
                Some(selector) => match self.closest_compiled(target, selector) {
                    Some(matched) => Some(matched),
                    None => continue,
                },
                None => None,
            };

            let Some(instance) = self.registry.get_mut(id) else {
                break;
            };
            debug!("{} on {} calls {}.{}", event.event_type, target, class.name(), binding.binding.method);
            let mut cx = Context::new(&mut self.document, id, instance.element);
            class.call(&binding.binding.method, instance.state.as_mut(), &mut cx, event, matched);
        }
    }

    /// Number of events the delegated listeners have handled
    pub fn events_handled(&self) -> u64 {
        self.events_handled
    }
}
