//! DOM Events
//!
//! Event objects, listener storage and the capture/target/bubble route an
//! event takes through the tree.
//!
//! Listeners are stored as opaque [`ListenerId`]s. Whoever registers a
//! listener keeps the mapping from id to behavior and receives the ids back
//! from [`EventRoute::dispatch`] in propagation order.

use std::collections::HashMap;

use crate::NodeId;

/// Event types that do not bubble
const NON_BUBBLING: &[&str] = &[
    "focus", "blur", "load", "unload", "scroll",
    "mouseenter", "mouseleave", "pointerenter", "pointerleave",
];

/// Event types whose default action can be prevented
const CANCELABLE: &[&str] = &[
    "click", "dblclick", "mousedown", "mouseup", "contextmenu",
    "touchstart", "touchmove", "touchend", "keydown", "keyup", "keypress",
    "submit", "wheel",
];

/// Event propagation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventPhase {
    #[default]
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

/// DOM event
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: String,
    pub target: NodeId,
    pub current_target: Option<NodeId>,
    pub phase: EventPhase,
    pub bubbles: bool,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
    in_passive_listener: bool,
}

impl Event {
    /// Create an event, deriving `bubbles` and `cancelable` from its type
    pub fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: None,
            phase: EventPhase::None,
            bubbles: !NON_BUBBLING.contains(&event_type),
            cancelable: CANCELABLE.contains(&event_type),
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
            in_passive_listener: false,
        }
    }

    /// Create click event
    pub fn click(target: NodeId) -> Self {
        Self::new("click", target)
    }

    /// Override the bubbles flag
    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    /// Override the cancelable flag
    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    /// Event type name
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable && !self.in_passive_listener {
            self.default_prevented = true;
        }
    }

    /// Stop propagation after the current node's listeners
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Stop propagation immediately, skipping remaining listeners
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Check if propagation was stopped
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Listener identifier, unique per registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Event listener options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub passive: bool,
}

impl ListenerOptions {
    /// Capture-phase listener
    pub fn capture() -> Self {
        Self { capture: true, passive: false }
    }

    /// Bubble-phase listener
    pub fn bubble() -> Self {
        Self::default()
    }
}

/// Event listener registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    pub id: ListenerId,
    pub event_type: String,
    pub options: ListenerOptions,
}

/// Event listener storage
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    /// Listeners per node, in registration order
    listeners: HashMap<NodeId, Vec<Listener>>,
    /// Next listener ID
    next_id: u64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event listener
    pub fn add_listener(&mut self, node: NodeId, event_type: &str, options: ListenerOptions) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;

        self.listeners.entry(node).or_default().push(Listener {
            id,
            event_type: event_type.to_string(),
            options,
        });

        id
    }

    /// Remove an event listener
    pub fn remove_listener(&mut self, node: NodeId, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(&node) else {
            return false;
        };
        let Some(pos) = list.iter().position(|l| l.id == id) else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            self.listeners.remove(&node);
        }
        true
    }

    /// Listeners on a node for an event type
    pub fn listeners(&self, node: NodeId, event_type: &str) -> impl Iterator<Item = &Listener> {
        self.listeners
            .get(&node)
            .into_iter()
            .flatten()
            .filter(move |l| l.event_type == event_type)
    }

    /// Clear all listeners for a node
    pub fn clear_node(&mut self, node: NodeId) {
        self.listeners.remove(&node);
    }

    /// Total number of listeners
    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    /// Check if no listeners are registered
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// One listener invocation on an event's route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    pub node: NodeId,
    pub listener: ListenerId,
    pub phase: EventPhase,
    pub passive: bool,
}

/// Propagation route of one event, computed before dispatch
#[derive(Debug, Clone, Default)]
pub struct EventRoute {
    entries: Vec<RouteEntry>,
}

impl EventRoute {
    /// Build the route; `path` runs from the root down to the target's parent
    pub(crate) fn build(registry: &ListenerRegistry, path: &[NodeId], event: &Event) -> Self {
        let mut entries = Vec::new();
        let ty = event.event_type.as_str();
        let mut push = |node: NodeId, listener: &Listener, phase: EventPhase| {
            entries.push(RouteEntry {
                node,
                listener: listener.id,
                phase,
                passive: listener.options.passive,
            });
        };

        for &node in path {
            for l in registry.listeners(node, ty).filter(|l| l.options.capture) {
                push(node, l, EventPhase::Capturing);
            }
        }

        let target = event.target;
        for l in registry.listeners(target, ty).filter(|l| l.options.capture) {
            push(target, l, EventPhase::AtTarget);
        }
        for l in registry.listeners(target, ty).filter(|l| !l.options.capture) {
            push(target, l, EventPhase::AtTarget);
        }

        if event.bubbles {
            for &node in path.iter().rev() {
                for l in registry.listeners(node, ty).filter(|l| !l.options.capture) {
                    push(node, l, EventPhase::Bubbling);
                }
            }
        }

        Self { entries }
    }

    /// Route entries in propagation order
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Number of listener invocations on the route
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing listens along the route
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Walk the route, calling `invoke` for each listener.
    ///
    /// Returns `false` if the default action was prevented.
    pub fn dispatch<F>(&self, event: &mut Event, mut invoke: F) -> bool
    where
        F: FnMut(&RouteEntry, &mut Event),
    {
        let mut current = NodeId::NONE;

        for entry in &self.entries {
            if entry.node != current {
                if event.propagation_stopped {
                    break;
                }
                current = entry.node;
            }
            if event.immediate_propagation_stopped {
                break;
            }

            event.current_target = Some(entry.node);
            event.phase = entry.phase;
            event.in_passive_listener = entry.passive;
            invoke(entry, event);
            event.in_passive_listener = false;
        }

        event.current_target = None;
        event.phase = EventPhase::None;
        !event.default_prevented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bubbles_by_type() {
        assert!(Event::new("click", NodeId(1)).bubbles);
        assert!(!Event::new("focus", NodeId(1)).bubbles);
        assert!(!Event::new("blur", NodeId(1)).bubbles);
        assert!(Event::new("change", NodeId(1)).bubbles);
    }

    #[test]
    fn test_prevent_default_requires_cancelable() {
        let mut focus = Event::new("focus", NodeId(1));
        focus.prevent_default();
        assert!(!focus.is_default_prevented());

        let mut click = Event::click(NodeId(1));
        click.prevent_default();
        assert!(click.is_default_prevented());
    }

    #[test]
    fn test_listener_registry() {
        let mut registry = ListenerRegistry::new();
        let a = registry.add_listener(NodeId(1), "click", ListenerOptions::bubble());
        let b = registry.add_listener(NodeId(1), "keyup", ListenerOptions::capture());

        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.listeners(NodeId(1), "click").count(), 1);

        assert!(registry.remove_listener(NodeId(1), a));
        assert!(!registry.remove_listener(NodeId(1), a));
        assert_eq!(registry.listeners(NodeId(1), "click").count(), 0);

        registry.clear_node(NodeId(1));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_route_phases() {
        let mut registry = ListenerRegistry::new();
        let root_capture = registry.add_listener(NodeId(0), "click", ListenerOptions::capture());
        let root_bubble = registry.add_listener(NodeId(0), "click", ListenerOptions::bubble());
        let target = registry.add_listener(NodeId(2), "click", ListenerOptions::bubble());

        let event = Event::click(NodeId(2));
        let route = EventRoute::build(&registry, &[NodeId(0), NodeId(1)], &event);
        let order: Vec<_> = route.entries().iter().map(|e| (e.listener, e.phase)).collect();

        assert_eq!(order, vec![
            (root_capture, EventPhase::Capturing),
            (target, EventPhase::AtTarget),
            (root_bubble, EventPhase::Bubbling),
        ]);
    }

    #[test]
    fn test_non_bubbling_skips_bubble_phase() {
        let mut registry = ListenerRegistry::new();
        registry.add_listener(NodeId(0), "focus", ListenerOptions::bubble());
        let capture = registry.add_listener(NodeId(0), "focus", ListenerOptions::capture());

        let event = Event::new("focus", NodeId(3));
        let route = EventRoute::build(&registry, &[NodeId(0)], &event);
        let ids: Vec<_> = route.entries().iter().map(|e| e.listener).collect();
        assert_eq!(ids, vec![capture]);
    }

    #[test]
    fn test_stop_propagation_finishes_current_node() {
        let mut registry = ListenerRegistry::new();
        let first = registry.add_listener(NodeId(1), "click", ListenerOptions::bubble());
        let second = registry.add_listener(NodeId(1), "click", ListenerOptions::bubble());
        registry.add_listener(NodeId(0), "click", ListenerOptions::bubble());

        let mut event = Event::click(NodeId(1));
        let route = EventRoute::build(&registry, &[NodeId(0)], &event);

        let mut seen = Vec::new();
        route.dispatch(&mut event, |entry, ev| {
            seen.push(entry.listener);
            ev.stop_propagation();
        });
        assert_eq!(seen, vec![first, second]);
    }

    #[test]
    fn test_passive_listener_cannot_cancel() {
        let mut registry = ListenerRegistry::new();
        registry.add_listener(
            NodeId(0),
            "touchmove",
            ListenerOptions { capture: false, passive: true },
        );

        let mut event = Event::new("touchmove", NodeId(1));
        let route = EventRoute::build(&registry, &[NodeId(0)], &event);
        let not_canceled = route.dispatch(&mut event, |_, ev| ev.prevent_default());
        assert!(not_canceled);
    }
}
