use super::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub(crate) struct EventState {
    pub(crate) event_type: String,
    pub(crate) target: NodeId,
    pub(crate) default_prevented: bool,
    pub(crate) propagation_stopped: bool,
    pub(crate) immediate_propagation_stopped: bool,
}

impl EventState {
    pub(crate) fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }

    pub(crate) fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }
}

/// What a registered listener does when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ListenerAction {
    /// Capture the form and persist it under `key`.
    AutoSave { key: String },
    /// Validate `container` and follow `intent` when it passes.
    NavGuard { container: NodeId, intent: NavIntent },
    /// Record `label` in the page's listener log.
    Record { label: String },
}

#[derive(Debug, Clone)]
pub(crate) struct Listener {
    pub(crate) capture: bool,
    pub(crate) action: ListenerAction,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ListenerStore {
    map: HashMap<NodeId, HashMap<String, Vec<Listener>>>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, node_id: NodeId, event: &str, capture: bool, action: ListenerAction) {
        let listeners = self
            .map
            .entry(node_id)
            .or_default()
            .entry(event.to_string())
            .or_default();
        if listeners
            .iter()
            .any(|existing| existing.capture == capture && existing.action == action)
        {
            return;
        }
        listeners.push(Listener { capture, action });
    }

    pub(crate) fn get(&self, node_id: NodeId, event: &str, capture: bool) -> Vec<Listener> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map(|listeners| {
                listeners
                    .iter()
                    .filter(|listener| listener.capture == capture)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn count(&self, node_id: NodeId, event: &str) -> usize {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map_or(0, Vec::len)
    }
}

impl SurveyPage {
    /// Dispatches `event_type` at `target` through the capture, target and
    /// bubble phases, then runs the default action of a click.
    pub(crate) fn dispatch_event(&mut self, target: NodeId, event_type: &str) -> Result<EventState> {
        let mut event = EventState::new(event_type, target);

        let mut path = Vec::new();
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            path.push(node);
            cursor = self.dom.parent(node);
        }
        path.reverse();

        'phases: {
            // Capture phase.
            if path.len() >= 2 {
                for node in &path[..path.len() - 1] {
                    self.invoke_listeners(*node, &mut event, true)?;
                    if event.propagation_stopped {
                        break 'phases;
                    }
                }
            }

            // Target phase: capture listeners, the inline handler, then
            // bubble listeners.
            self.invoke_listeners(target, &mut event, true)?;
            if event.immediate_propagation_stopped {
                break 'phases;
            }
            self.invoke_inline_handler(&event);
            self.invoke_listeners(target, &mut event, false)?;
            if event.propagation_stopped {
                break 'phases;
            }

            // Bubble phase.
            if path.len() >= 2 {
                for node in path[..path.len() - 1].iter().rev() {
                    self.invoke_listeners(*node, &mut event, false)?;
                    if event.propagation_stopped {
                        break 'phases;
                    }
                }
            }
        }

        Ok(event)
    }

    fn invoke_listeners(&mut self, node_id: NodeId, event: &mut EventState, capture: bool) -> Result<()> {
        for listener in self.listeners.get(node_id, &event.event_type, capture) {
            if event.immediate_propagation_stopped {
                break;
            }
            match listener.action {
                ListenerAction::AutoSave { key } => self.save_snapshot(&key)?,
                ListenerAction::NavGuard { container, intent } => {
                    event.default_prevented = true;
                    event.stop_immediate_propagation();
                    self.run_guard(container, &intent)?;
                }
                ListenerAction::Record { label } => self.listener_calls.push(label),
            }
        }
        Ok(())
    }

    /// Inline `onclick` navigation, the only handler text pages carry.
    fn invoke_inline_handler(&mut self, event: &EventState) {
        if event.event_type != "click" {
            return;
        }
        let Some(intent) = self
            .dom
            .attr(event.target, "onclick")
            .and_then(|source| NavIntent::from_inline_handler(&source))
        else {
            return;
        };
        self.navigate(&intent.target);
    }
}
