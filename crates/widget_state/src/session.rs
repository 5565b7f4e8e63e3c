//! Session flags - Transient UI state for one widget mount

use crate::machine::{StateTransition, Visibility, VisibilityMachine, WidgetEvent};

/// Every flag the view reads, created closed with all flags false on mount.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    visibility: VisibilityMachine,
    escalated: bool,
    form_submitted: bool,
    /// Outstanding collaborator calls; the typing indicator shows while > 0.
    in_flight: usize,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_event(&mut self, event: WidgetEvent) -> StateTransition {
        self.visibility.handle_event(event)
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility.state()
    }

    pub fn is_open(&self) -> bool {
        self.visibility.state().is_open()
    }

    pub fn is_minimized(&self) -> bool {
        self.visibility.state().is_minimized()
    }

    pub fn is_escalated(&self) -> bool {
        self.escalated
    }

    /// Set `escalated`. Returns true only on the false -> true edge.
    pub fn mark_escalated(&mut self) -> bool {
        !std::mem::replace(&mut self.escalated, true)
    }

    pub fn is_form_submitted(&self) -> bool {
        self.form_submitted
    }

    /// Set `form_submitted`. Returns true only on the false -> true edge.
    pub fn mark_form_submitted(&mut self) -> bool {
        !std::mem::replace(&mut self.form_submitted, true)
    }

    pub fn begin_request(&mut self) {
        self.in_flight += 1;
    }

    pub fn end_request(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub fn is_typing(&self) -> bool {
        self.in_flight > 0
    }

    pub fn pending_requests(&self) -> usize {
        self.in_flight
    }

    /// Close the panel. Escalation and form flags are kept; they are
    /// session-scoped, not panel-scoped.
    pub fn close(&mut self) {
        self.visibility.reset();
    }
}
