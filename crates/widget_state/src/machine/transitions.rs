//! State transitions - Visibility FSM transition logic

use tracing::debug;

use super::events::WidgetEvent;
use super::states::Visibility;

/// Represents a state transition result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    /// The state before the transition.
    pub from: Visibility,
    /// The state after the transition.
    pub to: Visibility,
    /// The event that triggered the transition.
    pub event: WidgetEvent,
    /// Whether the state actually changed.
    pub changed: bool,
}

impl StateTransition {
    /// The panel went from closed to open.
    pub fn opened(&self) -> bool {
        !self.from.is_open() && self.to.is_open()
    }
}

/// State machine for the panel's visibility.
#[derive(Debug, Clone, Default)]
pub struct VisibilityMachine {
    current: Visibility,
}

impl VisibilityMachine {
    /// Create a new state machine in the Closed state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Visibility {
        self.current
    }

    /// Handle an event and transition to a new state.
    pub fn handle_event(&mut self, event: WidgetEvent) -> StateTransition {
        let from = self.current;
        let to = Self::next_state(from, event);
        self.current = to;

        let transition = StateTransition {
            from,
            to,
            event,
            changed: from != to,
        };
        if transition.changed {
            debug!("Widget visibility {:?} -> {:?} on {:?}", from, to, event);
        }
        transition
    }

    fn next_state(state: Visibility, event: WidgetEvent) -> Visibility {
        use Visibility::*;
        use WidgetEvent::*;

        match (state, event) {
            (Closed, OpenRequested) | (Closed, LauncherClicked) => Open,
            (Open, CloseRequested) | (Minimized, CloseRequested) => Closed,
            // The launcher closes the panel and clears minimize with it.
            (Open, LauncherClicked) | (Minimized, LauncherClicked) => Closed,
            (Open, MinimizeToggled) => Minimized,
            (Minimized, MinimizeToggled) => Open,
            (Minimized, OpenRequested) => Open,
            _ => state,
        }
    }

    /// Check if an event would change the state without applying it.
    pub fn can_transition(&self, event: WidgetEvent) -> bool {
        Self::next_state(self.current, event) != self.current
    }

    /// Back to Closed.
    pub fn reset(&mut self) {
        self.current = Visibility::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_minimize_close_flow() {
        let mut sm = VisibilityMachine::new();
        assert_eq!(sm.state(), Visibility::Closed);

        let t1 = sm.handle_event(WidgetEvent::OpenRequested);
        assert!(t1.changed);
        assert!(t1.opened());
        assert_eq!(sm.state(), Visibility::Open);

        sm.handle_event(WidgetEvent::MinimizeToggled);
        assert_eq!(sm.state(), Visibility::Minimized);

        sm.handle_event(WidgetEvent::MinimizeToggled);
        assert_eq!(sm.state(), Visibility::Open);

        let t4 = sm.handle_event(WidgetEvent::CloseRequested);
        assert!(t4.changed);
        assert_eq!(sm.state(), Visibility::Closed);
    }

    #[test]
    fn test_minimize_ignored_while_closed() {
        let mut sm = VisibilityMachine::new();
        assert!(!sm.can_transition(WidgetEvent::MinimizeToggled));
        let t = sm.handle_event(WidgetEvent::MinimizeToggled);
        assert!(!t.changed);
        assert_eq!(sm.state(), Visibility::Closed);
    }

    #[test]
    fn test_reopening_lands_unminimized() {
        let mut sm = VisibilityMachine::new();
        sm.handle_event(WidgetEvent::LauncherClicked);
        sm.handle_event(WidgetEvent::MinimizeToggled);
        sm.handle_event(WidgetEvent::LauncherClicked);
        assert_eq!(sm.state(), Visibility::Closed);

        let t = sm.handle_event(WidgetEvent::LauncherClicked);
        assert!(t.opened());
        assert_eq!(sm.state(), Visibility::Open);
    }

    #[test]
    fn test_open_while_open_is_not_a_reopen() {
        let mut sm = VisibilityMachine::new();
        sm.handle_event(WidgetEvent::OpenRequested);
        let t = sm.handle_event(WidgetEvent::OpenRequested);
        assert!(!t.changed);
        assert!(!t.opened());
    }
}
