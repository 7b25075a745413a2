use super::error::{StateError, StateResult};
use super::{GestureEvent, GestureState};

#[derive(Debug, Default)]
pub struct GestureMachine {
    state: GestureState,
}

impl GestureMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn next_state(&self, event: GestureEvent) -> Option<GestureState> {
        use GestureEvent::*;
        match (self.state, event) {
            (GestureState::Idle, PanStart) => Some(GestureState::Panning),
            (GestureState::Idle, DrawStart) => Some(GestureState::Drawing),
            (GestureState::Idle, RelocateStart) => Some(GestureState::RelocatingCloneAnchor),
            (GestureState::Panning | GestureState::PinchZoom, PinchStart) => {
                Some(GestureState::PinchZoom)
            }
            (GestureState::PinchZoom, PinchEnd) => Some(GestureState::Panning),
            (_, Release) => Some(GestureState::Idle),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: GestureEvent) -> StateResult<GestureState> {
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, event = ?event, "invalid gesture transition requested");
            StateError::InvalidGestureTransition { from, event }
        })?;

        if next != self.state {
            tracing::debug!(from = ?self.state, event = ?event, to = ?next, "gesture transition");
        }
        self.state = next;

        Ok(self.state)
    }

    /// Drops any gesture in flight, e.g. when a new primary contact lands.
    pub fn reset(&mut self) {
        if self.state != GestureState::Idle {
            tracing::debug!(from = ?self.state, "gesture reset");
        }
        self.state = GestureState::Idle;
    }
}

impl std::fmt::Display for GestureMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GestureState::{:?}", self.state)
    }
}
