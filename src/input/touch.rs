use serde::{Deserialize, Serialize};

use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchAction {
    Down,
    Move,
    Up,
    Cancel,
    /// An extra contact landed; `secondary` carries it.
    PointerDown,
    /// A non-primary contact lifted.
    PointerUp,
}

/// One pointer event in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub primary: Point,
    pub secondary: Option<Point>,
}

impl TouchEvent {
    pub const fn new(action: TouchAction, primary: Point, secondary: Option<Point>) -> Self {
        Self {
            action,
            primary,
            secondary,
        }
    }

    pub const fn down(at: Point) -> Self {
        Self::new(TouchAction::Down, at, None)
    }

    pub const fn moved(to: Point) -> Self {
        Self::new(TouchAction::Move, to, None)
    }

    pub const fn up(at: Point) -> Self {
        Self::new(TouchAction::Up, at, None)
    }

    pub const fn pointer_down(primary: Point, secondary: Point) -> Self {
        Self::new(TouchAction::PointerDown, primary, Some(secondary))
    }

    pub const fn pointer_up(primary: Point, secondary: Point) -> Self {
        Self::new(TouchAction::PointerUp, primary, Some(secondary))
    }

    pub const fn pinch_move(primary: Point, secondary: Point) -> Self {
        Self::new(TouchAction::Move, primary, Some(secondary))
    }

    /// Distance between the two contacts, when both are present.
    pub fn spacing(&self) -> Option<f32> {
        self.secondary.map(|secondary| self.primary.distance(secondary))
    }

    pub fn midpoint(&self) -> Option<Point> {
        self.secondary.map(|secondary| self.primary.midpoint(secondary))
    }
}
