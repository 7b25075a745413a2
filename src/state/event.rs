#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    /// First contact down in move-picture mode.
    PanStart,
    /// First contact down in draw mode.
    DrawStart,
    /// First contact down on the clone anchor.
    RelocateStart,
    /// Extra contact down in move-picture mode.
    PinchStart,
    /// Back to a single contact after a pinch.
    PinchEnd,
    /// Last contact lifted or the gesture was cancelled.
    Release,
}
