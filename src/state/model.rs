#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Panning,
    PinchZoom,
    Drawing,
    RelocatingCloneAnchor,
}

impl GestureState {
    pub const fn is_drawing(self) -> bool {
        matches!(self, Self::Drawing | Self::RelocatingCloneAnchor)
    }
}
