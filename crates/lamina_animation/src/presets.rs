//! Popup transition presets

/// Edge an overlay pops out from, relative to its anchor
///
/// The entrance animation slides the surface in from this side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PopupEdge {
    Top,
    Bottom,
    Left,
    Right,
}

impl PopupEdge {
    /// Starting translation for a slide of `distance` pixels
    ///
    /// A surface placed above its anchor starts lower and slides up, and so on
    /// for the other edges.
    pub fn translation(self, distance: f32) -> (f32, f32) {
        match self {
            PopupEdge::Top => (0.0, distance),
            PopupEdge::Bottom => (0.0, -distance),
            PopupEdge::Left => (distance, 0.0),
            PopupEdge::Right => (-distance, 0.0),
        }
    }
}

/// Whether a transition brings a surface in or takes it out
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TransitionKind {
    #[default]
    Enter,
    Exit,
}

/// A single popup enter or exit transition
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PopupTransition {
    pub kind: TransitionKind,
    pub duration_ms: u32,
    /// Slide distance in pixels
    pub offset: f32,
    /// Edge to slide from; `None` means fade only
    pub edge: Option<PopupEdge>,
}

impl PopupTransition {
    pub fn enter(duration_ms: u32) -> Self {
        Self {
            kind: TransitionKind::Enter,
            duration_ms,
            offset: 0.0,
            edge: None,
        }
    }

    pub fn exit(duration_ms: u32) -> Self {
        Self {
            kind: TransitionKind::Exit,
            duration_ms,
            offset: 0.0,
            edge: None,
        }
    }

    /// Slide `offset` pixels in addition to fading
    pub fn slide(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    pub fn from_edge(mut self, edge: PopupEdge) -> Self {
        self.edge = Some(edge);
        self
    }

    pub fn is_instant(&self) -> bool {
        self.duration_ms == 0
    }

    /// Starting translation for this transition
    pub fn translation(&self) -> (f32, f32) {
        self.edge
            .map(|edge| edge.translation(self.offset))
            .unwrap_or((0.0, 0.0))
    }
}

/// Enter/exit pair for an overlay surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PopupAnimation {
    pub enter: PopupTransition,
    pub exit: PopupTransition,
}

impl Default for PopupAnimation {
    fn default() -> Self {
        Self::flyout()
    }
}

impl PopupAnimation {
    /// Flyout animation (slide 50px from the anchor side and fade)
    pub fn flyout() -> Self {
        Self {
            enter: PopupTransition::enter(250).slide(50.0),
            exit: PopupTransition::exit(150),
        }
    }

    /// Menu animation (shorter slide, quicker exit)
    pub fn menu() -> Self {
        Self {
            enter: PopupTransition::enter(167).slide(50.0),
            exit: PopupTransition::exit(120),
        }
    }

    /// No animation (instant show/hide)
    pub fn none() -> Self {
        Self {
            enter: PopupTransition::enter(0),
            exit: PopupTransition::exit(0),
        }
    }

    /// Custom animation
    pub fn custom(enter: PopupTransition, exit: PopupTransition) -> Self {
        Self { enter, exit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_translation_points_away_from_anchor() {
        assert_eq!(PopupEdge::Top.translation(50.0), (0.0, 50.0));
        assert_eq!(PopupEdge::Bottom.translation(50.0), (0.0, -50.0));
        assert_eq!(PopupEdge::Left.translation(50.0), (50.0, 0.0));
        assert_eq!(PopupEdge::Right.translation(50.0), (-50.0, 0.0));
    }

    #[test]
    fn test_fade_only_transition_has_no_translation() {
        let transition = PopupTransition::enter(100).slide(50.0);
        assert_eq!(transition.translation(), (0.0, 0.0));
        assert_eq!(
            transition.from_edge(PopupEdge::Left).translation(),
            (50.0, 0.0)
        );
    }

    #[test]
    fn test_presets() {
        let none = PopupAnimation::none();
        assert!(none.enter.is_instant());
        assert!(none.exit.is_instant());

        let flyout = PopupAnimation::default();
        assert_eq!(flyout.enter.kind, TransitionKind::Enter);
        assert_eq!(flyout.exit.kind, TransitionKind::Exit);
        assert!(!flyout.enter.is_instant());
    }
}
