//! Flyout positioning
//!
//! Positions a flyout next to its anchor inside the visible document area.
//! Seven placements are supported: four explicit sides and three automatic
//! modes.
//!
//! - `Auto` imagines the anchor vertically centered in the viewport. If the
//!   flyout would fit above that centered anchor it is placed vertically,
//!   otherwise horizontally.
//! - Vertical placement prefers the top (fingers obscure content below the
//!   anchor), horizontal placement prefers the left.
//! - Vertical placements that overflow are shrunk to a `max_height` and
//!   scroll internally.
//!
//! Everything here is a pure function of the anchor rectangle, the flyout's
//! measured size and a [`ViewportBounds`] snapshot.

use std::fmt;
use std::str::FromStr;

use lamina_animation::PopupEdge;
use lamina_core::Rect;
use lamina_platform::ViewportMetrics;

use crate::error::OverlayError;

// =============================================================================
// Placement / Alignment
// =============================================================================

/// Where a flyout goes relative to its anchor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Placement {
    Top,
    Bottom,
    Left,
    Right,
    /// Vertical if it would fit above a centered anchor, else horizontal
    #[default]
    Auto,
    /// Left, falling back to right
    AutoHorizontal,
    /// Top, falling back to bottom
    AutoVertical,
}

impl Placement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Placement::Top => "top",
            Placement::Bottom => "bottom",
            Placement::Left => "left",
            Placement::Right => "right",
            Placement::Auto => "auto",
            Placement::AutoHorizontal => "autohorizontal",
            Placement::AutoVertical => "autovertical",
        }
    }
}

impl FromStr for Placement {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Placement::Top),
            "bottom" => Ok(Placement::Bottom),
            "left" => Ok(Placement::Left),
            "right" => Ok(Placement::Right),
            "auto" => Ok(Placement::Auto),
            "autohorizontal" => Ok(Placement::AutoHorizontal),
            "autovertical" => Ok(Placement::AutoVertical),
            other => Err(OverlayError::BadPlacement(other.to_string())),
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Horizontal alignment for vertical placements
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    #[default]
    Center,
    /// Flyout's left edge lines up with the anchor's left edge
    Left,
    /// Flyout's right edge lines up with the anchor's right edge
    Right,
}

impl Alignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Center => "center",
            Alignment::Left => "left",
            Alignment::Right => "right",
        }
    }
}

impl FromStr for Alignment {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "center" => Ok(Alignment::Center),
            "left" => Ok(Alignment::Left),
            "right" => Ok(Alignment::Right),
            other => Err(OverlayError::BadAlignment(other.to_string())),
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Inputs
// =============================================================================

/// Measured size of a flyout
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlyoutMetrics {
    /// Total width including margins
    pub width: f32,
    /// Total height including margins and padding
    pub height: f32,
    /// Content height
    pub inner_height: f32,
}

impl FlyoutMetrics {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            inner_height: height,
        }
    }

    /// Set the content height; the difference to `height` is margin and padding
    pub fn inner_height(mut self, inner_height: f32) -> Self {
        self.inner_height = inner_height.min(self.height);
        self
    }

    pub fn margin_padding(&self) -> f32 {
        self.height - self.inner_height
    }
}

/// Snapshot of the visible document area
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportBounds {
    pub doc_top: f32,
    pub doc_height: f32,
    pub doc_bottom: f32,
    /// Offset to apply when attaching to the bottom while a keyboard is up
    pub bottom_offset: f32,
    pub visual_width: f32,
    pub client_width: f32,
    pub keyboard_visible: bool,
}

impl ViewportBounds {
    /// Unoccluded viewport of the given size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            doc_top: 0.0,
            doc_height: height,
            doc_bottom: height,
            bottom_offset: 0.0,
            visual_width: width,
            client_width: width,
            keyboard_visible: false,
        }
    }

    pub fn from_metrics(metrics: &dyn ViewportMetrics) -> Self {
        Self {
            doc_top: metrics.visible_doc_top(),
            doc_height: metrics.visible_doc_height(),
            doc_bottom: metrics.visible_doc_bottom(),
            bottom_offset: metrics.visible_doc_bottom_offset(),
            visual_width: metrics.visual_viewport_width(),
            client_width: metrics.client_width(),
            keyboard_visible: metrics.keyboard_visible(),
        }
    }
}

// =============================================================================
// Output
// =============================================================================

/// Vertical position of the flyout
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VerticalPosition {
    /// Top edge at this document y
    Top(f32),
    /// Attached to the bottom of the viewport
    PinnedBottom,
}

/// Horizontal position of the flyout
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HorizontalPosition {
    /// Left edge at this document x
    Left(f32),
    /// Attached to the right of the viewport
    PinnedRight,
}

/// Where the flyout ends up once a soft keyboard is taken into account
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollAnchor {
    /// Top edge at this document y
    Top(f32),
    /// Attached to the bottom, raised by this offset
    Bottom(f32),
}

/// Soft keyboard adjustment
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyboardFit {
    /// The keyboard forces the flyout to a new spot
    pub moved: bool,
    /// Reduced max-height when the flyout is taller than the visible area
    pub squished_height: Option<f32>,
    pub anchor: ScrollAnchor,
}

/// Result of positioning a flyout
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlyoutLayout {
    pub top: VerticalPosition,
    pub left: HorizontalPosition,
    /// Content max-height when the flyout must scroll
    pub max_height: Option<f32>,
    /// Side the flyout sits on, used for the entrance slide
    pub edge: PopupEdge,
    /// Bottom edge in document coordinates, `None` when pinned to the bottom
    pub bottom: Option<f32>,
    /// Keyboard adjustment, present while a soft keyboard is visible
    pub keyboard: Option<KeyboardFit>,
}

impl FlyoutLayout {
    pub fn scrolls(&self) -> bool {
        self.max_height.is_some()
    }

    /// Document rectangle the flyout occupies, pinned edges resolved
    pub fn frame(&self, flyout: FlyoutMetrics, viewport: &ViewportBounds) -> Rect {
        let mut height = match self.max_height {
            Some(max_height) => max_height + flyout.margin_padding(),
            None => flyout.height,
        };
        let mut top = match self.top {
            VerticalPosition::Top(top) => top,
            VerticalPosition::PinnedBottom => viewport.doc_bottom - height,
        };

        if let Some(fit) = self.keyboard.filter(|fit| fit.moved) {
            if let Some(squished) = fit.squished_height {
                height = squished + flyout.margin_padding();
            }
            top = match fit.anchor {
                ScrollAnchor::Top(top) => top,
                ScrollAnchor::Bottom(_) => viewport.doc_bottom - height,
            };
        }

        let left = match self.left {
            HorizontalPosition::Left(left) => left,
            HorizontalPosition::PinnedRight => viewport.client_width - flyout.width,
        };
        Rect::new(left, top, flyout.width, height)
    }
}

// =============================================================================
// Computation
// =============================================================================

/// Position a flyout of size `flyout` next to `anchor`
pub fn compute_placement(
    anchor: Rect,
    flyout: FlyoutMetrics,
    placement: Placement,
    alignment: Alignment,
    viewport: &ViewportBounds,
) -> FlyoutLayout {
    let mut placer = Placer {
        anchor,
        flyout,
        viewport,
        top: VerticalPosition::Top(0.0),
        left: HorizontalPosition::Left(0.0),
        max_height: None,
        edge: PopupEdge::Top,
    };
    placer.place(placement, alignment);

    let bottom = match (placer.top, placer.max_height) {
        (VerticalPosition::PinnedBottom, _) => None,
        (VerticalPosition::Top(top), Some(max_height)) => Some(top + max_height),
        (VerticalPosition::Top(top), None) => Some(top + flyout.height),
    };

    let mut layout = FlyoutLayout {
        top: placer.top,
        left: placer.left,
        max_height: placer.max_height,
        edge: placer.edge,
        bottom,
        keyboard: None,
    };
    if viewport.keyboard_visible {
        layout.keyboard = Some(check_keyboard_fit(&layout, flyout, viewport));
    }

    tracing::trace!(
        "compute_placement - {} / {} -> {:?}",
        placement,
        alignment,
        layout
    );
    layout
}

/// Work out whether a soft keyboard forces the flyout to move
pub fn check_keyboard_fit(
    layout: &FlyoutLayout,
    flyout: FlyoutMetrics,
    viewport: &ViewportBounds,
) -> KeyboardFit {
    let margin_padding = flyout.margin_padding();
    let height = match layout.max_height {
        Some(max_height) => (max_height + margin_padding).min(flyout.height),
        None => flyout.height,
    };
    let available = viewport.doc_height - margin_padding;

    let resting = match layout.top {
        VerticalPosition::Top(top) if top >= viewport.doc_top => ScrollAnchor::Top(top),
        _ => ScrollAnchor::Bottom(viewport.bottom_offset),
    };
    let pinned_top = ScrollAnchor::Top(viewport.doc_top);

    if height > available {
        return KeyboardFit {
            moved: true,
            squished_height: Some(available),
            anchor: pinned_top,
        };
    }

    let (moved, anchor) = match layout.top {
        VerticalPosition::PinnedBottom => (true, resting),
        VerticalPosition::Top(top) if top < viewport.doc_top => (true, pinned_top),
        VerticalPosition::Top(_)
            if layout.bottom.is_some_and(|bottom| bottom > viewport.doc_bottom) =>
        {
            (true, ScrollAnchor::Bottom(viewport.bottom_offset))
        }
        VerticalPosition::Top(_) => (false, resting),
    };

    KeyboardFit {
        moved,
        squished_height: None,
        anchor,
    }
}

struct Placer<'a> {
    anchor: Rect,
    flyout: FlyoutMetrics,
    viewport: &'a ViewportBounds,
    top: VerticalPosition,
    left: HorizontalPosition,
    max_height: Option<f32>,
    edge: PopupEdge,
}

impl Placer<'_> {
    fn place(&mut self, placement: Placement, alignment: Alignment) {
        match placement {
            Placement::Top => {
                if !self.fit_top() {
                    self.scroll_above();
                }
                self.center_horizontally(alignment);
            }
            Placement::Bottom => {
                if !self.fit_bottom() {
                    self.scroll_below();
                }
                self.center_horizontally(alignment);
            }
            Placement::Left => {
                if !self.fit_left() {
                    self.left = HorizontalPosition::Left(0.0);
                }
                self.center_vertically();
            }
            Placement::Right => {
                if !self.fit_right() {
                    self.left = HorizontalPosition::PinnedRight;
                }
                self.center_vertically();
            }
            Placement::AutoVertical => {
                if !self.fit_top() && !self.fit_bottom() {
                    self.vertical_with_scroll();
                }
                self.center_horizontally(alignment);
            }
            Placement::AutoHorizontal => {
                if !self.fit_left() && !self.fit_right() {
                    self.left = HorizontalPosition::PinnedRight;
                }
                self.center_vertically();
            }
            Placement::Auto => {
                if self.sometimes_fits_above() {
                    if !self.fit_top() {
                        self.fit_bottom();
                    }
                    self.center_horizontally(alignment);
                } else if self.fit_left() || self.fit_right() {
                    self.center_vertically();
                } else {
                    self.vertical_with_scroll();
                    self.center_horizontally(alignment);
                }
            }
        }
    }

    /// Would the flyout fit above the anchor if the anchor were centered?
    fn sometimes_fits_above(&self) -> bool {
        (self.viewport.doc_height - self.anchor.height()) / 2.0 >= self.flyout.height
    }

    fn top_has_more_room(&self) -> bool {
        self.anchor.top() > self.viewport.doc_height - self.anchor.bottom()
    }

    fn fits_vertically(&self, top: f32) -> bool {
        top >= self.viewport.doc_top && top + self.flyout.height <= self.viewport.doc_bottom
    }

    fn fits_horizontally(&self, left: f32) -> bool {
        left >= 0.0 && left + self.flyout.width <= self.viewport.visual_width
    }

    fn fit_top(&mut self) -> bool {
        let top = self.anchor.top() - self.flyout.height;
        self.top = VerticalPosition::Top(top);
        self.edge = PopupEdge::Top;
        self.fits_vertically(top)
    }

    fn fit_bottom(&mut self) -> bool {
        let top = self.anchor.bottom();
        self.top = VerticalPosition::Top(top);
        self.edge = PopupEdge::Bottom;
        self.fits_vertically(top)
    }

    fn fit_left(&mut self) -> bool {
        let left = self.anchor.left() - self.flyout.width;
        self.left = HorizontalPosition::Left(left);
        self.edge = PopupEdge::Left;
        self.fits_horizontally(left)
    }

    fn fit_right(&mut self) -> bool {
        let left = self.anchor.right();
        self.left = HorizontalPosition::Left(left);
        self.edge = PopupEdge::Right;
        self.fits_horizontally(left)
    }

    fn scroll_above(&mut self) {
        let viewport = self.viewport;
        self.top = VerticalPosition::Top(viewport.doc_top);
        self.max_height =
            Some(self.anchor.top() - viewport.doc_top - self.flyout.margin_padding());
    }

    fn scroll_below(&mut self) {
        let viewport = self.viewport;
        self.top = VerticalPosition::PinnedBottom;
        self.max_height = Some(
            viewport.doc_height
                - (self.anchor.bottom() - viewport.doc_top)
                - self.flyout.margin_padding(),
        );
    }

    fn vertical_with_scroll(&mut self) {
        if self.top_has_more_room() {
            self.scroll_above();
        } else {
            self.scroll_below();
        }
    }

    fn center_vertically(&mut self) {
        let viewport = self.viewport;
        let top = self.anchor.top() + self.anchor.height() / 2.0 - self.flyout.height / 2.0;
        self.top = if top < viewport.doc_top {
            VerticalPosition::Top(viewport.doc_top)
        } else if top + self.flyout.height >= viewport.doc_bottom {
            VerticalPosition::PinnedBottom
        } else {
            VerticalPosition::Top(top)
        };
    }

    fn center_horizontally(&mut self, alignment: Alignment) {
        let left = match alignment {
            Alignment::Center => {
                self.anchor.left() + self.anchor.width() / 2.0 - self.flyout.width / 2.0
            }
            Alignment::Left => self.anchor.left(),
            Alignment::Right => self.anchor.right() - self.flyout.width,
        };
        self.left = if left < 0.0 {
            HorizontalPosition::Left(0.0)
        } else if left + self.flyout.width >= self.viewport.client_width {
            HorizontalPosition::PinnedRight
        } else {
            HorizontalPosition::Left(left)
        };
    }
}
