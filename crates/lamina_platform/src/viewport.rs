//! Visible-window geometry
//!
//! Positioning needs to know which part of the document the user can actually
//! see. On devices with a soft keyboard the visual viewport may be partially
//! occluded, and depending on the platform the layout viewport is either
//! resized to make room or left alone with the keyboard drawn on top.
//!
//! [`ViewportMetrics`] is the read-only view that placement code consumes.
//! [`VisibleWindow`] is the default implementation, fed by the host whenever
//! the window or keyboard changes.

use std::cell::Cell;

use crate::error::{PlatformError, Result};

/// Read-only view of the visible document area
pub trait ViewportMetrics {
    /// Top of the visible document area, in document coordinates
    fn visible_doc_top(&self) -> f32;

    /// Height of the document area not covered by a soft keyboard
    fn visible_doc_height(&self) -> f32;

    /// Bottom of the visible document area
    fn visible_doc_bottom(&self) -> f32 {
        self.visible_doc_top() + self.visible_doc_height()
    }

    /// Distance between the visible bottom and the layout viewport bottom
    fn visible_doc_bottom_offset(&self) -> f32;

    /// Width of the visual viewport
    fn visual_viewport_width(&self) -> f32;

    /// Client width of the document element (excludes scrollbars)
    fn client_width(&self) -> f32;

    /// Whether a soft keyboard currently occludes part of the window
    fn keyboard_visible(&self) -> bool;

    /// Duration of the platform's keyboard show animation
    fn keyboard_animation_ms(&self) -> u32 {
        0
    }
}

/// Host-fed visible window state
///
/// All setters take `&self` so a single instance can be shared behind an `Rc`
/// between the host and the overlay layer.
#[derive(Debug)]
pub struct VisibleWindow {
    visual_width: Cell<f32>,
    visual_height: Cell<f32>,
    client_width: Cell<f32>,
    client_height: Cell<f32>,
    inner_width: Cell<f32>,
    inner_height: Cell<f32>,
    occluded_height: Cell<f32>,
    keyboard_animation_ms: Cell<u32>,
}

impl VisibleWindow {
    /// Create a window whose visual, client and inner sizes all match
    pub fn new(width: f32, height: f32) -> Result<Self> {
        validate_size(width, height)?;
        Ok(Self {
            visual_width: Cell::new(width),
            visual_height: Cell::new(height),
            client_width: Cell::new(width),
            client_height: Cell::new(height),
            inner_width: Cell::new(width),
            inner_height: Cell::new(height),
            occluded_height: Cell::new(0.0),
            keyboard_animation_ms: Cell::new(0),
        })
    }

    /// Resize the whole window
    pub fn resize(&self, width: f32, height: f32) -> Result<()> {
        validate_size(width, height)?;
        self.visual_width.set(width);
        self.visual_height.set(height);
        self.client_width.set(width);
        self.client_height.set(height);
        self.inner_width.set(width);
        self.inner_height.set(height);
        Ok(())
    }

    /// Set the document element client size separately from the window
    pub fn set_client_size(&self, width: f32, height: f32) -> Result<()> {
        validate_size(width, height)?;
        self.client_width.set(width);
        self.client_height.set(height);
        Ok(())
    }

    /// Set the inner window size separately from the document element
    ///
    /// Platforms that resize the view for the keyboard shrink the inner
    /// height while the client size stays put.
    pub fn set_inner_size(&self, width: f32, height: f32) -> Result<()> {
        validate_size(width, height)?;
        self.inner_width.set(width);
        self.inner_height.set(height);
        Ok(())
    }

    /// Set the visual viewport size (pinch zoom, keyboard resize)
    pub fn set_visual_viewport(&self, width: f32, height: f32) -> Result<()> {
        validate_size(width, height)?;
        self.visual_width.set(width);
        self.visual_height.set(height);
        Ok(())
    }

    /// Report a soft keyboard occluding the bottom of the window
    pub fn show_keyboard(&self, occluded_height: f32, animation_ms: u32) -> Result<()> {
        if !occluded_height.is_finite() || occluded_height < 0.0 {
            return Err(PlatformError::InvalidOcclusion(occluded_height));
        }
        tracing::debug!(
            "VisibleWindow::show_keyboard - occluded {} px over {} ms",
            occluded_height,
            animation_ms
        );
        self.occluded_height.set(occluded_height);
        self.keyboard_animation_ms.set(animation_ms);
        Ok(())
    }

    /// Report the soft keyboard as dismissed
    pub fn hide_keyboard(&self) {
        tracing::debug!("VisibleWindow::hide_keyboard");
        self.occluded_height.set(0.0);
    }

    /// Whether the layout viewport was resized to make room for the keyboard
    pub fn is_resized(&self) -> bool {
        let height_ratio = self.client_height.get() / self.inner_height.get();
        let width_ratio = self.client_width.get() / self.inner_width.get();
        width_ratio / height_ratio < 0.99
    }

    /// Keyboard occlusion that was not absorbed by a layout resize
    pub fn extra_occluded(&self) -> f32 {
        let occluded = self.occluded_height.get();
        if occluded > 0.0 && !self.is_resized() {
            occluded
        } else {
            0.0
        }
    }
}

impl Default for VisibleWindow {
    fn default() -> Self {
        Self {
            visual_width: Cell::new(1024.0),
            visual_height: Cell::new(768.0),
            client_width: Cell::new(1024.0),
            client_height: Cell::new(768.0),
            inner_width: Cell::new(1024.0),
            inner_height: Cell::new(768.0),
            occluded_height: Cell::new(0.0),
            keyboard_animation_ms: Cell::new(0),
        }
    }
}

impl ViewportMetrics for VisibleWindow {
    fn visible_doc_top(&self) -> f32 {
        0.0
    }

    fn visible_doc_height(&self) -> f32 {
        self.visual_height.get() - self.extra_occluded()
    }

    fn visible_doc_bottom_offset(&self) -> f32 {
        if self.is_resized() {
            0.0
        } else {
            self.extra_occluded()
        }
    }

    fn visual_viewport_width(&self) -> f32 {
        self.visual_width.get()
    }

    fn client_width(&self) -> f32 {
        self.client_width.get()
    }

    fn keyboard_visible(&self) -> bool {
        self.occluded_height.get() > 0.0
    }

    fn keyboard_animation_ms(&self) -> u32 {
        self.keyboard_animation_ms.get()
    }
}

fn validate_size(width: f32, height: f32) -> Result<()> {
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Ok(())
    } else {
        Err(PlatformError::InvalidViewport { width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window_has_no_keyboard() {
        let window = VisibleWindow::default();
        assert!(!window.keyboard_visible());
        assert_eq!(window.visible_doc_top(), 0.0);
        assert_eq!(window.visible_doc_height(), 768.0);
        assert_eq!(window.visible_doc_bottom(), 768.0);
        assert_eq!(window.visible_doc_bottom_offset(), 0.0);
    }

    #[test]
    fn test_rejects_invalid_sizes() {
        assert!(VisibleWindow::new(0.0, 100.0).is_err());
        assert!(VisibleWindow::new(100.0, f32::NAN).is_err());
        let window = VisibleWindow::new(800.0, 600.0).unwrap();
        assert_eq!(
            window.show_keyboard(-1.0, 0),
            Err(PlatformError::InvalidOcclusion(-1.0))
        );
    }

    #[test]
    fn test_overlaid_keyboard_reduces_visible_height() {
        let window = VisibleWindow::new(800.0, 600.0).unwrap();
        window.show_keyboard(200.0, 300).unwrap();

        assert!(window.keyboard_visible());
        assert!(!window.is_resized());
        assert_eq!(window.extra_occluded(), 200.0);
        assert_eq!(window.visible_doc_height(), 400.0);
        assert_eq!(window.visible_doc_bottom_offset(), 200.0);
        assert_eq!(window.keyboard_animation_ms(), 300);

        window.hide_keyboard();
        assert_eq!(window.visible_doc_height(), 600.0);
    }

    #[test]
    fn test_resized_layout_absorbs_keyboard() {
        let window = VisibleWindow::new(800.0, 600.0).unwrap();
        window.set_inner_size(800.0, 400.0).unwrap();
        window.set_visual_viewport(800.0, 400.0).unwrap();
        window.show_keyboard(200.0, 0).unwrap();

        assert!(window.is_resized());
        assert_eq!(window.extra_occluded(), 0.0);
        assert_eq!(window.visible_doc_height(), 400.0);
        assert_eq!(window.visible_doc_bottom_offset(), 0.0);
    }

    #[test]
    fn test_proportional_client_shrink_is_not_a_resize() {
        let window = VisibleWindow::new(800.0, 600.0).unwrap();
        window.set_client_size(780.0, 585.0).unwrap();
        window.show_keyboard(200.0, 0).unwrap();

        assert!(!window.is_resized());
        assert_eq!(window.extra_occluded(), 200.0);
    }
}
