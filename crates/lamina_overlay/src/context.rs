//! Overlay context
//!
//! One [`OverlayContext`] ties together everything overlay controls share:
//! the document, the task queue, the animator, viewport metrics, input
//! modality, the light dismiss service and the cascade manager. Controls are
//! constructed against a context; there is no global state.
//!
//! Hosts feed input through the routing helpers ([`OverlayContext::key_down`],
//! [`OverlayContext::pointer_down`], [`OverlayContext::focus`]) so modality
//! tracking and light dismissal see every event.
//!
//! # Example
//!
//! ```ignore
//! let ctx = OverlayContext::builder()
//!     .viewport(Rc::new(VisibleWindow::new(1280.0, 720.0)?))
//!     .service_config(DismissServiceConfig::new().base_z_index(2000))
//!     .build();
//!
//! let flyout = Flyout::new(&ctx, panel)?;
//! flyout.show_at(button, Placement::Bottom, Alignment::Left)?;
//! ctx.tasks().advance(250);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use lamina_animation::{Animator, TimedAnimator};
use lamina_core::{Document, ElementId, KeyEvent, KeyboardEvent, TaskQueue};
use lamina_platform::{InputEvent, InputModality, InputType, ViewportMetrics, VisibleWindow};
use rustc_hash::FxHashSet;

use crate::cascade::CascadeManager;
use crate::dismiss::{DismissService, DismissServiceConfig};
use crate::error::{OverlayError, Result};
use crate::placement::ViewportBounds;

struct ContextInner {
    document: Document,
    tasks: TaskQueue,
    animator: Rc<dyn Animator>,
    viewport: Rc<dyn ViewportMetrics>,
    modality: Rc<InputModality>,
    service: Rc<DismissService>,
    cascade: Rc<CascadeManager>,
    controls: RefCell<FxHashSet<ElementId>>,
}

/// Shared services for overlay controls
#[derive(Clone)]
pub struct OverlayContext {
    inner: Rc<ContextInner>,
}

impl OverlayContext {
    /// Context with a fresh document, queue and default collaborators
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> OverlayContextBuilder {
        OverlayContextBuilder::default()
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    pub fn tasks(&self) -> &TaskQueue {
        &self.inner.tasks
    }

    pub fn animator(&self) -> &Rc<dyn Animator> {
        &self.inner.animator
    }

    pub fn viewport(&self) -> &Rc<dyn ViewportMetrics> {
        &self.inner.viewport
    }

    /// Snapshot of the visible document area
    pub fn viewport_bounds(&self) -> ViewportBounds {
        ViewportBounds::from_metrics(self.inner.viewport.as_ref())
    }

    pub fn modality(&self) -> &Rc<InputModality> {
        &self.inner.modality
    }

    pub fn service(&self) -> &Rc<DismissService> {
        &self.inner.service
    }

    pub fn cascade(&self) -> &Rc<CascadeManager> {
        &self.inner.cascade
    }

    pub fn ptr_eq(&self, other: &OverlayContext) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // =========================================================================
    // Control registry
    // =========================================================================

    /// Claim `element` for an overlay control
    pub fn register_control(&self, element: ElementId) -> Result<()> {
        if !self.inner.document.exists(element) {
            return Err(lamina_core::CoreError::ElementNotFound(element).into());
        }
        if !self.inner.controls.borrow_mut().insert(element) {
            return Err(OverlayError::DuplicateControl(element));
        }
        Ok(())
    }

    pub fn unregister_control(&self, element: ElementId) -> bool {
        self.inner.controls.borrow_mut().remove(&element)
    }

    pub fn is_control(&self, element: ElementId) -> bool {
        self.inner.controls.borrow().contains(&element)
    }

    // =========================================================================
    // Input routing
    // =========================================================================

    /// Record raw input for modality tracking
    pub fn observe_input(&self, event: &InputEvent) {
        self.inner.modality.observe(event);
    }

    /// Route a key press to `target`
    ///
    /// The press bubbles through the document first; if no handler prevented
    /// it, the light dismiss service gets a chance (Escape).
    pub fn key_down(&self, target: ElementId, keyboard: KeyboardEvent) -> KeyEvent {
        self.observe_input(&InputEvent::Keyboard(keyboard.clone()));
        let event = self.inner.document.dispatch_key_down(target, keyboard);
        if !event.is_default_prevented() {
            self.inner.service.key_down(&event);
        }
        event
    }

    /// Key press at the focused element, or nowhere if nothing has focus
    pub fn key_down_focused(&self, keyboard: KeyboardEvent) -> Option<KeyEvent> {
        let target = self.inner.document.focused()?;
        Some(self.key_down(target, keyboard))
    }

    /// Route a pointer press on `target` (`None` for empty window space)
    ///
    /// Light dismissal runs first, then focus follows the press when the
    /// target can take it.
    pub fn pointer_down(&self, target: Option<ElementId>, input_type: InputType) {
        self.inner.modality.record(input_type);
        self.inner.service.pointer_down(target);
        if let Some(target) = target {
            if self.inner.document.tree().can_focus(target) {
                self.inner.document.focus(target);
            }
        }
    }

    /// Move focus to `target`
    pub fn focus(&self, target: ElementId) -> bool {
        self.inner.document.focus(target)
    }

    pub fn window_resized(&self) -> bool {
        self.inner.service.window_resized()
    }

    pub fn window_blurred(&self) -> bool {
        self.inner.service.window_blurred()
    }

    pub fn back_requested(&self) -> bool {
        self.inner.service.back_requested()
    }
}

impl Default for OverlayContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OverlayContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayContext")
            .field("cascade", &self.inner.cascade)
            .field("service", &self.inner.service)
            .field("controls", &self.inner.controls.borrow().len())
            .finish()
    }
}

/// Builder for [`OverlayContext`]
#[derive(Default)]
pub struct OverlayContextBuilder {
    document: Option<Document>,
    tasks: Option<TaskQueue>,
    animator: Option<Rc<dyn Animator>>,
    viewport: Option<Rc<dyn ViewportMetrics>>,
    modality: Option<Rc<InputModality>>,
    service_config: DismissServiceConfig,
}

impl OverlayContextBuilder {
    pub fn document(mut self, document: Document) -> Self {
        self.document = Some(document);
        self
    }

    pub fn tasks(mut self, tasks: TaskQueue) -> Self {
        self.tasks = Some(tasks);
        self
    }

    /// Animation playback; defaults to a [`TimedAnimator`] on the task queue
    pub fn animator(mut self, animator: impl Animator + 'static) -> Self {
        self.animator = Some(Rc::new(animator));
        self
    }

    /// Viewport metrics; defaults to a 1024x768 [`VisibleWindow`]
    pub fn viewport(mut self, viewport: Rc<dyn ViewportMetrics>) -> Self {
        self.viewport = Some(viewport);
        self
    }

    pub fn modality(mut self, modality: Rc<InputModality>) -> Self {
        self.modality = Some(modality);
        self
    }

    pub fn service_config(mut self, config: DismissServiceConfig) -> Self {
        self.service_config = config;
        self
    }

    pub fn build(self) -> OverlayContext {
        let document = self.document.unwrap_or_default();
        let tasks = self.tasks.unwrap_or_default();
        let animator = self
            .animator
            .unwrap_or_else(|| Rc::new(TimedAnimator::new(tasks.clone())));
        let viewport = self
            .viewport
            .unwrap_or_else(|| Rc::new(VisibleWindow::default()));
        let modality = self.modality.unwrap_or_default();

        let service = DismissService::new(document.clone(), modality.clone(), self.service_config);
        let cascade = CascadeManager::new(document.clone(), modality.clone(), service.clone());

        tracing::debug!(
            "OverlayContext::build - base z-index {}",
            self.service_config.base_z_index
        );

        OverlayContext {
            inner: Rc::new(ContextInner {
                document,
                tasks,
                animator,
                viewport,
                modality,
                service,
                cascade,
                controls: RefCell::new(FxHashSet::default()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_core::{Key, Rect};

    #[test]
    fn test_register_control_rejects_duplicates() {
        let ctx = OverlayContext::new();
        let root = ctx.document().create_root(Rect::new(0.0, 0.0, 800.0, 600.0));
        let panel = ctx.document().create_child(root).unwrap();

        assert!(ctx.register_control(panel).is_ok());
        assert_eq!(
            ctx.register_control(panel),
            Err(OverlayError::DuplicateControl(panel))
        );
        assert!(ctx.unregister_control(panel));
        assert!(!ctx.is_control(panel));
    }

    #[test]
    fn test_register_unknown_element_fails() {
        let ctx = OverlayContext::new();
        let other = Document::new();
        let stray = other.create_element();
        assert!(matches!(
            ctx.register_control(stray),
            Err(OverlayError::Core(_))
        ));
    }

    #[test]
    fn test_key_down_records_keyboard_modality() {
        let ctx = OverlayContext::new();
        let root = ctx.document().create_root(Rect::new(0.0, 0.0, 800.0, 600.0));
        let event = ctx.key_down(root, KeyboardEvent::pressed(Key::Tab));
        assert!(!event.is_default_prevented());
        assert_eq!(ctx.modality().last_input_type(), Some(InputType::Keyboard));
        assert!(ctx.key_down_focused(KeyboardEvent::pressed(Key::Tab)).is_none());
    }

    #[test]
    fn test_pointer_down_moves_focus_to_focusable_target() {
        let ctx = OverlayContext::new();
        let root = ctx.document().create_root(Rect::new(0.0, 0.0, 800.0, 600.0));
        let button = ctx.document().create_child(root).unwrap();
        ctx.document().set_focusable(button, true).unwrap();

        ctx.pointer_down(Some(button), InputType::Touch);
        assert_eq!(ctx.document().focused(), Some(button));
        assert_eq!(ctx.modality().last_input_type(), Some(InputType::Touch));
        assert!(!ctx.modality().keyboard_seen_last());
    }

    #[test]
    fn test_builder_uses_supplied_collaborators() {
        let tasks = TaskQueue::new();
        let window = Rc::new(VisibleWindow::new(640.0, 480.0).unwrap());
        let ctx = OverlayContext::builder()
            .tasks(tasks.clone())
            .viewport(window)
            .service_config(DismissServiceConfig::new().base_z_index(50))
            .build();

        assert_eq!(ctx.service().config().base_z_index, 50);
        assert_eq!(ctx.viewport_bounds().doc_height, 480.0);
        ctx.tasks().post_delayed(10, || {});
        assert_eq!(tasks.pending_timers(), 1);
    }
}
