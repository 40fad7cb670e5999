//! Flyout control
//!
//! A [`Flyout`] is a transient surface anchored to another element. It owns an
//! [`OverlayMachine`] for its open/close lifecycle, joins the context's
//! [`CascadeManager`](crate::cascade::CascadeManager) while visible, and plays
//! its enter/exit transitions through the context's animator.
//!
//! Show and hide requests that arrive mid-transition are parked as the
//! machine's pending operation and re-issued when the transition settles. A
//! show that arrives while the cascade is collapsing waits for the cascade's
//! `unlocked` completion instead.
//!
//! # Example
//!
//! ```ignore
//! let flyout = Flyout::with_config(&ctx, panel, FlyoutConfig::new().placement(Placement::Bottom))?;
//! flyout.on(LifecycleEventKind::AfterShow, |_| tracing::info!("visible"));
//! flyout.show_at(button, Placement::Bottom, Alignment::Left)?;
//! ctx.tasks().advance(250);
//! assert!(flyout.state().is_shown());
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use lamina_animation::{PopupAnimation, PopupEdge};
use lamina_core::{CoreError, ElementId, FocusEvent, Key, KeyEvent, ListenerId, Rect};

use crate::cascade::{CascadeSurface, SurfaceId};
use crate::context::OverlayContext;
use crate::dismiss::{Dismissable, LightDismissableElement};
use crate::error::{OverlayError, Result};
use crate::events::{LifecycleEvent, LifecycleEventKind, LifecycleListenerId, LifecycleListeners};
use crate::placement::{compute_placement, Alignment, FlyoutLayout, FlyoutMetrics, Placement};
use crate::state::{OverlayMachine, OverlayState, PendingOp, RequestOutcome};

// =============================================================================
// Configuration
// =============================================================================

/// Where focus goes when a flyout is activated and has no remembered focus
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ActivationFocus {
    /// First focusable descendant, else the flyout element
    #[default]
    FirstFocusable,
    /// The flyout element itself
    Surface,
}

/// Flyout configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlyoutConfig {
    /// Default placement when `show` is called without one
    pub placement: Placement,
    /// Default alignment when `show` is called without one
    pub alignment: Alignment,
    pub animation: PopupAnimation,
    /// Margin plus padding around the content, subtracted when scrolling
    pub frame_inset: f32,
    pub activation: ActivationFocus,
}

impl Default for FlyoutConfig {
    fn default() -> Self {
        Self {
            placement: Placement::Auto,
            alignment: Alignment::Center,
            animation: PopupAnimation::flyout(),
            frame_inset: 0.0,
            activation: ActivationFocus::FirstFocusable,
        }
    }
}

impl FlyoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset for menus: quicker animation, focus lands on the menu itself
    pub fn menu() -> Self {
        Self {
            animation: PopupAnimation::menu(),
            activation: ActivationFocus::Surface,
            ..Self::default()
        }
    }

    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn animation(mut self, animation: PopupAnimation) -> Self {
        self.animation = animation;
        self
    }

    pub fn frame_inset(mut self, inset: f32) -> Self {
        self.frame_inset = inset.max(0.0);
        self
    }

    pub fn activation(mut self, activation: ActivationFocus) -> Self {
        self.activation = activation;
        self
    }
}

// =============================================================================
// Hooks
// =============================================================================

/// Extension points for controls built on a flyout
///
/// Every method has a no-op default. `key_down` and `focus_in` return `true`
/// when they fully handled the event, which skips the flyout's own handling.
pub trait FlyoutHooks {
    /// Before the flyout starts hiding (also when collapsed by its cascade)
    fn before_hide(&self) {}

    /// Exit transition finished, before the flyout leaves the dismiss layer
    fn before_end_hide(&self) {}

    /// Before the flyout is measured and positioned
    fn before_position(&self) {}

    fn key_down(&self, _event: &KeyEvent) -> bool {
        false
    }

    fn focus_in(&self, _event: &FocusEvent) -> bool {
        false
    }
}

// =============================================================================
// Flyout
// =============================================================================

pub(crate) struct FlyoutInner {
    this: Weak<FlyoutInner>,
    id: SurfaceId,
    element: ElementId,
    ctx: OverlayContext,
    config: Cell<FlyoutConfig>,
    machine: Cell<OverlayMachine>,

    /// Default anchor
    anchor: Cell<Option<ElementId>>,
    /// Anchor, placement and alignment of the latest show request
    current_anchor: Cell<Option<ElementId>>,
    current_placement: Cell<Placement>,
    current_alignment: Cell<Alignment>,

    layout: Cell<Option<FlyoutLayout>>,
    frame: Cell<Option<Rect>>,
    /// Bumped on every transition; completions from older ones are ignored
    generation: Cell<u64>,
    disposed: Cell<bool>,

    dismissable: Rc<LightDismissableElement>,
    listeners: LifecycleListeners,
    hooks: RefCell<Option<Weak<dyn FlyoutHooks>>>,
    dom_listeners: RefCell<Vec<ListenerId>>,
}

/// Anchored transient surface
///
/// Cheap to clone; clones share one surface.
#[derive(Clone)]
pub struct Flyout {
    inner: Rc<FlyoutInner>,
}

impl Flyout {
    /// Turn `element` into a flyout with the default configuration
    pub fn new(ctx: &OverlayContext, element: ElementId) -> Result<Self> {
        Self::with_config(ctx, element, FlyoutConfig::default())
    }

    pub fn with_config(ctx: &OverlayContext, element: ElementId, config: FlyoutConfig) -> Result<Self> {
        ctx.register_control(element)?;
        let document = ctx.document().clone();
        document.set_focusable(element, true)?;
        document.set_hidden(element, true)?;

        let inner = Rc::new_cyclic(|this: &Weak<FlyoutInner>| {
            let dismiss = this.clone();
            let activate = this.clone();
            let dismissable = LightDismissableElement::new(document.clone(), element, move |_| {
                if let Some(inner) = dismiss.upgrade() {
                    if !inner.disposed.get() {
                        inner.hide_internal();
                    }
                }
            })
            .with_activation(move |_| {
                if let Some(inner) = activate.upgrade() {
                    inner.activate();
                }
            });

            FlyoutInner {
                this: this.clone(),
                id: SurfaceId::next(),
                element,
                ctx: ctx.clone(),
                config: Cell::new(config),
                machine: Cell::new(OverlayMachine::new()),
                anchor: Cell::new(None),
                current_anchor: Cell::new(None),
                current_placement: Cell::new(config.placement),
                current_alignment: Cell::new(config.alignment),
                layout: Cell::new(None),
                frame: Cell::new(None),
                generation: Cell::new(0),
                disposed: Cell::new(false),
                dismissable: Rc::new(dismissable),
                listeners: LifecycleListeners::new(),
                hooks: RefCell::new(None),
                dom_listeners: RefCell::new(Vec::new()),
            }
        });
        inner.attach_listeners();

        tracing::debug!("Flyout::new - {:?} on {:?}", inner.id, element);
        Ok(Self { inner })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Show at the default anchor, placement and alignment
    pub fn show(&self) -> Result<()> {
        self.inner.show(None, None, None)
    }

    /// Show at `anchor`, overriding the defaults for this show only
    pub fn show_at(&self, anchor: ElementId, placement: Placement, alignment: Alignment) -> Result<()> {
        self.inner.show(Some(anchor), Some(placement), Some(alignment))
    }

    /// Hide this flyout and every flyout cascaded from it
    pub fn hide(&self) {
        if self.inner.disposed.get() {
            return;
        }
        self.inner.hide_internal();
    }

    /// Collapse the whole cascade this flyout belongs to
    pub fn light_dismiss(&self) {
        self.inner.light_dismiss();
    }

    /// Tear down synchronously
    ///
    /// Sub-flyouts are collapsed, the surface leaves the dismiss layer and
    /// any in-flight transition completion is ignored.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    pub fn state(&self) -> OverlayState {
        self.inner.machine.get().state()
    }

    /// Hidden, hiding, or about to hide once the running transition ends
    pub fn is_hidden(&self) -> bool {
        let machine = self.inner.machine.get();
        matches!(machine.state(), OverlayState::Hidden | OverlayState::Hiding)
            || machine.pending() == Some(PendingOp::Hide)
    }

    /// Operation queued behind the running transition
    pub fn pending(&self) -> Option<PendingOp> {
        self.inner.machine.get().pending()
    }

    pub fn is_disabled(&self) -> bool {
        self.inner.machine.get().is_disabled()
    }

    /// Disabled flyouts ignore `show`; disabling a visible flyout hides it
    pub fn set_disabled(&self, disabled: bool) {
        if self.is_disabled() == disabled {
            return;
        }
        self.inner.update_machine(|machine| machine.set_disabled(disabled));
        if disabled && self.state().is_visible() {
            self.hide();
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    pub fn element(&self) -> ElementId {
        self.inner.element
    }

    pub fn surface_id(&self) -> SurfaceId {
        self.inner.id
    }

    pub fn context(&self) -> &OverlayContext {
        &self.inner.ctx
    }

    pub fn config(&self) -> FlyoutConfig {
        self.inner.config.get()
    }

    /// Default anchor
    pub fn anchor(&self) -> Option<ElementId> {
        self.inner.anchor.get()
    }

    pub fn set_anchor(&self, anchor: Option<ElementId>) {
        self.inner.anchor.set(anchor);
    }

    /// Anchor of the latest show
    pub fn current_anchor(&self) -> Option<ElementId> {
        self.inner.current_anchor.get()
    }

    pub fn placement(&self) -> Placement {
        self.inner.config.get().placement
    }

    pub fn set_placement(&self, placement: Placement) {
        self.inner.update_config(|config| config.placement = placement);
    }

    pub fn alignment(&self) -> Alignment {
        self.inner.config.get().alignment
    }

    pub fn set_alignment(&self, alignment: Alignment) {
        self.inner.update_config(|config| config.alignment = alignment);
    }

    pub fn set_animation(&self, animation: PopupAnimation) {
        self.inner.update_config(|config| config.animation = animation);
    }

    /// Position computed for the current show
    pub fn layout(&self) -> Option<FlyoutLayout> {
        self.inner.layout.get()
    }

    /// Document rectangle of the current show
    pub fn frame(&self) -> Option<Rect> {
        self.inner.frame.get()
    }

    /// The flyout's light dismiss participant
    pub fn dismissable(&self) -> Rc<dyn Dismissable> {
        self.inner.dismissable.clone()
    }

    // =========================================================================
    // Events and hooks
    // =========================================================================

    /// Listen for a lifecycle event
    pub fn on<F>(&self, kind: LifecycleEventKind, handler: F) -> LifecycleListenerId
    where
        F: Fn(&LifecycleEvent) + 'static,
    {
        self.inner.listeners.add(kind, handler)
    }

    pub fn off(&self, id: LifecycleListenerId) -> bool {
        self.inner.listeners.remove(id)
    }

    /// Install extension hooks; the flyout holds them weakly
    pub fn set_hooks(&self, hooks: Weak<dyn FlyoutHooks>) {
        *self.inner.hooks.borrow_mut() = Some(hooks);
    }

    /// The flyout's own key handling, for hooks that extend rather than replace it
    pub fn handle_key_down_default(&self, event: &KeyEvent) {
        self.inner.default_key_down(event);
    }

    /// The flyout's own focus-in handling
    pub fn handle_focus_in_default(&self, event: &FocusEvent) {
        self.inner.default_focus_in(event);
    }

    pub fn ptr_eq(&self, other: &Flyout) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for Flyout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flyout")
            .field("id", &self.inner.id)
            .field("element", &self.inner.element)
            .field("machine", &self.inner.machine.get())
            .field("anchor", &self.inner.current_anchor.get())
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}

impl FlyoutInner {
    fn update_machine<R>(&self, f: impl FnOnce(&mut OverlayMachine) -> R) -> R {
        let mut machine = self.machine.get();
        let result = f(&mut machine);
        self.machine.set(machine);
        result
    }

    fn update_config(&self, f: impl FnOnce(&mut FlyoutConfig)) {
        let mut config = self.config.get();
        f(&mut config);
        self.config.set(config);
    }

    fn hooks(&self) -> Option<Rc<dyn FlyoutHooks>> {
        self.hooks.borrow().as_ref().and_then(Weak::upgrade)
    }

    fn surface(&self) -> Option<Rc<dyn CascadeSurface>> {
        let surface: Rc<dyn CascadeSurface> = self.this.upgrade()?;
        Some(surface)
    }

    fn next_generation(&self) -> u64 {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        generation
    }

    fn attach_listeners(&self) {
        let document = self.ctx.document();

        let weak = self.this.clone();
        let key = document.add_key_down_listener(self.element, move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_key_down(event);
            }
        });

        let weak = self.this.clone();
        let focus = document.add_focus_in_listener(self.element, move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_focus_in(event);
            }
        });

        self.dom_listeners.borrow_mut().extend([key, focus]);
    }

    fn detach_listeners(&self) {
        let listeners: Vec<ListenerId> = self.dom_listeners.borrow_mut().drain(..).collect();
        for id in listeners {
            self.ctx.document().remove_listener(id);
        }
    }

    // =========================================================================
    // Show
    // =========================================================================

    fn show(
        &self,
        anchor: Option<ElementId>,
        placement: Option<Placement>,
        alignment: Option<Alignment>,
    ) -> Result<()> {
        if self.disposed.get() {
            tracing::warn!("Flyout::show - {:?} is disposed", self.id);
            return Ok(());
        }
        if self.machine.get().is_disabled() {
            tracing::debug!("Flyout::show - {:?} is disabled", self.id);
            return Ok(());
        }

        let config = self.config.get();
        let anchor = anchor
            .or(self.anchor.get())
            .filter(|anchor| self.ctx.document().is_attached(*anchor))
            .ok_or(OverlayError::NoAnchor)?;

        self.current_anchor.set(Some(anchor));
        self.current_placement.set(placement.unwrap_or(config.placement));
        self.current_alignment.set(alignment.unwrap_or(config.alignment));

        self.request_show()
    }

    fn request_show(&self) -> Result<()> {
        if self.machine.get().state().is_animating() {
            tracing::trace!("Flyout::show - {:?} busy, deferring", self.id);
            self.update_machine(|machine| machine.defer(PendingOp::Show));
            return Ok(());
        }

        let cascade = self.ctx.cascade();
        if cascade.is_locked() {
            tracing::debug!("Flyout::show - {:?} waiting for the cascade to unlock", self.id);
            self.update_machine(|machine| machine.defer(PendingOp::Show));
            if let Some(unlocked) = cascade.unlocked() {
                let weak = self.this.clone();
                unlocked.then(self.ctx.tasks(), move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.check_do_next();
                    }
                });
            }
            return Ok(());
        }

        match self.update_machine(|machine| machine.request_show()) {
            RequestOutcome::Start => self.base_show(),
            RequestOutcome::Unchanged if cascade.index_of(self.id).is_none() => {
                // Shown but collapsed out of the cascade by a canceled hide
                if self.machine.get().state().is_shown() {
                    if let Some(surface) = self.surface() {
                        cascade.append_flyout(surface);
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn base_show(&self) -> Result<()> {
        if !self.listeners.dispatch(LifecycleEventKind::BeforeShow) {
            tracing::debug!("Flyout::show - {:?} canceled by beforeshow", self.id);
            return Ok(());
        }

        if let Some(hooks) = self.hooks() {
            hooks.before_position();
        }
        let layout = self.find_position()?;

        if !self.update_machine(|machine| machine.begin(PendingOp::Show)) {
            return Ok(());
        }
        self.ctx.document().set_hidden(self.element, false)?;

        let transition = self.config.get().animation.enter.from_edge(layout.edge);
        let completion = self.ctx.animator().play(self.element, &transition);

        if let Some(surface) = self.surface() {
            self.ctx.cascade().append_flyout(surface);
        }

        let generation = self.next_generation();
        let weak = self.this.clone();
        completion.then(self.ctx.tasks(), move || {
            if let Some(inner) = weak.upgrade() {
                inner.end_show(generation);
            }
        });
        tracing::debug!("Flyout::show - {:?} showing ({:?})", self.id, layout.edge);
        Ok(())
    }

    fn find_position(&self) -> Result<FlyoutLayout> {
        let document = self.ctx.document();
        let anchor = self
            .current_anchor
            .get()
            .filter(|anchor| document.is_attached(*anchor))
            .and_then(|anchor| document.bounds(anchor))
            .ok_or(OverlayError::NoAnchor)?;
        let bounds = document
            .bounds(self.element)
            .ok_or(CoreError::ElementNotFound(self.element))?;

        let inset = self.config.get().frame_inset;
        let metrics =
            FlyoutMetrics::new(bounds.width(), bounds.height()).inner_height(bounds.height() - inset);
        let viewport = self.ctx.viewport_bounds();
        let layout = compute_placement(
            anchor,
            metrics,
            self.current_placement.get(),
            self.current_alignment.get(),
            &viewport,
        );

        self.layout.set(Some(layout));
        self.frame.set(Some(layout.frame(metrics, &viewport)));
        Ok(layout)
    }

    fn end_show(&self, generation: u64) {
        if self.generation.get() != generation || self.machine.get().state() != OverlayState::Showing {
            return;
        }
        let pending = self.update_machine(|machine| machine.settle());
        tracing::debug!("Flyout::show - {:?} shown", self.id);
        self.listeners.dispatch(LifecycleEventKind::AfterShow);

        if let Some(op) = pending {
            self.run_pending(op);
        }
    }

    // =========================================================================
    // Hide
    // =========================================================================

    fn hide_internal(&self) {
        let cascade = self.ctx.cascade();
        if cascade.index_of(self.id).is_some() && !cascade.is_locked() {
            if let Some(surface) = self.surface() {
                // Hides sub-flyouts, then this one through hide_from_cascade
                cascade.collapse_flyout(&surface);
                return;
            }
        }
        self.hide_self();
    }

    fn hide_self(&self) {
        if let Some(hooks) = self.hooks() {
            hooks.before_hide();
        }
        if self.base_hide() {
            self.ctx.cascade().hiding(self);
        }
    }

    fn base_hide(&self) -> bool {
        match self.update_machine(|machine| machine.request_hide()) {
            RequestOutcome::Start => {}
            RequestOutcome::Deferred => {
                tracing::trace!("Flyout::hide - {:?} busy, deferring", self.id);
                return false;
            }
            _ => return false,
        }

        if !self.listeners.dispatch(LifecycleEventKind::BeforeHide) {
            tracing::debug!("Flyout::hide - {:?} canceled by beforehide", self.id);
            return false;
        }
        if !self.update_machine(|machine| machine.begin(PendingOp::Hide)) {
            return false;
        }

        let edge = self.layout.get().map_or(PopupEdge::Top, |layout| layout.edge);
        let transition = self.config.get().animation.exit.from_edge(edge);
        let completion = self.ctx.animator().play(self.element, &transition);

        let generation = self.next_generation();
        let weak = self.this.clone();
        completion.then(self.ctx.tasks(), move || {
            if let Some(inner) = weak.upgrade() {
                inner.end_hide(generation);
            }
        });
        tracing::debug!("Flyout::hide - {:?} hiding", self.id);
        true
    }

    fn end_hide(&self, generation: u64) {
        if self.generation.get() != generation || self.machine.get().state() != OverlayState::Hiding {
            return;
        }

        if let Some(hooks) = self.hooks() {
            hooks.before_end_hide();
        }
        self.ctx.cascade().hidden(self);

        let pending = self.update_machine(|machine| machine.settle());
        self.conceal();
        tracing::debug!("Flyout::hide - {:?} hidden", self.id);
        self.listeners.dispatch(LifecycleEventKind::AfterHide);

        if let Some(op) = pending {
            self.run_pending(op);
        }
    }

    fn conceal(&self) {
        if let Err(err) = self.ctx.document().set_hidden(self.element, true) {
            tracing::warn!("Flyout - {:?} could not be hidden: {}", self.id, err);
        }
        self.layout.set(None);
        self.frame.set(None);
    }

    // =========================================================================
    // Deferred work
    // =========================================================================

    fn check_do_next(&self) {
        if self.disposed.get() || self.machine.get().state().is_animating() {
            return;
        }
        if let Some(op) = self.update_machine(|machine| machine.take_pending()) {
            self.run_pending(op);
        }
    }

    fn run_pending(&self, op: PendingOp) {
        tracing::trace!("Flyout - {:?} running deferred {:?}", self.id, op);
        match op {
            PendingOp::Show => {
                if let Err(err) = self.request_show() {
                    tracing::warn!("Flyout::show - deferred show of {:?} failed: {}", self.id, err);
                }
            }
            PendingOp::Hide => self.hide_internal(),
        }
    }

    fn light_dismiss(&self) {
        self.ctx.cascade().collapse_all();
    }

    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        tracing::debug!("Flyout::dispose - {:?}", self.id);

        // Our own entry is skipped by `hide_from_cascade`; descendants hide
        if let Some(surface) = self.surface() {
            self.ctx.cascade().collapse_flyout(&surface);
        }

        self.update_machine(|machine| machine.dispose());
        self.next_generation();
        self.ctx.cascade().hidden(self);
        self.conceal();

        self.detach_listeners();
        self.ctx.unregister_control(self.element);
        self.anchor.set(None);
        self.current_anchor.set(None);
    }

    // =========================================================================
    // Focus and keyboard
    // =========================================================================

    fn activate(&self) {
        if self.dismissable.restore_focus() {
            return;
        }
        match self.config.get().activation {
            ActivationFocus::FirstFocusable => {
                self.dismissable.focus_first();
            }
            ActivationFocus::Surface => {
                self.ctx.document().focus(self.element);
            }
        }
    }

    fn handle_key_down(&self, event: &KeyEvent) {
        if let Some(hooks) = self.hooks() {
            if hooks.key_down(event) {
                return;
            }
        }
        self.default_key_down(event);
    }

    fn default_key_down(&self, event: &KeyEvent) {
        let document = self.ctx.document();
        if document.focused() != Some(self.element) {
            return;
        }

        match event.key() {
            Key::Space | Key::Enter => {
                event.prevent_default();
                event.stop_propagation();
                self.hide_internal();
            }
            Key::Tab if event.modifiers().shift_only() => {
                event.prevent_default();
                event.stop_propagation();
                // Shift+Tab from the surface wraps to its last stop
                let last = document.tree().focusable_descendants(self.element).pop();
                document.focus(last.unwrap_or(self.element));
            }
            _ => {}
        }
    }

    fn handle_focus_in(&self, event: &FocusEvent) {
        if let Some(hooks) = self.hooks() {
            if hooks.focus_in(event) {
                return;
            }
        }
        self.default_focus_in(event);
    }

    fn default_focus_in(&self, event: &FocusEvent) {
        let from_inside = event
            .related_target
            .is_some_and(|related| self.ctx.document().contains(self.element, related));
        if !from_inside {
            self.ctx.cascade().handle_focus_into_flyout(event);
        }
    }
}

impl CascadeSurface for FlyoutInner {
    fn surface_id(&self) -> SurfaceId {
        self.id
    }

    fn element(&self) -> ElementId {
        self.element
    }

    fn current_anchor(&self) -> Option<ElementId> {
        self.current_anchor.get()
    }

    fn dismissable(&self) -> Rc<dyn Dismissable> {
        self.dismissable.clone()
    }

    fn hide_from_cascade(&self) {
        if !self.disposed.get() {
            self.hide_self();
        }
    }
}

impl Drop for FlyoutInner {
    fn drop(&mut self) {
        if !self.disposed.get() {
            self.detach_listeners();
            self.ctx.unregister_control(self.element);
        }
    }
}
