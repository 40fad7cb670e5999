//! Menu commands
//!
//! A [`MenuCommand`] is one entry of a [`Menu`](crate::Menu):
//! - Buttons invoke a click handler and light dismiss the whole cascade
//! - Toggles flip their selected state, then dismiss like buttons
//! - Separators are inert and never take focus
//! - Flyout commands open a sub-flyout anchored at themselves and stay open
//!
//! Enter and Space invoke the focused command. On a flyout command the
//! forward arrow (Right, or Left in right-to-left text) opens the sub-flyout.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use lamina_core::{Direction, ElementId, Key, KeyEvent, ListenerId};
use lamina_overlay::{
    Alignment, Flyout, LifecycleEventKind, LifecycleListenerId, OverlayContext, Placement,
};

use crate::error::Result;
use crate::menu::MenuInner;

/// What a command does when invoked
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CommandKind {
    #[default]
    Button,
    Toggle,
    Separator,
    /// Opens a sub-flyout
    Flyout,
}

/// Click callback
pub type ClickHandler = Rc<dyn Fn(&MenuCommand)>;

pub(crate) struct CommandInner {
    ctx: OverlayContext,
    element: ElementId,
    id: String,
    kind: CommandKind,
    label: RefCell<String>,
    hidden: Cell<bool>,
    disabled: Cell<bool>,
    selected: Cell<bool>,
    flyout: RefCell<Option<Flyout>>,
    on_click: RefCell<Option<ClickHandler>>,
    /// Sub-flyout opened by this command and not yet hiding
    activated: Cell<bool>,
    deactivation: Cell<Option<LifecycleListenerId>>,
    owner: RefCell<Weak<MenuInner>>,
    key_listener: Cell<Option<ListenerId>>,
    disposed: Cell<bool>,
}

/// An entry in a menu
#[derive(Clone)]
pub struct MenuCommand {
    inner: Rc<CommandInner>,
}

impl MenuCommand {
    pub fn button(ctx: &OverlayContext, id: impl Into<String>, label: impl Into<String>) -> Result<Self> {
        Self::build(ctx, id.into(), label.into(), CommandKind::Button, None)
    }

    pub fn toggle(ctx: &OverlayContext, id: impl Into<String>, label: impl Into<String>) -> Result<Self> {
        Self::build(ctx, id.into(), label.into(), CommandKind::Toggle, None)
    }

    pub fn separator(ctx: &OverlayContext, id: impl Into<String>) -> Result<Self> {
        Self::build(ctx, id.into(), String::new(), CommandKind::Separator, None)
    }

    /// Command opening `flyout` as a sub-flyout
    pub fn flyout(
        ctx: &OverlayContext,
        id: impl Into<String>,
        label: impl Into<String>,
        flyout: Flyout,
    ) -> Result<Self> {
        Self::build(ctx, id.into(), label.into(), CommandKind::Flyout, Some(flyout))
    }

    fn build(
        ctx: &OverlayContext,
        id: String,
        label: String,
        kind: CommandKind,
        flyout: Option<Flyout>,
    ) -> Result<Self> {
        let document = ctx.document();
        let element = document.create_element();
        if kind != CommandKind::Separator {
            document.set_focusable(element, true)?;
        }
        ctx.register_control(element)?;

        let inner = Rc::new(CommandInner {
            ctx: ctx.clone(),
            element,
            id,
            kind,
            label: RefCell::new(label),
            hidden: Cell::new(false),
            disabled: Cell::new(false),
            selected: Cell::new(false),
            flyout: RefCell::new(flyout),
            on_click: RefCell::new(None),
            activated: Cell::new(false),
            deactivation: Cell::new(None),
            owner: RefCell::new(Weak::new()),
            key_listener: Cell::new(None),
            disposed: Cell::new(false),
        });

        if kind != CommandKind::Separator {
            let weak = Rc::downgrade(&inner);
            let listener = document.add_key_down_listener(element, move |event| {
                if let Some(inner) = weak.upgrade() {
                    MenuCommand { inner }.handle_key_down(event);
                }
            });
            inner.key_listener.set(Some(listener));
        }

        tracing::debug!("MenuCommand::build - '{}' ({:?})", inner.id, kind);
        Ok(Self { inner })
    }

    // =========================================================================
    // Properties
    // =========================================================================

    pub fn element(&self) -> ElementId {
        self.inner.element
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn kind(&self) -> CommandKind {
        self.inner.kind
    }

    pub fn label(&self) -> String {
        self.inner.label.borrow().clone()
    }

    pub fn set_label(&self, label: impl Into<String>) {
        *self.inner.label.borrow_mut() = label.into();
    }

    pub fn is_hidden(&self) -> bool {
        self.inner.hidden.get()
    }

    /// Hidden commands are not rendered and cannot take focus
    pub fn set_hidden(&self, hidden: bool) {
        if self.inner.hidden.replace(hidden) == hidden {
            return;
        }
        if let Err(err) = self.inner.ctx.document().set_hidden(self.inner.element, hidden) {
            tracing::warn!("MenuCommand::set_hidden - '{}': {}", self.inner.id, err);
        }
        if hidden {
            self.deactivate_flyout();
        }
        if let Some(owner) = self.owner() {
            owner.commands_updated();
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.inner.disabled.get()
    }

    /// Disabled commands ignore invocation and are skipped by arrow navigation
    pub fn set_disabled(&self, disabled: bool) {
        if self.inner.disabled.replace(disabled) == disabled {
            return;
        }
        if self.inner.kind != CommandKind::Separator {
            if let Err(err) = self
                .inner
                .ctx
                .document()
                .set_focusable(self.inner.element, !disabled)
            {
                tracing::warn!("MenuCommand::set_disabled - '{}': {}", self.inner.id, err);
            }
        }
    }

    pub fn is_selected(&self) -> bool {
        self.inner.selected.get()
    }

    pub fn set_selected(&self, selected: bool) {
        self.inner.selected.set(selected);
    }

    pub fn sub_flyout(&self) -> Option<Flyout> {
        self.inner.flyout.borrow().clone()
    }

    /// Replace the sub-flyout; an open one is closed first
    pub fn set_sub_flyout(&self, flyout: Option<Flyout>) {
        self.deactivate_flyout();
        *self.inner.flyout.borrow_mut() = flyout;
    }

    /// Whether this command's sub-flyout is open
    pub fn is_flyout_activated(&self) -> bool {
        self.inner.activated.get()
    }

    pub fn on_click<F>(&self, handler: F)
    where
        F: Fn(&MenuCommand) + 'static,
    {
        *self.inner.on_click.borrow_mut() = Some(Rc::new(handler));
    }

    pub fn ptr_eq(&self, other: &MenuCommand) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn owner(&self) -> Option<Rc<MenuInner>> {
        self.inner.owner.borrow().upgrade()
    }

    pub(crate) fn set_owner(&self, owner: Weak<MenuInner>) {
        *self.inner.owner.borrow_mut() = owner;
    }

    // =========================================================================
    // Invocation
    // =========================================================================

    /// Act as if the user clicked the command
    pub fn invoke(&self) {
        if self.is_hidden() || self.is_disabled() || self.inner.disposed.get() {
            return;
        }

        match self.inner.kind {
            CommandKind::Separator => return,
            CommandKind::Toggle => self.inner.selected.set(!self.inner.selected.get()),
            CommandKind::Flyout => self.activate_flyout(),
            CommandKind::Button => {}
        }

        let handler = self.inner.on_click.borrow().clone();
        if let Some(handler) = handler {
            handler(self);
        }

        if let Some(owner) = self.owner() {
            owner.handle_command_invoked(self);
        }
    }

    fn activate_flyout(&self) {
        let Some(flyout) = self.sub_flyout() else {
            return;
        };
        if !flyout.is_hidden() {
            return;
        }

        let placement = self
            .owner()
            .map(|owner| owner.sub_flyout_placement())
            .unwrap_or(Placement::AutoHorizontal);

        self.inner.activated.set(true);
        self.clear_deactivation(&flyout);

        // One-shot: the mark clears as soon as the sub-flyout starts hiding
        let weak = Rc::downgrade(&self.inner);
        let listener = flyout.on(LifecycleEventKind::BeforeHide, move |_| {
            if let Some(inner) = weak.upgrade() {
                let command = MenuCommand { inner };
                command.inner.activated.set(false);
                if let Some(flyout) = command.sub_flyout() {
                    command.clear_deactivation(&flyout);
                }
            }
        });
        self.inner.deactivation.set(Some(listener));

        tracing::debug!("MenuCommand::activate_flyout - '{}'", self.inner.id);
        if let Err(err) = flyout.show_at(self.inner.element, placement, Alignment::Center) {
            tracing::warn!("MenuCommand::activate_flyout - '{}': {}", self.inner.id, err);
            self.inner.activated.set(false);
            self.clear_deactivation(&flyout);
        }
    }

    /// Close the sub-flyout this command opened
    pub(crate) fn deactivate_flyout(&self) {
        if !self.inner.activated.replace(false) {
            return;
        }
        if let Some(flyout) = self.sub_flyout() {
            self.clear_deactivation(&flyout);
            if !flyout.is_hidden() {
                flyout.hide();
            }
        }
    }

    fn clear_deactivation(&self, flyout: &Flyout) {
        if let Some(listener) = self.inner.deactivation.take() {
            flyout.off(listener);
        }
    }

    fn handle_key_down(&self, event: &KeyEvent) {
        let forward = match self.inner.ctx.document().direction(self.inner.element) {
            Direction::Ltr => Key::Right,
            Direction::Rtl => Key::Left,
        };
        let invoke = match event.key() {
            Key::Enter | Key::Space => true,
            key => key == forward && self.inner.kind == CommandKind::Flyout,
        };
        if invoke {
            event.prevent_default();
            self.invoke();
        }
    }

    /// Release listeners and the element registration
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        if let Some(flyout) = self.sub_flyout() {
            self.clear_deactivation(&flyout);
        }
        self.inner.activated.set(false);
        self.inner.release();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }
}

impl CommandInner {
    fn release(&self) {
        if let Some(listener) = self.key_listener.take() {
            self.ctx.document().remove_listener(listener);
        }
        self.ctx.unregister_control(self.element);
    }
}

impl Drop for CommandInner {
    fn drop(&mut self) {
        if !self.disposed.get() {
            self.release();
        }
    }
}

impl std::fmt::Debug for MenuCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuCommand")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("element", &self.inner.element)
            .field("hidden", &self.inner.hidden.get())
            .field("disabled", &self.inner.disabled.get())
            .field("selected", &self.inner.selected.get())
            .field("activated", &self.inner.activated.get())
            .finish()
    }
}
