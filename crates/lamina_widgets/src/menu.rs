//! Menu control
//!
//! A [`Menu`] is a [`Flyout`] whose content is a list of [`MenuCommand`]s. On
//! top of the flyout it provides:
//! - Up/Down arrow navigation that wraps around the command list
//! - Sub-menus: flyout commands open cascading sub-flyouts, and focusing a
//!   sibling command closes the open one
//! - Hover: resting the pointer on a flyout command opens its sub-flyout
//!   after [`MenuConfig::hover_delay_ms`]
//! - Light dismiss of the whole cascade once a leaf command is invoked
//! - Mouse or touch spacing, chosen by the input that opened the cascade
//!
//! # Example
//!
//! ```ignore
//! let open = MenuCommand::button(&ctx, "open", "Open")?;
//! let recent = MenuCommand::flyout(&ctx, "recent", "Recent", recent_menu.flyout().clone())?;
//!
//! let menu = Menu::new(&ctx, panel)?;
//! menu.set_commands(vec![open, recent])?;
//! menu.show_at(button, Placement::Bottom, Alignment::Left)?;
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use lamina_core::{ElementId, FocusEvent, Key, KeyEvent, TimerHandle};
use lamina_overlay::{
    Alignment, Flyout, FlyoutConfig, FlyoutHooks, LifecycleEvent, LifecycleEventKind,
    LifecycleListenerId, OverlayContext, OverlayState, Placement,
};
use lamina_platform::InputType;

use crate::error::{MenuError, Result};
use crate::menu_command::{CommandKind, MenuCommand};

/// Milliseconds the pointer rests on a flyout command before it opens
pub const DEFAULT_HOVER_DELAY_MS: u64 = 400;

/// Menu configuration
#[derive(Clone, Copy, Debug)]
pub struct MenuConfig {
    /// Underlying flyout behavior
    pub flyout: FlyoutConfig,
    /// Hover delay before a flyout command opens its sub-flyout
    pub hover_delay_ms: u64,
    /// Where sub-flyouts open relative to their command
    pub sub_flyout_placement: Placement,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            flyout: FlyoutConfig::menu(),
            hover_delay_ms: DEFAULT_HOVER_DELAY_MS,
            sub_flyout_placement: Placement::AutoHorizontal,
        }
    }
}

impl MenuConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flyout(mut self, flyout: FlyoutConfig) -> Self {
        self.flyout = flyout;
        self
    }

    pub fn hover_delay_ms(mut self, delay: u64) -> Self {
        self.hover_delay_ms = delay;
        self
    }

    pub fn sub_flyout_placement(mut self, placement: Placement) -> Self {
        self.sub_flyout_placement = placement;
        self
    }
}

/// Command spacing, fixed when the menu starts showing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MenuSpacing {
    /// Compact rows for mouse and keyboard
    Mouse,
    /// Roomy rows for touch and pen
    Touch,
}

/// Which command kinds the visible commands include
///
/// Renderers reserve a check column for toggles and an arrow column for
/// flyout commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MenuLayoutFlags {
    pub has_toggle: bool,
    pub has_flyout: bool,
}

// =============================================================================
// Menu
// =============================================================================

pub(crate) struct MenuInner {
    this: Weak<MenuInner>,
    flyout: Flyout,
    config: MenuConfig,
    commands: RefCell<Vec<MenuCommand>>,
    hover: RefCell<Option<TimerHandle>>,
    spacing: Cell<Option<MenuSpacing>>,
    layout_flags: Cell<MenuLayoutFlags>,
}

/// A flyout listing commands
#[derive(Clone)]
pub struct Menu {
    inner: Rc<MenuInner>,
}

impl Menu {
    pub fn new(ctx: &OverlayContext, element: ElementId) -> Result<Self> {
        Self::with_config(ctx, element, MenuConfig::default())
    }

    pub fn with_config(ctx: &OverlayContext, element: ElementId, config: MenuConfig) -> Result<Self> {
        let flyout = Flyout::with_config(ctx, element, config.flyout)?;
        let inner = Rc::new_cyclic(|this| MenuInner {
            this: this.clone(),
            flyout: flyout.clone(),
            config,
            commands: RefCell::new(Vec::new()),
            hover: RefCell::new(None),
            spacing: Cell::new(None),
            layout_flags: Cell::new(MenuLayoutFlags::default()),
        });

        let hooks: Weak<MenuInner> = Rc::downgrade(&inner);
        flyout.set_hooks(hooks);

        tracing::debug!("Menu::new - {:?}", flyout.surface_id());
        Ok(Self { inner })
    }

    // =========================================================================
    // Show / Hide
    // =========================================================================

    /// Show at the default anchor
    pub fn show(&self) -> Result<()> {
        Ok(self.inner.flyout.show()?)
    }

    pub fn show_at(&self, anchor: ElementId, placement: Placement, alignment: Alignment) -> Result<()> {
        Ok(self.inner.flyout.show_at(anchor, placement, alignment)?)
    }

    pub fn hide(&self) {
        self.inner.flyout.hide();
    }

    /// Collapse the whole cascade this menu belongs to
    pub fn light_dismiss(&self) {
        self.inner.flyout.light_dismiss();
    }

    /// Tear down the menu and its commands
    pub fn dispose(&self) {
        self.inner.cancel_hover();
        for command in self.commands() {
            command.dispose();
        }
        self.inner.flyout.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.flyout.is_disposed()
    }

    pub fn state(&self) -> OverlayState {
        self.inner.flyout.state()
    }

    pub fn is_hidden(&self) -> bool {
        self.inner.flyout.is_hidden()
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// The flyout underneath, for anchoring, events and use as a sub-flyout
    pub fn flyout(&self) -> &Flyout {
        &self.inner.flyout
    }

    pub fn element(&self) -> ElementId {
        self.inner.flyout.element()
    }

    pub fn context(&self) -> &OverlayContext {
        self.inner.flyout.context()
    }

    pub fn config(&self) -> MenuConfig {
        self.inner.config
    }

    /// Spacing of the current show, `None` while hidden
    pub fn spacing(&self) -> Option<MenuSpacing> {
        self.inner.spacing.get()
    }

    pub fn layout_flags(&self) -> MenuLayoutFlags {
        self.inner.layout_flags.get()
    }

    /// Whether a hover timer is waiting to open a sub-flyout
    pub fn hover_pending(&self) -> bool {
        self.inner
            .hover
            .borrow()
            .as_ref()
            .is_some_and(TimerHandle::is_pending)
    }

    pub fn on<F>(&self, kind: LifecycleEventKind, handler: F) -> LifecycleListenerId
    where
        F: Fn(&LifecycleEvent) + 'static,
    {
        self.inner.flyout.on(kind, handler)
    }

    pub fn off(&self, id: LifecycleListenerId) -> bool {
        self.inner.flyout.off(id)
    }

    // =========================================================================
    // Commands
    // =========================================================================

    pub fn commands(&self) -> Vec<MenuCommand> {
        self.inner.commands.borrow().clone()
    }

    /// Replace the command list; only allowed while hidden
    pub fn set_commands(&self, commands: Vec<MenuCommand>) -> Result<()> {
        if !self.inner.flyout.is_hidden() {
            return Err(MenuError::CannotChangeCommandsWhenVisible);
        }

        let document = self.context().document();
        let menu = self.element();

        for command in self.inner.commands.take() {
            command.deactivate_flyout();
            document.detach(command.element())?;
            command.set_owner(Weak::new());
        }

        for command in &commands {
            if let Some(previous) = command.owner() {
                if !Rc::ptr_eq(&previous, &self.inner) {
                    previous.forget(command);
                }
            }
            document.detach(command.element())?;
            document.append_child(menu, command.element())?;
            command.set_owner(self.inner.this.clone());
        }

        tracing::debug!("Menu::set_commands - {} commands", commands.len());
        *self.inner.commands.borrow_mut() = commands;
        Ok(())
    }

    /// First command with `id`
    pub fn command_by_id(&self, id: &str) -> Option<MenuCommand> {
        self.inner
            .commands
            .borrow()
            .iter()
            .find(|command| command.id() == id)
            .cloned()
    }

    pub fn show_commands(&self, ids: &[&str]) -> Result<()> {
        self.set_commands_hidden(ids, false)
    }

    pub fn hide_commands(&self, ids: &[&str]) -> Result<()> {
        self.set_commands_hidden(ids, true)
    }

    /// Show the listed commands and hide all others
    pub fn show_only_commands(&self, ids: &[&str]) -> Result<()> {
        if ids.is_empty() {
            return Err(MenuError::RequiresCommands);
        }
        for command in self.commands() {
            command.set_hidden(!ids.contains(&command.id()));
        }
        Ok(())
    }

    fn set_commands_hidden(&self, ids: &[&str], hidden: bool) -> Result<()> {
        if ids.is_empty() {
            return Err(MenuError::RequiresCommands);
        }
        for command in self.commands() {
            if ids.contains(&command.id()) {
                command.set_hidden(hidden);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Pointer
    // =========================================================================

    /// Pointer moved onto `target`
    ///
    /// A command under the pointer takes focus. A flyout command whose
    /// sub-flyout is closed starts the hover timer.
    pub fn pointer_over(&self, target: ElementId) {
        let Some(command) = self.inner.command_for(target) else {
            return;
        };
        if !self.context().focus(command.element()) {
            return;
        }
        let closed = command.sub_flyout().is_some_and(|flyout| flyout.is_hidden());
        if command.kind() == CommandKind::Flyout && closed {
            self.inner.start_hover(command);
        }
    }

    /// Pointer left `target` for `related`
    pub fn pointer_out(&self, target: ElementId, related: Option<ElementId>) {
        let Some(command) = self.inner.command_for(target) else {
            return;
        };
        let document = self.context().document();
        if related.is_some_and(|related| document.contains(command.element(), related)) {
            return;
        }
        if document.focused() == Some(command.element()) {
            document.focus(self.element());
        }
        self.inner.cancel_hover();
    }

    pub fn ptr_eq(&self, other: &Menu) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for Menu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Menu")
            .field("flyout", &self.inner.flyout)
            .field("commands", &self.inner.commands.borrow().len())
            .field("spacing", &self.inner.spacing.get())
            .finish()
    }
}

// =============================================================================
// Internals
// =============================================================================

impl MenuInner {
    pub(crate) fn sub_flyout_placement(&self) -> Placement {
        self.config.sub_flyout_placement
    }

    /// A command was invoked; leaf commands dismiss the cascade
    pub(crate) fn handle_command_invoked(&self, command: &MenuCommand) {
        self.cancel_hover();
        if !matches!(command.kind(), CommandKind::Flyout | CommandKind::Separator) {
            tracing::debug!("Menu::handle_command_invoked - '{}' dismisses", command.id());
            self.flyout.light_dismiss();
        }
    }

    pub(crate) fn commands_updated(&self) {
        if !self.flyout.is_hidden() {
            self.refresh_layout();
        }
    }

    fn forget(&self, command: &MenuCommand) {
        self.commands.borrow_mut().retain(|c| !c.ptr_eq(command));
    }

    fn command_for(&self, target: ElementId) -> Option<MenuCommand> {
        let document = self.flyout.context().document();
        self.commands
            .borrow()
            .iter()
            .find(|command| document.contains(command.element(), target))
            .cloned()
    }

    fn activated_command(&self) -> Option<MenuCommand> {
        self.commands
            .borrow()
            .iter()
            .find(|command| command.is_flyout_activated())
            .cloned()
    }

    fn refresh_layout(&self) {
        let commands = self.commands.borrow();
        let visible = || commands.iter().filter(|command| !command.is_hidden());
        self.layout_flags.set(MenuLayoutFlags {
            has_toggle: visible().any(|command| command.kind() == CommandKind::Toggle),
            has_flyout: visible().any(|command| command.kind() == CommandKind::Flyout),
        });
    }

    fn start_hover(&self, command: MenuCommand) {
        if self.hover.borrow().is_some() {
            return;
        }
        let weak = self.this.clone();
        let handle = self
            .flyout
            .context()
            .tasks()
            .post_delayed(self.config.hover_delay_ms, move || {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                inner.hover.borrow_mut().take();
                if !inner.flyout.is_hidden() && !inner.flyout.is_disposed() {
                    command.invoke();
                }
            });
        *self.hover.borrow_mut() = Some(handle);
    }

    fn cancel_hover(&self) {
        let handle = self.hover.borrow_mut().take();
        if let Some(handle) = handle {
            handle.cancel();
        }
    }

    /// Walk siblings from the focused element until one takes focus
    fn focus_step(&self, forward: bool) {
        let document = self.flyout.context().document();
        let menu = self.flyout.element();
        let Some(start) = document.focused() else {
            return;
        };

        // Every child plus the menu itself, twice over, bounds the walk
        let limit = 2 * (document.tree().children(menu).len() + 1);
        let mut current = start;
        for _ in 0..limit {
            let next = {
                let tree = document.tree();
                match (current == menu, forward) {
                    (true, true) => tree.first_child(menu),
                    (true, false) => tree.last_child(menu),
                    (false, true) => tree.next_sibling(current),
                    (false, false) => tree.prev_sibling(current),
                }
            };
            match next {
                Some(next) => {
                    document.focus(next);
                    current = next;
                }
                None => current = menu,
            }
            if document.focused() == Some(current) {
                return;
            }
        }
    }

    fn pick_spacing(&self) {
        if self.spacing.get().is_some() {
            return;
        }
        let spacing = match self.flyout.context().cascade().input_type() {
            Some(InputType::Mouse | InputType::Keyboard) => MenuSpacing::Mouse,
            _ => MenuSpacing::Touch,
        };
        self.spacing.set(Some(spacing));
    }
}

impl FlyoutHooks for MenuInner {
    fn before_hide(&self) {
        self.cancel_hover();
    }

    fn before_end_hide(&self) {
        self.spacing.set(None);
    }

    fn before_position(&self) {
        self.pick_spacing();
        self.refresh_layout();
    }

    fn key_down(&self, event: &KeyEvent) -> bool {
        let focused = self.flyout.context().document().focused();
        match event.key() {
            Key::Up => {
                event.prevent_default();
                self.focus_step(false);
            }
            Key::Down => {
                event.prevent_default();
                self.focus_step(true);
            }
            Key::Space | Key::Enter if focused == Some(self.flyout.element()) => {
                event.prevent_default();
                self.flyout.hide();
            }
            // Focus stays inside the menu
            Key::Tab => event.prevent_default(),
            _ => {}
        }
        true
    }

    fn focus_in(&self, event: &FocusEvent) -> bool {
        if let Some(command) = self.command_for(event.target) {
            if command.is_flyout_activated() {
                if let Some(flyout) = command.sub_flyout() {
                    self.flyout.context().focus(flyout.element());
                }
            } else if let Some(sibling) = self.activated_command() {
                sibling.deactivate_flyout();
            }
        } else if event.target == self.flyout.element() {
            self.flyout.handle_focus_in_default(event);
        }
        true
    }
}

impl Drop for MenuInner {
    fn drop(&mut self) {
        if let Some(handle) = self.hover.get_mut().take() {
            handle.cancel();
        }
    }
}
