//! End-to-end cascade behavior across menus, sub-menus and plain flyouts

use std::cell::Cell;
use std::rc::Rc;

use lamina_core::{ElementId, Key, KeyboardEvent, Rect};
use lamina_overlay::{
    Alignment, Flyout, LifecycleEventKind, OverlayContext, OverlayState, Placement,
};
use lamina_platform::InputType;

use crate::menu::Menu;
use crate::menu_command::MenuCommand;

struct Fixture {
    ctx: OverlayContext,
    root: ElementId,
    button: ElementId,
    other_button: ElementId,
}

impl Fixture {
    fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();

        let ctx = OverlayContext::new();
        let root = ctx.document().create_root(Rect::new(0.0, 0.0, 1024.0, 768.0));
        let button = ctx.document().create_child(root).unwrap();
        ctx.document()
            .set_bounds(button, Rect::new(100.0, 60.0, 80.0, 30.0))
            .unwrap();
        let other_button = ctx.document().create_child(root).unwrap();
        ctx.document()
            .set_bounds(other_button, Rect::new(700.0, 60.0, 80.0, 30.0))
            .unwrap();
        Self {
            ctx,
            root,
            button,
            other_button,
        }
    }

    fn panel(&self) -> ElementId {
        let panel = self.ctx.document().create_child(self.root).unwrap();
        self.ctx
            .document()
            .set_bounds(panel, Rect::new(0.0, 0.0, 160.0, 120.0))
            .unwrap();
        panel
    }

    fn menu(&self, commands: Vec<MenuCommand>) -> Menu {
        let menu = Menu::new(&self.ctx, self.panel()).unwrap();
        menu.set_commands(commands.clone()).unwrap();
        for (row, command) in commands.iter().enumerate() {
            let top = 100.0 + 30.0 * row as f32;
            self.ctx
                .document()
                .set_bounds(command.element(), Rect::new(100.0, top, 160.0, 30.0))
                .unwrap();
        }
        menu
    }

    fn button_command(&self, id: &str) -> MenuCommand {
        MenuCommand::button(&self.ctx, id, id).unwrap()
    }

    fn sub_command(&self, id: &str, sub: &Menu) -> MenuCommand {
        MenuCommand::flyout(&self.ctx, id, id, sub.flyout().clone()).unwrap()
    }

    fn open(&self, menu: &Menu) {
        menu.show_at(self.button, Placement::Bottom, Alignment::Left)
            .unwrap();
        self.settle();
    }

    fn settle(&self) {
        self.ctx.tasks().advance(1000);
    }

    fn surfaces(&self) -> Vec<lamina_overlay::SurfaceId> {
        self.ctx.cascade().surfaces()
    }
}

#[test]
fn test_sub_menu_stacks_above_its_parent() {
    let fx = Fixture::new();
    let sub = fx.menu(vec![fx.button_command("copy")]);
    let recent = fx.sub_command("recent", &sub);
    let menu = fx.menu(vec![fx.button_command("open"), recent.clone()]);

    fx.open(&menu);
    recent.invoke();
    fx.settle();

    assert!(recent.is_flyout_activated());
    assert_eq!(sub.state(), OverlayState::Shown);
    assert_eq!(
        fx.surfaces(),
        vec![menu.flyout().surface_id(), sub.flyout().surface_id()]
    );
    // Sub-flyouts open beside their command
    let frame = sub.flyout().frame().unwrap();
    assert_eq!(frame.left(), 260.0);
}

#[test]
fn test_opening_sibling_sub_menu_closes_the_first() {
    let fx = Fixture::new();
    let first_sub = fx.menu(vec![fx.button_command("a1")]);
    let second_sub = fx.menu(vec![fx.button_command("b1")]);
    let first = fx.sub_command("first", &first_sub);
    let second = fx.sub_command("second", &second_sub);
    let menu = fx.menu(vec![first.clone(), second.clone()]);

    fx.open(&menu);
    first.invoke();
    fx.settle();
    second.invoke();

    assert_eq!(first_sub.state(), OverlayState::Hiding);
    assert!(!first.is_flyout_activated());
    assert!(second.is_flyout_activated());
    assert_eq!(
        fx.surfaces(),
        vec![menu.flyout().surface_id(), second_sub.flyout().surface_id()]
    );
}

#[test]
fn test_unrelated_flyout_starts_a_new_cascade() {
    let fx = Fixture::new();
    let sub = fx.menu(vec![fx.button_command("copy")]);
    let recent = fx.sub_command("recent", &sub);
    let menu = fx.menu(vec![recent.clone()]);
    let other = Flyout::new(&fx.ctx, fx.panel()).unwrap();

    fx.open(&menu);
    recent.invoke();
    fx.settle();

    other
        .show_at(fx.other_button, Placement::Bottom, Alignment::Center)
        .unwrap();
    assert_eq!(menu.state(), OverlayState::Hiding);
    assert_eq!(sub.state(), OverlayState::Hiding);
    assert_eq!(fx.surfaces(), vec![other.surface_id()]);
}

#[test]
fn test_escape_collapses_one_level_at_a_time() {
    let fx = Fixture::new();
    let sub = fx.menu(vec![fx.button_command("copy")]);
    let recent = fx.sub_command("recent", &sub);
    let menu = fx.menu(vec![recent.clone()]);

    fx.open(&menu);
    recent.invoke();
    fx.settle();

    fx.ctx
        .key_down(sub.element(), KeyboardEvent::pressed(Key::Escape));
    fx.settle();
    assert!(sub.is_hidden());
    assert_eq!(menu.state(), OverlayState::Shown);
    assert_eq!(fx.surfaces(), vec![menu.flyout().surface_id()]);

    fx.ctx
        .key_down(menu.element(), KeyboardEvent::pressed(Key::Escape));
    fx.settle();
    assert!(menu.is_hidden());
    assert!(fx.ctx.cascade().is_empty());
}

#[test]
fn test_click_away_collapses_whole_cascade() {
    let fx = Fixture::new();
    let sub = fx.menu(vec![fx.button_command("copy")]);
    let recent = fx.sub_command("recent", &sub);
    let menu = fx.menu(vec![recent.clone()]);

    fx.open(&menu);
    recent.invoke();
    fx.settle();

    fx.ctx.pointer_down(Some(fx.root), InputType::Mouse);
    fx.settle();
    assert!(menu.is_hidden());
    assert!(sub.is_hidden());
    assert!(fx.ctx.cascade().is_empty());
    assert!(!recent.is_flyout_activated());
}

#[test]
fn test_back_arrow_closes_focused_sub_menu() {
    let fx = Fixture::new();
    let sub = fx.menu(vec![fx.button_command("copy")]);
    let recent = fx.sub_command("recent", &sub);
    let menu = fx.menu(vec![recent.clone()]);

    fx.open(&menu);
    fx.ctx
        .key_down(recent.element(), KeyboardEvent::pressed(Key::Right));
    fx.settle();
    assert_eq!(sub.state(), OverlayState::Shown);

    let event = fx
        .ctx
        .key_down(sub.element(), KeyboardEvent::pressed(Key::Left));
    assert!(event.is_default_prevented());
    fx.settle();
    assert!(sub.is_hidden());
    assert_eq!(menu.state(), OverlayState::Shown);
}

#[test]
fn test_leaf_command_in_sub_menu_dismisses_everything() {
    let fx = Fixture::new();
    let copy = fx.button_command("copy");
    let sub = fx.menu(vec![copy.clone()]);
    let recent = fx.sub_command("recent", &sub);
    let menu = fx.menu(vec![recent.clone()]);

    let clicked = Rc::new(Cell::new(false));
    let flag = clicked.clone();
    copy.on_click(move |_| flag.set(true));

    fx.open(&menu);
    recent.invoke();
    fx.settle();
    copy.invoke();
    fx.settle();

    assert!(clicked.get());
    assert!(menu.is_hidden());
    assert!(sub.is_hidden());
    assert!(fx.ctx.cascade().is_empty());
}

#[test]
fn test_focusing_sibling_command_closes_open_sub_menu() {
    let fx = Fixture::new();
    let sub = fx.menu(vec![fx.button_command("copy")]);
    let recent = fx.sub_command("recent", &sub);
    let open = fx.button_command("open");
    let menu = fx.menu(vec![recent.clone(), open.clone()]);

    fx.open(&menu);
    recent.invoke();
    fx.settle();

    menu.pointer_over(open.element());
    assert_eq!(fx.ctx.document().focused(), Some(open.element()));
    assert!(!recent.is_flyout_activated());
    assert_eq!(sub.state(), OverlayState::Hiding);
    assert_eq!(fx.surfaces(), vec![menu.flyout().surface_id()]);
}

#[test]
fn test_hover_opens_sub_menu_after_delay() {
    let fx = Fixture::new();
    let sub = fx.menu(vec![fx.button_command("copy")]);
    let recent = fx.sub_command("recent", &sub);
    let menu = fx.menu(vec![recent.clone()]);
    fx.open(&menu);

    menu.pointer_over(recent.element());
    assert_eq!(fx.ctx.document().focused(), Some(recent.element()));
    assert!(menu.hover_pending());

    fx.ctx.tasks().advance(399);
    assert!(sub.is_hidden());

    fx.ctx.tasks().advance(1);
    assert!(!sub.is_hidden());
    assert!(recent.is_flyout_activated());
    assert!(!menu.hover_pending());
}

#[test]
fn test_pointer_out_cancels_hover() {
    let fx = Fixture::new();
    let sub = fx.menu(vec![fx.button_command("copy")]);
    let recent = fx.sub_command("recent", &sub);
    let menu = fx.menu(vec![recent.clone()]);
    fx.open(&menu);

    menu.pointer_over(recent.element());
    menu.pointer_out(recent.element(), Some(fx.root));
    assert!(!menu.hover_pending());
    assert_eq!(fx.ctx.document().focused(), Some(menu.element()));

    fx.settle();
    assert!(sub.is_hidden());
}

#[test]
fn test_hiding_menu_cancels_hover() {
    let fx = Fixture::new();
    let sub = fx.menu(vec![fx.button_command("copy")]);
    let recent = fx.sub_command("recent", &sub);
    let menu = fx.menu(vec![recent.clone()]);
    fx.open(&menu);

    menu.pointer_over(recent.element());
    menu.hide();
    assert!(!menu.hover_pending());

    fx.settle();
    assert!(menu.is_hidden());
    assert!(sub.is_hidden());
}

#[test]
fn test_collapse_survives_reentrant_hide() {
    let fx = Fixture::new();
    let sub = fx.menu(vec![fx.button_command("copy")]);
    let recent = fx.sub_command("recent", &sub);
    let menu = fx.menu(vec![recent.clone()]);

    let parent = menu.clone();
    sub.on(LifecycleEventKind::BeforeHide, move |_| parent.hide());

    fx.open(&menu);
    recent.invoke();
    fx.settle();

    fx.ctx.pointer_down(Some(fx.root), InputType::Mouse);
    assert!(!fx.ctx.cascade().is_locked());
    assert!(fx.ctx.cascade().is_empty());

    fx.settle();
    assert_eq!(menu.state(), OverlayState::Hidden);
    assert_eq!(sub.state(), OverlayState::Hidden);
}

#[test]
fn test_show_during_collapse_waits_for_unlock() {
    let fx = Fixture::new();
    let sub = fx.menu(vec![fx.button_command("copy")]);
    let recent = fx.sub_command("recent", &sub);
    let menu = fx.menu(vec![recent.clone()]);
    let other = Flyout::new(&fx.ctx, fx.panel()).unwrap();

    let next = other.clone();
    let anchor = fx.other_button;
    sub.on(LifecycleEventKind::BeforeHide, move |_| {
        next.show_at(anchor, Placement::Bottom, Alignment::Center)
            .unwrap();
    });

    fx.open(&menu);
    recent.invoke();
    fx.settle();

    fx.ctx.pointer_down(Some(fx.root), InputType::Mouse);
    assert_eq!(other.state(), OverlayState::Hidden);

    fx.settle();
    assert_eq!(other.state(), OverlayState::Shown);
    assert_eq!(fx.surfaces(), vec![other.surface_id()]);
    assert!(menu.is_hidden());
}
