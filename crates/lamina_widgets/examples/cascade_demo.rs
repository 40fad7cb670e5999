//! Cascade Demo
//!
//! Scripted session driving a menu with a cascading sub-menu:
//! - Open the menu from a button with the mouse
//! - Hover the "Recent" command until its sub-menu opens
//! - Press Escape to close one level, then click away to close the rest
//! - Reopen and pick a leaf command from the sub-menu
//!
//! Run with: cargo run -p lamina_widgets --example cascade_demo

use lamina_core::{Key, KeyboardEvent};
use lamina_widgets::prelude::*;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let ctx = OverlayContext::new();
    let document = ctx.document();
    let root = document.create_root(Rect::new(0.0, 0.0, 1024.0, 768.0));

    let button = document.create_child(root)?;
    document.set_bounds(button, Rect::new(40.0, 20.0, 90.0, 32.0))?;
    document.set_focusable(button, true)?;

    // Sub-menu with two files
    let sub_panel = document.create_child(root)?;
    document.set_bounds(sub_panel, Rect::new(0.0, 0.0, 180.0, 64.0))?;
    let recent_menu = Menu::new(&ctx, sub_panel)?;
    let notes = MenuCommand::button(&ctx, "notes", "notes.txt")?;
    notes.on_click(|command| tracing::info!("opening {}", command.label()));
    let todo = MenuCommand::button(&ctx, "todo", "todo.md")?;
    recent_menu.set_commands(vec![notes.clone(), todo])?;

    // Top-level menu
    let panel = document.create_child(root)?;
    document.set_bounds(panel, Rect::new(0.0, 0.0, 200.0, 96.0))?;
    let menu = Menu::new(&ctx, panel)?;
    let open = MenuCommand::button(&ctx, "open", "Open...")?;
    let wrap = MenuCommand::toggle(&ctx, "wrap", "Word wrap")?;
    let recent = MenuCommand::flyout(&ctx, "recent", "Recent", recent_menu.flyout().clone())?;
    menu.set_commands(vec![open, wrap, recent.clone()])?;

    // Rows as a renderer would lay them out under the button
    for (row, command) in menu.commands().iter().enumerate() {
        let top = 52.0 + 32.0 * row as f32;
        document.set_bounds(command.element(), Rect::new(40.0, top, 200.0, 32.0))?;
    }

    let report = |step: &str| {
        tracing::info!(
            "{step}: menu {:?}, recent {:?}, cascade depth {}",
            menu.state(),
            recent_menu.state(),
            ctx.cascade().len()
        );
    };

    ctx.pointer_down(Some(button), InputType::Mouse);
    menu.show_at(button, Placement::Bottom, Alignment::Left)?;
    ctx.tasks().advance(500);
    report("opened");
    tracing::info!("spacing {:?}, layout {:?}", menu.spacing(), menu.layout_flags());

    menu.pointer_over(recent.element());
    ctx.tasks().advance(menu.config().hover_delay_ms);
    ctx.tasks().advance(500);
    report("hovered recent");

    ctx.key_down(recent_menu.element(), KeyboardEvent::pressed(Key::Escape));
    ctx.tasks().advance(500);
    report("escape");

    ctx.pointer_down(Some(root), InputType::Mouse);
    ctx.tasks().advance(500);
    report("click away");

    menu.show_at(button, Placement::Bottom, Alignment::Left)?;
    ctx.tasks().advance(500);
    ctx.key_down(recent.element(), KeyboardEvent::pressed(Key::Right));
    ctx.tasks().advance(500);
    ctx.key_down(notes.element(), KeyboardEvent::pressed(Key::Enter));
    ctx.tasks().advance(500);
    report("picked notes.txt");

    menu.dispose();
    recent_menu.dispose();
    Ok(())
}
