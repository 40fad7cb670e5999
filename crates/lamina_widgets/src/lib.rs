//! Lamina Widgets
//!
//! Controls built on cascading flyouts:
//!
//! - **Menu**: a flyout listing commands, with arrow navigation, hover
//!   sub-menus and mouse/touch spacing
//! - **MenuCommand**: button, toggle, separator and sub-flyout entries
//!
//! # Example
//!
//! ```ignore
//! use lamina_widgets::prelude::*;
//!
//! let ctx = OverlayContext::new();
//! let menu = Menu::new(&ctx, panel)?;
//! let save = MenuCommand::button(&ctx, "save", "Save")?;
//! save.on_click(|_| tracing::info!("saving"));
//!
//! menu.set_commands(vec![save])?;
//! menu.show_at(button, Placement::Bottom, Alignment::Left)?;
//! ```

pub mod error;
pub mod menu;
pub mod menu_command;

#[cfg(test)]
mod scenarios;

pub use error::{MenuError, Result};
pub use menu::{Menu, MenuConfig, MenuLayoutFlags, MenuSpacing, DEFAULT_HOVER_DELAY_MS};
pub use menu_command::{ClickHandler, CommandKind, MenuCommand};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{MenuError, Result};
    pub use crate::menu::{Menu, MenuConfig, MenuSpacing};
    pub use crate::menu_command::{CommandKind, MenuCommand};

    pub use lamina_overlay::prelude::*;
}
