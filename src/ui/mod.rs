//! Presentation layer
//!
//! The [`list_presenter`] holds the view state; the other modules render it
//! as a full-screen terminal UI, a line-mode REPL or a plain table.

pub mod classic;
pub mod list_presenter;
pub mod table_display;
pub mod tui_app;
