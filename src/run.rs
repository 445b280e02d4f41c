mod cli;
pub(crate) mod input;
mod shell;
mod tui;

pub(crate) use cli::{as_cli, shellexpand};
pub(crate) use tui::as_tui;
