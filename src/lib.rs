//! usagebar: shows Claude usage from a polled usage script in a terminal
//! panel or a status line.

pub mod commands;
pub mod config;
pub mod menu;
pub mod state;
pub mod ui;
