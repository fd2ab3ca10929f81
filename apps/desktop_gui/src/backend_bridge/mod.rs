//! Worker thread that runs classifier requests off the UI thread.

pub mod commands;
pub mod runtime;
