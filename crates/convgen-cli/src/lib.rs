//! convgen library - expose command modules for testing

pub mod commands;
pub mod common;

pub use common::GlobalOpts;
