//! Chatfolk library crate: re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the actual stage entry point.
//! This library crate exposes the same modules so that `tests/` integration
//! tests can drive the chat log, roster, and behaviour systems without a
//! window or GPU.

pub mod shared;
pub mod settings;
pub mod chatlog;
pub mod data;
pub mod npcs;
pub mod ui;
