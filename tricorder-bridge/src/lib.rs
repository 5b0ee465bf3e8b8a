//! Tricorder Bridge library target.
//!
//! Exposes internal modules for integration tests. The binary entry point
//! is in `main.rs`; this file exists solely so `tests/*.rs` can import
//! the bridge's logic.

pub mod editor;
pub mod keyboard;
pub mod scrollback;
