//! Platform abstraction layer
//!
//! Translates device events into simulation input. Hosts own the event loop
//! and forward events here.

pub mod input;

pub use input::{InputAdapter, InputSource};
