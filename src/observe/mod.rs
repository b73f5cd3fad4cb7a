//! Observation primitives
//!
//! The buffer reacts to two caller-owned inputs: the frontend page and the
//! request options. This module holds the pieces that make those inputs
//! observable.
//!
//! - `PageCursor` - shared frontend page cell with subscription and reset
//! - `KeyWatcher` - key-by-key change detection for options objects

mod cursor;
mod keys;

pub use cursor::{PageCursor, ResetFn};
pub use keys::KeyWatcher;

#[cfg(test)]
mod tests;
