//! Keystroke injection script engine.
//!
//! Scripts are read a line at a time from a [`storage::Storage`] through the
//! [`navigation::ScriptStack`], which follows `IMPORT`s, and run by the
//! [`interpreter::Interpreter`] against a [`device::Device`].

pub mod tokenizer;
pub mod number;
pub mod keys;
pub mod device;
pub mod storage;
pub mod navigation;
pub mod interpreter;
mod signals;

#[cfg(test)]
mod testing;

pub use interpreter::Interpreter;
pub use navigation::ScriptStack;
