extern crate thiserror;

pub mod bytecode;
pub mod loader;
pub mod machine;

pub use machine::machine::{execute, Machine};
