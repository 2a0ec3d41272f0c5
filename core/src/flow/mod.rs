// craftflow/src/flow/mod.rs

//! `Flow<T, Err>`: definition, handler registration and execution.

pub mod definition;
pub mod execution;
pub mod hooks;

pub use definition::Flow;
