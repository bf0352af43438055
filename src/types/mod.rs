//! Static type model: types and type sets, function signatures, and the
//! namespace of built-in objects, functions and modules.

pub mod builtins;
pub mod function;
pub mod modules;
pub mod namespace;
pub mod types;

#[cfg(test)]
mod tests;
