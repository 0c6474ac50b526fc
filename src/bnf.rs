//! Main module for grammar matching

pub mod ast;
pub mod config;
pub mod engine;
pub mod error;
pub mod formats;
pub mod grammar;
pub mod loader;
pub mod location;
pub mod node;
pub mod parse_error;
pub mod syntax;
